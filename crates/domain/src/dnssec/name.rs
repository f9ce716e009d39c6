//! Helpers for fully-qualified, lower-cased presentation names.
//!
//! Every name that crosses a module boundary is normalized with [`normalize`]:
//! lower-case, trailing dot, root written as `"."`.

use crate::DomainError;

/// Lower-case a name and make it fully qualified.
///
/// - `"Example.COM"` → `"example.com."`
/// - `""` / `"."` → `"."`
pub fn normalize(name: &str) -> String {
    let trimmed = name.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return ".".to_string();
    }
    format!("{}.", trimmed.to_ascii_lowercase())
}

/// Labels of a normalized name, leftmost first. The root has none.
pub fn labels(name: &str) -> Vec<&str> {
    let trimmed = name.trim_end_matches('.');
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split('.').collect()
}

pub fn label_count(name: &str) -> usize {
    labels(name).len()
}

/// Parent of a name.
///
/// Examples:
/// - "www.example.com." → "example.com."
/// - "com." → "."
/// - "." → None
pub fn parent(name: &str) -> Option<String> {
    let parts = labels(name);
    if parts.is_empty() {
        return None;
    }
    if parts.len() == 1 {
        return Some(".".to_string());
    }
    Some(format!("{}.", parts[1..].join(".")))
}

/// True when `name` equals `ancestor` or lies below it.
pub fn is_subdomain(name: &str, ancestor: &str) -> bool {
    let name = normalize(name);
    let ancestor = normalize(ancestor);
    if ancestor == "." {
        return true;
    }
    name == ancestor || name.ends_with(&format!(".{}", ancestor))
}

/// Zones to visit from `anchor` down to `target`, both included, one label
/// at a time.
///
/// `zone_path(".", "www.example.com.")` → `[".", "com.", "example.com.", "www.example.com."]`
pub fn zone_path(anchor: &str, target: &str) -> Result<Vec<String>, DomainError> {
    let anchor = normalize(anchor);
    let target = normalize(target);
    if !is_subdomain(&target, &anchor) {
        return Err(DomainError::InvalidDomainName(format!(
            "{} is not below trust anchor {}",
            target, anchor
        )));
    }

    let mut path = vec![target.clone()];
    let mut current = target;
    while current != anchor {
        match parent(&current) {
            Some(p) => {
                path.push(p.clone());
                current = p;
            }
            None => break,
        }
    }
    path.reverse();
    Ok(path)
}

/// Prepend a single label to a name.
pub fn prepend(label: &str, name: &str) -> String {
    let name = normalize(name);
    if name == "." {
        format!("{}.", label.to_ascii_lowercase())
    } else {
        format!("{}.{}", label.to_ascii_lowercase(), name)
    }
}

/// Keep the rightmost `count` labels of a name.
pub fn suffix(name: &str, count: usize) -> String {
    let parts = labels(name);
    if count == 0 || parts.is_empty() {
        return ".".to_string();
    }
    let start = parts.len().saturating_sub(count);
    format!("{}.", parts[start..].join("."))
}

/// Convert a name to uncompressed, lower-cased wire format.
///
/// ## Format
/// ```text
/// example.com. → 0x07 e x a m p l e 0x03 c o m 0x00
/// ```
pub fn to_wire(name: &str) -> Result<Vec<u8>, DomainError> {
    let mut wire = Vec::with_capacity(name.len() + 2);

    for label in labels(name) {
        if label.is_empty() {
            return Err(DomainError::InvalidDomainName(format!(
                "Empty label in {}",
                name
            )));
        }
        if label.len() > 63 {
            return Err(DomainError::InvalidDomainName(format!(
                "Label too long in {}",
                name
            )));
        }
        wire.push(label.len() as u8);
        wire.extend(label.bytes().map(|b| b.to_ascii_lowercase()));
    }

    wire.push(0);

    if wire.len() > 255 {
        return Err(DomainError::InvalidDomainName(format!(
            "Name too long: {}",
            name
        )));
    }

    Ok(wire)
}

/// Parse an uncompressed wire-format name.
///
/// Returns (normalized name, bytes consumed)
pub fn from_wire(data: &[u8]) -> Result<(String, usize), DomainError> {
    let mut labels = Vec::new();
    let mut pos = 0;

    loop {
        let len = *data
            .get(pos)
            .ok_or_else(|| DomainError::InvalidDnsResponse("DNS name truncated".into()))?
            as usize;
        pos += 1;

        if len == 0 {
            break;
        }

        if len > 63 {
            return Err(DomainError::InvalidDnsResponse(
                "Invalid DNS label length".into(),
            ));
        }

        let label = data
            .get(pos..pos + len)
            .ok_or_else(|| DomainError::InvalidDnsResponse("DNS label truncated".into()))?;
        labels.push(String::from_utf8_lossy(label).to_ascii_lowercase());
        pos += len;
    }

    let name = if labels.is_empty() {
        ".".to_string()
    } else {
        format!("{}.", labels.join("."))
    };

    Ok((name, pos))
}
