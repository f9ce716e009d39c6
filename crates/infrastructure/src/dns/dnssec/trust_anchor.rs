use base64::{engine::general_purpose::STANDARD, Engine};
use dnssec_monitor_domain::dnssec::name;
use dnssec_monitor_domain::{AnchorKind, DnskeyRecord, DomainError, DsRecord, TrustAnchor};
use std::path::Path;
use tracing::info;

/// Loads trust anchors from zone-file formatted key files
///
/// ```text
/// ; root KSK-2017
/// .  172800  IN  DNSKEY  257 3 8 (
///        AwEAAaz/tAm8yTn4Mfeh5eyI96WSVexTBAvkMgJzkKTOiW1v... )
/// .  IN DS 20326 8 2 E06D44B80B8F1D39A95C0B0D7C65D08458E880409BBC683457104237C7F8EC8D
/// ```
///
/// Comments start with `;`, parentheses continue a record over several
/// lines and `$` directives are ignored. All records must share one owner,
/// which becomes the anchor zone.
pub struct TrustAnchorLoader;

impl TrustAnchorLoader {
    pub fn load(path: &str, kind: AnchorKind) -> Result<TrustAnchor, DomainError> {
        if !Path::new(path).exists() {
            return Err(DomainError::InvalidTrustAnchor(format!(
                "{}: file not found",
                path
            )));
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| DomainError::IoError(format!("{}: {}", path, e)))?;

        let anchor = Self::parse(&content, kind, path)?;
        info!(
            zone = %anchor.zone,
            kind = %anchor.kind,
            keys = anchor.keys.len(),
            digests = anchor.digests.len(),
            path = %path,
            "Trust anchor loaded"
        );
        Ok(anchor)
    }

    pub fn parse(content: &str, kind: AnchorKind, source: &str) -> Result<TrustAnchor, DomainError> {
        let mut anchor: Option<TrustAnchor> = None;

        for (line_no, record) in Self::logical_records(content) {
            let invalid =
                |reason: String| DomainError::InvalidTrustAnchor(format!("{}:{}: {}", source, line_no, reason));

            let tokens: Vec<&str> = record.split_whitespace().collect();
            let owner = name::normalize(tokens[0]);

            let mut pos = 1;
            while pos < tokens.len()
                && (tokens[pos].parse::<u32>().is_ok()
                    || tokens[pos].eq_ignore_ascii_case("IN"))
            {
                pos += 1;
            }
            let rtype = tokens
                .get(pos)
                .ok_or_else(|| invalid("missing record type".to_string()))?
                .to_ascii_uppercase();
            let rdata = &tokens[pos + 1..];

            let current = anchor.get_or_insert_with(|| {
                TrustAnchor::new(owner.clone(), kind, source.to_string())
            });
            if current.zone != owner {
                return Err(invalid(format!(
                    "owner {} differs from {}",
                    owner, current.zone
                )));
            }

            match rtype.as_str() {
                "DNSKEY" => current.keys.push(Self::parse_dnskey(rdata).map_err(invalid)?),
                "DS" | "DLV" => current.digests.push(Self::parse_ds(rdata).map_err(invalid)?),
                other => return Err(invalid(format!("unsupported record type {}", other))),
            }
        }

        match anchor {
            Some(anchor) if !anchor.is_empty() => Ok(anchor),
            _ => Err(DomainError::InvalidTrustAnchor(format!(
                "{}: no DNSKEY or DS records",
                source
            ))),
        }
    }

    /// Strips comments and joins parenthesized continuations.
    ///
    /// Returns (first line number, record text) pairs.
    fn logical_records(content: &str) -> Vec<(usize, String)> {
        let mut records = Vec::new();
        let mut pending = String::new();
        let mut start = 0;
        let mut depth = 0usize;

        for (index, raw) in content.lines().enumerate() {
            let line = raw.split(';').next().unwrap_or("");
            if depth == 0 && line.trim_start().starts_with('$') {
                continue;
            }
            if pending.is_empty() {
                start = index + 1;
            }
            for ch in line.chars() {
                match ch {
                    '(' => {
                        depth += 1;
                        pending.push(' ');
                    }
                    ')' => {
                        depth = depth.saturating_sub(1);
                        pending.push(' ');
                    }
                    c => pending.push(c),
                }
            }
            pending.push(' ');

            if depth == 0 {
                if !pending.trim().is_empty() {
                    records.push((start, pending.trim().to_string()));
                }
                pending.clear();
            }
        }

        if !pending.trim().is_empty() {
            records.push((start, pending.trim().to_string()));
        }
        records
    }

    fn parse_dnskey(rdata: &[&str]) -> Result<DnskeyRecord, String> {
        if rdata.len() < 4 {
            return Err("DNSKEY needs flags, protocol, algorithm and key".to_string());
        }
        let flags = rdata[0]
            .parse::<u16>()
            .map_err(|_| format!("invalid DNSKEY flags '{}'", rdata[0]))?;
        let protocol = rdata[1]
            .parse::<u8>()
            .map_err(|_| format!("invalid DNSKEY protocol '{}'", rdata[1]))?;
        let algorithm = rdata[2]
            .parse::<u8>()
            .map_err(|_| format!("invalid DNSKEY algorithm '{}'", rdata[2]))?;
        let public_key = STANDARD
            .decode(rdata[3..].concat())
            .map_err(|e| format!("invalid DNSKEY base64: {}", e))?;

        let mut wire = Vec::with_capacity(4 + public_key.len());
        wire.extend_from_slice(&flags.to_be_bytes());
        wire.push(protocol);
        wire.push(algorithm);
        wire.extend_from_slice(&public_key);

        DnskeyRecord::parse(&wire).map_err(|e| e.to_string())
    }

    fn parse_ds(rdata: &[&str]) -> Result<DsRecord, String> {
        if rdata.len() < 4 {
            return Err("DS needs key tag, algorithm, digest type and digest".to_string());
        }
        let key_tag = rdata[0]
            .parse::<u16>()
            .map_err(|_| format!("invalid DS key tag '{}'", rdata[0]))?;
        let algorithm = rdata[1]
            .parse::<u8>()
            .map_err(|_| format!("invalid DS algorithm '{}'", rdata[1]))?;
        let digest_type = rdata[2]
            .parse::<u8>()
            .map_err(|_| format!("invalid DS digest type '{}'", rdata[2]))?;
        let digest = data_encoding::HEXLOWER_PERMISSIVE
            .decode(rdata[3..].concat().as_bytes())
            .map_err(|e| format!("invalid DS digest hex: {}", e))?;

        let mut wire = Vec::with_capacity(4 + digest.len());
        wire.extend_from_slice(&key_tag.to_be_bytes());
        wire.push(algorithm);
        wire.push(digest_type);
        wire.extend_from_slice(&digest);

        DsRecord::parse(&wire).map_err(|e| e.to_string())
    }
}
