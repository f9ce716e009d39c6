use anyhow::Context;
use chrono::{DateTime, Utc};

/// Check time in Unix seconds: `--now` as Unix seconds or RFC 3339, else
/// the system clock
pub fn resolve_now(raw: Option<&str>) -> anyhow::Result<i64> {
    let Some(raw) = raw.map(str::trim) else {
        return Ok(Utc::now().timestamp());
    };

    if let Ok(secs) = raw.parse::<i64>() {
        return Ok(secs);
    }

    let time = DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("invalid --now value {:?} (expected RFC 3339 or Unix seconds)", raw))?;
    Ok(time.timestamp())
}
