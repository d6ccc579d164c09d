use super::types::Page;

pub const DEFAULT_LIMIT: i64 = 20;

impl Page {
    /// Normalizes raw `limit`/`offset` query values.
    ///
    /// Absent or unparseable limits fall back to `default_limit`; parsed limits
    /// are floored at 1 with no upper cap. Offsets default to 0 and are floored
    /// at 0. Fractional values are truncated.
    pub fn normalize(limit_raw: Option<&str>, offset_raw: Option<&str>, default_limit: i64) -> Self {
        let limit = limit_raw
            .and_then(parse_count)
            .map(|l| l.max(1))
            .unwrap_or(default_limit.max(1));
        let offset = offset_raw.and_then(parse_count).map(|o| o.max(0)).unwrap_or(0);
        Page { limit, offset }
    }
}

fn parse_count(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(n);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f.trunc().clamp(i64::MIN as f64, i64::MAX as f64) as i64)
}
