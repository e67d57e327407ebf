use std::time::Duration;
use anyhow::{anyhow, Result};

/// Parse a poll interval or timeout.
///
/// Bare numbers are seconds and may be fractional ("2.5"). A unit suffix
/// is also accepted: "500ms", "30s", "15m", "1h".
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return Err(anyhow!("Empty duration"));
    }

    let (num, scale) = if let Some(n) = s.strip_suffix("ms") {
        (n, 0.001)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1.0)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60.0)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 3600.0)
    } else {
        (s, 1.0)
    };

    let n: f64 = num
        .trim()
        .parse()
        .map_err(|_| anyhow!("Invalid duration: {}", s))?;
    if !n.is_finite() || n < 0.0 {
        return Err(anyhow!("Duration must be a non-negative number: {}", s));
    }
    Duration::try_from_secs_f64(n * scale).map_err(|_| anyhow!("Duration out of range: {}", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_seconds() {
        assert_eq!(parse_duration("5").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration("2.5").unwrap(), Duration::from_millis(2500));
        assert_eq!(parse_duration(" 900 ").unwrap(), Duration::from_secs(900));
    }

    #[test]
    fn test_units() {
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("15m").unwrap(), Duration::from_secs(900));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("-1").is_err());
        assert!(parse_duration("5d").is_err());
    }

    #[test]
    fn test_rejects_huge_values() {
        let err = parse_duration("1e20").unwrap_err();
        assert_eq!(err.to_string(), "Duration out of range: 1e20");
        assert!(parse_duration("1e16h").is_err());
        assert!(parse_duration("1e9h").is_ok());
    }
}
