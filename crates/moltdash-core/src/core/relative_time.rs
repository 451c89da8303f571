//! Relative timestamps for feed cards ("now", "42s", "2m", "2h", "2d").

const MINUTE: f64 = 60.0;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;

/// Formats `timestamp` relative to `now` (both seconds since the epoch).
///
/// Every bucket is floored, never rounded. Timestamps in the future read as
/// "now".
pub fn format_relative(timestamp: f64, now: f64) -> String {
    let elapsed = now - timestamp;
    if !elapsed.is_finite() || elapsed < 5.0 {
        return "now".to_string();
    }
    if elapsed < MINUTE {
        return format!("{}s", elapsed.floor() as u64);
    }
    if elapsed < HOUR {
        return format!("{}m", (elapsed / MINUTE).floor() as u64);
    }
    if elapsed < DAY {
        return format!("{}h", (elapsed / HOUR).floor() as u64);
    }
    format!("{}d", (elapsed / DAY).floor() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: f64 = 1_700_000_000.0;

    #[test]
    fn test_reference_offsets() {
        assert_eq!(format_relative(NOW - 3.0, NOW), "now");
        assert_eq!(format_relative(NOW - 42.0, NOW), "42s");
        assert_eq!(format_relative(NOW - 125.0, NOW), "2m");
        assert_eq!(format_relative(NOW - 7200.0, NOW), "2h");
        assert_eq!(format_relative(NOW - 2.0 * DAY, NOW), "2d");
    }

    #[test]
    fn test_buckets_floor_instead_of_round() {
        assert_eq!(format_relative(NOW - 59.9, NOW), "59s");
        assert_eq!(format_relative(NOW - 119.0, NOW), "1m");
        assert_eq!(format_relative(NOW - (2.0 * HOUR - 1.0), NOW), "1h");
        assert_eq!(format_relative(NOW - (DAY * 1.99), NOW), "1d");
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(format_relative(NOW - 4.999, NOW), "now");
        assert_eq!(format_relative(NOW - 5.0, NOW), "5s");
        assert_eq!(format_relative(NOW - MINUTE, NOW), "1m");
        assert_eq!(format_relative(NOW - HOUR, NOW), "1h");
        assert_eq!(format_relative(NOW - DAY, NOW), "1d");
    }

    #[test]
    fn test_future_timestamp_reads_now() {
        assert_eq!(format_relative(NOW + 30.0, NOW), "now");
    }
}
