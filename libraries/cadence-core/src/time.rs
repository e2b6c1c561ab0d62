//! Millisecond → display string helpers
//!
//! Three formats are in use:
//! - `format_duration`: track lengths in lists, `mm:ss` with zero-padded minutes
//! - `format_clock`: elapsed/remaining labels next to the seek bar, `m:ss`
//! - `format_total_duration`: playlist totals, `h:mm:ss` once past an hour

/// Format milliseconds as `mm:ss`
///
/// Minutes are not wrapped at 60: a 75 minute track is `75:00`.
pub fn format_duration(duration_ms: u64) -> String {
    let total_seconds = duration_ms / 1000;
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Format milliseconds as `m:ss`
pub fn format_clock(position_ms: u64) -> String {
    let total_seconds = position_ms / 1000;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Format milliseconds as `h:mm:ss`, falling back to `mm:ss` under an hour
pub fn format_total_duration(duration_ms: u64) -> String {
    let total_seconds = duration_ms / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Integer progress percentage for seek bars, 0 when the duration is unknown
pub fn progress_percent(position_ms: u64, duration_ms: u64) -> u8 {
    if duration_ms == 0 {
        return 0;
    }
    ((position_ms.min(duration_ms) as f64 / duration_ms as f64) * 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_is_zero_padded() {
        assert_eq!(format_duration(180_000), "03:00");
        assert_eq!(format_duration(65_000), "01:05");
        assert_eq!(format_duration(0), "00:00");
    }

    #[test]
    fn duration_truncates_partial_seconds() {
        assert_eq!(format_duration(65_999), "01:05");
    }

    #[test]
    fn duration_keeps_counting_minutes_past_an_hour() {
        assert_eq!(format_duration(4_500_000), "75:00");
    }

    #[test]
    fn clock_has_unpadded_minutes() {
        assert_eq!(format_clock(65_000), "1:05");
        assert_eq!(format_clock(600_000), "10:00");
    }

    #[test]
    fn total_duration_switches_to_hours() {
        assert_eq!(format_total_duration(3_599_000), "59:59");
        assert_eq!(format_total_duration(3_600_000), "1:00:00");
    }

    #[test]
    fn progress_handles_unknown_duration() {
        assert_eq!(progress_percent(5_000, 0), 0);
        assert_eq!(progress_percent(50_000, 200_000), 25);
        assert_eq!(progress_percent(300_000, 200_000), 100);
    }
}
