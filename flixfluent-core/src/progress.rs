//! Progress bar math

/// Playback progress in percent.
///
/// Returns 0 whenever the ratio is not a finite number, which covers an
/// unknown (NaN) or zero duration. The result is clamped to `[0, 100]`.
pub fn progress_percent(current_time: f64, duration: f64) -> f64 {
    let progress = current_time / duration * 100.0;
    if progress.is_finite() {
        progress.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Format seconds as `m:ss` for the time display
pub fn format_timestamp(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_defaults_to_zero() {
        assert_eq!(progress_percent(12.0, 0.0), 0.0);
        assert_eq!(progress_percent(12.0, f64::NAN), 0.0);
        assert_eq!(progress_percent(0.0, 0.0), 0.0);
        assert_eq!(progress_percent(f64::NAN, 100.0), 0.0);
    }

    #[test]
    fn test_progress_ratio() {
        assert_eq!(progress_percent(25.0, 100.0), 25.0);
        assert_eq!(progress_percent(120.0, 100.0), 100.0);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "0:00");
        assert_eq!(format_timestamp(9.9), "0:09");
        assert_eq!(format_timestamp(75.0), "1:15");
        assert_eq!(format_timestamp(3600.0), "60:00");
        assert_eq!(format_timestamp(f64::NAN), "0:00");
    }
}
