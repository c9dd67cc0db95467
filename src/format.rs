//! Fixed-width text formatting for the process table.

/// Render a duration in seconds as `HH:MM:SS`. Days roll into the hour
/// field, so the output stays sortable as plain text.
pub fn elapsed_hms(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Render a kilobyte count with an auto-selected unit.
pub fn kb_auto_unit(kb: u64) -> String {
    const MB: u64 = 1024;
    const GB: u64 = MB * 1024;
    match kb {
        k if k >= GB => format!("{:.1}G", k as f64 / GB as f64),
        k if k >= MB => format!("{:.1}M", k as f64 / MB as f64),
        k => format!("{k}K"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_hms() {
        assert_eq!(elapsed_hms(0), "00:00:00");
        assert_eq!(elapsed_hms(59), "00:00:59");
        assert_eq!(elapsed_hms(61), "00:01:01");
        assert_eq!(elapsed_hms(3661), "01:01:01");
    }

    #[test]
    fn test_elapsed_hms_rolls_days_into_hours() {
        assert_eq!(elapsed_hms(90061), "25:01:01");
    }

    #[test]
    fn test_kb_auto_unit() {
        assert_eq!(kb_auto_unit(512), "512K");
        assert_eq!(kb_auto_unit(2048), "2.0M");
        assert_eq!(kb_auto_unit(3 * 1024 * 1024), "3.0G");
    }
}
