//! Human-readable record rendering for diagnostics.

use chrono::{DateTime, Utc};
use std::fmt;

/// Render a record with its batch position, tag and time.
///
/// The output is meant for operators reading logs, not for parsing:
/// `[3] app.access: [2023-11-14 22:13:20 UTC, {"log": "GET /"}]`.
pub fn render_record<R>(index: usize, tag: &str, timestamp: DateTime<Utc>, record: &R) -> String
where
    R: fmt::Display + ?Sized,
{
    format!("[{}] {}: [{}, {}]", index, tag, timestamp, record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RawValue;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_render_raw_record() {
        let ts = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap();
        let raw = RawValue::map([("log", RawValue::from("GET /"))]);
        assert_eq!(
            render_record(3, "app.access", ts, &raw),
            r#"[3] app.access: [2023-11-14 22:13:20 UTC, {"log": "GET /"}]"#
        );
    }

    #[test]
    fn test_render_normalized_record() {
        let ts = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap();
        let value = json!({"status": 200});
        assert_eq!(
            render_record(0, "t", ts, &value),
            r#"[0] t: [2023-11-14 22:13:20 UTC, {"status":200}]"#
        );
    }
}
