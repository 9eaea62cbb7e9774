//! Newline-delimited JSON batch framing.
//!
//! Each non-blank line is a two element array `[timestamp, record]`. A
//! non-negative integer timestamp counts epoch seconds, an object
//! `{"sec": s, "nsec": n}` is the host's native event time, and anything
//! else is left for the wall-clock fallback.

use crate::{BatchDecoder, DecodeStatus, HostTimestamp, RawValue};
use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;

/// Native event time as the host encodes it.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EventTime {
    sec: i64,
    #[serde(default)]
    nsec: u32,
}

/// Decoder over a newline-delimited JSON buffer.
pub struct JsonBatchDecoder<'a> {
    lines: std::str::Lines<'a>,
    line_no: usize,
    failed: Option<String>,
}

impl<'a> JsonBatchDecoder<'a> {
    /// Create a decoder over a host buffer.
    ///
    /// A buffer that is not valid UTF-8 yields a single `Error` status.
    pub fn new(data: &'a [u8]) -> Self {
        match std::str::from_utf8(data) {
            Ok(text) => Self::from_str(text),
            Err(e) => Self {
                lines: "".lines(),
                line_no: 0,
                failed: Some(format!("batch is not valid UTF-8: {}", e)),
            },
        }
    }

    /// Create a decoder over text.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
            line_no: 0,
            failed: None,
        }
    }
}

fn decode_line(line_no: usize, line: &str) -> DecodeStatus {
    let entry: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => return DecodeStatus::Error(format!("line {}: {}", line_no, e)),
    };

    let mut parts = match entry {
        Value::Array(parts) if parts.len() == 2 => parts,
        _ => {
            return DecodeStatus::Error(format!(
                "line {}: expected [timestamp, record]",
                line_no
            ))
        }
    };

    let record = RawValue::from(parts.pop().unwrap_or(Value::Null));
    let timestamp = parse_timestamp(parts.pop().unwrap_or(Value::Null));
    DecodeStatus::Record(timestamp, record)
}

fn parse_timestamp(value: Value) -> HostTimestamp {
    match value {
        Value::Object(_) => match serde_json::from_value::<EventTime>(value.clone()) {
            Ok(t) => match DateTime::from_timestamp(t.sec, t.nsec) {
                Some(dt) => HostTimestamp::Native(dt),
                None => HostTimestamp::Other(Some(RawValue::from(value))),
            },
            Err(_) => HostTimestamp::Other(Some(RawValue::from(value))),
        },
        Value::Null => HostTimestamp::Other(None),
        other => HostTimestamp::from_raw(Some(RawValue::from(other))),
    }
}

impl BatchDecoder for JsonBatchDecoder<'_> {
    fn next_record(&mut self) -> DecodeStatus {
        if let Some(reason) = self.failed.take() {
            return DecodeStatus::Error(reason);
        }

        for line in self.lines.by_ref() {
            self.line_no += 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            return decode_line(self.line_no, line);
        }

        DecodeStatus::End
    }
}
