//! Record timestamp resolution.

use crate::RawValue;
use chrono::{DateTime, Utc};
use tracing::warn;

/// Timestamp as handed over by the host, before resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum HostTimestamp {
    /// The host's native time value.
    Native(DateTime<Utc>),
    /// Seconds since the Unix epoch.
    EpochSeconds(u64),
    /// Anything else the host produced, including nothing at all.
    Other(Option<RawValue>),
}

impl HostTimestamp {
    /// Classify an untyped host value.
    ///
    /// Unsigned integers count epoch seconds; every other shape is kept as
    /// [`HostTimestamp::Other`] and resolved to the wall clock later.
    pub fn from_raw(value: Option<RawValue>) -> Self {
        match value {
            Some(RawValue::Uint(secs)) => Self::EpochSeconds(secs),
            other => Self::Other(other),
        }
    }
}

/// Resolve a host timestamp to an absolute UTC time.
///
/// Falls back to the current time, with a single warning, when the value is
/// missing, malformed or out of range. Never fails.
pub fn resolve_timestamp(ts: &HostTimestamp) -> DateTime<Utc> {
    match ts {
        HostTimestamp::Native(dt) => *dt,
        HostTimestamp::EpochSeconds(secs) => match epoch_seconds(*secs) {
            Some(dt) => dt,
            None => fallback(&format!("epoch seconds {} out of range", secs)),
        },
        HostTimestamp::Other(None) => fallback("missing"),
        HostTimestamp::Other(Some(value)) => fallback(&format!("unsupported {}", value.kind())),
    }
}

fn epoch_seconds(secs: u64) -> Option<DateTime<Utc>> {
    let secs = i64::try_from(secs).ok()?;
    DateTime::from_timestamp(secs, 0)
}

fn fallback(reason: &str) -> DateTime<Utc> {
    warn!(reason = %reason, "time provided invalid, defaulting to now");
    Utc::now()
}
