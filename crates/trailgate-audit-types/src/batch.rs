//! Wrappers and the outbound batch.

use crate::WrapperId;
use serde::{Deserialize, Serialize};

/// One serialized envelope plus its request-local key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEventWrapper {
    /// Reconciliation key, independent of the envelope UID.
    pub id: WrapperId,
    /// Serialized envelope.
    pub event_data: String,
}

/// Events accumulated during one flush, submitted once as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundBatch {
    /// Destination channel.
    #[serde(rename = "channelArn")]
    pub channel: String,
    /// Wrappers in insertion order.
    pub audit_events: Vec<AuditEventWrapper>,
}

impl OutboundBatch {
    /// Create an empty batch for a channel.
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            audit_events: Vec::new(),
        }
    }

    /// Append a wrapper.
    pub fn push(&mut self, wrapper: AuditEventWrapper) {
        self.audit_events.push(wrapper);
    }

    /// Number of wrappers.
    pub fn len(&self) -> usize {
        self.audit_events.len()
    }

    /// Whether the batch holds no wrappers.
    pub fn is_empty(&self) -> bool {
        self.audit_events.is_empty()
    }

    /// Iterate wrappers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &AuditEventWrapper> {
        self.audit_events.iter()
    }

    /// Indented JSON rendering for debug diagnostics.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn wrapper(data: &str) -> AuditEventWrapper {
        AuditEventWrapper {
            id: WrapperId::from_uuid(Uuid::new_v4()),
            event_data: data.to_string(),
        }
    }

    #[test]
    fn test_batch_keeps_insertion_order() {
        let mut batch = OutboundBatch::new("arn:aws:cloudtrail:eu-west-1:123456789012:channel/abc");
        assert!(batch.is_empty());
        batch.push(wrapper("a"));
        batch.push(wrapper("b"));

        let data: Vec<_> = batch.iter().map(|w| w.event_data.as_str()).collect();
        assert_eq!(data, ["a", "b"]);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_pretty_json_shape() {
        let mut batch = OutboundBatch::new("chan");
        batch.push(wrapper("{}"));
        let pretty = batch.to_pretty_json().unwrap();
        assert!(pretty.contains("\n  \"channelArn\": \"chan\""));
        assert!(pretty.contains("\"eventData\": \"{}\""));
    }
}
