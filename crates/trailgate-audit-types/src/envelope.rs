//! The audit event envelope.

use crate::{EventUid, IdentityContext, PrincipalType};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fixed event metadata shared by every envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTemplate {
    /// Envelope schema version.
    pub schema_version: String,
    /// Source tag of the events.
    pub event_source: String,
    /// Name tag of the events.
    pub event_name: String,
}

impl Default for EventTemplate {
    fn default() -> Self {
        Self {
            schema_version: env!("CARGO_PKG_VERSION").to_string(),
            event_source: "trailgate".to_string(),
            event_name: "Trailgate: forwarded log record".to_string(),
        }
    }
}

/// Principal section of the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    /// Principal type tag.
    #[serde(rename = "type")]
    pub principal_type: PrincipalType,
    /// Principal identifier.
    pub principal_id: String,
}

/// One audit event as the ingestion API expects it inside `eventData`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEventEnvelope {
    /// Schema version.
    pub version: String,
    /// Who submitted the event.
    pub user_identity: UserIdentity,
    /// Event source tag.
    pub event_source: String,
    /// Event name tag.
    pub event_name: String,
    /// `YYYY-MM-DDTHH:MM:SSZ`.
    pub event_time: String,
    /// The event's own identity.
    #[serde(rename = "UID")]
    pub uid: EventUid,
    /// Account the event belongs to.
    pub recipient_account_id: String,
    /// The normalized record.
    pub additional_event_data: Map<String, Value>,
}

impl AuditEventEnvelope {
    /// Assemble an envelope.
    pub fn new(
        template: &EventTemplate,
        identity: &IdentityContext,
        timestamp: DateTime<Utc>,
        uid: EventUid,
        record: Map<String, Value>,
    ) -> Self {
        Self {
            version: template.schema_version.clone(),
            user_identity: UserIdentity {
                principal_type: identity.principal_type,
                principal_id: identity.principal_id.clone(),
            },
            event_source: template.event_source.clone(),
            event_name: template.event_name.clone(),
            event_time: format_event_time(timestamp),
            uid,
            recipient_account_id: identity.recipient_account_id.clone(),
            additional_event_data: record,
        }
    }

    /// Compact JSON text.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Format an event time with seconds precision and a `Z` designator.
pub fn format_event_time(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}
