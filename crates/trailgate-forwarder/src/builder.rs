//! Audit event construction.

use crate::ids::{IdGenerator, UuidGenerator};
use crate::RecordSkip;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use trailgate_audit_types::{
    AuditEventEnvelope, AuditEventWrapper, EventTemplate, EventUid, IdentityContext, WrapperId,
};
use trailgate_record::NormalizedRecord;

/// Turns normalized records into batch wrappers.
#[derive(Clone)]
pub struct EventBuilder {
    template: EventTemplate,
    ids: Arc<dyn IdGenerator>,
}

impl EventBuilder {
    /// Create a builder drawing random UUIDs.
    pub fn new(template: EventTemplate) -> Self {
        Self::with_ids(template, Arc::new(UuidGenerator))
    }

    /// Create a builder with a custom identifier source.
    pub fn with_ids(template: EventTemplate, ids: Arc<dyn IdGenerator>) -> Self {
        Self { template, ids }
    }

    /// Build the wrapper for record `index`.
    ///
    /// The envelope UID and the wrapper id are drawn independently.
    pub fn build(
        &self,
        index: usize,
        timestamp: DateTime<Utc>,
        record: NormalizedRecord,
        identity: &IdentityContext,
    ) -> Result<AuditEventWrapper, RecordSkip> {
        let uid = self.draw(index).map(EventUid::from_uuid)?;

        let envelope = AuditEventEnvelope::new(&self.template, identity, timestamp, uid, record);
        let event_data = envelope
            .to_json()
            .map_err(|source| RecordSkip::Serialization { index, source })?;

        let id = self.draw(index).map(WrapperId::from_uuid)?;
        Ok(AuditEventWrapper { id, event_data })
    }

    fn draw(&self, index: usize) -> Result<uuid::Uuid, RecordSkip> {
        self.ids.next_uuid().map_err(|e| RecordSkip::IdGeneration {
            index,
            reason: e.to_string(),
        })
    }
}

impl std::fmt::Debug for EventBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBuilder")
            .field("template", &self.template)
            .finish_non_exhaustive()
    }
}
