//! Audit event types for Trailgate.

mod batch;
mod envelope;
mod id;
mod identity;
mod outcome;

pub use batch::{AuditEventWrapper, OutboundBatch};
pub use envelope::{format_event_time, AuditEventEnvelope, EventTemplate, UserIdentity};
pub use id::{EventUid, WrapperId};
pub use identity::{IdentityContext, PrincipalType};
pub use outcome::{
    AcceptedEvent, Inconsistency, PutAuditEventsResponse, RejectedEvent, SubmissionOutcome,
};
