//! Forwards host log batches to an audit ingestion channel.
//!
//! One flush resolves the caller identity, turns every decodable record
//! into an audit event, submits the batch in a single call and reconciles
//! the per-item results.

pub mod builder;
pub mod error;
pub mod flush;
pub mod identity;
pub mod ids;
pub mod ingest;
pub mod status;
pub mod submitter;

pub use builder::EventBuilder;
pub use error::{FlushError, IdentityError, RecordSkip, SubmitError};
pub use flush::{BuiltBatch, FlushReport, FlushState, Forwarder};
pub use identity::{HttpIdentityResolver, IdentityResolver};
pub use ids::{IdError, IdGenerator, UuidGenerator};
pub use ingest::{AuditIngestClient, HttpIngestClient};
pub use status::FlushStatus;
pub use submitter::submit;
