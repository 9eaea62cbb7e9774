#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use trailgate_audit_types::{
    AcceptedEvent, IdentityContext, OutboundBatch, PutAuditEventsResponse, RejectedEvent,
};
use trailgate_common_config::ForwarderConfig;
use trailgate_common_http::HttpError;
use trailgate_forwarder::{
    AuditIngestClient, Forwarder, IdError, IdGenerator, IdentityError, IdentityResolver,
    SubmitError,
};
use trailgate_record::{HostTimestamp, MemoryDecoder, RawValue};
use uuid::Uuid;

pub const CHANNEL: &str = "arn:aws:cloudtrail:us-east-1:123456789012:channel/01234567";

pub fn config() -> ForwarderConfig {
    ForwarderConfig::new(CHANNEL, "http://127.0.0.1:9")
}

pub fn identity() -> IdentityContext {
    IdentityContext::new("AIDAEXAMPLE", "123456789012")
}

/// Always returns the same identity, counting calls.
#[derive(Default)]
pub struct StaticIdentity {
    pub calls: AtomicUsize,
}

#[async_trait]
impl IdentityResolver for StaticIdentity {
    async fn caller_identity(&self) -> Result<IdentityContext, IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(identity())
    }
}

/// Identity lookup that always fails.
pub struct NoIdentity;

#[async_trait]
impl IdentityResolver for NoIdentity {
    async fn caller_identity(&self) -> Result<IdentityContext, IdentityError> {
        Err(IdentityError::Http(HttpError::ClientError {
            status: 403,
            body: "ExpiredToken".to_string(),
        }))
    }
}

/// How the fake ingestion service answers.
pub enum Reply {
    AcceptAll,
    RejectPositions(Vec<usize>),
    Fail,
}

/// Records every batch it is handed.
pub struct RecordingIngest {
    reply: Reply,
    pub batches: Mutex<Vec<OutboundBatch>>,
}

impl RecordingIngest {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            batches: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.batches.lock().unwrap().len()
    }

    pub fn last(&self) -> OutboundBatch {
        self.batches.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl AuditIngestClient for RecordingIngest {
    async fn put_audit_events(
        &self,
        batch: &OutboundBatch,
    ) -> Result<PutAuditEventsResponse, SubmitError> {
        self.batches.lock().unwrap().push(batch.clone());

        let rejected: &[usize] = match &self.reply {
            Reply::AcceptAll => &[],
            Reply::RejectPositions(positions) => positions,
            Reply::Fail => return Err(SubmitError::Http(HttpError::Timeout)),
        };

        let mut response = PutAuditEventsResponse::default();
        for (i, wrapper) in batch.iter().enumerate() {
            let id = wrapper.id.to_string();
            if rejected.contains(&i) {
                response.failed.push(RejectedEvent {
                    id,
                    error_code: "InvalidEventData".to_string(),
                    error_message: "event data is not valid".to_string(),
                });
            } else {
                response.successful.push(AcceptedEvent {
                    event_id: format!("evt-{}", i),
                    id,
                });
            }
        }
        Ok(response)
    }
}

/// Sequential UUIDs that fail on the listed draws (1-based).
pub struct FailingIds {
    next: AtomicUsize,
    fail_on: Vec<usize>,
}

impl FailingIds {
    pub fn on(fail_on: Vec<usize>) -> Arc<Self> {
        Arc::new(Self {
            next: AtomicUsize::new(1),
            fail_on,
        })
    }
}

impl IdGenerator for FailingIds {
    fn next_uuid(&self) -> Result<Uuid, IdError> {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        if self.fail_on.contains(&n) {
            Err(IdError("random source unavailable".to_string()))
        } else {
            Ok(Uuid::from_u128(n as u128))
        }
    }
}

pub fn record(n: u64) -> RawValue {
    RawValue::map([
        ("log", RawValue::Bytes(format!("GET /items/{}", n).into_bytes())),
        ("seq", RawValue::Uint(n)),
    ])
}

pub fn batch_of(n: u64) -> MemoryDecoder {
    let mut decoder = MemoryDecoder::new();
    for i in 0..n {
        decoder.push(HostTimestamp::EpochSeconds(1_700_000_000 + i), record(i));
    }
    decoder
}

pub fn forwarder(identity: Arc<dyn IdentityResolver>, ingest: Arc<RecordingIngest>) -> Forwarder {
    Forwarder::new(config(), identity, ingest)
}
