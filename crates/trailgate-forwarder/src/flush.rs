//! One flush, from identity lookup to reconciled outcome.

use crate::builder::EventBuilder;
use crate::identity::{HttpIdentityResolver, IdentityResolver};
use crate::ids::IdGenerator;
use crate::ingest::{AuditIngestClient, HttpIngestClient};
use crate::{submitter, FlushError, RecordSkip};
use std::sync::Arc;
use strum::Display;
use tracing::{debug, error, info, trace, Level};
use trailgate_audit_types::{AuditEventWrapper, IdentityContext, OutboundBatch, SubmissionOutcome};
use trailgate_common_config::ForwarderConfig;
use trailgate_common_http::{HttpClient, HttpConfig, HttpError, RequestBuilder};
use trailgate_common_log::spans::{flush_span, instrument_future, Timer};
use trailgate_record::{normalize, render_record, BatchDecoder, DecodedRecord};

/// Where a flush currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
pub enum FlushState {
    #[default]
    Idle,
    ResolvingIdentity,
    Iterating,
    Submitting,
    Done,
    Aborted,
}

/// Records that survived building, plus the iteration counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltBatch {
    /// Wrappers in decode order.
    pub batch: OutboundBatch,
    /// Records pulled from the decoder.
    pub decoded: usize,
    /// Indices of records that were dropped.
    pub skipped: Vec<usize>,
}

/// What a completed flush did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// State the flush finished in.
    pub state: FlushState,
    /// Records pulled from the decoder.
    pub decoded: usize,
    /// Indices of records that were dropped.
    pub skipped: Vec<usize>,
    /// Wrappers sent in the submission call.
    pub submitted: usize,
    /// Per-item submission results.
    pub outcome: SubmissionOutcome,
}

/// Drives flushes against one channel.
pub struct Forwarder {
    config: Arc<ForwarderConfig>,
    identity: Arc<dyn IdentityResolver>,
    ingest: Arc<dyn AuditIngestClient>,
    builder: EventBuilder,
}

impl Forwarder {
    /// Create a forwarder over arbitrary collaborators.
    pub fn new(
        config: ForwarderConfig,
        identity: Arc<dyn IdentityResolver>,
        ingest: Arc<dyn AuditIngestClient>,
    ) -> Self {
        let builder = EventBuilder::new(config.template.clone());
        Self {
            config: Arc::new(config),
            identity,
            ingest,
            builder,
        }
    }

    /// Create a forwarder talking HTTP to the configured endpoint.
    pub fn http(config: ForwarderConfig) -> Result<Self, HttpError> {
        let client = HttpClient::with_config(HttpConfig {
            request_timeout: config.timeout,
            ..HttpConfig::default()
        })?;

        let mut request = RequestBuilder::new()
            .base_url(config.endpoint.as_str())
            .json_content();
        if let Some(token) = &config.api_token {
            request = request.bearer_auth(token.expose());
        }

        let identity = HttpIdentityResolver::new(client.clone(), request.clone());
        let ingest =
            HttpIngestClient::new(client, request).with_external_id(config.external_id.clone());
        Ok(Self::new(config, Arc::new(identity), Arc::new(ingest)))
    }

    /// Replace the identifier source.
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.builder = EventBuilder::with_ids(self.config.template.clone(), ids);
        self
    }

    /// Look up the caller identity for this flush.
    pub async fn resolve_identity(&self) -> Result<IdentityContext, FlushError> {
        self.identity.caller_identity().await.map_err(|e| {
            error!(error = %e, "could not resolve caller identity");
            FlushError::from(e)
        })
    }

    /// Decode, normalize and build every record of the batch.
    ///
    /// Records that cannot be built are dropped with an error diagnostic;
    /// the rest keep their decode order.
    pub fn iterate_and_build<D: BatchDecoder>(
        &self,
        decoder: D,
        tag: &str,
        identity: &IdentityContext,
    ) -> BuiltBatch {
        let mut batch = OutboundBatch::new(self.config.channel.as_str());
        let mut skipped = Vec::new();
        let mut records = decoder.records();

        for decoded in records.by_ref() {
            match self.build_one(&decoded, identity) {
                Ok(wrapper) => batch.push(wrapper),
                Err(skip) => {
                    let rendered =
                        render_record(decoded.index, tag, decoded.timestamp, &decoded.record);
                    error!(index = skip.index(), error = %skip, "skipping record {}", rendered);
                    skipped.push(skip.index());
                }
            }
        }

        BuiltBatch {
            batch,
            decoded: records.decoded(),
            skipped,
        }
    }

    fn build_one(
        &self,
        decoded: &DecodedRecord,
        identity: &IdentityContext,
    ) -> Result<AuditEventWrapper, RecordSkip> {
        let record = normalize(&decoded.record).map_err(|source| RecordSkip::Normalize {
            index: decoded.index,
            source,
        })?;
        self.builder
            .build(decoded.index, decoded.timestamp, record, identity)
    }

    /// Submit the batch in one call. An empty batch is not sent.
    pub async fn submit(&self, batch: &OutboundBatch) -> Result<SubmissionOutcome, FlushError> {
        if batch.is_empty() {
            debug!("no events to submit");
            return Ok(SubmissionOutcome::default());
        }

        if tracing::enabled!(Level::DEBUG) {
            match batch.to_pretty_json() {
                Ok(json) => debug!("outbound batch:\n{}", json),
                Err(e) => debug!(error = %e, "could not render outbound batch"),
            }
        }

        let timer = Timer::start("submit");
        let result = submitter::submit(self.ingest.as_ref(), batch).await;
        timer.finish();

        result.map_err(|e| {
            error!(error = %e, events = batch.len(), "batch submission failed");
            FlushError::from(e)
        })
    }

    /// Run one flush over a host batch.
    pub async fn run_flush<D: BatchDecoder>(
        &self,
        decoder: D,
        tag: &str,
    ) -> Result<FlushReport, FlushError> {
        instrument_future(self.flush(decoder, tag), flush_span(tag)).await
    }

    async fn flush<D: BatchDecoder>(&self, decoder: D, tag: &str) -> Result<FlushReport, FlushError> {
        let mut state = FlushState::Idle;
        let mut advance = |next: FlushState| {
            trace!(from = %state, to = %next, "flush state");
            state = next;
        };

        advance(FlushState::ResolvingIdentity);
        let identity = match self.resolve_identity().await {
            Ok(identity) => identity,
            Err(e) => {
                advance(FlushState::Aborted);
                return Err(e);
            }
        };

        advance(FlushState::Iterating);
        let built = self.iterate_and_build(decoder, tag, &identity);

        advance(FlushState::Submitting);
        let outcome = match self.submit(&built.batch).await {
            Ok(outcome) => outcome,
            Err(e) => {
                advance(FlushState::Aborted);
                return Err(e);
            }
        };

        advance(FlushState::Done);
        info!(
            decoded = built.decoded,
            skipped = built.skipped.len(),
            accepted = outcome.accepted.len(),
            rejected = outcome.rejected.len(),
            "flush complete"
        );

        Ok(FlushReport {
            state,
            decoded: built.decoded,
            skipped: built.skipped,
            submitted: built.batch.len(),
            outcome,
        })
    }
}

impl std::fmt::Debug for Forwarder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forwarder")
            .field("config", &self.config)
            .field("builder", &self.builder)
            .finish_non_exhaustive()
    }
}
