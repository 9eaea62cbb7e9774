//! Batched audit event submission.

use crate::SubmitError;
use async_trait::async_trait;
use serde::Serialize;
use trailgate_audit_types::{AuditEventWrapper, OutboundBatch, PutAuditEventsResponse};
use trailgate_common_http::{parse_json, HttpClient, RequestBuilder};
use trailgate_common_log::spans::{instrument_future, remote_span};

/// The remote audit ingestion API.
#[async_trait]
pub trait AuditIngestClient: Send + Sync {
    /// Submit a whole batch in one call.
    async fn put_audit_events(
        &self,
        batch: &OutboundBatch,
    ) -> Result<PutAuditEventsResponse, SubmitError>;
}

/// Request body; the channel travels in the query string.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PutAuditEventsBody<'a> {
    audit_events: &'a [AuditEventWrapper],
}

/// Ingestion over `POST {endpoint}/PutAuditEvents`.
#[derive(Debug, Clone)]
pub struct HttpIngestClient {
    client: HttpClient,
    request: RequestBuilder,
    external_id: Option<String>,
}

impl HttpIngestClient {
    /// Path of the submission operation.
    pub const PATH: &'static str = "/PutAuditEvents";

    /// Create a client using a shared HTTP client and request template.
    pub fn new(client: HttpClient, request: RequestBuilder) -> Self {
        Self {
            client,
            request,
            external_id: None,
        }
    }

    /// Pass an external id with every submission.
    pub fn with_external_id(mut self, external_id: Option<String>) -> Self {
        self.external_id = external_id;
        self
    }

    async fn send(
        &self,
        url: &str,
        batch: &OutboundBatch,
    ) -> Result<PutAuditEventsResponse, SubmitError> {
        let mut query = vec![("channelArn", batch.channel.as_str())];
        if let Some(external_id) = &self.external_id {
            query.push(("externalId", external_id.as_str()));
        }

        let body = PutAuditEventsBody {
            audit_events: &batch.audit_events,
        };
        let response = self
            .client
            .post_json(url, self.request.headers(), &query, &body)
            .await?;
        let response = HttpClient::check_response(response).await?;
        Ok(parse_json(response).await?)
    }
}

#[async_trait]
impl AuditIngestClient for HttpIngestClient {
    async fn put_audit_events(
        &self,
        batch: &OutboundBatch,
    ) -> Result<PutAuditEventsResponse, SubmitError> {
        let url = self.request.url(Self::PATH);
        let span = remote_span("PutAuditEvents", &url);
        instrument_future(self.send(&url, batch), span).await
    }
}
