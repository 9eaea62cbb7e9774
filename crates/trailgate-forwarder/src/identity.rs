//! Caller identity resolution.

use crate::IdentityError;
use async_trait::async_trait;
use serde::Deserialize;
use trailgate_audit_types::IdentityContext;
use trailgate_common_http::{parse_json, HttpClient, RequestBuilder};
use trailgate_common_log::spans::{instrument_future, remote_span};

/// Resolves who is submitting events, once per flush.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Look up the caller identity.
    async fn caller_identity(&self) -> Result<IdentityContext, IdentityError>;
}

/// Identity response body. Other fields, such as `Arn`, are ignored.
#[derive(Debug, Deserialize)]
struct CallerIdentity {
    #[serde(rename = "Account")]
    account: Option<String>,
    #[serde(rename = "UserId")]
    user_id: Option<String>,
}

impl CallerIdentity {
    fn into_context(self) -> Result<IdentityContext, IdentityError> {
        let account = non_empty(self.account).ok_or(IdentityError::Incomplete { field: "Account" })?;
        let user_id = non_empty(self.user_id).ok_or(IdentityError::Incomplete { field: "UserId" })?;
        Ok(IdentityContext::new(user_id, account))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Identity lookup over `GET {endpoint}/GetCallerIdentity`.
///
/// Speaks plain JSON with bearer auth, so it targets a gateway exposing a
/// compatible endpoint. It does not sign requests and cannot call AWS STS
/// directly, which uses the query protocol with SigV4.
#[derive(Debug, Clone)]
pub struct HttpIdentityResolver {
    client: HttpClient,
    request: RequestBuilder,
}

impl HttpIdentityResolver {
    /// Path of the identity operation.
    pub const PATH: &'static str = "/GetCallerIdentity";

    /// Create a resolver using a shared client and request template.
    pub fn new(client: HttpClient, request: RequestBuilder) -> Self {
        Self { client, request }
    }

    async fn fetch(&self, url: &str) -> Result<IdentityContext, IdentityError> {
        let response = self.client.get(url, self.request.headers()).await?;
        let response = HttpClient::check_response(response).await?;
        let identity: CallerIdentity = parse_json(response).await?;
        identity.into_context()
    }
}

#[async_trait]
impl IdentityResolver for HttpIdentityResolver {
    async fn caller_identity(&self) -> Result<IdentityContext, IdentityError> {
        let url = self.request.url(Self::PATH);
        let span = remote_span("GetCallerIdentity", &url);
        instrument_future(self.fetch(&url), span).await
    }
}
