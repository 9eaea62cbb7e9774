use serde_json::{json, Value};
use std::time::Duration;
use trailgate_common_config::{ApiToken, ForwarderConfig};
use trailgate_common_http::HttpError;
use trailgate_forwarder::{FlushError, FlushStatus, Forwarder, SubmitError};
use trailgate_record::JsonBatchDecoder;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const CHANNEL: &str = "arn:aws:cloudtrail:us-east-1:123456789012:channel/01234567";

const BATCH: &str = r#"[1700000000, {"log": "GET /a", "status": 200}]
[{"sec": 1700000001, "nsec": 0}, {"log": "GET /b", "status": 404}]
["not a time", {"log": "GET /c", "status": 500}]
"#;

/// Accepts every item except those at the given positions.
struct RejectPositions(Vec<usize>);

impl Respond for RejectPositions {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = request.body_json().unwrap();
        let mut successful = Vec::new();
        let mut failed = Vec::new();
        for (i, item) in body["auditEvents"].as_array().unwrap().iter().enumerate() {
            if self.0.contains(&i) {
                failed.push(json!({
                    "id": item["id"],
                    "errorCode": "InvalidEventData",
                    "errorMessage": "bad event",
                }));
            } else {
                successful.push(json!({"id": item["id"], "eventID": format!("evt-{}", i)}));
            }
        }
        ResponseTemplate::new(200).set_body_json(json!({"successful": successful, "failed": failed}))
    }
}

fn config(server: &MockServer) -> ForwarderConfig {
    let mut config = ForwarderConfig::new(CHANNEL, server.uri());
    config.api_token = Some(ApiToken::new("tok-123".to_string()));
    config.external_id = Some("ext-9".to_string());
    config.timeout = Duration::from_secs(5);
    config
}

async fn mount_identity(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/GetCallerIdentity"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Account": "123456789012",
            "UserId": "AROAEXAMPLE:forwarder",
            "Arn": "arn:aws:sts::123456789012:assumed-role/forwarder/session",
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_end_to_end_flush() {
    let server = MockServer::start().await;
    mount_identity(&server).await;
    Mock::given(method("POST"))
        .and(path("/PutAuditEvents"))
        .and(query_param("channelArn", CHANNEL))
        .and(query_param("externalId", "ext-9"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(RejectPositions(vec![2]))
        .expect(1)
        .mount(&server)
        .await;

    let forwarder = Forwarder::http(config(&server)).unwrap();
    let result = forwarder
        .run_flush(JsonBatchDecoder::from_str(BATCH), "app.access")
        .await;
    assert_eq!(FlushStatus::from(&result), FlushStatus::Ok);

    let report = result.unwrap();
    assert_eq!(report.decoded, 3);
    assert_eq!(report.outcome.accepted.len(), 2);
    assert_eq!(report.outcome.rejected.len(), 1);
    assert!(report.outcome.inconsistencies.is_empty());

    let requests = server.received_requests().await.unwrap();
    let put = requests
        .iter()
        .find(|r| r.url.path() == "/PutAuditEvents")
        .unwrap();
    let body: Value = put.body_json().unwrap();
    let first: Value =
        serde_json::from_str(body["auditEvents"][0]["eventData"].as_str().unwrap()).unwrap();
    assert_eq!(first["eventTime"], "2023-11-14T22:13:20Z");
    assert_eq!(first["userIdentity"]["type"], "User");
    assert_eq!(first["userIdentity"]["principalId"], "AROAEXAMPLE:forwarder");
    assert_eq!(first["additionalEventData"], json!({"log": "GET /a", "status": 200}));
    assert!(body.get("channelArn").is_none());
}

#[tokio::test]
async fn test_identity_rejection_skips_submission() {
    let server = MockServer::start().await;
    Mock::given(path("/GetCallerIdentity"))
        .respond_with(ResponseTemplate::new(403).set_body_string("ExpiredToken"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/PutAuditEvents"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let forwarder = Forwarder::http(config(&server)).unwrap();
    let result = forwarder
        .run_flush(JsonBatchDecoder::from_str(BATCH), "app")
        .await;
    assert!(matches!(result, Err(FlushError::Identity(_))));
}

#[tokio::test]
async fn test_submission_http_error_aborts() {
    let server = MockServer::start().await;
    mount_identity(&server).await;
    Mock::given(path("/PutAuditEvents"))
        .respond_with(ResponseTemplate::new(400).set_body_string("ChannelNotFound"))
        .mount(&server)
        .await;

    let forwarder = Forwarder::http(config(&server)).unwrap();
    let result = forwarder
        .run_flush(JsonBatchDecoder::from_str(BATCH), "app")
        .await;

    match result {
        Err(FlushError::Submission(SubmitError::Http(HttpError::ClientError { status, body }))) => {
            assert_eq!(status, 400);
            assert_eq!(body, "ChannelNotFound");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn test_undecodable_submission_response_aborts() {
    let server = MockServer::start().await;
    mount_identity(&server).await;
    Mock::given(path("/PutAuditEvents"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let forwarder = Forwarder::http(config(&server)).unwrap();
    let result = forwarder
        .run_flush(JsonBatchDecoder::from_str(BATCH), "app")
        .await;
    assert!(matches!(
        result,
        Err(FlushError::Submission(SubmitError::Response(_)))
    ));
}
