//! HTTP response types.

use serde::de::DeserializeOwned;

/// Parse a JSON response.
pub async fn parse_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ResponseError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(ResponseError::Read)?;
    decode_body(status.as_u16(), &bytes)
}

/// Decode an already-read body, keeping it for diagnostics on failure.
pub fn decode_body<T: DeserializeOwned>(status: u16, bytes: &[u8]) -> Result<T, ResponseError> {
    serde_json::from_slice(bytes).map_err(|e| ResponseError::Parse {
        status,
        body: String::from_utf8_lossy(bytes).to_string(),
        source: e,
    })
}

/// Response parsing errors.
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error("failed to read response body: {0}")]
    Read(#[source] reqwest::Error),

    #[error("failed to parse JSON (status {status}): {source}")]
    Parse {
        status: u16,
        body: String,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Identity {
        #[serde(rename = "Account")]
        account: String,
    }

    #[test]
    fn test_decode_body() {
        let parsed: Identity = decode_body(200, br#"{"Account": "123456789012"}"#).unwrap();
        assert_eq!(parsed.account, "123456789012");
    }

    #[test]
    fn test_decode_body_keeps_raw_text() {
        let err = decode_body::<Identity>(502, b"<html>bad gateway</html>").unwrap_err();
        match &err {
            ResponseError::Parse { status, body, .. } => {
                assert_eq!(*status, 502);
                assert_eq!(body, "<html>bad gateway</html>");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(err.to_string().contains("status 502"));
    }
}
