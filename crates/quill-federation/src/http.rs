//! Response checks and the error-envelope translator.
//!
//! A failed response is expected to carry `{"errors": [{"code", "message"}]}`.
//! The first listed error becomes a [`FederationError::Protocol`]; an
//! unparseable envelope becomes [`FederationError::UnreadableErrorResponse`].

use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::FederationError;
use crate::wire::WireItem;

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    #[serde(default, alias = "status")]
    code: Option<u16>,
    #[serde(default)]
    message: String,
}

/// Turn a failed response body into a typed error.
pub fn translate_error(url: &str, status: StatusCode, body: &[u8]) -> FederationError {
    let envelope: ErrorEnvelope = match serde_json::from_slice(body) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::error!(%url, status = status.as_u16(), error = %e, "unable to parse error response");
            return FederationError::UnreadableErrorResponse {
                status: status.as_u16(),
                url: url.to_string(),
            };
        }
    };
    let Some(first) = envelope.errors.into_iter().next() else {
        return FederationError::Protocol {
            status: status.as_u16(),
            message: status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        };
    };
    FederationError::Protocol {
        status: first.code.unwrap_or_else(|| status.as_u16()),
        message: first.message,
    }
}

/// Read the body of a response, translating non-success statuses.
///
/// # Errors
///
/// Returns [`FederationError::Http`] if the body cannot be read, and the
/// translated error for any non-2xx status.
pub async fn check_response(
    url: &str,
    resp: reqwest::Response,
) -> Result<Vec<u8>, FederationError> {
    let status = resp.status();
    let body = resp.bytes().await?;
    if !status.is_success() {
        tracing::error!(%url, status = status.as_u16(), "hub returned an error");
        return Err(translate_error(url, status, &body));
    }
    Ok(body.to_vec())
}

/// Decode a success body into a wire value.
///
/// # Errors
///
/// Returns [`FederationError::Malformed`] if the body is not a wire value.
pub fn decode(url: &str, body: &[u8]) -> Result<WireItem, FederationError> {
    WireItem::from_slice(body).map_err(|e| {
        tracing::error!(%url, error = %e, "malformed response body");
        FederationError::Malformed {
            url: url.to_string(),
            reason: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mock_response(status: u16, body: &'static str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body(body)
                .unwrap(),
        )
    }

    #[test]
    fn first_listed_error_wins() {
        let body = br#"{"@context":"x","errors":[{"code":409,"message":"already exists"},{"code":500,"message":"other"}]}"#;
        let err = translate_error("http://hub/inbox", StatusCode::CONFLICT, body);
        let FederationError::Protocol { status, message } = err else {
            panic!("expected a protocol error, got {err:?}");
        };
        assert_eq!(status, 409);
        assert_eq!(message, "already exists");
    }

    #[test]
    fn envelope_code_may_be_named_status() {
        let body = br#"{"errors":[{"status":403,"message":"forbidden"}]}"#;
        let err = translate_error("http://hub/inbox", StatusCode::FORBIDDEN, body);
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn empty_envelope_uses_status() {
        let err = translate_error("http://hub/inbox", StatusCode::NOT_FOUND, br#"{"errors":[]}"#);
        assert!(matches!(
            err,
            FederationError::Protocol { status: 404, ref message } if message == "Not Found"
        ));
    }

    #[test]
    fn garbage_envelope_is_unreadable() {
        let err = translate_error("http://hub/inbox", StatusCode::BAD_GATEWAY, b"<html>");
        assert!(matches!(
            err,
            FederationError::UnreadableErrorResponse { status: 502, .. }
        ));
        assert_eq!(err.kind(), crate::error::ErrorKind::Transport);
    }

    #[tokio::test]
    async fn check_response_returns_body_on_success() {
        let body = check_response("http://hub", mock_response(200, "{}"))
            .await
            .unwrap();
        assert_eq!(body, b"{}");
    }

    #[tokio::test]
    async fn check_response_translates_failures() {
        let resp = mock_response(403, r#"{"errors":[{"code":403,"message":"nope"}]}"#);
        let err = check_response("http://hub", resp).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Protocol);
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn decode_rejects_non_objects() {
        let err = decode("http://hub", b"12").unwrap_err();
        assert!(matches!(err, FederationError::Malformed { .. }));
    }
}
