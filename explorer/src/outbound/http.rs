//! Transport helpers shared by the reqwest adapters.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::domain::ports::{OverlaySourceError, PoiSourceError};

const PREVIEW_CHAR_LIMIT: usize = 160;

/// Port errors the shared mappers can produce.
pub(super) trait HttpFailure {
    fn transport(message: String) -> Self;
    fn timeout(message: String) -> Self;
    fn rate_limited(message: String) -> Self;
    fn invalid_request(message: String) -> Self;
}

impl HttpFailure for PoiSourceError {
    fn transport(message: String) -> Self {
        Self::transport(message)
    }

    fn timeout(message: String) -> Self {
        Self::timeout(message)
    }

    fn rate_limited(message: String) -> Self {
        Self::rate_limited(message)
    }

    fn invalid_request(message: String) -> Self {
        Self::invalid_request(message)
    }
}

impl HttpFailure for OverlaySourceError {
    fn transport(message: String) -> Self {
        Self::transport(message)
    }

    fn timeout(message: String) -> Self {
        Self::timeout(message)
    }

    fn rate_limited(message: String) -> Self {
        Self::rate_limited(message)
    }

    fn invalid_request(message: String) -> Self {
        Self::invalid_request(message)
    }
}

/// Client with an optional whole-request timeout.
pub(super) fn build_client(timeout: Option<Duration>) -> Result<Client, reqwest::Error> {
    let builder = Client::builder();
    match timeout {
        Some(timeout) => builder.timeout(timeout).build(),
        None => builder.build(),
    }
}

/// Maps a reqwest failure, stripping the URL so API keys never reach logs.
pub(super) fn map_transport_error<E: HttpFailure>(error: reqwest::Error) -> E {
    let timed_out = error.is_timeout();
    let message = error.without_url().to_string();
    if timed_out {
        E::timeout(message)
    } else {
        E::transport(message)
    }
}

/// Maps a non-success status, preferring the provider's own error text
/// over a raw body preview.
pub(super) fn map_status_error<E: HttpFailure>(status: StatusCode, body: &[u8]) -> E {
    let detail = provider_message(body).unwrap_or_else(|| body_preview(body));
    let message = if detail.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), detail)
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => E::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => E::timeout(message),
        _ if status.is_client_error() => E::invalid_request(message),
        _ => E::transport(message),
    }
}

/// Error text from the JSON error envelopes the providers use.
///
/// Google APIs nest `{"error": {"status", "message"}}`, Places puts
/// `error_message` at the top level and OpenWeatherMap uses `message`.
fn provider_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let message = match value.get("error") {
        Some(Value::Object(error)) => {
            let text = error.get("message").and_then(Value::as_str)?;
            match error.get("status").and_then(Value::as_str) {
                Some(status) => format!("{status}: {text}"),
                None => text.to_owned(),
            }
        }
        Some(Value::String(text)) => text.clone(),
        _ => value
            .get("error_message")
            .or_else(|| value.get("message"))
            .and_then(Value::as_str)?
            .to_owned(),
    };
    let message = body_preview(message.as_bytes());
    (!message.is_empty()).then_some(message)
}

/// Whitespace-collapsed prefix of a response body for error messages.
pub(super) fn body_preview(body: &[u8]) -> String {
    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Status mapping and preview trimming.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::rate_limited(StatusCode::TOO_MANY_REQUESTS, "RateLimited")]
    #[case::request_timeout(StatusCode::REQUEST_TIMEOUT, "Timeout")]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, "Timeout")]
    #[case::forbidden(StatusCode::FORBIDDEN, "InvalidRequest")]
    #[case::server_error(StatusCode::BAD_GATEWAY, "Transport")]
    fn maps_statuses_for_both_ports(#[case] status: StatusCode, #[case] expected: &str) {
        let poi_error: PoiSourceError = map_status_error(status, b"{\"error\":\"nope\"}");
        let overlay_error: OverlaySourceError = map_status_error(status, b"");

        assert_eq!(poi_error.kind(), expected);
        assert_eq!(overlay_error.kind(), expected);
    }

    #[test]
    fn status_message_includes_compacted_body() {
        let error: OverlaySourceError =
            map_status_error(StatusCode::FORBIDDEN, b"{\n  \"error\":   \"API key not valid\"\n}");
        assert_eq!(
            error.to_string(),
            "overlay request invalid: status 403: API key not valid"
        );
    }

    #[rstest]
    #[case::google(
        br#"{"error":{"code":403,"message":"API key not valid.","status":"PERMISSION_DENIED"}}"#,
        "status 403: PERMISSION_DENIED: API key not valid."
    )]
    #[case::places(
        br#"{"status":"REQUEST_DENIED","error_message":"This API project is not authorized."}"#,
        "status 403: This API project is not authorized."
    )]
    #[case::open_weather(
        br#"{"cod":401,"message":"Invalid API key."}"#,
        "status 403: Invalid API key."
    )]
    #[case::html(b"<html>  Forbidden </html>", "status 403: <html> Forbidden </html>")]
    #[case::empty(b"", "status 403")]
    fn provider_error_text_is_surfaced(#[case] body: &[u8], #[case] expected: &str) {
        let error: PoiSourceError = map_status_error(StatusCode::FORBIDDEN, body);
        assert_eq!(
            error,
            PoiSourceError::InvalidRequest {
                message: expected.to_owned()
            }
        );
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(400);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.chars().count(), PREVIEW_CHAR_LIMIT + 3);
        assert!(preview.ends_with("..."));
    }
}
