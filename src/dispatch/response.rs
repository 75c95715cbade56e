//! Response normalizer: provider HTTP responses to [`ToolResult`].

use reqwest::StatusCode;
use serde_json::Value;

use super::result::{ErrorKind, ToolResult};
use super::transport::HttpResponse;

/// Google error reasons that arrive as 403 but mean "slow down".
const RATE_LIMIT_REASONS: &[&str] = &["rateLimitExceeded", "userRateLimitExceeded"];

/// Convert a raw provider response into the tool result contract.
pub fn normalize(response: &HttpResponse) -> ToolResult {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);

    if status.is_success() {
        return normalize_success(response);
    }

    let body: Option<Value> = serde_json::from_slice(&response.body).ok();
    let kind = error_kind(status, body.as_ref());
    let message = body
        .as_ref()
        .and_then(error_message)
        .unwrap_or_else(|| status_line(status));

    ToolResult::failure(kind, message)
}

fn normalize_success(response: &HttpResponse) -> ToolResult {
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return ToolResult::empty();
    }
    match serde_json::from_slice::<Value>(&response.body) {
        Ok(data) => ToolResult::success(data),
        Err(e) => ToolResult::failure(
            ErrorKind::UpstreamProtocolError,
            format!("malformed response body (status {}): {}", response.status, e),
        ),
    }
}

fn error_kind(status: StatusCode, body: Option<&Value>) -> ErrorKind {
    match status {
        StatusCode::BAD_REQUEST => ErrorKind::InvalidArguments,
        StatusCode::UNAUTHORIZED => ErrorKind::Unauthorized,
        StatusCode::FORBIDDEN if body.is_some_and(is_rate_limit) => ErrorKind::RateLimited,
        StatusCode::FORBIDDEN => ErrorKind::Forbidden,
        StatusCode::NOT_FOUND | StatusCode::GONE => ErrorKind::NotFound,
        StatusCode::TOO_MANY_REQUESTS => ErrorKind::RateLimited,
        s if s.is_server_error() => ErrorKind::UpstreamUnavailable,
        s if s.is_client_error() => ErrorKind::InvalidArguments,
        // 1xx/3xx are never final answers from this API
        _ => ErrorKind::UpstreamProtocolError,
    }
}

fn is_rate_limit(body: &Value) -> bool {
    body.pointer("/error/errors")
        .and_then(Value::as_array)
        .is_some_and(|errors| {
            errors.iter().any(|e| {
                e.get("reason")
                    .and_then(Value::as_str)
                    .is_some_and(|r| RATE_LIMIT_REASONS.contains(&r))
            })
        })
}

/// Pull a human-readable message out of the provider's error body.
///
/// Handles the Google API shape (`{"error": {"message": ..}}`) and the OAuth
/// shape (`{"error": "invalid_token", "error_description": ..}`).
fn error_message(body: &Value) -> Option<String> {
    if let Some(msg) = body.pointer("/error/message").and_then(Value::as_str) {
        return Some(msg.to_string());
    }
    if let Some(msg) = body.get("error_description").and_then(Value::as_str) {
        return Some(msg.to_string());
    }
    body.get("error")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}
