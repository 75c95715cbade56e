//! Top-level IPC router: routes by service, delegates to handlers.

use crate::dispatch::Dispatcher;
use crate::ipc::handlers;
use crate::types::{Error, Result};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Route an IPC request to the appropriate service handler.
pub async fn route_request(
    dispatcher: &Dispatcher,
    service: &str,
    method: &str,
    body: Value,
    cancel: &CancellationToken,
) -> Result<Value> {
    match service {
        "tools" => handlers::tools::handle(dispatcher, method, body, cancel).await,
        "health" => handlers::health::handle(dispatcher, method, body).await,
        _ => Err(Error::not_found(format!("Unknown service: {}", service))),
    }
}

// =============================================================================
// Shared helpers: used by all handler modules
// =============================================================================

pub fn str_field(body: &Value, key: &str) -> Result<String> {
    body.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| Error::validation(format!("Missing required field: {}", key)))
}

/// Optional JSON field; absent or null becomes `{}`. Anything else is passed
/// through untouched so argument validation can report it.
pub fn object_field(body: &Value, key: &str) -> Value {
    match body.get(key) {
        None | Some(Value::Null) => Value::Object(serde_json::Map::new()),
        Some(v) => v.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_str_field() {
        let body = json!({"tool_name": "gcal_get_colors", "n": 3});
        assert_eq!(str_field(&body, "tool_name").unwrap(), "gcal_get_colors");
        assert!(matches!(str_field(&body, "n"), Err(Error::Validation(_))));
        assert!(matches!(str_field(&body, "missing"), Err(Error::Validation(_))));
    }

    #[test]
    fn test_object_field() {
        assert_eq!(object_field(&json!({}), "arguments"), json!({}));
        assert_eq!(object_field(&json!({"arguments": null}), "arguments"), json!({}));
        assert_eq!(object_field(&json!({"arguments": [1]}), "arguments"), json!([1]));
    }
}
