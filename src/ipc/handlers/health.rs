//! Health service handler: liveness probe for the hosting gateway.

use crate::dispatch::Dispatcher;
use crate::types::{Error, Result};
use serde_json::Value;

pub async fn handle(dispatcher: &Dispatcher, method: &str, _body: Value) -> Result<Value> {
    match method {
        "Ping" => Ok(serde_json::json!({
            "status": "ok",
            "tools": dispatcher.catalog().len(),
            "cached_credentials": dispatcher.resolver().cache().len().await,
        })),
        _ => Err(Error::not_found(format!("Unknown health method: {}", method))),
    }
}
