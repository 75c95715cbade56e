//! Tools service handler: call, list, describe, validate.

use crate::dispatch::{Dispatcher, ToolInvocation};
use crate::ipc::router::{object_field, str_field};
use crate::types::{CallerId, Error, Result};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

pub async fn handle(
    dispatcher: &Dispatcher,
    method: &str,
    body: Value,
    cancel: &CancellationToken,
) -> Result<Value> {
    match method {
        "CallTool" => {
            let tool_name = str_field(&body, "tool_name")?;
            let caller =
                CallerId::from_string(str_field(&body, "caller_id")?).map_err(Error::validation)?;
            let invocation = ToolInvocation::new(tool_name, object_field(&body, "arguments"));

            let result = dispatcher
                .dispatch_with_cancel(&invocation, &caller, cancel)
                .await;

            Ok(serde_json::to_value(&result)?)
        }

        "ListTools" => {
            let tools: Vec<Value> = dispatcher
                .catalog()
                .list_entries()
                .iter()
                .map(|definition| definition.descriptor())
                .collect();

            Ok(serde_json::json!({
                "count": tools.len(),
                "tools": tools,
            }))
        }

        "GetTool" => {
            let tool_name = str_field(&body, "tool_name")?;

            let definition = dispatcher
                .catalog()
                .get(&tool_name)
                .ok_or_else(|| Error::not_found(format!("Unknown tool: {}", tool_name)))?;

            Ok(definition.descriptor())
        }

        "ValidateToolArguments" => {
            let tool_name = str_field(&body, "tool_name")?;
            let mut arguments = object_field(&body, "arguments");

            let errors = dispatcher.catalog().validate_params(&tool_name, &arguments)?;
            if errors.is_empty() {
                dispatcher.catalog().fill_defaults(&tool_name, &mut arguments)?;
            }

            Ok(serde_json::json!({
                "valid": errors.is_empty(),
                "errors": errors,
                "arguments": arguments,
            }))
        }

        _ => Err(Error::not_found(format!("Unknown tools method: {}", method))),
    }
}
