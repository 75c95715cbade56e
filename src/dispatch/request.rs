//! Request builder: renders a validated invocation into an [`HttpRequest`].

use serde_json::{Map, Value};

use super::transport::HttpRequest;
use crate::auth::Credential;
use crate::tools::catalog::check_path_segment;
use crate::tools::{BodyShape, ParamDef, ParamLocation, ToolDefinition};
use crate::types::{Error, Result};

/// Render `definition` + `arguments` into a request against `base_url`.
///
/// `arguments` must already be validated and have defaults applied; a path
/// placeholder without a value is a contract violation and yields
/// `Error::Internal`.
pub fn build(
    definition: &ToolDefinition,
    arguments: &Value,
    credential: &Credential,
    base_url: &reqwest::Url,
) -> Result<HttpRequest> {
    let empty = Map::new();
    let args = arguments.as_object().unwrap_or(&empty);

    let mut url = base_url.clone();
    push_path(&mut url, definition, args)?;
    push_query(&mut url, definition, args);

    let body = render_body(definition, args);

    let mut headers = vec![(
        "Authorization".to_string(),
        credential.authorization_header(),
    )];
    if body.is_some() {
        headers.push(("Content-Type".to_string(), "application/json".to_string()));
    }

    Ok(HttpRequest {
        method: definition.method.into(),
        url,
        headers,
        body,
    })
}

fn push_path(url: &mut reqwest::Url, definition: &ToolDefinition, args: &Map<String, Value>) -> Result<()> {
    let mut segments = url
        .path_segments_mut()
        .map_err(|_| Error::config("API base URL cannot be a base"))?;
    segments.pop_if_empty();

    for segment in definition.path_template.split('/').filter(|s| !s.is_empty()) {
        match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) => {
                let value = args
                    .get(name)
                    .filter(|v| !v.is_null())
                    .ok_or_else(|| {
                        Error::internal(format!(
                            "{}: no value for path placeholder {{{}}}",
                            definition.name, name
                        ))
                    })?;
                check_path_segment(value).map_err(|e| {
                    Error::internal(format!("{}: {{{}}}: {}", definition.name, name, e))
                })?;
                segments.push(&scalar_to_string(value));
            }
            None => {
                segments.push(segment);
            }
        }
    }
    Ok(())
}

fn push_query(url: &mut reqwest::Url, definition: &ToolDefinition, args: &Map<String, Value>) {
    let mut pairs: Vec<(String, String)> = Vec::new();

    for param in definition
        .params
        .iter()
        .filter(|p| p.location == ParamLocation::Query)
    {
        // Null and "" both mean "not supplied" for optional query parameters
        let Some(value) = args
            .get(&param.name)
            .filter(|v| !v.is_null() && v.as_str() != Some(""))
        else {
            continue;
        };
        if let Some(flag) = &param.only_if {
            if args.get(flag).and_then(Value::as_bool) != Some(true) {
                continue;
            }
        }
        pairs.push((param.wire_key().to_string(), query_value(param, value)));
    }
    pairs.extend(definition.fixed_query.iter().cloned());

    if pairs.is_empty() {
        return;
    }
    let mut query = url.query_pairs_mut();
    for (key, value) in &pairs {
        query.append_pair(key, value);
    }
}

fn query_value(param: &ParamDef, value: &Value) -> String {
    let Some((min, max)) = param.clamp else {
        return scalar_to_string(value);
    };
    match (value.as_i64(), value.as_u64()) {
        (Some(n), _) => n.clamp(min, max).to_string(),
        // Above i64::MAX, so past any upper bound
        (None, Some(_)) => max.to_string(),
        _ => scalar_to_string(value),
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn body_fields(definition: &ToolDefinition, args: &Map<String, Value>) -> Map<String, Value> {
    definition
        .params
        .iter()
        .filter(|p| p.location == ParamLocation::Body)
        .filter_map(|p| {
            args.get(&p.name)
                .filter(|v| !v.is_null())
                .map(|v| (p.wire_key().to_string(), v.clone()))
        })
        .collect()
}

fn render_body(definition: &ToolDefinition, args: &Map<String, Value>) -> Option<Value> {
    match definition.body {
        BodyShape::Empty => None,
        BodyShape::Document => definition
            .params
            .iter()
            .find(|p| p.location == ParamLocation::Body)
            .and_then(|p| args.get(&p.name))
            .filter(|v| !v.is_null())
            .cloned(),
        BodyShape::Fields => Some(Value::Object(body_fields(definition, args))),
        BodyShape::FreeBusyQuery => {
            let mut fields = body_fields(definition, args);
            let ids = fields
                .remove("calendarIds")
                .and_then(|v| v.as_array().cloned())
                .unwrap_or_default();
            let items: Vec<Value> = ids
                .into_iter()
                .map(|id| serde_json::json!({ "id": id }))
                .collect();
            fields.insert("items".to_string(), Value::Array(items));
            Some(Value::Object(fields))
        }
    }
}
