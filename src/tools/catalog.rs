//! Tool catalog: typed tool definitions, argument validation, listing.
//!
//! A [`ToolDefinition`] is pure data: which HTTP method and path template a
//! tool maps to, and where each argument goes in the outbound request. The
//! catalog owns lookup and validation; the dispatch layer owns behavior.

use crate::types::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};

// =============================================================================
// Parameter types
// =============================================================================

/// Parameter type for tool arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    String,
    Int,
    Bool,
    /// A JSON object passed through as a resource document.
    Object,
    StringList,
    Enum(Vec<String>),
    Optional(Box<ParamType>),
}

impl ParamType {
    /// Validate a JSON value against this parameter type.
    pub fn validate(&self, value: &Value) -> std::result::Result<(), String> {
        match self {
            ParamType::String => {
                if value.is_string() {
                    Ok(())
                } else {
                    Err(format!("expected string, got {}", value_type_name(value)))
                }
            }
            ParamType::Int => {
                if value.is_i64() || value.is_u64() {
                    Ok(())
                } else {
                    Err(format!("expected integer, got {}", value_type_name(value)))
                }
            }
            ParamType::Bool => {
                if value.is_boolean() {
                    Ok(())
                } else {
                    Err(format!("expected boolean, got {}", value_type_name(value)))
                }
            }
            ParamType::Object => {
                if value.is_object() {
                    Ok(())
                } else {
                    Err(format!("expected object, got {}", value_type_name(value)))
                }
            }
            ParamType::StringList => {
                if let Some(arr) = value.as_array() {
                    for (i, item) in arr.iter().enumerate() {
                        if !item.is_string() {
                            return Err(format!(
                                "expected string at index {}, got {}",
                                i,
                                value_type_name(item)
                            ));
                        }
                    }
                    Ok(())
                } else {
                    Err(format!("expected array, got {}", value_type_name(value)))
                }
            }
            ParamType::Enum(variants) => {
                if let Some(s) = value.as_str() {
                    if variants.iter().any(|v| v == s) {
                        Ok(())
                    } else {
                        Err(format!(
                            "invalid enum value '{}', expected one of: {}",
                            s,
                            variants.join(", ")
                        ))
                    }
                } else {
                    Err(format!("expected string for enum, got {}", value_type_name(value)))
                }
            }
            ParamType::Optional(inner) => {
                if value.is_null() {
                    Ok(())
                } else {
                    inner.validate(value)
                }
            }
        }
    }

    /// JSON Schema fragment describing this type.
    pub fn json_schema(&self) -> Value {
        match self {
            ParamType::String => serde_json::json!({"type": "string"}),
            ParamType::Int => serde_json::json!({"type": "integer"}),
            ParamType::Bool => serde_json::json!({"type": "boolean"}),
            ParamType::Object => serde_json::json!({"type": "object"}),
            ParamType::StringList => {
                serde_json::json!({"type": "array", "items": {"type": "string"}})
            }
            ParamType::Enum(variants) => serde_json::json!({"type": "string", "enum": variants}),
            ParamType::Optional(inner) => inner.json_schema(),
        }
    }
}

fn value_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Parameter definition
// =============================================================================

/// Where an argument lands in the outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamLocation {
    Path,
    Query,
    Body,
}

/// A single parameter definition for a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDef {
    pub name: String,
    pub location: ParamLocation,
    pub param_type: ParamType,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Query key, when it differs from the argument name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wire_name: Option<String>,
    /// Inclusive bounds integers are clamped to before sending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clamp: Option<(i64, i64)>,
    /// Only send this query parameter when the named boolean argument is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only_if: Option<String>,
}

impl ParamDef {
    pub fn new(
        name: &str,
        location: ParamLocation,
        param_type: ParamType,
        description: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            location,
            param_type,
            description: description.to_string(),
            default: None,
            wire_name: None,
            clamp: None,
            only_if: None,
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_wire_name(mut self, wire_name: &str) -> Self {
        self.wire_name = Some(wire_name.to_string());
        self
    }

    pub fn with_clamp(mut self, min: i64, max: i64) -> Self {
        self.clamp = Some((min, max));
        self
    }

    pub fn only_if(mut self, flag: &str) -> Self {
        self.only_if = Some(flag.to_string());
        self
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none() && !matches!(self.param_type, ParamType::Optional(_))
    }

    /// Key used on the wire (query string or body field).
    pub fn wire_key(&self) -> &str {
        self.wire_name.as_deref().unwrap_or(&self.name)
    }
}

// =============================================================================
// Tool definition
// =============================================================================

/// HTTP method of the endpoint a tool maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// OAuth scope granting full calendar access.
pub const SCOPE_CALENDAR: &str = "https://www.googleapis.com/auth/calendar";
/// OAuth scope granting event access only.
pub const SCOPE_CALENDAR_EVENTS: &str = "https://www.googleapis.com/auth/calendar.events";

/// Operation family a tool belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolFamily {
    Calendars,
    CalendarList,
    Events,
    FreeBusy,
    Settings,
    Colors,
    Watch,
}

impl ToolFamily {
    /// OAuth scope a credential needs to call tools in this family.
    pub fn required_scope(&self) -> &'static str {
        match self {
            ToolFamily::Events | ToolFamily::FreeBusy => SCOPE_CALENDAR_EVENTS,
            _ => SCOPE_CALENDAR,
        }
    }
}

/// How body parameters become the request document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyShape {
    /// No request body.
    Empty,
    /// The single body parameter's object value is the whole document.
    Document,
    /// Each body parameter becomes a top-level field.
    Fields,
    /// Fields, with `calendarIds` expanded into `items: [{"id": ..}]`.
    FreeBusyQuery,
}

/// Complete tool definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub family: ToolFamily,
    pub method: HttpMethod,
    /// Path relative to the API base URL, with `{name}` placeholders as whole segments.
    pub path_template: String,
    pub params: Vec<ParamDef>,
    pub body: BodyShape,
    /// Query pairs always sent, after the declared parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fixed_query: Vec<(String, String)>,
}

impl ToolDefinition {
    pub fn param(&self, name: &str) -> Option<&ParamDef> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Placeholder names in the path template, in order.
    pub fn path_placeholders(&self) -> Vec<&str> {
        self.path_template
            .split('/')
            .filter_map(|seg| seg.strip_prefix('{').and_then(|s| s.strip_suffix('}')))
            .collect()
    }

    /// JSON Schema for the tool's arguments.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for p in &self.params {
            let mut schema = p.param_type.json_schema();
            if let Some(obj) = schema.as_object_mut() {
                obj.insert("description".to_string(), Value::String(p.description.clone()));
                if let Some(default) = &p.default {
                    obj.insert("default".to_string(), default.clone());
                }
                if let Some((min, max)) = p.clamp {
                    obj.insert("minimum".to_string(), Value::from(min));
                    obj.insert("maximum".to_string(), Value::from(max));
                }
            }
            properties.insert(p.name.clone(), schema);
            if p.is_required() {
                required.push(Value::String(p.name.clone()));
            }
        }

        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }

    /// Descriptor exposed through tool listing.
    pub fn descriptor(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "family": self.family,
            "method": self.method.as_str(),
            "path": self.path_template,
            "input_schema": self.input_schema(),
        })
    }

    /// Check internal consistency: every placeholder has a path parameter and
    /// the body shape matches the body parameters.
    fn check(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::validation("Tool name cannot be empty"));
        }
        if !self.path_template.starts_with('/') {
            return Err(Error::validation(format!(
                "{}: path template must start with '/'",
                self.name
            )));
        }

        let mut seen = BTreeSet::new();
        for p in &self.params {
            if !seen.insert(p.name.as_str()) {
                return Err(Error::validation(format!(
                    "{}: duplicate parameter {}",
                    self.name, p.name
                )));
            }
        }

        for placeholder in self.path_placeholders() {
            match self.param(placeholder) {
                Some(p) if p.location == ParamLocation::Path => {}
                _ => {
                    return Err(Error::validation(format!(
                        "{}: placeholder {{{}}} has no path parameter",
                        self.name, placeholder
                    )))
                }
            }
        }

        let body_params = self
            .params
            .iter()
            .filter(|p| p.location == ParamLocation::Body)
            .count();
        let consistent = match self.body {
            BodyShape::Empty => body_params == 0,
            BodyShape::Document => body_params == 1,
            BodyShape::Fields | BodyShape::FreeBusyQuery => body_params > 0,
        };
        if !consistent {
            return Err(Error::validation(format!(
                "{}: body shape {:?} does not match {} body parameter(s)",
                self.name, self.body, body_params
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Tool catalog
// =============================================================================

/// In-memory tool catalog. Owns definitions, not behavior.
#[derive(Debug, Default)]
pub struct ToolCatalog {
    entries: HashMap<String, ToolDefinition>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register a tool definition. Names are unique.
    pub fn register(&mut self, definition: ToolDefinition) -> Result<()> {
        definition.check()?;
        if self.entries.contains_key(&definition.name) {
            return Err(Error::validation(format!(
                "Tool already registered: {}",
                definition.name
            )));
        }
        self.entries.insert(definition.name.clone(), definition);
        Ok(())
    }

    /// Get a tool definition by name.
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.entries.get(name)
    }

    /// Check if a tool exists.
    pub fn has_tool(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// List all tool definitions.
    pub fn list_entries(&self) -> Vec<&ToolDefinition> {
        let mut entries: Vec<&ToolDefinition> = self.entries.values().collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    /// Union of the scopes required by every registered tool.
    pub fn required_scopes(&self) -> Vec<String> {
        let scopes: BTreeSet<&'static str> = self
            .entries
            .values()
            .map(|d| d.family.required_scope())
            .collect();
        scopes.into_iter().map(str::to_string).collect()
    }

    /// Validate arguments against a tool's parameter definitions.
    ///
    /// Returns a list of validation errors (empty = valid).
    pub fn validate_params(&self, name: &str, arguments: &Value) -> Result<Vec<String>> {
        let definition = self
            .entries
            .get(name)
            .ok_or_else(|| Error::not_found(format!("Unknown tool: {}", name)))?;
        Ok(validate_arguments(definition, arguments))
    }

    /// Fill in default values for missing optional parameters.
    pub fn fill_defaults(&self, name: &str, arguments: &mut Value) -> Result<()> {
        let definition = self
            .entries
            .get(name)
            .ok_or_else(|| Error::not_found(format!("Unknown tool: {}", name)))?;
        apply_defaults(definition, arguments);
        Ok(())
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Validate arguments against a definition. Pure; every violation is reported.
pub fn validate_arguments(definition: &ToolDefinition, arguments: &Value) -> Vec<String> {
    let Some(arg_map) = arguments.as_object() else {
        return vec![format!(
            "Arguments must be a JSON object, got {}",
            value_type_name(arguments)
        )];
    };

    let mut errors = Vec::new();

    // Required parameters, in declared order
    for param_def in &definition.params {
        let present = arg_map.get(&param_def.name).is_some_and(|v| !v.is_null());
        if param_def.is_required() && !present {
            errors.push(format!("Missing required parameter: {}", param_def.name));
        }
    }

    // Types of provided parameters; sorted so the verdict is stable
    let mut keys: Vec<&String> = arg_map.keys().collect();
    keys.sort();
    for key in keys {
        let value = &arg_map[key];
        match definition.param(key) {
            Some(param_def) => {
                if value.is_null() && param_def.is_required() {
                    // already reported as missing
                    continue;
                }
                let check = if value.is_null() {
                    Ok(())
                } else {
                    param_def.param_type.validate(value).and_then(|()| {
                        if param_def.location == ParamLocation::Path {
                            check_path_segment(value)
                        } else {
                            Ok(())
                        }
                    })
                };
                if let Err(e) = check {
                    errors.push(format!("Parameter '{}': {}", key, e));
                }
            }
            None => errors.push(format!("Unknown parameter: {}", key)),
        }
    }

    errors
}

/// Path values that URL normalization would drop or collapse, sending the
/// call to a different endpoint.
const RESERVED_PATH_SEGMENTS: &[&str] = &["", ".", ".."];

/// Reject values that cannot stand as a single path segment.
pub(crate) fn check_path_segment(value: &Value) -> std::result::Result<(), String> {
    match value.as_str() {
        Some(s) if RESERVED_PATH_SEGMENTS.contains(&s) => {
            Err(format!("'{}' is not a valid path segment", s))
        }
        _ => Ok(()),
    }
}

/// Insert declared defaults for absent (or null) arguments.
pub fn apply_defaults(definition: &ToolDefinition, arguments: &mut Value) {
    if let Some(map) = arguments.as_object_mut() {
        for param_def in &definition.params {
            let missing = map.get(&param_def.name).map_or(true, Value::is_null);
            if missing {
                if let Some(default) = &param_def.default {
                    map.insert(param_def.name.clone(), default.clone());
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_definition() -> ToolDefinition {
        ToolDefinition {
            name: "gcal_list_events".to_string(),
            description: "List events from a calendar".to_string(),
            family: ToolFamily::Events,
            method: HttpMethod::Get,
            path_template: "/calendars/{calendarId}/events".to_string(),
            params: vec![
                ParamDef::new("calendarId", ParamLocation::Path, ParamType::String, "Calendar")
                    .with_default(json!("primary")),
                ParamDef::new("q", ParamLocation::Query, ParamType::String, "Search text"),
                ParamDef::new("maxResults", ParamLocation::Query, ParamType::Int, "Page size")
                    .with_default(json!(25))
                    .with_clamp(1, 2500),
            ],
            body: BodyShape::Empty,
            fixed_query: Vec::new(),
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut catalog = ToolCatalog::new();
        catalog.register(sample_definition()).unwrap();

        assert!(catalog.has_tool("gcal_list_events"));
        assert!(!catalog.has_tool("nonexistent"));
        assert_eq!(catalog.len(), 1);

        let entry = catalog.get("gcal_list_events").unwrap();
        assert_eq!(entry.path_placeholders(), vec!["calendarId"]);
    }

    #[test]
    fn test_register_duplicate_fails() {
        let mut catalog = ToolCatalog::new();
        catalog.register(sample_definition()).unwrap();
        assert!(catalog.register(sample_definition()).is_err());
    }

    #[test]
    fn test_register_rejects_unbound_placeholder() {
        let mut catalog = ToolCatalog::new();
        let mut definition = sample_definition();
        definition.path_template = "/calendars/{calendarId}/events/{eventId}".to_string();
        assert!(catalog.register(definition).is_err());
    }

    #[test]
    fn test_register_rejects_inconsistent_body() {
        let mut catalog = ToolCatalog::new();
        let mut definition = sample_definition();
        definition.body = BodyShape::Document;
        assert!(catalog.register(definition).is_err());
    }

    #[test]
    fn test_validate_params_valid() {
        let mut catalog = ToolCatalog::new();
        catalog.register(sample_definition()).unwrap();

        let errors = catalog
            .validate_params("gcal_list_events", &json!({"q": "standup"}))
            .unwrap();
        assert!(errors.is_empty(), "Expected no errors, got: {:?}", errors);
    }

    #[test]
    fn test_validate_params_missing_required() {
        let mut catalog = ToolCatalog::new();
        catalog.register(sample_definition()).unwrap();

        let errors = catalog.validate_params("gcal_list_events", &json!({})).unwrap();
        assert_eq!(errors, vec!["Missing required parameter: q"]);

        let errors = catalog
            .validate_params("gcal_list_events", &json!({"q": null}))
            .unwrap();
        assert_eq!(errors, vec!["Missing required parameter: q"]);
    }

    #[test]
    fn test_validate_params_wrong_type() {
        let mut catalog = ToolCatalog::new();
        catalog.register(sample_definition()).unwrap();

        let errors = catalog
            .validate_params("gcal_list_events", &json!({"q": 42}))
            .unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Parameter 'q': expected string"));
    }

    #[test]
    fn test_validate_params_unknown_param() {
        let mut catalog = ToolCatalog::new();
        catalog.register(sample_definition()).unwrap();

        let errors = catalog
            .validate_params("gcal_list_events", &json!({"q": "x", "bogus": true}))
            .unwrap();
        assert_eq!(errors, vec!["Unknown parameter: bogus"]);
    }

    #[test]
    fn test_validate_params_reserved_path_segment() {
        let mut catalog = ToolCatalog::new();
        catalog.register(sample_definition()).unwrap();

        for segment in ["", ".", ".."] {
            let errors = catalog
                .validate_params("gcal_list_events", &json!({"q": "x", "calendarId": segment}))
                .unwrap();
            assert_eq!(errors.len(), 1, "segment {:?}", segment);
            assert!(errors[0].starts_with("Parameter 'calendarId':"), "{}", errors[0]);
        }

        // Only path parameters are restricted
        let errors = catalog
            .validate_params("gcal_list_events", &json!({"q": "..", "calendarId": "a.b"}))
            .unwrap();
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn test_validate_params_not_an_object() {
        let mut catalog = ToolCatalog::new();
        catalog.register(sample_definition()).unwrap();

        let errors = catalog
            .validate_params("gcal_list_events", &json!(["q"]))
            .unwrap();
        assert_eq!(errors, vec!["Arguments must be a JSON object, got array"]);
    }

    #[test]
    fn test_validate_params_unknown_tool() {
        let catalog = ToolCatalog::new();
        assert!(catalog.validate_params("nonexistent", &json!({})).is_err());
    }

    #[test]
    fn test_fill_defaults() {
        let mut catalog = ToolCatalog::new();
        catalog.register(sample_definition()).unwrap();

        let mut params = json!({"q": "test", "calendarId": null});
        catalog.fill_defaults("gcal_list_events", &mut params).unwrap();

        assert_eq!(params["maxResults"], 25);
        assert_eq!(params["calendarId"], "primary");
    }

    #[test]
    fn test_fill_defaults_no_overwrite() {
        let mut catalog = ToolCatalog::new();
        catalog.register(sample_definition()).unwrap();

        let mut params = json!({"q": "test", "maxResults": 5});
        catalog.fill_defaults("gcal_list_events", &mut params).unwrap();

        assert_eq!(params["maxResults"], 5);
    }

    #[test]
    fn test_input_schema() {
        let schema = sample_definition().input_schema();
        assert_eq!(schema["required"], json!(["q"]));
        assert_eq!(schema["properties"]["maxResults"]["maximum"], 2500);
        assert_eq!(schema["properties"]["calendarId"]["default"], "primary");
        assert_eq!(schema["additionalProperties"], false);
    }

    #[test]
    fn test_param_type_enum_validation() {
        let pt = ParamType::Enum(vec!["all".to_string(), "none".to_string()]);
        assert!(pt.validate(&json!("all")).is_ok());
        assert!(pt.validate(&json!("bad")).is_err());
        assert!(pt.validate(&json!(42)).is_err());
    }

    #[test]
    fn test_param_type_string_list_validation() {
        let pt = ParamType::StringList;
        assert!(pt.validate(&json!(["a", "b"])).is_ok());
        assert!(pt.validate(&json!([1, 2])).is_err());
        assert!(pt.validate(&json!("not array")).is_err());
    }

    #[test]
    fn test_param_type_optional_accepts_null() {
        let pt = ParamType::Optional(Box::new(ParamType::Bool));
        assert!(pt.validate(&Value::Null).is_ok());
        assert!(pt.validate(&json!(true)).is_ok());
        assert!(pt.validate(&json!("true")).is_err());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_value() -> impl Strategy<Value = Value> {
            prop_oneof![
                Just(Value::Null),
                any::<bool>().prop_map(Value::from),
                any::<i64>().prop_map(Value::from),
                "[a-z]{0,8}".prop_map(Value::from),
            ]
        }

        fn arb_key() -> impl Strategy<Value = String> {
            prop_oneof![
                Just("calendarId".to_string()),
                Just("q".to_string()),
                Just("maxResults".to_string()),
                "[a-z]{1,6}".prop_map(|s| format!("x_{}", s)),
            ]
        }

        proptest! {
            #[test]
            fn validation_is_deterministic_and_names_every_unknown(
                args in proptest::collection::btree_map(arb_key(), arb_value(), 0..6)
            ) {
                let definition = sample_definition();
                let unknown = args.keys().filter(|k| k.starts_with("x_")).count();
                let value = Value::Object(args.into_iter().collect());

                let first = validate_arguments(&definition, &value);
                prop_assert_eq!(&first, &validate_arguments(&definition, &value));
                let reported = first.iter().filter(|e| e.starts_with("Unknown parameter: ")).count();
                prop_assert_eq!(reported, unknown);
            }

            #[test]
            fn valid_arguments_gain_every_default(
                q in "[a-z ]{1,12}",
                max in proptest::option::of(1i64..5000),
            ) {
                let definition = sample_definition();
                let mut value = json!({"q": q});
                if let Some(max) = max {
                    value["maxResults"] = json!(max);
                }
                prop_assert!(validate_arguments(&definition, &value).is_empty());

                apply_defaults(&definition, &mut value);
                prop_assert_eq!(&value["calendarId"], &json!("primary"));
                prop_assert_eq!(&value["maxResults"], &json!(max.unwrap_or(25)));
            }
        }
    }
}
