//! Tool invocation and result contract.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

use crate::auth::ConnectUrl;

/// One inbound tool call. Not retained after dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub tool_name: String,
    #[serde(default = "empty_object")]
    pub arguments: Value,
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

impl ToolInvocation {
    pub fn new(tool_name: impl Into<String>, arguments: Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
        }
    }
}

/// Failure taxonomy surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidTool,
    InvalidArguments,
    /// Actionable: carries a connect URL the user has to open.
    AuthenticationRequired,
    Unauthorized,
    Forbidden,
    NotFound,
    RateLimited,
    UpstreamUnavailable,
    UpstreamProtocolError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidTool => "invalid_tool",
            ErrorKind::InvalidArguments => "invalid_arguments",
            ErrorKind::AuthenticationRequired => "authentication_required",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not_found",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::UpstreamUnavailable => "upstream_unavailable",
            ErrorKind::UpstreamProtocolError => "upstream_protocol_error",
        }
    }

    /// Transient conditions the caller may retry later (with its own backoff).
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::RateLimited | ErrorKind::UpstreamUnavailable)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successful payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Document(Value),
    /// 2xx with no body (deletes, clear, channels.stop).
    Empty,
}

/// Failed invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolFailure {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_url: Option<ConnectUrl>,
}

impl ToolFailure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            connect_url: None,
        }
    }

    pub fn authentication_required(url: ConnectUrl) -> Self {
        Self {
            kind: ErrorKind::AuthenticationRequired,
            message: format!("Calendar access not authorized yet; open {} to connect", url),
            connect_url: Some(url),
        }
    }
}

/// Uniform result of a tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    Success(Payload),
    Failure(ToolFailure),
}

impl ToolResult {
    pub fn success(data: Value) -> Self {
        ToolResult::Success(Payload::Document(data))
    }

    pub fn empty() -> Self {
        ToolResult::Success(Payload::Empty)
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        ToolResult::Failure(ToolFailure::new(kind, message))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolResult::Success(_))
    }

    /// Failure kind, if this is a failure.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            ToolResult::Failure(f) => Some(f.kind),
            ToolResult::Success(_) => None,
        }
    }

    pub fn connect_url(&self) -> Option<&ConnectUrl> {
        match self {
            ToolResult::Failure(f) => f.connect_url.as_ref(),
            ToolResult::Success(_) => None,
        }
    }
}

// Wire shape:
//   {"status": "success", "data": <json|null>, "empty": bool}
//   {"status": "failure", "kind": "...", "message": "...", "connect_url"?: "...", "retryable": bool}
impl Serialize for ToolResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self {
            ToolResult::Success(Payload::Document(data)) => {
                map.serialize_entry("status", "success")?;
                map.serialize_entry("data", data)?;
                map.serialize_entry("empty", &false)?;
            }
            ToolResult::Success(Payload::Empty) => {
                map.serialize_entry("status", "success")?;
                map.serialize_entry("data", &Value::Null)?;
                map.serialize_entry("empty", &true)?;
            }
            ToolResult::Failure(failure) => {
                map.serialize_entry("status", "failure")?;
                map.serialize_entry("kind", &failure.kind)?;
                map.serialize_entry("message", &failure.message)?;
                if let Some(url) = &failure.connect_url {
                    map.serialize_entry("connect_url", url)?;
                }
                map.serialize_entry("retryable", &failure.kind.is_retryable())?;
            }
        }
        map.end()
    }
}
