//! Core types for the gateway.
//!
//! This module provides foundational types used throughout the system:
//! - **IDs**: Strongly-typed identifiers (CallerId, RequestId)
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Configuration structures for server, API, broker and auth

mod config;
mod errors;
mod ids;

pub use config::{
    ApiConfig, AuthConfig, BrokerConfig, Config, IpcConfig, ServerConfig, DEFAULT_API_BASE_URL,
};
pub use errors::{Error, Result};
pub use ids::{CallerId, RequestId};
