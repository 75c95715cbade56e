//! # gcal-gateway - Authenticated Google Calendar tool dispatch
//!
//! Maps named tool invocations onto Google Calendar v3 REST calls on behalf
//! of a caller whose OAuth grant lives in an external credential broker:
//! - Closed catalog of 31 calendar tools with typed, validated arguments
//! - Per-call token resolution with a short-lived in-memory cache
//! - Connect-URL handshake when the caller has not authorized yet
//! - Single guarded retry after a provider 401
//! - Uniform success / failure result contract
//! - Length-prefixed TCP IPC surface for the hosting gateway
//!
//! ## Architecture
//!
//! ```text
//!                    ┌───────────────────────────────────┐
//!   IPC requests  →  │            Dispatcher             │
//!                    │  ┌─────────┐      ┌─────────────┐ │
//!                    │  │  Tool   │      │    Token    │ │ ─► credential broker
//!                    │  │ Catalog │      │  Resolver   │ │
//!                    │  └─────────┘      └─────────────┘ │
//!                    │  ┌─────────┐      ┌─────────────┐ │
//!                    │  │ Request │  ─►  │  Response   │ │ ─► calendar API
//!                    │  │ Builder │      │ Normalizer  │ │
//!                    │  └─────────┘      └─────────────┘ │
//!                    └───────────────────────────────────┘
//! ```

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod auth;
pub mod dispatch;
pub mod ipc;
pub mod tools;
pub mod types;

// Internal utilities
pub mod observability;

pub use types::{Config, Error, IpcConfig, Result};
