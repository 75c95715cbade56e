//! TCP IPC transport layer.
//!
//! Length-prefixed JSON framing. The hosting gateway sends
//! `{id, service, method, body}` requests and receives
//! `{id, ok, body | error}` responses on the same connection.

pub mod codec;
pub mod handlers;
pub mod router;
pub mod server;

pub use server::IpcServer;
