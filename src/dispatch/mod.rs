//! Tool dispatch: request building, execution, response normalization.
//!
//! ```text
//!   ToolInvocation ─► catalog lookup ─► validate ─► TokenResolver
//!                                                      │
//!   ToolResult ◄── normalize ◄── HttpTransport ◄── request::build
//!                     │
//!                     └─ 401 ─► reauthorize ─► one retry
//! ```

pub mod dispatcher;
pub mod request;
pub mod response;
pub mod result;
pub mod transport;

pub use dispatcher::Dispatcher;
pub use response::normalize;
pub use result::{ErrorKind, Payload, ToolFailure, ToolInvocation, ToolResult};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

#[cfg(test)]
pub use transport::MockHttpTransport;
