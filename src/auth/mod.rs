//! Delegated OAuth: credential broker client, token resolver, credential cache.
//!
//! The gateway never stores tokens durably. It asks the broker for the
//! caller's current token, refreshes through the broker when the token has
//! expired, and asks the broker for a connect URL when the caller has never
//! authorized (or the stored grant is gone).

pub mod broker;
pub mod cache;
pub mod credential;
pub mod resolver;

pub use broker::{CredentialBroker, HttpCredentialBroker, TokenLookup, TokenRefresh};
pub use cache::CredentialCache;
pub use credential::{ConnectUrl, Credential};
pub use resolver::{Resolution, TokenResolver};

#[cfg(test)]
pub use broker::MockCredentialBroker;
