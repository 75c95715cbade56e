//! Credential broker contract and its HTTP client.
//!
//! The broker issues, stores and refreshes OAuth tokens on behalf of the
//! gateway. The gateway only needs three operations from it; each has
//! exactly the outcomes modeled by [`TokenLookup`], [`TokenRefresh`] and
//! [`ConnectUrl`], plus `Err(Error::BrokerUnavailable)` for transport
//! failures.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::credential::{ConnectUrl, Credential};
use crate::types::{BrokerConfig, CallerId, Error, Result};

/// Outcome of `getToken`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenLookup {
    Found(Credential),
    /// No credential stored, or the stored one is permanently invalid.
    NotFound,
}

/// Outcome of `refreshToken`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenRefresh {
    Refreshed(Credential),
    RefreshFailed,
}

/// Operations the gateway needs from the credential broker.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialBroker: Send + Sync {
    async fn get_token(&self, caller: &CallerId) -> Result<TokenLookup>;

    async fn refresh_token(&self, caller: &CallerId) -> Result<TokenRefresh>;

    async fn begin_authorization(&self, caller: &CallerId, scopes: &[String]) -> Result<ConnectUrl>;
}

// =============================================================================
// HTTP implementation
// =============================================================================

/// Token document returned by the broker.
#[derive(Debug, Deserialize)]
struct TokenDocument {
    access_token: String,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
    /// Seconds until expiry; used when `expires_at` is absent.
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scopes: Vec<String>,
}

impl TokenDocument {
    fn into_credential(self) -> Credential {
        // An `expires_in` past chrono's range leaves the expiry unknown
        let expires_at = self.expires_at.or_else(|| {
            self.expires_in
                .and_then(TimeDelta::try_seconds)
                .and_then(|delta| Utc::now().checked_add_signed(delta))
        });
        Credential {
            access_token: self.access_token,
            scopes: self.scopes.into_iter().collect(),
            expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct AuthorizationRequest<'a> {
    caller_id: &'a str,
    scopes: &'a [String],
}

#[derive(Debug, Deserialize)]
struct AuthorizationDocument {
    connect_url: String,
}

/// Broker client speaking the broker's REST contract.
///
/// ```text
/// GET  {base}/v1/connections/{connection}/tokens/{caller}          200 | 404 | 410
/// POST {base}/v1/connections/{connection}/tokens/{caller}/refresh  200 | 4xx
/// POST {base}/v1/connections/{connection}/authorizations           200 {connect_url}
/// ```
#[derive(Debug, Clone)]
pub struct HttpCredentialBroker {
    client: reqwest::Client,
    base_url: reqwest::Url,
    api_key: String,
    connection: String,
}

impl HttpCredentialBroker {
    pub fn new(config: &BrokerConfig) -> Result<Self> {
        let base_url = reqwest::Url::parse(&config.base_url)
            .map_err(|e| Error::config(format!("invalid broker URL: {}", e)))?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build broker client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
            connection: config.connection.clone(),
        })
    }

    fn endpoint(&self, tail: &[&str]) -> Result<reqwest::Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| Error::config("broker URL cannot be a base"))?;
            segments
                .pop_if_empty()
                .extend(["v1", "connections", self.connection.as_str()])
                .extend(tail);
        }
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        request
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::broker_unavailable(format!("broker request timed out: {}", e))
                } else {
                    Error::broker_unavailable(format!("broker unreachable: {}", e))
                }
            })
    }

    async fn read_token(response: reqwest::Response) -> Result<Credential> {
        let doc: TokenDocument = response
            .json()
            .await
            .map_err(|e| Error::broker_unavailable(format!("malformed broker token response: {}", e)))?;
        Ok(doc.into_credential())
    }
}

fn unexpected_status(operation: &str, status: StatusCode) -> Error {
    Error::broker_unavailable(format!("broker {} returned {}", operation, status))
}

#[async_trait]
impl CredentialBroker for HttpCredentialBroker {
    async fn get_token(&self, caller: &CallerId) -> Result<TokenLookup> {
        let url = self.endpoint(&["tokens", caller.as_str()])?;
        let response = self.send(self.client.get(url)).await?;

        match response.status() {
            status if status.is_success() => Ok(TokenLookup::Found(Self::read_token(response).await?)),
            StatusCode::NOT_FOUND | StatusCode::GONE => Ok(TokenLookup::NotFound),
            status => Err(unexpected_status("token lookup", status)),
        }
    }

    async fn refresh_token(&self, caller: &CallerId) -> Result<TokenRefresh> {
        let url = self.endpoint(&["tokens", caller.as_str(), "refresh"])?;
        let response = self.send(self.client.post(url)).await?;

        match response.status() {
            status if status.is_success() => {
                Ok(TokenRefresh::Refreshed(Self::read_token(response).await?))
            }
            status if status.is_client_error() => {
                tracing::debug!(caller = %caller, %status, "broker refused token refresh");
                Ok(TokenRefresh::RefreshFailed)
            }
            status => Err(unexpected_status("token refresh", status)),
        }
    }

    async fn begin_authorization(&self, caller: &CallerId, scopes: &[String]) -> Result<ConnectUrl> {
        let url = self.endpoint(&["authorizations"])?;
        let body = AuthorizationRequest {
            caller_id: caller.as_str(),
            scopes,
        };
        let response = self.send(self.client.post(url).json(&body)).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(unexpected_status("authorization", status));
        }
        let doc: AuthorizationDocument = response
            .json()
            .await
            .map_err(|e| Error::broker_unavailable(format!("malformed broker authorization response: {}", e)))?;
        Ok(ConnectUrl::new(doc.connect_url))
    }
}
