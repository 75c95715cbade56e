//! Token resolution: cache → broker lookup → refresh → authorization handshake.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use super::broker::{CredentialBroker, TokenLookup, TokenRefresh};
use super::cache::CredentialCache;
use super::credential::{ConnectUrl, Credential};
use crate::types::{AuthConfig, CallerId, Result};

/// Outcome of resolving a caller's credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A credential that is valid as far as the gateway can tell.
    Ready(Credential),
    /// No usable credential; the caller must open this URL first.
    Pending(ConnectUrl),
}

/// Resolves a bearer credential for a caller on every invocation.
///
/// All durable state lives in the broker. Broker transport failures come back
/// as `Err(Error::BrokerUnavailable)` and never as [`Resolution::Pending`].
#[derive(Clone)]
pub struct TokenResolver {
    broker: Arc<dyn CredentialBroker>,
    cache: Arc<CredentialCache>,
    scopes: Arc<Vec<String>>,
    skew: Duration,
}

impl std::fmt::Debug for TokenResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResolver")
            .field("cache", &self.cache)
            .field("scopes", &self.scopes)
            .field("skew", &self.skew)
            .finish_non_exhaustive()
    }
}

impl TokenResolver {
    /// `scopes` is what a new authorization asks the user to grant.
    pub fn new(broker: Arc<dyn CredentialBroker>, config: &AuthConfig, scopes: Vec<String>) -> Self {
        Self {
            broker,
            cache: Arc::new(CredentialCache::new(config.cache_ttl, config.expiry_skew)),
            scopes: Arc::new(scopes),
            skew: config.expiry_skew,
        }
    }

    pub fn cache(&self) -> &CredentialCache {
        &self.cache
    }

    /// Resolve a credential, reusing the cache when possible.
    pub async fn resolve(&self, caller: &CallerId) -> Result<Resolution> {
        if let Some(credential) = self.cache.get(caller).await {
            tracing::trace!(caller = %caller, "credential cache hit");
            return Ok(Resolution::Ready(credential));
        }

        match self.broker.get_token(caller).await? {
            TokenLookup::Found(credential) if !credential.is_expired_at(Utc::now(), self.skew) => {
                self.cache.insert(caller, credential.clone()).await;
                Ok(Resolution::Ready(credential))
            }
            TokenLookup::Found(_) => {
                tracing::debug!(caller = %caller, "stored credential expired, refreshing");
                self.refresh_or_authorize(caller).await
            }
            TokenLookup::NotFound => {
                tracing::debug!(caller = %caller, "no stored credential");
                self.authorize(caller).await
            }
        }
    }

    /// Resolve again after the provider rejected the current credential.
    ///
    /// Skips the broker's stored token (the one just rejected) and goes
    /// straight to a refresh.
    pub async fn reauthorize(&self, caller: &CallerId) -> Result<Resolution> {
        self.cache.invalidate(caller).await;
        self.refresh_or_authorize(caller).await
    }

    /// Start a fresh authorization handshake.
    pub async fn connect_url(&self, caller: &CallerId) -> Result<ConnectUrl> {
        self.cache.invalidate(caller).await;
        self.broker.begin_authorization(caller, &self.scopes).await
    }

    pub async fn invalidate(&self, caller: &CallerId) {
        self.cache.invalidate(caller).await;
    }

    async fn refresh_or_authorize(&self, caller: &CallerId) -> Result<Resolution> {
        match self.broker.refresh_token(caller).await? {
            TokenRefresh::Refreshed(credential) => {
                self.cache.insert(caller, credential.clone()).await;
                Ok(Resolution::Ready(credential))
            }
            TokenRefresh::RefreshFailed => {
                tracing::debug!(caller = %caller, "token refresh failed");
                self.authorize(caller).await
            }
        }
    }

    async fn authorize(&self, caller: &CallerId) -> Result<Resolution> {
        let url = self.broker.begin_authorization(caller, &self.scopes).await?;
        tracing::info!(caller = %caller, "authorization required, connect URL issued");
        Ok(Resolution::Pending(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::broker::MockCredentialBroker;
    use crate::types::Error;

    fn caller(id: &str) -> CallerId {
        CallerId::from_string(id.to_string()).unwrap()
    }

    fn resolver(broker: MockCredentialBroker, cache_ttl: Duration) -> TokenResolver {
        let config = AuthConfig {
            cache_ttl,
            expiry_skew: Duration::from_secs(30),
        };
        TokenResolver::new(Arc::new(broker), &config, vec!["scope-a".to_string()])
    }

    fn fresh(token: &str) -> Credential {
        Credential::new(token).with_expiry(Utc::now() + chrono::Duration::hours(1))
    }

    #[tokio::test]
    async fn test_found_token_is_returned_and_cached() {
        let mut broker = MockCredentialBroker::new();
        broker
            .expect_get_token()
            .times(1)
            .returning(|_| Ok(TokenLookup::Found(fresh("tok-1"))));
        broker.expect_refresh_token().times(0);
        broker.expect_begin_authorization().times(0);

        let resolver = resolver(broker, Duration::from_secs(60));
        for _ in 0..3 {
            match resolver.resolve(&caller("u1")).await.unwrap() {
                Resolution::Ready(cred) => assert_eq!(cred.access_token, "tok-1"),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_cache_disabled_hits_broker_every_time() {
        let mut broker = MockCredentialBroker::new();
        broker
            .expect_get_token()
            .times(2)
            .returning(|_| Ok(TokenLookup::Found(fresh("tok-1"))));

        let resolver = resolver(broker, Duration::ZERO);
        resolver.resolve(&caller("u1")).await.unwrap();
        resolver.resolve(&caller("u1")).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_token_starts_authorization() {
        let mut broker = MockCredentialBroker::new();
        broker
            .expect_get_token()
            .returning(|_| Ok(TokenLookup::NotFound));
        broker
            .expect_begin_authorization()
            .withf(|c, scopes| c.as_str() == "u1" && scopes.len() == 1 && scopes[0] == "scope-a")
            .times(1)
            .returning(|c, _| Ok(ConnectUrl::new(format!("https://auth.example/connect/{}", c))));

        let resolver = resolver(broker, Duration::from_secs(60));
        assert_eq!(
            resolver.resolve(&caller("u1")).await.unwrap(),
            Resolution::Pending(ConnectUrl::new("https://auth.example/connect/u1"))
        );
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed() {
        let mut broker = MockCredentialBroker::new();
        broker.expect_get_token().returning(|_| {
            Ok(TokenLookup::Found(
                Credential::new("old").with_expiry(Utc::now() - chrono::Duration::minutes(5)),
            ))
        });
        broker
            .expect_refresh_token()
            .times(1)
            .returning(|_| Ok(TokenRefresh::Refreshed(fresh("new"))));

        let resolver = resolver(broker, Duration::from_secs(60));
        match resolver.resolve(&caller("u1")).await.unwrap() {
            Resolution::Ready(cred) => assert_eq!(cred.access_token, "new"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_refresh_failure_is_treated_as_missing() {
        let mut broker = MockCredentialBroker::new();
        broker.expect_get_token().returning(|_| {
            Ok(TokenLookup::Found(
                Credential::new("old").with_expiry(Utc::now() - chrono::Duration::minutes(5)),
            ))
        });
        broker
            .expect_refresh_token()
            .returning(|_| Ok(TokenRefresh::RefreshFailed));
        broker
            .expect_begin_authorization()
            .times(1)
            .returning(|_, _| Ok(ConnectUrl::new("https://auth.example/c")));

        let resolver = resolver(broker, Duration::from_secs(60));
        assert!(matches!(
            resolver.resolve(&caller("u1")).await.unwrap(),
            Resolution::Pending(_)
        ));
    }

    #[tokio::test]
    async fn test_broker_outage_is_an_error_not_pending() {
        let mut broker = MockCredentialBroker::new();
        broker
            .expect_get_token()
            .returning(|_| Err(Error::broker_unavailable("connection refused")));
        broker.expect_begin_authorization().times(0);

        let resolver = resolver(broker, Duration::from_secs(60));
        let err = resolver.resolve(&caller("u1")).await.unwrap_err();
        assert!(matches!(err, Error::BrokerUnavailable(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_reauthorize_skips_stored_token() {
        let mut broker = MockCredentialBroker::new();
        broker
            .expect_get_token()
            .times(1)
            .returning(|_| Ok(TokenLookup::Found(fresh("rejected"))));
        broker
            .expect_refresh_token()
            .times(1)
            .returning(|_| Ok(TokenRefresh::Refreshed(fresh("renewed"))));

        let resolver = resolver(broker, Duration::from_secs(60));
        resolver.resolve(&caller("u1")).await.unwrap();

        match resolver.reauthorize(&caller("u1")).await.unwrap() {
            Resolution::Ready(cred) => assert_eq!(cred.access_token, "renewed"),
            other => panic!("unexpected {:?}", other),
        }
        // The renewed credential replaced the rejected one in the cache.
        match resolver.resolve(&caller("u1")).await.unwrap() {
            Resolution::Ready(cred) => assert_eq!(cred.access_token, "renewed"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
