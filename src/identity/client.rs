// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity provider client.
//!
//! Restores the persisted identity without network access, runs the
//! interactive login when asked to, and forgets the credential on logout.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use super::credential::Identity;
use super::delegation::DelegationChain;
use super::error::AuthError;
use super::keys::SessionKey;
use super::login::{AuthorizeRequest, CallbackLoginFlow, LoginFlow};
use super::now_nanos;
use crate::storage::credentials::{DELEGATION, SESSION_KEY};
use crate::storage::LocalState;

/// Key-value entry recording the last time the identity was used.
pub const ACTIVITY_KEY: &str = "wegrow-last-active";

/// Identity provider settings.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub provider_url: Url,
    /// Restored sessions idle longer than this are discarded
    pub idle_timeout: Duration,
    /// Delegation lifetime requested from the provider
    pub max_time_to_live: Duration,
    /// Upper bound on the interactive login (unbounded when `None`)
    pub login_timeout: Option<Duration>,
}

pub struct AuthClient<F = CallbackLoginFlow> {
    local: LocalState,
    flow: F,
    config: IdentityConfig,
}

/// Whether `identity` is the well-known anonymous identity.
pub fn is_anonymous(identity: &Identity) -> bool {
    identity.principal().is_anonymous()
}

impl<F: LoginFlow> AuthClient<F> {
    pub fn new(local: LocalState, flow: F, config: IdentityConfig) -> Self {
        Self {
            local,
            flow,
            config,
        }
    }

    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    /// Restore the current identity from local state.
    ///
    /// Falls back to [`Identity::Anonymous`] when no delegation is stored or
    /// the stored one is expired or idle. Never touches the network.
    pub async fn create_session(&self) -> Result<Arc<Identity>, AuthError> {
        let key = self.session_key()?;

        let Some(chain) = self.stored_delegation()? else {
            debug!("No stored delegation, continuing anonymously");
            return Ok(Arc::new(Identity::Anonymous));
        };

        if chain.is_expired(now_nanos()) || !chain.delegates_to(key.public_key_der()) {
            info!("Stored delegation is no longer valid, discarding it");
            self.forget_delegation()?;
            return Ok(Arc::new(Identity::Anonymous));
        }

        if self.idle_expired()? {
            info!(
                idle_timeout_secs = self.config.idle_timeout.as_secs(),
                "Session idle timeout elapsed, discarding delegation"
            );
            self.forget_delegation()?;
            return Ok(Arc::new(Identity::Anonymous));
        }

        self.record_activity()?;
        let identity = Identity::Delegated { key, chain };
        debug!(principal = %identity.principal(), "Restored delegated identity");
        Ok(Arc::new(identity))
    }

    /// Run the interactive login and persist the resulting delegation.
    ///
    /// Resolves only when the flow completes, `cancel` fires, or the
    /// configured login timeout elapses.
    pub async fn login(&self, cancel: &CancellationToken) -> Result<Arc<Identity>, AuthError> {
        let key = self.session_key()?;
        let request = AuthorizeRequest {
            provider_url: self.config.provider_url.clone(),
            session_public_key: key.public_key_der().to_vec(),
            max_time_to_live: self.config.max_time_to_live,
        };

        let authorize = bounded(self.config.login_timeout, self.flow.authorize(request));
        let chain = tokio::select! {
            result = authorize => result?,
            _ = cancel.cancelled() => {
                info!("Login cancelled");
                return Err(AuthError::LoginCancelled);
            }
        };

        if !chain.delegates_to(key.public_key_der()) {
            return Err(AuthError::DelegationMismatch);
        }
        if chain.is_expired(now_nanos()) {
            return Err(AuthError::DelegationExpired);
        }

        let encoded = serde_json::to_vec(&chain).map_err(crate::storage::StorageError::from)?;
        self.local.credentials().put(DELEGATION, &encoded)?;
        self.record_activity()?;

        let identity = Identity::Delegated { key, chain };
        info!(principal = %identity.principal(), "Signed in");
        Ok(Arc::new(identity))
    }

    /// Forget the persisted credential.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let credentials = self.local.credentials();
        credentials.remove(DELEGATION)?;
        credentials.remove(SESSION_KEY)?;
        self.local.storage().remove(ACTIVITY_KEY)?;
        info!("Signed out of identity provider");
        Ok(())
    }

    /// Load the persisted session key, generating one on first use.
    fn session_key(&self) -> Result<SessionKey, AuthError> {
        let credentials = self.local.credentials();
        if let Some(pem) = credentials.get(SESSION_KEY)? {
            let pem = String::from_utf8(pem)
                .map_err(|e| AuthError::MalformedKey(format!("session key is not UTF-8: {e}")))?;
            return SessionKey::from_pem(&pem);
        }

        let key = SessionKey::generate()?;
        credentials.put(SESSION_KEY, key.to_pem()?.as_bytes())?;
        debug!("Generated new session key");
        Ok(key)
    }

    fn stored_delegation(&self) -> Result<Option<DelegationChain>, AuthError> {
        match self.local.credentials().get(DELEGATION)? {
            Some(bytes) => match serde_json::from_slice(&bytes) {
                Ok(chain) => Ok(Some(chain)),
                Err(e) => {
                    info!(error = %e, "Stored delegation is unreadable, discarding it");
                    self.forget_delegation()?;
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    fn forget_delegation(&self) -> Result<(), AuthError> {
        self.local.credentials().remove(DELEGATION)?;
        self.local.storage().remove(ACTIVITY_KEY)?;
        Ok(())
    }

    fn idle_expired(&self) -> Result<bool, AuthError> {
        let Some(raw) = self.local.storage().get(ACTIVITY_KEY)? else {
            return Ok(false);
        };
        let Ok(last_active) = DateTime::parse_from_rfc3339(&raw) else {
            return Ok(true);
        };
        let idle = Utc::now().signed_duration_since(last_active.with_timezone(&Utc));
        Ok(idle.to_std().is_ok_and(|idle| idle > self.config.idle_timeout))
    }

    fn record_activity(&self) -> Result<(), AuthError> {
        self.local
            .storage()
            .set(ACTIVITY_KEY, Utc::now().to_rfc3339())?;
        Ok(())
    }
}

async fn bounded<T>(
    limit: Option<Duration>,
    future: impl std::future::Future<Output = Result<T, AuthError>>,
) -> Result<T, AuthError> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, future)
            .await
            .map_err(|_| AuthError::LoginTimedOut)?,
        None => future.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::delegation::{Delegation, SignedDelegation};
    use crate::storage::StoragePaths;
    use tempfile::TempDir;

    /// Provider that immediately delegates to whatever key it is asked about.
    struct GrantingFlow {
        expiration: u64,
    }

    impl LoginFlow for GrantingFlow {
        async fn authorize(&self, request: AuthorizeRequest) -> Result<DelegationChain, AuthError> {
            Ok(DelegationChain {
                public_key: vec![0x30, 0x99, 0x01],
                delegations: vec![SignedDelegation {
                    delegation: Delegation {
                        pubkey: request.session_public_key,
                        expiration: self.expiration,
                        targets: None,
                    },
                    signature: vec![0x01],
                }],
            })
        }
    }

    /// Provider the user never returns from.
    struct AbandonedFlow;

    impl LoginFlow for AbandonedFlow {
        async fn authorize(&self, _request: AuthorizeRequest) -> Result<DelegationChain, AuthError> {
            std::future::pending().await
        }
    }

    fn config() -> IdentityConfig {
        IdentityConfig {
            provider_url: Url::parse("https://identity.ic0.app").unwrap(),
            idle_timeout: Duration::from_secs(30 * 60),
            max_time_to_live: Duration::from_secs(8 * 60 * 60),
            login_timeout: None,
        }
    }

    fn client_with<F: LoginFlow>(flow: F, config: IdentityConfig) -> (AuthClient<F>, LocalState, TempDir) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let local = LocalState::open(&StoragePaths::new(dir.path())).unwrap();
        (AuthClient::new(local.clone(), flow, config), local, dir)
    }

    #[tokio::test]
    async fn fresh_client_is_anonymous() {
        let (client, _local, _dir) = client_with(AbandonedFlow, config());
        let identity = client.create_session().await.unwrap();
        assert!(is_anonymous(&identity));
    }

    #[tokio::test]
    async fn session_key_is_generated_once() {
        let (client, local, _dir) = client_with(AbandonedFlow, config());
        client.create_session().await.unwrap();
        let first = local.credentials().get(SESSION_KEY).unwrap().unwrap();
        client.create_session().await.unwrap();
        let second = local.credentials().get(SESSION_KEY).unwrap().unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn login_persists_and_restores_delegated_identity() {
        let (client, _local, _dir) = client_with(GrantingFlow { expiration: u64::MAX }, config());
        let identity = client.login(&CancellationToken::new()).await.unwrap();
        assert!(!is_anonymous(&identity));

        let restored = client.create_session().await.unwrap();
        assert_eq!(restored.principal(), identity.principal());
    }

    #[tokio::test]
    async fn expired_delegation_from_provider_is_rejected() {
        let (client, _local, _dir) = client_with(GrantingFlow { expiration: 1 }, config());
        let result = client.login(&CancellationToken::new()).await;
        assert!(matches!(result, Err(AuthError::DelegationExpired)));
    }

    #[tokio::test]
    async fn logout_forgets_credential() {
        let (client, local, _dir) = client_with(GrantingFlow { expiration: u64::MAX }, config());
        client.login(&CancellationToken::new()).await.unwrap();
        client.logout().await.unwrap();

        assert_eq!(local.credentials().get(DELEGATION).unwrap(), None);
        assert!(is_anonymous(&client.create_session().await.unwrap()));
    }

    #[tokio::test]
    async fn idle_session_falls_back_to_anonymous() {
        let (client, local, _dir) = client_with(GrantingFlow { expiration: u64::MAX }, config());
        client.login(&CancellationToken::new()).await.unwrap();

        let stale = Utc::now() - chrono::Duration::hours(2);
        local.storage().set(ACTIVITY_KEY, stale.to_rfc3339()).unwrap();

        assert!(is_anonymous(&client.create_session().await.unwrap()));
        assert_eq!(local.credentials().get(DELEGATION).unwrap(), None);
    }

    #[tokio::test]
    async fn abandoned_login_can_be_cancelled() {
        let (client, _local, _dir) = client_with(AbandonedFlow, config());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = client.login(&cancel).await;
        assert!(matches!(result, Err(AuthError::LoginCancelled)));
    }

    #[tokio::test]
    async fn abandoned_login_times_out_when_configured() {
        let mut config = config();
        config.login_timeout = Some(Duration::from_millis(20));
        let (client, _local, _dir) = client_with(AbandonedFlow, config);
        let result = client.login(&CancellationToken::new()).await;
        assert!(matches!(result, Err(AuthError::LoginTimedOut)));
    }
}
