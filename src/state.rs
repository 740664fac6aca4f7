// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Application composition root.
//!
//! Every component is constructed once here and cloned into its consumers.
//! The DAO and token handles share one agent, so a single rebind covers
//! both.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::actor::{ActorHandle, Agent, HttpAgent};
use crate::api::{DaoActor, Governance, TokenActor};
use crate::config::Config;
use crate::error::Result;
use crate::gate::{AuthGate, ProtectedView};
use crate::identity::{is_anonymous, AuthClient, CallbackLoginFlow, Identity, LoginFlow, Principal};
use crate::routes::{Navigator, Route};
use crate::session::{Action, SessionStore};
use crate::storage::{LocalState, StoragePaths};

pub struct AppState<A = HttpAgent, F = CallbackLoginFlow> {
    pub local: LocalState,
    pub auth: Arc<AuthClient<F>>,
    pub dao: DaoActor<A>,
    pub token: TokenActor<A>,
    pub session: SessionStore,
    pub navigator: Navigator,
}

impl<A, F> Clone for AppState<A, F> {
    fn clone(&self) -> Self {
        Self {
            local: self.local.clone(),
            auth: Arc::clone(&self.auth),
            dao: self.dao.clone(),
            token: self.token.clone(),
            session: self.session.clone(),
            navigator: self.navigator.clone(),
        }
    }
}

impl AppState {
    /// Build the application from configuration with the loopback login flow.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::open(config, CallbackLoginFlow::new(config.login_callback_addr))
    }
}

impl<F: LoginFlow> AppState<HttpAgent, F> {
    /// Build the application with a custom login flow.
    ///
    /// The agent starts out anonymous until the landing check or a sign-in
    /// rebinds it.
    pub fn open(config: &Config, flow: F) -> Result<Self> {
        let local = LocalState::open(&StoragePaths::new(&config.data_dir))?;
        let auth = Arc::new(AuthClient::new(local.clone(), flow, config.identity_config()));
        let agent = Arc::new(HttpAgent::new(
            config.gateway_url.clone(),
            Arc::new(Identity::Anonymous),
        )?);
        let dao = ActorHandle::new(agent, config.dao_canister_id.clone());
        let token = dao.for_canister(config.token_canister_id.clone());

        info!(
            network = ?config.network,
            gateway = %config.gateway_url,
            dao = %config.dao_canister_id,
            "Application state initialized"
        );

        Ok(Self::new(local, auth, DaoActor::new(dao), TokenActor::new(token)))
    }
}

impl<A: Agent, F: LoginFlow> AppState<A, F> {
    pub fn new(
        local: LocalState,
        auth: Arc<AuthClient<F>>,
        dao: DaoActor<A>,
        token: TokenActor<A>,
    ) -> Self {
        Self {
            local,
            auth,
            dao,
            token,
            session: SessionStore::new(),
            navigator: Navigator::new(),
        }
    }

    /// Landing page check: a restored identity goes straight to the
    /// dashboard.
    pub async fn check_landing(&self) -> Result<Option<Principal>> {
        let identity = self.auth.create_session().await?;
        if is_anonymous(&identity) {
            return Ok(None);
        }

        let principal = identity.principal();
        self.dao.handle().rebind(identity)?;
        self.navigator.navigate(Route::Dashboard);
        Ok(Some(principal))
    }

    /// Interactive sign-in. Resolves when the login completes or `cancel`
    /// fires.
    pub async fn sign_in(&self, cancel: &CancellationToken) -> Result<Principal> {
        let identity = self.auth.login(cancel).await?;
        let principal = identity.principal();
        // The next gate check establishes the profile for the new identity.
        self.session.reset();
        self.dao.handle().rebind(identity)?;
        self.navigator.navigate(Route::Dashboard);
        Ok(principal)
    }

    /// Sign out and return to the landing page.
    ///
    /// The handle keeps its identity until the next sign-in or gate check.
    pub async fn sign_out(&self) -> Result<()> {
        self.local.clear_all()?;
        self.auth.logout().await?;
        self.session.dispatch(Action::Logout);
        self.navigator.navigate(Route::Landing);
        info!("Signed out");
        Ok(())
    }

    pub fn gate(&self) -> AuthGate<A, F> {
        AuthGate::new(
            Arc::clone(&self.auth),
            self.dao.clone(),
            self.session.clone(),
            self.local.clone(),
            self.navigator.clone(),
        )
    }

    pub fn protected_view(&self) -> ProtectedView<A, F> {
        ProtectedView::new(self.gate())
    }

    pub fn governance(&self) -> Governance<A> {
        Governance::new(self.dao.clone(), self.token.clone(), self.session.clone())
    }
}
