// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Auth Gate
//!
//! Guards every protected view.
//!
//! ## State Machine
//!
//! ```text
//! Checking ──anonymous──────────────▶ Unauthenticated  (teardown, navigate "/")
//!     │
//!     ├──member found───────────────▶ Authenticated    (LOGIN dispatched once)
//!     │
//!     └──no member──────────────────▶ NotMember
//! ```
//!
//! Transport failures end the check with an error and are not retried.

use std::sync::Arc;

use tracing::{debug, info};

use crate::actor::{ActorError, Agent};
use crate::api::DaoActor;
use crate::identity::{is_anonymous, AuthClient, AuthError, LoginFlow, Principal};
use crate::routes::{Navigator, Route};
use crate::session::{Action, Profile, SessionStore};
use crate::storage::{LocalState, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("identity check failed: {0}")]
    Auth(#[from] AuthError),

    #[error("member lookup failed: {0}")]
    Actor(#[from] ActorError),

    #[error("local session teardown failed: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    Checking,
    Authenticated(Profile),
    /// Signed in, but not registered with the remote service
    NotMember { principal: Principal },
    Unauthenticated,
}

pub struct AuthGate<A, F> {
    auth: Arc<AuthClient<F>>,
    dao: DaoActor<A>,
    session: SessionStore,
    local: LocalState,
    navigator: Navigator,
}

impl<A, F> Clone for AuthGate<A, F> {
    fn clone(&self) -> Self {
        Self {
            auth: Arc::clone(&self.auth),
            dao: self.dao.clone(),
            session: self.session.clone(),
            local: self.local.clone(),
            navigator: self.navigator.clone(),
        }
    }
}

impl<A: Agent, F: LoginFlow> AuthGate<A, F> {
    pub fn new(
        auth: Arc<AuthClient<F>>,
        dao: DaoActor<A>,
        session: SessionStore,
        local: LocalState,
        navigator: Navigator,
    ) -> Self {
        Self {
            auth,
            dao,
            session,
            local,
            navigator,
        }
    }

    /// Resolve the current identity and settle the session accordingly.
    pub async fn check(&self) -> Result<GateState, GateError> {
        let identity = self.auth.create_session().await?;

        if is_anonymous(&identity) {
            self.teardown()?;
            return Ok(GateState::Unauthenticated);
        }

        let principal = identity.principal();
        self.dao.handle().rebind(identity)?;

        match self.dao.get_member(&principal).await? {
            Ok(member) => {
                let profile = Profile {
                    principal,
                    member: Some(member),
                };
                self.session.dispatch(Action::Login(profile.clone()));
                info!(principal = %profile.principal, "Member signed in");
                Ok(GateState::Authenticated(profile))
            }
            Err(rejection) => {
                debug!(%principal, reason = %rejection, "Caller is not a member");
                // A session left by an earlier sign-in must not outlive it.
                if self.session.state().user().is_some() {
                    self.session.reset();
                }
                Ok(GateState::NotMember { principal })
            }
        }
    }

    /// Clear all locally persisted session data and send the user home.
    fn teardown(&self) -> Result<(), GateError> {
        self.local.clear_all()?;
        self.session.reset();
        self.navigator.navigate(Route::Landing);
        info!("Anonymous identity, local session torn down");
        Ok(())
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }
}

/// What a protected view shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Checking,
    Content(Profile),
    NotMember,
    NotLoggedIn,
}

/// A view behind the gate. The check runs once per mount.
pub struct ProtectedView<A, F> {
    gate: AuthGate<A, F>,
    state: GateState,
    mounted: bool,
}

impl<A: Agent, F: LoginFlow> ProtectedView<A, F> {
    pub fn new(gate: AuthGate<A, F>) -> Self {
        Self {
            gate,
            state: GateState::Checking,
            mounted: false,
        }
    }

    /// Mount the view, running the gate check unless already mounted.
    ///
    /// A failed check leaves the view unmounted, so the next call checks
    /// again.
    pub async fn mount(&mut self) -> Result<&GateState, GateError> {
        if !self.mounted {
            self.state = GateState::Checking;
            self.state = self.gate.check().await?;
            self.mounted = true;
        }
        Ok(&self.state)
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
        self.state = GateState::Checking;
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    /// Render from the current session without re-running the check.
    pub fn render(&self) -> Rendered {
        let session = self.gate.session().state();
        match (session.user(), &self.state) {
            (Some(user), _) if user.member.is_some() => Rendered::Content(user.clone()),
            (Some(_), _) | (None, GateState::NotMember { .. }) => Rendered::NotMember,
            (None, GateState::Checking) => Rendered::Checking,
            (None, _) => Rendered::NotLoggedIn,
        }
    }
}
