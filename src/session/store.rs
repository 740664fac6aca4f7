// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication state and its two transitions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

use crate::identity::Principal;
use crate::models::Member;

/// The signed-in caller. `member` is absent until they register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub principal: Principal,
    pub member: Option<Member>,
}

/// Authentication state.
///
/// `is_authenticated()` is true exactly when `user()` is present; the
/// fields are only reachable through [`reduce`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    is_authenticated: bool,
    user: Option<Profile>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn user(&self) -> Option<&Profile> {
        self.user.as_ref()
    }

    pub fn member(&self) -> Option<&Member> {
        self.user.as_ref().and_then(|user| user.member.as_ref())
    }
}

/// Session transitions, tagged as `{"type": "LOGIN", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "UPPERCASE")]
pub enum Action {
    Login(Profile),
    Logout,
    /// Any tag this store does not know; applying it changes nothing
    #[serde(other)]
    Unknown,
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Action::Login(_) => "LOGIN",
            Action::Logout => "LOGOUT",
            Action::Unknown => "UNKNOWN",
        }
    }
}

/// Apply `action` to `state`.
///
/// Unknown actions, and LOGOUT on an already signed-out state, return
/// `state` itself (pointer-equal).
pub fn reduce(state: &Arc<Session>, action: Action) -> Arc<Session> {
    match action {
        Action::Login(profile) => Arc::new(Session {
            is_authenticated: true,
            user: Some(profile),
        }),
        Action::Logout if state.user.is_none() => Arc::clone(state),
        Action::Logout => Arc::new(Session::default()),
        Action::Unknown => Arc::clone(state),
    }
}

/// Shared store holding the current [`Session`].
///
/// Construct one per application and clone it into consumers. Dispatches
/// are applied one at a time under the channel's write lock.
#[derive(Clone)]
pub struct SessionStore {
    sender: Arc<watch::Sender<Arc<Session>>>,
    transitions: Arc<AtomicU64>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Arc::new(Session::default()));
        Self {
            sender: Arc::new(sender),
            transitions: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn state(&self) -> Arc<Session> {
        Arc::clone(&self.sender.borrow())
    }

    pub fn dispatch(&self, action: Action) -> Arc<Session> {
        let name = action.name();
        let mut applied = None;
        self.sender.send_if_modified(|current| {
            let next = reduce(current, action);
            let changed = !Arc::ptr_eq(current, &next);
            if changed {
                *current = Arc::clone(&next);
                self.transitions.fetch_add(1, Ordering::Relaxed);
            }
            applied = Some(next);
            changed
        });

        let next = applied.unwrap_or_else(|| self.state());
        debug!(action = name, authenticated = next.is_authenticated(), "Session dispatch");
        next
    }

    /// Reset to the initial, signed-out state.
    pub fn reset(&self) -> Arc<Session> {
        self.dispatch(Action::Logout)
    }

    /// Change notifications for presentation code.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Session>> {
        self.sender.subscribe()
    }

    /// Number of LOGIN/LOGOUT transitions applied so far.
    pub fn transitions(&self) -> u64 {
        self.transitions.load(Ordering::Relaxed)
    }
}
