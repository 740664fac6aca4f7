// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Identity Module
//!
//! Client-side identity handling for the WeGrow dashboard.
//!
//! ## Overview
//!
//! - [`Principal`] is the stable public identifier the remote service sees
//! - [`SessionKey`] is the locally held secp256k1 key, persisted as PKCS#8
//! - [`DelegationChain`] is issued by the identity provider at login
//! - [`Identity`] combines them into what a request is signed with
//! - [`AuthClient`] restores, obtains and forgets identities
//!
//! ## Lifecycle
//!
//! 1. `create_session()` restores a stored delegation or yields anonymous
//! 2. `login()` runs the interactive flow and persists the new delegation
//! 3. `logout()` forgets the stored credential

pub mod client;
pub mod credential;
pub mod delegation;
pub mod error;
pub mod keys;
pub mod login;
pub mod principal;

pub use client::{is_anonymous, AuthClient, IdentityConfig};
pub use credential::Identity;
pub use delegation::{Delegation, DelegationChain, SignedDelegation};
pub use error::AuthError;
pub use keys::SessionKey;
pub use login::{AuthorizeRequest, CallbackLoginFlow, LoginFlow};
pub use principal::{Principal, PrincipalError};

/// Current time in nanoseconds since the Unix epoch.
pub(crate) fn now_nanos() -> u64 {
    chrono::Utc::now()
        .timestamp_nanos_opt()
        .and_then(|nanos| u64::try_from(nanos).ok())
        .unwrap_or(u64::MAX)
}
