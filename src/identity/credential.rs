// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The identity presented to the remote service.

use super::delegation::DelegationChain;
use super::keys::SessionKey;
use super::principal::Principal;

/// Client-held credential identifying the caller.
///
/// Identities are never mutated. A login replaces the whole value and the
/// new one is shared as `Arc<Identity>`.
#[derive(Debug, Clone, Default)]
pub enum Identity {
    /// Unauthenticated caller; requests go unsigned
    #[default]
    Anonymous,
    /// Caller identified directly by a local key
    Basic(SessionKey),
    /// Caller identified by the identity provider's root key, acting
    /// through a delegated session key
    Delegated {
        key: SessionKey,
        chain: DelegationChain,
    },
}

impl Identity {
    pub fn principal(&self) -> Principal {
        match self {
            Identity::Anonymous => Principal::anonymous(),
            Identity::Basic(key) => key.principal(),
            Identity::Delegated { chain, .. } => chain.principal(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.principal().is_anonymous()
    }

    /// Public key the remote service attributes the request to.
    pub fn sender_public_key(&self) -> Option<&[u8]> {
        match self {
            Identity::Anonymous => None,
            Identity::Basic(key) => Some(key.public_key_der()),
            Identity::Delegated { chain, .. } => Some(&chain.public_key),
        }
    }

    pub fn delegation_chain(&self) -> Option<&DelegationChain> {
        match self {
            Identity::Delegated { chain, .. } => Some(chain),
            _ => None,
        }
    }

    /// Sign a request body. Anonymous identities do not sign.
    pub fn sign(&self, message: &[u8]) -> Option<Vec<u8>> {
        match self {
            Identity::Anonymous => None,
            Identity::Basic(key) | Identity::Delegated { key, .. } => Some(key.sign(message)),
        }
    }
}
