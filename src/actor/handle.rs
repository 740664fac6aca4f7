// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The shared, rebindable actor handle.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use super::agent::{Agent, CallKind, CallRequest};
use super::error::ActorError;
use super::wire::{RemoteResult, Reply};
use crate::identity::{Identity, Principal};

/// A remote-call binding for one canister.
///
/// Clones share the underlying agent, so a [`rebind`](Self::rebind) through
/// any clone is observed by all of them. Handles for different canisters
/// built from the same agent share its identity too.
pub struct ActorHandle<A> {
    agent: Arc<A>,
    canister_id: Principal,
}

impl<A> Clone for ActorHandle<A> {
    fn clone(&self) -> Self {
        Self {
            agent: Arc::clone(&self.agent),
            canister_id: self.canister_id.clone(),
        }
    }
}

impl<A: Agent> ActorHandle<A> {
    pub fn new(agent: Arc<A>, canister_id: Principal) -> Self {
        Self { agent, canister_id }
    }

    /// Handle for another canister sharing this handle's agent.
    pub fn for_canister(&self, canister_id: Principal) -> Self {
        Self::new(Arc::clone(&self.agent), canister_id)
    }

    pub fn canister_id(&self) -> &Principal {
        &self.canister_id
    }

    pub fn agent(&self) -> &Arc<A> {
        &self.agent
    }

    /// Swap the identity used for every subsequent call.
    ///
    /// Overlapping rebinds are not coordinated; the last one to run wins.
    pub fn rebind(&self, identity: Arc<Identity>) -> Result<(), ActorError> {
        let principal = identity.principal();
        self.agent.replace_identity(identity)?;
        info!(%principal, canister = %self.canister_id, "Rebound actor identity");
        Ok(())
    }

    pub fn current_principal(&self) -> Principal {
        self.agent.principal()
    }

    async fn invoke(&self, kind: CallKind, method: &str, args: Value) -> Result<Value, ActorError> {
        debug!(method, canister = %self.canister_id, "Invoking actor method");
        self.agent
            .call(CallRequest {
                canister_id: self.canister_id.clone(),
                method: method.to_string(),
                kind,
                args,
            })
            .await
    }

    /// Query returning a plain value.
    pub async fn query<T: DeserializeOwned>(&self, method: &str, args: Value) -> Result<T, ActorError> {
        let reply = self.invoke(CallKind::Query, method, args).await?;
        Ok(serde_json::from_value(reply)?)
    }

    /// Query returning an `{ok} | {err}` result.
    pub async fn query_reply<T: DeserializeOwned>(
        &self,
        method: &str,
        args: Value,
    ) -> Result<Reply<T>, ActorError> {
        let reply = self.invoke(CallKind::Query, method, args).await?;
        Ok(serde_json::from_value::<RemoteResult<T>>(reply)?.into_reply())
    }

    /// Update call returning an `{ok} | {err}` result.
    pub async fn update_reply<T: DeserializeOwned>(
        &self,
        method: &str,
        args: Value,
    ) -> Result<Reply<T>, ActorError> {
        let reply = self.invoke(CallKind::Update, method, args).await?;
        Ok(serde_json::from_value::<RemoteResult<T>>(reply)?.into_reply())
    }
}
