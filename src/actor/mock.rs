// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Scripted agent for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use serde_json::Value;

use super::agent::{Agent, CallRequest};
use super::error::ActorError;
use crate::identity::{Identity, Principal};

enum Scripted {
    Reply(Value),
    Unavailable,
}

/// Agent answering each method with a scripted reply and recording calls.
///
/// Methods without a script are rejected by the "replica".
#[derive(Default)]
pub struct MockAgent {
    identity: RwLock<Arc<Identity>>,
    script: Mutex<HashMap<String, Scripted>>,
    calls: Mutex<Vec<CallRequest>>,
}

impl MockAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, method: &str, value: Value) {
        self.script
            .lock()
            .unwrap()
            .insert(method.to_string(), Scripted::Reply(value));
    }

    /// Make `method` fail at the transport level.
    pub fn unavailable(&self, method: &str) {
        self.script
            .lock()
            .unwrap()
            .insert(method.to_string(), Scripted::Unavailable);
    }

    pub fn calls(&self) -> Vec<CallRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.method == method)
            .count()
    }
}

impl Agent for MockAgent {
    fn principal(&self) -> Principal {
        self.identity.read().unwrap().principal()
    }

    fn replace_identity(&self, identity: Arc<Identity>) -> Result<(), ActorError> {
        *self.identity.write().unwrap() = identity;
        Ok(())
    }

    async fn call(&self, request: CallRequest) -> Result<Value, ActorError> {
        let outcome = match self.script.lock().unwrap().get(&request.method) {
            Some(Scripted::Reply(value)) => Ok(value.clone()),
            Some(Scripted::Unavailable) => Err(ActorError::Status {
                status: 503,
                body: "unavailable".to_string(),
            }),
            None => Err(ActorError::Rejected {
                code: 3,
                message: format!("no method {}", request.method),
            }),
        };
        self.calls.lock().unwrap().push(request);
        outcome
    }
}
