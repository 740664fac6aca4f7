// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Agents carry signed calls to the remote service.
//!
//! ## Gateway Protocol
//!
//! [`HttpAgent`] is a JSON adapter for a call gateway that fronts the
//! canisters and relays each call synchronously. It does not speak the
//! replica's own HTTP interface (CBOR envelopes, Candid arguments,
//! `read_state` polling) and must not be pointed at a public boundary node.
//!
//! Requests are POSTed as JSON to
//! `{gateway}/api/v2/canister/{canister_id}/{query|call}`:
//!
//! ```text
//! {
//!   "content":           { request_type, canister_id, method_name, arg,
//!                          sender, ingress_expiry, nonce },
//!   "sender_pubkey":     base64 DER        (omitted when anonymous)
//!   "sender_sig":        base64 signature  (omitted when anonymous)
//!   "sender_delegation": [SignedDelegation] (delegated identities only)
//! }
//! ```
//!
//! The signature covers `"\x0Aic-request" || sha256(content)` where
//! `content` is the compact JSON of the content object with sorted keys.
//! This is the gateway's own scheme, not the representation-independent
//! hash the replica uses.
//! The gateway answers `{"status":"replied","reply":...}` or
//! `{"status":"rejected","reject_code":n,"reject_message":"..."}`.

use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use base64ct::{Base64, Encoding};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;
use url::Url;
use uuid::Uuid;

use super::error::ActorError;
use crate::identity::{now_nanos, Identity, Principal, SignedDelegation};

/// Domain separator prefixed to the request id before signing.
pub const REQUEST_DOMAIN_SEPARATOR: &[u8] = b"\x0Aic-request";

/// How long a submitted request stays valid.
const INGRESS_EXPIRY: Duration = Duration::from_secs(5 * 60);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Read-only call answered by a single replica
    Query,
    /// State-changing call that goes through consensus
    Update,
}

impl CallKind {
    fn as_str(self) -> &'static str {
        match self {
            CallKind::Query => "query",
            CallKind::Update => "call",
        }
    }
}

/// One remote method invocation. `args` is the positional argument list.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRequest {
    pub canister_id: Principal,
    pub method: String,
    pub kind: CallKind,
    pub args: Value,
}

/// Something that can execute calls on behalf of an identity.
pub trait Agent: Send + Sync {
    /// Principal calls are currently attributed to.
    fn principal(&self) -> Principal;

    /// Replace the identity in place.
    ///
    /// Agents bound to a fixed identity keep this default.
    fn replace_identity(&self, identity: Arc<Identity>) -> Result<(), ActorError> {
        let _ = identity;
        Err(ActorError::NotRebindable)
    }

    /// Execute a call and return the raw reply value.
    fn call(&self, request: CallRequest) -> impl Future<Output = Result<Value, ActorError>> + Send;
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    request_type: &'static str,
    canister_id: String,
    method_name: &'a str,
    arg: &'a Value,
    sender: String,
    ingress_expiry: u64,
    nonce: String,
}

#[derive(Debug, Serialize)]
struct Envelope<'a> {
    content: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    sender_pubkey: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sender_sig: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sender_delegation: Option<&'a [SignedDelegation]>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum GatewayResponse {
    Replied {
        reply: Value,
    },
    Rejected {
        reject_code: u32,
        reject_message: String,
    },
}

/// Request id of an encoded content object.
pub fn request_id(content: &Value) -> Result<[u8; 32], ActorError> {
    let bytes = serde_json::to_vec(content)?;
    Ok(Sha256::digest(&bytes).into())
}

/// Bytes an identity signs for a given request id.
pub fn signable(request_id: &[u8; 32]) -> Vec<u8> {
    [REQUEST_DOMAIN_SEPARATOR, request_id.as_slice()].concat()
}

/// Agent speaking the JSON gateway protocol over HTTP.
pub struct HttpAgent {
    gateway: Url,
    client: reqwest::Client,
    identity: RwLock<Arc<Identity>>,
}

impl HttpAgent {
    pub fn new(gateway: Url, identity: Arc<Identity>) -> Result<Self, ActorError> {
        if gateway.cannot_be_a_base() {
            return Err(ActorError::InvalidUrl(gateway.to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            gateway,
            client,
            identity: RwLock::new(identity),
        })
    }

    pub fn gateway(&self) -> &Url {
        &self.gateway
    }

    /// Identity the next call will be signed with.
    pub fn identity(&self) -> Arc<Identity> {
        self.identity
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn endpoint(&self, request: &CallRequest) -> Result<Url, ActorError> {
        self.gateway
            .join(&format!(
                "api/v2/canister/{}/{}",
                request.canister_id,
                request.kind.as_str()
            ))
            .map_err(|e| ActorError::InvalidUrl(e.to_string()))
    }

    fn envelope<'a>(
        &self,
        identity: &'a Identity,
        request: &CallRequest,
    ) -> Result<Envelope<'a>, ActorError> {
        let ingress_expiry =
            now_nanos().saturating_add(u64::try_from(INGRESS_EXPIRY.as_nanos()).unwrap_or(u64::MAX));
        let content = serde_json::to_value(RequestContent {
            request_type: request.kind.as_str(),
            canister_id: request.canister_id.to_text(),
            method_name: &request.method,
            arg: &request.args,
            sender: identity.principal().to_text(),
            ingress_expiry,
            nonce: Uuid::new_v4().to_string(),
        })?;

        let message = signable(&request_id(&content)?);
        Ok(Envelope {
            sender_pubkey: identity.sender_public_key().map(Base64::encode_string),
            sender_sig: identity.sign(&message).map(|sig| Base64::encode_string(&sig)),
            sender_delegation: identity.delegation_chain().map(|c| c.delegations.as_slice()),
            content,
        })
    }
}

impl Agent for HttpAgent {
    fn principal(&self) -> Principal {
        self.identity().principal()
    }

    fn replace_identity(&self, identity: Arc<Identity>) -> Result<(), ActorError> {
        let mut slot = self
            .identity
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = identity;
        Ok(())
    }

    async fn call(&self, request: CallRequest) -> Result<Value, ActorError> {
        let identity = self.identity();
        let url = self.endpoint(&request)?;
        let envelope = self.envelope(&identity, &request)?;

        debug!(
            method = %request.method,
            canister = %request.canister_id,
            kind = request.kind.as_str(),
            "Calling remote actor"
        );

        let response = self.client.post(url).json(&envelope).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(ActorError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        match serde_json::from_slice(&body)? {
            GatewayResponse::Replied { reply } => Ok(reply),
            GatewayResponse::Rejected {
                reject_code,
                reject_message,
            } => Err(ActorError::Rejected {
                code: reject_code,
                message: reject_message,
            }),
        }
    }
}
