// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Interactive login transport.
//!
//! ## Flow
//!
//! 1. A loopback listener is bound (`LOGIN_CALLBACK_ADDR`)
//! 2. The authorize URL is announced:
//!    `{provider}/#authorize?session_public_key=..&max_time_to_live=..&redirect_uri=..&state=..`
//! 3. The identity provider POSTs `{ state, delegation }` to `/callback`
//! 4. The delegation is checked against the pending login and handed back
//!
//! The listener shuts down as soon as the login future completes or is
//! dropped.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use super::delegation::DelegationChain;
use super::error::AuthError;
use super::now_nanos;

/// What the identity provider is asked to authorize.
#[derive(Debug, Clone)]
pub struct AuthorizeRequest {
    pub provider_url: Url,
    /// DER public key of the local session key
    pub session_public_key: Vec<u8>,
    pub max_time_to_live: Duration,
}

/// An interactive login that yields a delegation chain.
///
/// Implementations may suspend indefinitely; cancellation and timeouts are
/// applied by the caller.
pub trait LoginFlow: Send + Sync {
    fn authorize(
        &self,
        request: AuthorizeRequest,
    ) -> impl Future<Output = Result<DelegationChain, AuthError>> + Send;
}

type AuthorizeHook = Arc<dyn Fn(&Url) + Send + Sync>;

/// Login flow receiving the delegation on a loopback HTTP callback.
#[derive(Clone)]
pub struct CallbackLoginFlow {
    bind_addr: SocketAddr,
    on_authorize: Option<AuthorizeHook>,
}

impl CallbackLoginFlow {
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            on_authorize: None,
        }
    }

    /// Invoke `hook` with the authorize URL once the listener is ready.
    pub fn on_authorize(mut self, hook: impl Fn(&Url) + Send + Sync + 'static) -> Self {
        self.on_authorize = Some(Arc::new(hook));
        self
    }
}

/// Body posted by the identity provider.
#[derive(Debug, Deserialize)]
pub struct CallbackPayload {
    pub state: String,
    pub delegation: DelegationChain,
}

pub(crate) struct PendingLogin {
    state: String,
    session_public_key: Vec<u8>,
    sender: Mutex<Option<oneshot::Sender<DelegationChain>>>,
}

impl PendingLogin {
    pub(crate) fn new(
        state: String,
        session_public_key: Vec<u8>,
    ) -> (Arc<Self>, oneshot::Receiver<DelegationChain>) {
        let (sender, receiver) = oneshot::channel();
        let pending = Arc::new(Self {
            state,
            session_public_key,
            sender: Mutex::new(Some(sender)),
        });
        (pending, receiver)
    }
}

async fn receive_delegation(
    State(pending): State<Arc<PendingLogin>>,
    Json(payload): Json<CallbackPayload>,
) -> Result<StatusCode, AuthError> {
    if payload.state != pending.state {
        warn!("Login callback carried an unexpected state parameter");
        return Err(AuthError::StateMismatch);
    }
    if !payload.delegation.delegates_to(&pending.session_public_key) {
        return Err(AuthError::DelegationMismatch);
    }
    if payload.delegation.is_expired(now_nanos()) {
        return Err(AuthError::DelegationExpired);
    }

    let sender = pending
        .sender
        .lock()
        .ok()
        .and_then(|mut slot| slot.take())
        .ok_or_else(|| AuthError::Callback("login already completed".to_string()))?;
    // A dropped receiver means the login was abandoned; nothing left to do.
    let _ = sender.send(payload.delegation);
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn callback_router(pending: Arc<PendingLogin>) -> Router {
    Router::new()
        .route("/callback", post(receive_delegation))
        .layer(TraceLayer::new_for_http())
        .with_state(pending)
}

/// Build the provider URL the user opens to authorize the session key.
pub fn authorize_url(
    request: &AuthorizeRequest,
    redirect_uri: &str,
    state: &str,
) -> Result<Url, AuthError> {
    if request.provider_url.cannot_be_a_base() {
        return Err(AuthError::InvalidProviderUrl(request.provider_url.to_string()));
    }

    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("session_public_key", &hex::encode(&request.session_public_key))
        .append_pair(
            "max_time_to_live",
            &request.max_time_to_live.as_nanos().to_string(),
        )
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("state", state)
        .finish();

    let mut url = request.provider_url.clone();
    url.set_fragment(Some(&format!("authorize?{query}")));
    Ok(url)
}

impl LoginFlow for CallbackLoginFlow {
    async fn authorize(&self, request: AuthorizeRequest) -> Result<DelegationChain, AuthError> {
        let listener = TcpListener::bind(self.bind_addr)
            .await
            .map_err(|e| AuthError::Callback(format!("failed to bind {}: {e}", self.bind_addr)))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| AuthError::Callback(e.to_string()))?;

        let state = Uuid::new_v4().to_string();
        let (pending, receiver) = PendingLogin::new(state.clone(), request.session_public_key.clone());
        let redirect_uri = format!("http://{local_addr}/callback");
        let url = authorize_url(&request, &redirect_uri, &state)?;

        let shutdown = CancellationToken::new();
        let _shutdown_on_drop = shutdown.clone().drop_guard();
        let server = axum::serve(listener, callback_router(pending))
            .with_graceful_shutdown(shutdown.cancelled_owned());
        tokio::spawn(async move {
            if let Err(e) = server.await {
                warn!(error = %e, "Login callback listener failed");
            }
        });

        info!(%url, callback = %local_addr, "Open the identity provider to continue signing in");
        if let Some(hook) = &self.on_authorize {
            hook(&url);
        }

        receiver.await.map_err(|_| {
            AuthError::Callback("listener stopped before a delegation arrived".to_string())
        })
    }
}
