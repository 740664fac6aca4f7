// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity and login errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::storage::StorageError;

/// Identity provider client error type.
///
/// The callback-facing variants are also rendered as HTTP responses by the
/// loopback login listener.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Persisted or received key material could not be decoded
    #[error("Malformed key material: {0}")]
    MalformedKey(String),
    /// Credential storage failed
    #[error("Credential storage failed: {0}")]
    Storage(#[from] StorageError),
    /// The interactive login was cancelled by the caller
    #[error("Login was cancelled")]
    LoginCancelled,
    /// The interactive login did not complete within the configured timeout
    #[error("Login timed out")]
    LoginTimedOut,
    /// The login listener could not be started or stopped unexpectedly
    #[error("Login callback failed: {0}")]
    Callback(String),
    /// Callback `state` did not match the pending login
    #[error("Login callback state does not match")]
    StateMismatch,
    /// Delegation does not target the local session key
    #[error("Delegation does not target the local session key")]
    DelegationMismatch,
    /// Delegation has already expired
    #[error("Delegation has expired")]
    DelegationExpired,
    /// Identity provider URL is unusable
    #[error("Invalid identity provider URL: {0}")]
    InvalidProviderUrl(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MalformedKey(_) => "malformed_key",
            AuthError::Storage(_) => "storage_error",
            AuthError::LoginCancelled => "login_cancelled",
            AuthError::LoginTimedOut => "login_timed_out",
            AuthError::Callback(_) => "callback_error",
            AuthError::StateMismatch => "state_mismatch",
            AuthError::DelegationMismatch => "delegation_mismatch",
            AuthError::DelegationExpired => "delegation_expired",
            AuthError::InvalidProviderUrl(_) => "invalid_provider_url",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MalformedKey(_)
            | AuthError::StateMismatch
            | AuthError::DelegationMismatch
            | AuthError::DelegationExpired => StatusCode::BAD_REQUEST,
            AuthError::Storage(_)
            | AuthError::LoginCancelled
            | AuthError::LoginTimedOut
            | AuthError::Callback(_)
            | AuthError::InvalidProviderUrl(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn state_mismatch_returns_400() {
        let response = AuthError::StateMismatch.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error_code"], "state_mismatch");
    }

    #[tokio::test]
    async fn callback_failure_returns_500() {
        let response = AuthError::Callback("login already completed".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error_code"], "callback_error");
    }

    #[test]
    fn client_side_login_outcomes_are_not_client_errors() {
        assert_eq!(AuthError::LoginCancelled.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AuthError::LoginTimedOut.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn storage_errors_keep_their_source() {
        let err: AuthError = StorageError::Poisoned.into();
        assert_eq!(err.error_code(), "storage_error");
        assert!(std::error::Error::source(&err).is_some());
    }
}
