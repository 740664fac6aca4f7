// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use crate::actor::ActorError;
use crate::config::ConfigError;
use crate::gate::GateError;
use crate::identity::AuthError;
use crate::storage::StorageError;

/// Top-level error for application entry points.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("remote call failed: {0}")]
    Actor(#[from] ActorError),

    #[error("local storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Gate(#[from] GateError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Process exit code for the command-line front end.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Config(_) => 2,
            Error::Auth(AuthError::LoginCancelled) => 130,
            _ => 1,
        }
    }
}
