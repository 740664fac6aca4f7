// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Actor binding: agents, the shared handle, and the reply wire shape.

pub mod agent;
pub mod error;
pub mod handle;
#[cfg(test)]
pub(crate) mod mock;
pub mod wire;

pub use agent::{Agent, CallKind, CallRequest, HttpAgent};
pub use error::ActorError;
pub use handle::ActorHandle;
pub use wire::{Rejection, RemoteResult, Reply};
