// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Remote Call Façade
//!
//! Typed entry points for everything the dashboard asks of the remote
//! service. Writes live in [`governance`], page loaders in [`loaders`],
//! and the raw canister bindings in [`dao`].

pub mod dao;
pub mod governance;
pub mod loaders;

pub use dao::{DaoActor, TokenActor};
pub use governance::Governance;
pub use loaders::filter_members;
