// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! WeGrowTogether Dashboard - Governance Client
//!
//! Session, identity and remote-call layer for the WeGrowTogether DAO
//! canister. All durable state and business rules live in the remote
//! service; this crate establishes who the caller is and funnels their
//! actions into typed calls.
//!
//! ## Modules
//!
//! - `identity` - Principals, session keys, delegations and the login flow
//! - `actor` - The rebindable remote-call handle and its HTTP agent
//! - `session` - Authentication state store (LOGIN / LOGOUT)
//! - `gate` - Auth gate guarding protected views
//! - `api` - Typed DAO bindings, write actions and loaders
//! - `storage` - Local key-value store and credential database
//! - `routes` - Typed routes and navigation recorder
//! - `state` - Composition root

pub mod actor;
pub mod api;
pub mod config;
pub mod error;
pub mod gate;
pub mod identity;
pub mod logging;
pub mod models;
pub mod routes;
pub mod session;
pub mod state;
pub mod storage;

pub use error::{Error, Result};
