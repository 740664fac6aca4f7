// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session state shared by everything that renders or gates on sign-in.

pub mod store;

pub use store::{reduce, Action, Profile, Session, SessionStore};
