// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transport-level failures of remote calls.
//!
//! Application-level failures (`{"err": ...}` replies) are not errors here;
//! they decode into [`super::Rejection`].

#[derive(Debug, thiserror::Error)]
pub enum ActorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gateway returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("call rejected with code {code}: {message}")]
    Rejected { code: u32, message: String },

    #[error("failed to encode or decode payload: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("invalid gateway URL: {0}")]
    InvalidUrl(String),

    #[error("actor handle does not support rebinding its identity")]
    NotRebindable,
}
