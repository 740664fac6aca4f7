// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The remote `{ok} | {err}` result shape.

use serde::{Deserialize, Serialize};

/// Application-level failure reported by the remote service.
///
/// The message is kept verbatim for display.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct Rejection(pub String);

impl Rejection {
    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Outcome of a remote operation that can fail at application level.
pub type Reply<T> = Result<T, Rejection>;

/// Wire form of a fallible remote result: `{"ok": T}` or `{"err": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteResult<T> {
    Ok(T),
    Err(String),
}

impl<T> RemoteResult<T> {
    pub fn into_reply(self) -> Reply<T> {
        match self {
            RemoteResult::Ok(value) => Ok(value),
            RemoteResult::Err(message) => Err(Rejection(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ok_null_decodes_to_unit() {
        let result: RemoteResult<()> = serde_json::from_value(json!({ "ok": null })).unwrap();
        assert_eq!(result.into_reply(), Ok(()));
    }

    #[test]
    fn err_message_is_kept_verbatim() {
        let result: RemoteResult<()> =
            serde_json::from_value(json!({ "err": "Member already exists!" })).unwrap();
        let rejection = result.into_reply().unwrap_err();
        assert_eq!(rejection.message(), "Member already exists!");
        assert_eq!(rejection.to_string(), "Member already exists!");
    }

    #[test]
    fn unknown_ok_payload_can_be_ignored() {
        let result: RemoteResult<serde::de::IgnoredAny> =
            serde_json::from_value(json!({ "ok": { "anything": [1, 2, 3] } })).unwrap();
        assert!(result.into_reply().is_ok());
    }

    #[test]
    fn other_shapes_are_decode_errors() {
        let result = serde_json::from_value::<RemoteResult<()>>(json!({ "maybe": 1 }));
        assert!(result.is_err());
    }
}
