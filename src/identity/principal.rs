// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Principal identifiers.
//!
//! A principal is an opaque byte string of at most 29 bytes. Its textual
//! form is `base32(crc32_be(bytes) || bytes)`, lowercase, unpadded, and
//! grouped into five-character chunks separated by `-`.
//!
//! | Principal | Bytes | Text |
//! |-----------|-------|------|
//! | Management | `[]` | `aaaaa-aa` |
//! | Anonymous | `[0x04]` | `2vxsx-fae` |
//! | Self-authenticating | `sha224(der) || 0x02` | derived |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha224};

/// Maximum length of a principal in bytes.
pub const MAX_PRINCIPAL_LEN: usize = 29;

const ANONYMOUS_TAG: u8 = 0x04;
const SELF_AUTHENTICATING_TAG: u8 = 0x02;

const BASE32_ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

/// Errors produced when parsing principal text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrincipalError {
    #[error("principal text contains an invalid character: {0:?}")]
    InvalidCharacter(char),

    #[error("principal text is too short")]
    TooShort,

    #[error("principal is longer than {MAX_PRINCIPAL_LEN} bytes")]
    TooLong,

    #[error("principal checksum does not match")]
    ChecksumMismatch,

    #[error("principal text is not in canonical form (expected {expected})")]
    NotCanonical { expected: String },
}

/// Public identifier of an identity or canister.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Principal(Vec<u8>);

impl Principal {
    /// The principal used by unauthenticated callers.
    pub fn anonymous() -> Self {
        Self(vec![ANONYMOUS_TAG])
    }

    /// The management canister principal.
    pub fn management() -> Self {
        Self(Vec::new())
    }

    /// Principal derived from a DER-encoded public key.
    pub fn self_authenticating(der_public_key: &[u8]) -> Self {
        let mut bytes = Sha224::digest(der_public_key).to_vec();
        bytes.push(SELF_AUTHENTICATING_TAG);
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, PrincipalError> {
        if bytes.len() > MAX_PRINCIPAL_LEN {
            return Err(PrincipalError::TooLong);
        }
        Ok(Self(bytes.to_vec()))
    }

    pub fn from_text(text: &str) -> Result<Self, PrincipalError> {
        let compact: String = text.chars().filter(|c| *c != '-').collect();
        let decoded = base32_decode(&compact)?;
        if decoded.len() < 4 {
            return Err(PrincipalError::TooShort);
        }

        let (checksum, bytes) = decoded.split_at(4);
        if bytes.len() > MAX_PRINCIPAL_LEN {
            return Err(PrincipalError::TooLong);
        }
        if checksum != crc32fast::hash(bytes).to_be_bytes() {
            return Err(PrincipalError::ChecksumMismatch);
        }

        let principal = Self(bytes.to_vec());
        let canonical = principal.to_text();
        if canonical != text.to_ascii_lowercase() {
            return Err(PrincipalError::NotCanonical {
                expected: canonical,
            });
        }
        Ok(principal)
    }

    pub fn to_text(&self) -> String {
        let mut payload = Vec::with_capacity(4 + self.0.len());
        payload.extend_from_slice(&crc32fast::hash(&self.0).to_be_bytes());
        payload.extend_from_slice(&self.0);

        let encoded = base32_encode(&payload);
        let mut text = String::with_capacity(encoded.len() + encoded.len() / 5);
        for (i, c) in encoded.chars().enumerate() {
            if i > 0 && i % 5 == 0 {
                text.push('-');
            }
            text.push(c);
        }
        text
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn is_anonymous(&self) -> bool {
        self.0 == [ANONYMOUS_TAG]
    }
}

fn base32_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity((data.len() * 8).div_ceil(5));
    let mut buffer: u32 = 0;
    let mut bits = 0u32;

    for &byte in data {
        buffer = (buffer << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(BASE32_ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
        buffer &= (1 << bits) - 1;
    }
    if bits > 0 {
        out.push(BASE32_ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}

fn base32_decode(text: &str) -> Result<Vec<u8>, PrincipalError> {
    let mut out = Vec::with_capacity(text.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits = 0u32;

    for c in text.chars() {
        let lower = c.to_ascii_lowercase();
        let value = BASE32_ALPHABET
            .iter()
            .position(|&a| a as char == lower)
            .ok_or(PrincipalError::InvalidCharacter(c))? as u32;
        buffer = (buffer << 5) | value;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push(((buffer >> bits) & 0xff) as u8);
        }
        buffer &= (1 << bits) - 1;
    }
    Ok(out)
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Principal({})", self.to_text())
    }
}

impl FromStr for Principal {
    type Err = PrincipalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_text())
    }
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Principal::from_text(&text).map_err(serde::de::Error::custom)
    }
}
