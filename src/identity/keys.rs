// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session key material (secp256k1).
//!
//! The session key is generated locally, persisted as PKCS#8 PEM in the
//! credential database, and is the key the identity provider delegates to.

use std::fmt;

use k256::ecdsa::{signature::Signer, Signature, SigningKey};
use k256::elliptic_curve::rand_core::OsRng;
use k256::pkcs8::{DecodePrivateKey, EncodePrivateKey, EncodePublicKey, LineEnding};

use super::error::AuthError;
use super::principal::Principal;

/// A secp256k1 signing key with its cached DER public key.
#[derive(Clone)]
pub struct SessionKey {
    signing_key: SigningKey,
    public_key_der: Vec<u8>,
}

impl SessionKey {
    /// Generate a fresh random key.
    pub fn generate() -> Result<Self, AuthError> {
        Self::from_signing_key(SigningKey::random(&mut OsRng))
    }

    /// Load a key from PKCS#8 PEM.
    pub fn from_pem(pem: &str) -> Result<Self, AuthError> {
        let signing_key = SigningKey::from_pkcs8_pem(pem)
            .map_err(|e| AuthError::MalformedKey(format!("invalid PKCS#8 PEM: {e}")))?;
        Self::from_signing_key(signing_key)
    }

    fn from_signing_key(signing_key: SigningKey) -> Result<Self, AuthError> {
        let public_key_der = signing_key
            .verifying_key()
            .to_public_key_der()
            .map_err(|e| AuthError::MalformedKey(format!("failed to encode public key: {e}")))?
            .as_bytes()
            .to_vec();
        Ok(Self {
            signing_key,
            public_key_der,
        })
    }

    /// Encode the private key as PKCS#8 PEM for persistence.
    pub fn to_pem(&self) -> Result<String, AuthError> {
        let pem = self
            .signing_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| AuthError::MalformedKey(format!("failed to encode private key: {e}")))?;
        Ok(pem.to_string())
    }

    /// DER-encoded SubjectPublicKeyInfo.
    pub fn public_key_der(&self) -> &[u8] {
        &self.public_key_der
    }

    /// Principal of this key when used without a delegation.
    pub fn principal(&self) -> Principal {
        Principal::self_authenticating(&self.public_key_der)
    }

    /// ECDSA/SHA-256 signature, 64 bytes `r || s`.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        let signature: Signature = self.signing_key.sign(message);
        signature.to_bytes().to_vec()
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKey")
            .field("principal", &self.principal())
            .finish_non_exhaustive()
    }
}
