// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Delegation chains issued by the identity provider.
//!
//! The provider signs a delegation from its root key to the locally held
//! session key. Requests are signed with the session key and carry the chain,
//! so the remote service attributes them to the root key's principal.

use serde::{Deserialize, Serialize};

use super::principal::Principal;

/// A single delegation to a session public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delegation {
    /// DER-encoded public key being delegated to
    #[serde(with = "hex_bytes")]
    pub pubkey: Vec<u8>,
    /// Expiration in nanoseconds since the Unix epoch
    pub expiration: u64,
    /// Canisters this delegation is restricted to (unrestricted when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<Principal>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedDelegation {
    pub delegation: Delegation,
    #[serde(with = "hex_bytes")]
    pub signature: Vec<u8>,
}

/// Chain of delegations rooted at the identity provider's public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegationChain {
    /// DER-encoded root public key; the user's principal derives from it
    #[serde(with = "hex_bytes")]
    pub public_key: Vec<u8>,
    pub delegations: Vec<SignedDelegation>,
}

impl DelegationChain {
    /// Principal the chain authenticates as.
    pub fn principal(&self) -> Principal {
        Principal::self_authenticating(&self.public_key)
    }

    /// Earliest expiration across the chain, if any delegation is present.
    pub fn expiration(&self) -> Option<u64> {
        self.delegations
            .iter()
            .map(|d| d.delegation.expiration)
            .min()
    }

    /// A chain with no delegations, or one whose earliest expiration has
    /// passed, is no longer usable.
    pub fn is_expired(&self, now_nanos: u64) -> bool {
        match self.expiration() {
            Some(expiration) => expiration <= now_nanos,
            None => true,
        }
    }

    /// Whether the last delegation in the chain targets the given key.
    pub fn delegates_to(&self, der_public_key: &[u8]) -> bool {
        self.delegations
            .last()
            .is_some_and(|d| d.delegation.pubkey == der_public_key)
    }
}

pub(crate) mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        hex::decode(text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(expirations: &[u64]) -> DelegationChain {
        DelegationChain {
            public_key: vec![0x30, 0x01, 0x02],
            delegations: expirations
                .iter()
                .map(|&expiration| SignedDelegation {
                    delegation: Delegation {
                        pubkey: vec![0xaa, 0xbb],
                        expiration,
                        targets: None,
                    },
                    signature: vec![0x01],
                })
                .collect(),
        }
    }

    #[test]
    fn earliest_expiration_governs() {
        let chain = chain(&[500, 200, 900]);
        assert_eq!(chain.expiration(), Some(200));
        assert!(!chain.is_expired(199));
        assert!(chain.is_expired(200));
    }

    #[test]
    fn empty_chain_is_expired() {
        assert!(chain(&[]).is_expired(0));
    }

    #[test]
    fn principal_derives_from_root_key() {
        let chain = chain(&[1]);
        assert_eq!(chain.principal(), Principal::self_authenticating(&[0x30, 0x01, 0x02]));
    }

    #[test]
    fn delegates_to_checks_last_link() {
        let chain = chain(&[1]);
        assert!(chain.delegates_to(&[0xaa, 0xbb]));
        assert!(!chain.delegates_to(&[0xaa]));
    }

    #[test]
    fn json_uses_hex_and_camel_case() {
        let json = serde_json::to_value(chain(&[7])).unwrap();
        assert_eq!(json["publicKey"], "300102");
        assert_eq!(json["delegations"][0]["delegation"]["pubkey"], "aabb");
        assert_eq!(json["delegations"][0]["delegation"]["expiration"], 7);
        assert!(json["delegations"][0]["delegation"].get("targets").is_none());
    }
}
