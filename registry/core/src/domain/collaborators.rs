// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # External Collaborator Interfaces
//!
//! Narrow traits through which the protocol core reaches services it does
//! not implement itself. Keeping them here keeps the domain layer free of
//! `ed25519-dalek`, `sha2` and wall-clock dependencies; the infrastructure
//! layer provides the production implementations
//! ([`crate::infrastructure::crypto`], [`crate::infrastructure::clock`]).
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`SignatureVerifier`] | Check an owner's signature over a payload hash |
//! | [`CanonicalHasher`] | Deterministic, key-order-independent document hash |
//! | [`Clock`] | Source of `now` |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Digest of a canonicalised metadata document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayloadHash(pub Vec<u8>);

impl PayloadHash {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Display for PayloadHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Verifies owner signatures on registration requests.
///
/// Implementations must not panic on malformed keys or signatures; they
/// simply return `false`.
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, owner_key: &str, payload_hash: &PayloadHash, signature: &str) -> bool;
}

/// Produces the payload hash an owner signs.
///
/// Two structurally equal documents must hash identically regardless of
/// object key order.
pub trait CanonicalHasher: Send + Sync {
    fn hash(&self, metadata: &serde_json::Value) -> PayloadHash;
}

/// Wall-time source.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
