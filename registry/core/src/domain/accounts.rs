// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Program Account Seeds
//!
//! On-chain accounts for the protocol live at program-derived addresses. The
//! derivation routine belongs to the chain client; this module only decides
//! *which* fixed seed and which auxiliary bytes go into it for each kind of
//! account.
//!
//! | Account kind | Seed | Auxiliary bytes |
//! |--------------|------|-----------------|
//! | Manifest | `manifest` | owner key (32 bytes) |
//! | Attestation | `attestation` | agent id (16 bytes) |
//! | Validator | `validator` | validator key (32 bytes) |
//! | Governance | `governance` | none |
//!
//! Seeds are UTF-8 strings and unique within the program. Keys arrive
//! hex-encoded and are decoded to the raw Ed25519 public key bytes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::domain::agent::AgentId;
use crate::domain::error::RegistryError;

const PUBLIC_KEY_LEN: usize = ed25519_dalek::PUBLIC_KEY_LENGTH;

/// Fixed seed registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountSeed {
    Manifest,
    Attestation,
    Validator,
    Governance,
}

impl AccountSeed {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountSeed::Manifest => "manifest",
            AccountSeed::Attestation => "attestation",
            AccountSeed::Validator => "validator",
            AccountSeed::Governance => "governance",
        }
    }

    pub fn as_bytes(&self) -> &'static [u8] {
        self.as_str().as_bytes()
    }
}

impl fmt::Display for AccountSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of program account to address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountKind {
    /// Owner's agent manifest account.
    Manifest { owner: String },
    /// Per-agent attestation account.
    Attestation { agent_id: AgentId },
    /// Validator account.
    Validator { validator: String },
    /// Program-wide governance account.
    Governance,
}

impl AccountKind {
    /// Seed and auxiliary bytes for this account kind.
    pub fn seeds(&self) -> Result<(AccountSeed, Vec<u8>), RegistryError> {
        Ok(match self {
            AccountKind::Manifest { owner } => (AccountSeed::Manifest, decode_key("owner", owner)?),
            AccountKind::Attestation { agent_id } => {
                (AccountSeed::Attestation, agent_id.as_bytes().to_vec())
            }
            AccountKind::Validator { validator } => {
                (AccountSeed::Validator, decode_key("validator", validator)?)
            }
            AccountKind::Governance => (AccountSeed::Governance, Vec::new()),
        })
    }
}

fn decode_key(field: &str, key: &str) -> Result<Vec<u8>, RegistryError> {
    let bytes = hex::decode(key)
        .map_err(|e| RegistryError::validation(field, format!("invalid hex key: {}", e)))?;
    if bytes.len() != PUBLIC_KEY_LEN {
        return Err(RegistryError::validation(
            field,
            format!("expected {} key bytes, got {}", PUBLIC_KEY_LEN, bytes.len()),
        ));
    }
    Ok(bytes)
}

/// External address-derivation routine.
pub trait AddressDeriver: Send + Sync {
    fn derive(&self, seed: AccountSeed, auxiliary: &[u8]) -> String;
}

/// Resolves program account addresses through an injected [`AddressDeriver`].
#[derive(Clone)]
pub struct AccountAddressing {
    deriver: Arc<dyn AddressDeriver>,
}

impl AccountAddressing {
    pub fn new(deriver: Arc<dyn AddressDeriver>) -> Self {
        Self { deriver }
    }

    pub fn address_of(&self, kind: &AccountKind) -> Result<String, RegistryError> {
        let (seed, auxiliary) = kind.seeds()?;
        Ok(self.deriver.derive(seed, &auxiliary))
    }
}
