// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Fleet files
//!
//! A fleet file describes the agents to load into an embedded registry:
//!
//! ```yaml
//! agents:
//!   - metadata: { name: router, version: 1.0.0, ... }
//!     signature: <base64>          # pre-signed request
//!     reputation: 0.8
//!   - metadata: { name: vision, ... }
//!     secretKey: <hex>             # signed on load
//! ```
//!
//! Each entry carries either a `signature` (with `metadata.owner` set) or a
//! `secretKey` the CLI signs with.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use neuroswarm_core::domain::agent::AgentMetadata;
use neuroswarm_core::domain::collaborators::CanonicalHasher;
use neuroswarm_core::domain::registration::RegistrationRequest;
use neuroswarm_core::infrastructure::crypto::{sign_metadata, signing_key_from_hex};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fleet {
    pub agents: Vec<FleetEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetEntry {
    pub metadata: AgentMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    /// Reputation to seed after activation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reputation: Option<f64>,
}

impl Fleet {
    /// Load a fleet from YAML (JSON is accepted as a YAML subset).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fleet file: {:?}", path))?;
        Self::from_yaml_str(&content).with_context(|| format!("Invalid fleet file: {:?}", path))
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let fleet: Fleet = serde_yaml::from_str(yaml)?;
        if fleet.agents.is_empty() {
            bail!("fleet lists no agents");
        }
        Ok(fleet)
    }
}

impl FleetEntry {
    /// The registration request this entry submits.
    pub fn request(&self, hasher: &dyn CanonicalHasher) -> Result<RegistrationRequest> {
        match (&self.signature, &self.secret_key) {
            (Some(signature), None) => Ok(RegistrationRequest {
                metadata: self.metadata.clone(),
                signature: signature.clone(),
            }),
            (None, Some(secret)) => {
                let key = signing_key_from_hex(secret)
                    .with_context(|| format!("Invalid secretKey for agent '{}'", self.metadata.name))?;
                Ok(sign_metadata(self.metadata.clone(), &key, hasher)?)
            }
            (Some(_), Some(_)) => bail!(
                "agent '{}' has both signature and secretKey; keep one",
                self.metadata.name
            ),
            (None, None) => bail!("agent '{}' needs a signature or a secretKey", self.metadata.name),
        }
    }
}
