// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Shared swarm vocabulary.
//!
//! The formation aggregate and its coordinator live in the `neuroswarm-swarm`
//! crate; the identifier and status enum live here so registry-level events
//! can refer to swarms without a dependency cycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a swarm formation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SwarmId(pub String);

impl SwarmId {
    /// Generate a new random `SwarmId`.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SwarmId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for SwarmId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SwarmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a swarm formation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwarmStatus {
    Forming,
    Active,
    Completed,
    Failed,
    Dissolved,
}

impl SwarmStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwarmStatus::Forming => "forming",
            SwarmStatus::Active => "active",
            SwarmStatus::Completed => "completed",
            SwarmStatus::Failed => "failed",
            SwarmStatus::Dissolved => "dissolved",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SwarmStatus::Completed | SwarmStatus::Failed | SwarmStatus::Dissolved)
    }
}

impl fmt::Display for SwarmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
