// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Error Taxonomy
//!
//! Every protocol error maps onto one [`ErrorKind`] so callers can decide how
//! to react without parsing messages:
//!
//! | Kind | Meaning | Caller action |
//! |------|---------|---------------|
//! | `Validation` | malformed or incomplete input | correct and resubmit |
//! | `Auth` | signature does not verify | re-sign |
//! | `Conflict` | duplicate id, illegal state transition | reconcile state first |
//! | `NotFound` | unknown agent or swarm | do not retry |
//! | `Resource` | not enough agents, budget exceeded | relax constraints |
//! | `Timeout` | discovery exceeded its budget | safe to retry |
//! | `Internal` | storage failure | operation rejected, retry later |
//!
//! No error leaves the registry in a partially applied state.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::agent::{AgentId, AgentStatus};
use crate::domain::repository::RepositoryError;

/// Coarse error class shared by every protocol error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Auth,
    Conflict,
    NotFound,
    Resource,
    Timeout,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Auth => "auth",
            ErrorKind::Conflict => "conflict",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Resource => "resource",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Internal => "internal",
        }
    }

    /// Whether the same request may succeed if simply retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Timeout | ErrorKind::Internal)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RepositoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RepositoryError::NotFound(_) => ErrorKind::NotFound,
            RepositoryError::Conflict(_) => ErrorKind::Conflict,
            RepositoryError::Storage(_) | RepositoryError::Serialization(_) => ErrorKind::Internal,
        }
    }
}

/// Errors raised by registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Invalid field '{field}': {reason}")]
    Validation { field: String, reason: String },

    #[error("New agents cannot claim reputation {claimed}; omit it or submit 0")]
    InvalidReputationClaim { claimed: f64 },

    #[error("Signature does not verify for owner {owner}")]
    SignatureInvalid { owner: String },

    #[error("Duplicate capability id '{0}'")]
    DuplicateCapabilityId(String),

    #[error("Agent {agent_id} cannot transition from {from} to {to}")]
    InvalidTransition {
        agent_id: AgentId,
        from: AgentStatus,
        to: AgentStatus,
    },

    #[error("Agent {0} is deprecated")]
    AgentDeprecated(AgentId),

    #[error("Agent {0} missed its registration window and must re-register")]
    RegistrationExpired(AgentId),

    #[error("Agent {0} not found")]
    NotFound(AgentId),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl RegistryError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        RegistryError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::Validation { .. } | RegistryError::InvalidReputationClaim { .. } => {
                ErrorKind::Validation
            }
            RegistryError::SignatureInvalid { .. } => ErrorKind::Auth,
            RegistryError::DuplicateCapabilityId(_)
            | RegistryError::InvalidTransition { .. }
            | RegistryError::AgentDeprecated(_)
            | RegistryError::RegistrationExpired(_) => ErrorKind::Conflict,
            RegistryError::NotFound(_) => ErrorKind::NotFound,
            RegistryError::Repository(e) => e.kind(),
        }
    }
}

/// Errors raised by discovery.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Discovery query exceeded its {timeout_ms}ms budget")]
    QueryTimeout { timeout_ms: u64 },

    #[error("Invalid query field '{field}': {reason}")]
    InvalidQuery { field: String, reason: String },

    #[error("Agent {0} not found")]
    NotFound(AgentId),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl DiscoveryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DiscoveryError::QueryTimeout { .. } => ErrorKind::Timeout,
            DiscoveryError::InvalidQuery { .. } => ErrorKind::Validation,
            DiscoveryError::NotFound(_) => ErrorKind::NotFound,
            DiscoveryError::Repository(e) => e.kind(),
        }
    }
}
