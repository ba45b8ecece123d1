// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0

use neuroswarm_core::domain::error::{DiscoveryError, ErrorKind};
use neuroswarm_core::domain::repository::RepositoryError;
use neuroswarm_core::domain::swarm::{SwarmId, SwarmStatus};

/// Errors raised by swarm formation and lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum SwarmError {
    #[error("Invalid request field '{field}': {reason}")]
    InvalidRequest { field: String, reason: String },

    #[error("Not enough active agents to cover {uncovered:?} ({candidates} candidates considered)")]
    InsufficientAgents { uncovered: Vec<String>, candidates: usize },

    #[error("Budget {budget} exceeded: selection requires at least {required}")]
    BudgetExceeded { budget: f64, required: f64 },

    #[error("Swarm {0} already exists")]
    DuplicateSwarmId(SwarmId),

    #[error("Swarm {swarm_id} cannot accept '{signal}' while {from}")]
    InvalidTransition {
        swarm_id: SwarmId,
        from: SwarmStatus,
        signal: String,
    },

    #[error("Swarm {0} not found")]
    NotFound(SwarmId),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl SwarmError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SwarmError::InvalidRequest {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SwarmError::InvalidRequest { .. } => ErrorKind::Validation,
            SwarmError::InsufficientAgents { .. } | SwarmError::BudgetExceeded { .. } => ErrorKind::Resource,
            SwarmError::DuplicateSwarmId(_) | SwarmError::InvalidTransition { .. } => ErrorKind::Conflict,
            SwarmError::NotFound(_) => ErrorKind::NotFound,
            SwarmError::Discovery(e) => e.kind(),
            SwarmError::Repository(e) => e.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swarm_error_kinds() {
        let id = SwarmId::from("s-1");
        assert_eq!(SwarmError::invalid("task", "empty").kind(), ErrorKind::Validation);
        assert_eq!(
            SwarmError::InsufficientAgents { uncovered: vec!["x".into()], candidates: 0 }.kind(),
            ErrorKind::Resource
        );
        assert_eq!(SwarmError::BudgetExceeded { budget: 1.0, required: 2.0 }.kind(), ErrorKind::Resource);
        assert_eq!(SwarmError::DuplicateSwarmId(id.clone()).kind(), ErrorKind::Conflict);
        assert_eq!(SwarmError::NotFound(id).kind(), ErrorKind::NotFound);
        assert_eq!(
            SwarmError::from(DiscoveryError::QueryTimeout { timeout_ms: 10 }).kind(),
            ErrorKind::Timeout
        );
    }
}
