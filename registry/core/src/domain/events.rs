// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::agent::{AgentCategory, AgentId, AgentStatus, TransitionCause};
use crate::domain::swarm::{SwarmId, SwarmStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RegistryEvent {
    AgentRegistered {
        agent_id: AgentId,
        owner: String,
        category: AgentCategory,
        registered_at: DateTime<Utc>,
    },
    RegistrationRejected {
        owner: String,
        reason: String,
        rejected_at: DateTime<Utc>,
    },
    HeartbeatReceived {
        agent_id: AgentId,
        seen_at: DateTime<Utc>,
    },
    AgentStatusChanged {
        agent_id: AgentId,
        from: AgentStatus,
        to: AgentStatus,
        cause: TransitionCause,
        changed_at: DateTime<Utc>,
    },
    AgentReinstated {
        agent_id: AgentId,
        granted_by: String,
        reinstated_at: DateTime<Utc>,
    },
    ReputationAdjusted {
        agent_id: AgentId,
        old_reputation: f64,
        new_reputation: f64,
        adjusted_at: DateTime<Utc>,
    },
}

impl RegistryEvent {
    /// Agent the event is about, if any.
    pub fn agent_id(&self) -> Option<AgentId> {
        match self {
            RegistryEvent::AgentRegistered { agent_id, .. }
            | RegistryEvent::HeartbeatReceived { agent_id, .. }
            | RegistryEvent::AgentStatusChanged { agent_id, .. }
            | RegistryEvent::AgentReinstated { agent_id, .. }
            | RegistryEvent::ReputationAdjusted { agent_id, .. } => Some(*agent_id),
            RegistryEvent::RegistrationRejected { .. } => None,
        }
    }

    /// Whether the event can make an agent newly match a query it did not
    /// match before (new record, status change, higher reputation).
    pub fn may_widen_results(&self) -> bool {
        match self {
            RegistryEvent::AgentRegistered { .. }
            | RegistryEvent::AgentStatusChanged { .. }
            | RegistryEvent::AgentReinstated { .. } => true,
            RegistryEvent::ReputationAdjusted { old_reputation, new_reputation, .. } => {
                new_reputation > old_reputation
            }
            RegistryEvent::HeartbeatReceived { .. } | RegistryEvent::RegistrationRejected { .. } => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SwarmLifecycleEvent {
    SwarmFormed {
        swarm_id: SwarmId,
        coordinator: AgentId,
        participants: Vec<AgentId>,
        formed_at: DateTime<Utc>,
    },
    SwarmFormationFailed {
        swarm_id: SwarmId,
        reason: String,
        failed_at: DateTime<Utc>,
    },
    SwarmTransitioned {
        swarm_id: SwarmId,
        from: SwarmStatus,
        to: SwarmStatus,
        transitioned_at: DateTime<Utc>,
    },
}
