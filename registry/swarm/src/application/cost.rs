// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0

use neuroswarm_core::domain::agent::AgentRecord;

/// Prices an agent against a formation budget.
pub trait CostFunction: Send + Sync {
    fn cost(&self, agent: &AgentRecord) -> f64;
}

/// Every agent costs the same.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatCost(pub f64);

impl Default for FlatCost {
    fn default() -> Self {
        Self(1.0)
    }
}

impl CostFunction for FlatCost {
    fn cost(&self, _agent: &AgentRecord) -> f64 {
        self.0
    }
}

/// Linear price over an agent's declared resources.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DeclaredResourceCost {
    pub per_cpu_core: f64,
    pub per_memory_gb: f64,
    pub per_storage_gb: f64,
    pub per_network_mbps: f64,
}

impl CostFunction for DeclaredResourceCost {
    fn cost(&self, agent: &AgentRecord) -> f64 {
        let r = &agent.resources;
        self.per_cpu_core * r.cpu_cores
            + self.per_memory_gb * r.memory_mb / 1024.0
            + self.per_storage_gb * r.storage_mb / 1024.0
            + self.per_network_mbps * r.network_mbps
    }
}
