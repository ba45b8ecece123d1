// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Discovery Query Model
//!
//! Pure filtering logic for agent discovery. Every filter in a
//! [`DiscoveryQuery`] is optional, and the provided ones are combined with
//! AND semantics.
//!
//! | Filter | Rule |
//! |--------|------|
//! | `categories` | agent category is one of the listed |
//! | `capabilities` | agent provides *every* listed capability id |
//! | `owner` | exact match |
//! | `status` | exact match; when absent, `deprecated` and `suspended` are excluded |
//! | `min_reputation` | `reputation >= bound` |
//! | `max_latency` | every capability with a performance figure has `latency <= bound` |
//! | `available_resources` | every provided field `<=` the agent's declared field |
//! | `location` | advisory: ranks agents with a matching endpoint address first |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::domain::agent::{AgentCategory, AgentRecord, AgentStatus};
use crate::domain::error::DiscoveryError;

/// Minimum resource capacity a discovered agent must declare.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRequirements {
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "cpu")]
    pub cpu_cores: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "memory")]
    pub memory_mb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "storage")]
    pub storage_mb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "network")]
    pub network_mbps: Option<f64>,
}

impl ResourceRequirements {
    pub fn is_satisfied_by(&self, agent: &AgentRecord) -> bool {
        let r = &agent.resources;
        [
            (self.cpu_cores, r.cpu_cores),
            (self.memory_mb, r.memory_mb),
            (self.storage_mb, r.storage_mb),
            (self.network_mbps, r.network_mbps),
        ]
        .iter()
        .all(|(required, declared)| required.map_or(true, |req| req <= *declared))
    }
}

/// Conjunctive agent filter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<AgentCategory>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AgentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_reputation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_latency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_resources: Option<ResourceRequirements>,
}

impl DiscoveryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories(mut self, categories: impl IntoIterator<Item = AgentCategory>) -> Self {
        self.categories = Some(categories.into_iter().collect());
        self
    }

    pub fn with_capabilities<S: Into<String>>(mut self, ids: impl IntoIterator<Item = S>) -> Self {
        self.capabilities = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_status(mut self, status: AgentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_min_reputation(mut self, min: f64) -> Self {
        self.min_reputation = Some(min);
        self
    }

    pub fn with_max_latency(mut self, max_latency_ms: f64) -> Self {
        self.max_latency = Some(max_latency_ms);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_resources(mut self, resources: ResourceRequirements) -> Self {
        self.available_resources = Some(resources);
        self
    }

    /// Reject numeric bounds that can never be compared meaningfully.
    pub fn validate(&self) -> Result<(), DiscoveryError> {
        let numeric = [
            ("minReputation", self.min_reputation),
            ("maxLatency", self.max_latency),
        ];
        for (field, value) in numeric {
            if value.is_some_and(f64::is_nan) {
                return Err(DiscoveryError::InvalidQuery {
                    field: field.to_string(),
                    reason: "must be a number".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Stable key identifying equivalent queries for caching.
    pub fn cache_key(&self) -> String {
        let mut normalized = self.clone();
        if let Some(categories) = normalized.categories.as_mut() {
            categories.sort();
            categories.dedup();
        }
        if let Some(capabilities) = normalized.capabilities.as_mut() {
            capabilities.sort();
            capabilities.dedup();
        }
        serde_json::to_string(&normalized).unwrap_or_default()
    }

    /// Whether `agent` passes every provided filter.
    pub fn matches(&self, agent: &AgentRecord) -> bool {
        let status_ok = match self.status {
            Some(status) => agent.status == status,
            None => !matches!(agent.status, AgentStatus::Deprecated | AgentStatus::Suspended),
        };
        if !status_ok {
            return false;
        }

        if let Some(categories) = &self.categories {
            if !categories.contains(&agent.category) {
                return false;
            }
        }

        if let Some(capabilities) = &self.capabilities {
            if !capabilities.iter().all(|id| agent.provides(id)) {
                return false;
            }
        }

        if let Some(owner) = &self.owner {
            if &agent.owner != owner {
                return false;
            }
        }

        if let Some(min) = self.min_reputation {
            if agent.reputation() < min {
                return false;
            }
        }

        if let Some(max_latency) = self.max_latency {
            if !agent.capabilities.iter().all(|c| c.within_latency(max_latency)) {
                return false;
            }
        }

        if let Some(resources) = &self.available_resources {
            if !resources.is_satisfied_by(agent) {
                return false;
            }
        }

        true
    }

    /// Case-insensitive substring match of `location` against endpoint addresses.
    pub fn location_matches(&self, agent: &AgentRecord) -> bool {
        match &self.location {
            Some(location) => {
                let needle = location.to_lowercase();
                agent
                    .endpoints
                    .iter()
                    .any(|e| e.address.to_lowercase().contains(&needle))
            }
            None => false,
        }
    }

    /// Filter and order a snapshot: location matches first, then reputation
    /// descending, then earliest registration, then id.
    pub fn apply(&self, snapshot: Vec<AgentRecord>) -> Vec<AgentRecord> {
        let mut matched: Vec<(bool, AgentRecord)> = snapshot
            .into_iter()
            .filter(|agent| self.matches(agent))
            .map(|agent| (self.location_matches(&agent), agent))
            .collect();

        matched.sort_by(|(loc_a, a), (loc_b, b)| {
            loc_b
                .cmp(loc_a)
                .then_with(|| rank_by_reputation(a, b))
        });

        matched.into_iter().map(|(_, agent)| agent).collect()
    }
}

/// Reputation descending, then earliest `registered_at`, then id.
pub fn rank_by_reputation(a: &AgentRecord, b: &AgentRecord) -> Ordering {
    b.reputation()
        .partial_cmp(&a.reputation())
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.registered_at.cmp(&b.registered_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Outcome of a discovery query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryResult {
    pub agents: Vec<AgentRecord>,
    /// Number of matches after filtering, independent of caller pagination.
    pub total_count: usize,
    pub query: DiscoveryQuery,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl DiscoveryResult {
    pub fn new(query: DiscoveryQuery, agents: Vec<AgentRecord>, timestamp: DateTime<Utc>) -> Self {
        Self {
            total_count: agents.len(),
            agents,
            query,
            timestamp,
        }
    }

    pub fn contains(&self, id: crate::domain::agent::AgentId) -> bool {
        self.agents.iter().any(|a| a.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::{
        AgentEndpoint, AgentId, AgentMetadata, ResourceProfile, SecurityClaims, TransportKind,
    };
    use crate::domain::capability::{CapabilityDescriptor, PerformanceMetrics};
    use chrono::Duration;
    use std::collections::BTreeSet;

    fn agent(category: AgentCategory, caps: &[&str], reputation: f64, status: AgentStatus) -> AgentRecord {
        let metadata = AgentMetadata {
            owner: "owner-a".to_string(),
            name: "agent".to_string(),
            description: String::new(),
            version: "1.0.0".to_string(),
            category,
            capabilities: caps
                .iter()
                .map(|id| CapabilityDescriptor::new(*id, *id, "1.0.0"))
                .collect(),
            dependencies: BTreeSet::new(),
            resources: ResourceProfile { cpu_cores: 2.0, memory_mb: 2048.0, storage_mb: 100.0, network_mbps: 10.0 },
            security: SecurityClaims::default(),
            endpoints: vec![AgentEndpoint {
                transport: TransportKind::Http,
                address: "https://eu-west.agents.example".to_string(),
                supported_protocols: BTreeSet::new(),
                auth_required: false,
            }],
        };
        let mut record = AgentRecord::accept(metadata, AgentId::new(), Utc::now(), reputation);
        record.status = status;
        record
    }

    #[test]
    fn test_default_status_excludes_deprecated_and_suspended() {
        let query = DiscoveryQuery::new();
        assert!(query.matches(&agent(AgentCategory::Gateway, &["a"], 0.5, AgentStatus::Active)));
        assert!(query.matches(&agent(AgentCategory::Gateway, &["a"], 0.5, AgentStatus::Inactive)));
        assert!(query.matches(&agent(AgentCategory::Gateway, &["a"], 0.5, AgentStatus::Registering)));
        assert!(!query.matches(&agent(AgentCategory::Gateway, &["a"], 0.5, AgentStatus::Deprecated)));
        assert!(!query.matches(&agent(AgentCategory::Gateway, &["a"], 0.5, AgentStatus::Suspended)));

        let explicit = DiscoveryQuery::new().with_status(AgentStatus::Suspended);
        assert!(explicit.matches(&agent(AgentCategory::Gateway, &["a"], 0.5, AgentStatus::Suspended)));
    }

    #[test]
    fn test_capabilities_require_all() {
        let record = agent(AgentCategory::Indexing, &["index-v1", "search-v1"], 0.5, AgentStatus::Active);
        assert!(DiscoveryQuery::new().with_capabilities(["index-v1"]).matches(&record));
        assert!(DiscoveryQuery::new().with_capabilities(["index-v1", "search-v1"]).matches(&record));
        assert!(!DiscoveryQuery::new().with_capabilities(["index-v1", "rank-v1"]).matches(&record));
    }

    #[test]
    fn test_min_reputation_bound_is_inclusive() {
        let record = agent(AgentCategory::Medical, &["x"], 0.4, AgentStatus::Active);
        assert!(DiscoveryQuery::new().with_min_reputation(0.4).matches(&record));
        assert!(!DiscoveryQuery::new().with_min_reputation(0.41).matches(&record));
    }

    #[test]
    fn test_max_latency_ignores_capabilities_without_figures() {
        let mut record = agent(AgentCategory::Financial, &["quote-v1"], 0.5, AgentStatus::Active);
        assert!(DiscoveryQuery::new().with_max_latency(1.0).matches(&record));

        record.capabilities.push(
            CapabilityDescriptor::new("price-v1", "Price", "1.0.0").with_performance(PerformanceMetrics {
                latency_ms: 80.0,
                throughput_rps: 5.0,
                accuracy: 0.99,
            }),
        );
        assert!(DiscoveryQuery::new().with_max_latency(100.0).matches(&record));
        assert!(!DiscoveryQuery::new().with_max_latency(50.0).matches(&record));
    }

    #[test]
    fn test_resource_requirements_are_minimums() {
        let record = agent(AgentCategory::DataProcessing, &["etl-v1"], 0.5, AgentStatus::Active);
        let fits = ResourceRequirements { cpu_cores: Some(2.0), memory_mb: Some(1024.0), ..Default::default() };
        let too_big = ResourceRequirements { network_mbps: Some(1000.0), ..Default::default() };
        assert!(DiscoveryQuery::new().with_resources(fits).matches(&record));
        assert!(!DiscoveryQuery::new().with_resources(too_big).matches(&record));
    }

    #[test]
    fn test_location_ranks_but_does_not_filter() {
        let mut near = agent(AgentCategory::Gateway, &["gw"], 0.2, AgentStatus::Active);
        near.endpoints[0].address = "https://us-east.gw.example".to_string();
        let far = agent(AgentCategory::Gateway, &["gw"], 0.9, AgentStatus::Active);

        let query = DiscoveryQuery::new().with_location("US-EAST");
        let ordered = query.apply(vec![far.clone(), near.clone()]);
        assert_eq!(ordered.len(), 2);
        assert_eq!(ordered[0].id, near.id);
        assert_eq!(ordered[1].id, far.id);
    }

    #[test]
    fn test_ordering_prefers_reputation_then_age() {
        let mut older = agent(AgentCategory::Creative, &["c"], 0.5, AgentStatus::Active);
        older.registered_at = older.registered_at - Duration::minutes(10);
        let newer = agent(AgentCategory::Creative, &["c"], 0.5, AgentStatus::Active);
        let best = agent(AgentCategory::Creative, &["c"], 0.8, AgentStatus::Active);

        let ordered = DiscoveryQuery::new().apply(vec![newer.clone(), older.clone(), best.clone()]);
        let ids: Vec<_> = ordered.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![best.id, older.id, newer.id]);
    }

    #[test]
    fn test_cache_key_ignores_list_order() {
        let a = DiscoveryQuery::new().with_capabilities(["b", "a"]);
        let b = DiscoveryQuery::new().with_capabilities(["a", "b", "a"]);
        assert_eq!(a.cache_key(), b.cache_key());
        assert_ne!(a.cache_key(), DiscoveryQuery::new().cache_key());
    }

    #[test]
    fn test_nan_bounds_are_rejected() {
        let query = DiscoveryQuery::new().with_min_reputation(f64::NAN);
        assert!(matches!(query.validate(), Err(DiscoveryError::InvalidQuery { .. })));
    }
}
