// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Swarm Formation Aggregate
//!
//! A swarm is one coordinator agent plus a bounded set of participants
//! assembled to cover a capability requirement set. The formation holds agent
//! ids only; the registry stays the sole owner of agent records.
//!
//! ## Lifecycle
//!
//! ```text
//! forming ──start──▶ active ──complete──▶ completed
//!    │                 │ └────fail──────▶ failed
//!    └──dissolve──┬────┘
//!                 ▼
//!             dissolved
//! ```
//!
//! `completed`, `failed` and `dissolved` are terminal. There is no automatic
//! timeout edge: an external scheduler watches `expected_completion` and
//! sends `fail` or `dissolve` itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use neuroswarm_core::domain::agent::{AgentId, AgentRecord};
use neuroswarm_core::domain::capability::CapabilityDescriptor;
use neuroswarm_core::domain::swarm::{SwarmId, SwarmStatus};

use crate::domain::error::SwarmError;

/// Scheduling priority of the task a swarm is formed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            other => Err(format!("unknown priority '{}'", other)),
        }
    }
}

/// Selection limits for a formation request.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwarmConstraints {
    /// Coordinator plus participants. Defaults to, and is capped at, the
    /// protocol maximum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_agents: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_reputation: Option<f64>,
    /// Upper bound on every measured capability latency, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_latency: Option<f64>,
    /// Upper bound on the summed cost of every selected agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwarmCoordinationRequest {
    /// Caller-chosen id; generated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swarm_id: Option<SwarmId>,
    #[serde(default)]
    pub task: String,
    pub required_capabilities: Vec<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub constraints: SwarmConstraints,
}

impl SwarmCoordinationRequest {
    pub fn new<S: Into<String>>(required_capabilities: impl IntoIterator<Item = S>) -> Self {
        Self {
            swarm_id: None,
            task: String::new(),
            required_capabilities: required_capabilities.into_iter().map(Into::into).collect(),
            priority: Priority::default(),
            deadline: None,
            constraints: SwarmConstraints::default(),
        }
    }

    pub fn with_swarm_id(mut self, id: SwarmId) -> Self {
        self.swarm_id = Some(id);
        self
    }

    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task = task.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_constraints(mut self, constraints: SwarmConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Required capability ids, de-duplicated, in first-seen order.
    pub fn requirements(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.required_capabilities
            .iter()
            .map(|s| s.as_str())
            .filter(|id| seen.insert(*id))
            .collect()
    }

    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), SwarmError> {
        if self.required_capabilities.is_empty() {
            return Err(SwarmError::invalid("requiredCapabilities", "at least one capability is required"));
        }
        if let Some(index) = self.required_capabilities.iter().position(|c| c.trim().is_empty()) {
            return Err(SwarmError::invalid(
                format!("requiredCapabilities[{}]", index),
                "capability id cannot be empty",
            ));
        }
        if let Some(id) = &self.swarm_id {
            if id.as_str().trim().is_empty() {
                return Err(SwarmError::invalid("swarmId", "cannot be empty"));
            }
        }
        if self.constraints.max_agents == Some(0) {
            return Err(SwarmError::invalid("constraints.maxAgents", "must be at least 1"));
        }
        if let Some(min) = self.constraints.min_reputation {
            if !(0.0..=1.0).contains(&min) {
                return Err(SwarmError::invalid(
                    "constraints.minReputation",
                    format!("must be between 0.0 and 1.0, got {}", min),
                ));
            }
        }
        let non_negative = [
            ("constraints.maxLatency", self.constraints.max_latency),
            ("constraints.budget", self.constraints.budget),
        ];
        for (field, value) in non_negative {
            if let Some(value) = value {
                if value.is_nan() || value < 0.0 {
                    return Err(SwarmError::invalid(field, format!("must be >= 0, got {}", value)));
                }
            }
        }
        if let Some(deadline) = self.deadline {
            if deadline <= now {
                return Err(SwarmError::invalid("deadline", "must be in the future"));
            }
        }
        Ok(())
    }
}

/// Explicit lifecycle signal sent to a formation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum SwarmSignal {
    Start,
    Complete,
    Fail { reason: String },
    Dissolve,
}

impl SwarmSignal {
    pub fn name(&self) -> &'static str {
        match self {
            SwarmSignal::Start => "start",
            SwarmSignal::Complete => "complete",
            SwarmSignal::Fail { .. } => "fail",
            SwarmSignal::Dissolve => "dissolve",
        }
    }

    /// Status reached by applying this signal in `from`, if the edge exists.
    pub fn target(&self, from: SwarmStatus) -> Option<SwarmStatus> {
        match (from, self) {
            (SwarmStatus::Forming, SwarmSignal::Start) => Some(SwarmStatus::Active),
            (SwarmStatus::Active, SwarmSignal::Complete) => Some(SwarmStatus::Completed),
            (SwarmStatus::Active, SwarmSignal::Fail { .. }) => Some(SwarmStatus::Failed),
            (status, SwarmSignal::Dissolve) if !status.is_terminal() => Some(SwarmStatus::Dissolved),
            _ => None,
        }
    }
}

impl fmt::Display for SwarmSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwarmFormation {
    pub id: SwarmId,
    pub coordinator: AgentId,
    /// Coordinator excluded.
    pub participants: Vec<AgentId>,
    /// Union of coordinator and participant capabilities, unique by id.
    pub capabilities: Vec<CapabilityDescriptor>,
    pub task: String,
    pub priority: Priority,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub formed_at: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub expected_completion: Option<DateTime<Utc>>,
    pub status: SwarmStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl SwarmFormation {
    /// Assemble a `forming` swarm from already-selected agents.
    pub fn assemble(
        id: SwarmId,
        request: &SwarmCoordinationRequest,
        coordinator: &AgentRecord,
        participants: &[&AgentRecord],
        now: DateTime<Utc>,
    ) -> Self {
        let mut seen = HashSet::new();
        let capabilities = std::iter::once(coordinator)
            .chain(participants.iter().copied())
            .flat_map(|agent| agent.capabilities.iter())
            .filter(|c| seen.insert(c.id.clone()))
            .cloned()
            .collect();

        Self {
            id,
            coordinator: coordinator.id,
            participants: participants.iter().map(|a| a.id).collect(),
            capabilities,
            task: request.task.clone(),
            priority: request.priority,
            formed_at: now,
            expected_completion: request.deadline,
            status: SwarmStatus::Forming,
            failure_reason: None,
        }
    }

    /// Coordinator plus participants.
    pub fn size(&self) -> usize {
        self.participants.len() + 1
    }

    pub fn members(&self) -> impl Iterator<Item = AgentId> + '_ {
        std::iter::once(self.coordinator).chain(self.participants.iter().copied())
    }

    /// Apply `signal`, returning the previous status.
    pub fn apply(&mut self, signal: &SwarmSignal) -> Result<SwarmStatus, SwarmError> {
        let from = self.status;
        let to = signal.target(from).ok_or_else(|| SwarmError::InvalidTransition {
            swarm_id: self.id.clone(),
            from,
            signal: signal.name().to_string(),
        })?;
        if let SwarmSignal::Fail { reason } = signal {
            self.failure_reason = Some(reason.clone());
        }
        self.status = to;
        Ok(from)
    }

    /// Non-terminal and past its expected completion.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_terminal() && self.expected_completion.is_some_and(|deadline| deadline < now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn formation() -> SwarmFormation {
        SwarmFormation {
            id: SwarmId::from("swarm-1"),
            coordinator: AgentId::new(),
            participants: vec![AgentId::new()],
            capabilities: vec![],
            task: "summarise".to_string(),
            priority: Priority::High,
            formed_at: Utc::now(),
            expected_completion: None,
            status: SwarmStatus::Forming,
            failure_reason: None,
        }
    }

    #[test]
    fn test_lifecycle_edges() {
        let mut swarm = formation();
        assert_eq!(swarm.apply(&SwarmSignal::Start).unwrap(), SwarmStatus::Forming);
        assert_eq!(swarm.status, SwarmStatus::Active);
        swarm.apply(&SwarmSignal::Fail { reason: "deadline".into() }).unwrap();
        assert_eq!(swarm.status, SwarmStatus::Failed);
        assert_eq!(swarm.failure_reason.as_deref(), Some("deadline"));
    }

    #[test]
    fn test_terminal_states_reject_every_signal() {
        for signal in [
            SwarmSignal::Start,
            SwarmSignal::Complete,
            SwarmSignal::Fail { reason: "x".into() },
            SwarmSignal::Dissolve,
        ] {
            for terminal in [SwarmStatus::Completed, SwarmStatus::Failed, SwarmStatus::Dissolved] {
                assert_eq!(signal.target(terminal), None, "{} from {}", signal, terminal);
            }
        }
    }

    #[test]
    fn test_forming_can_only_start_or_dissolve() {
        assert_eq!(SwarmSignal::Complete.target(SwarmStatus::Forming), None);
        assert_eq!(SwarmSignal::Fail { reason: "x".into() }.target(SwarmStatus::Forming), None);
        assert_eq!(SwarmSignal::Dissolve.target(SwarmStatus::Forming), Some(SwarmStatus::Dissolved));
        assert_eq!(SwarmSignal::Dissolve.target(SwarmStatus::Active), Some(SwarmStatus::Dissolved));
    }

    #[test]
    fn test_overdue_only_while_live() {
        let now = Utc::now();
        let mut swarm = formation();
        assert!(!swarm.is_overdue(now));
        swarm.expected_completion = Some(now - Duration::seconds(1));
        assert!(swarm.is_overdue(now));
        swarm.status = SwarmStatus::Completed;
        assert!(!swarm.is_overdue(now));
    }

    #[test]
    fn test_request_validation() {
        let now = Utc::now();
        assert!(SwarmCoordinationRequest::new(["route-v1"]).validate(now).is_ok());
        assert!(SwarmCoordinationRequest::new(Vec::<String>::new()).validate(now).is_err());
        assert!(SwarmCoordinationRequest::new([""]).validate(now).is_err());

        let zero = SwarmCoordinationRequest::new(["route-v1"]).with_constraints(SwarmConstraints {
            max_agents: Some(0),
            ..SwarmConstraints::default()
        });
        assert!(matches!(
            zero.validate(now),
            Err(SwarmError::InvalidRequest { ref field, .. }) if field == "constraints.maxAgents"
        ));

        let late = SwarmCoordinationRequest::new(["route-v1"]).with_deadline(now - Duration::minutes(1));
        assert!(late.validate(now).is_err());
    }

    #[test]
    fn test_requirements_are_deduplicated_in_order() {
        let request = SwarmCoordinationRequest::new(["b", "a", "b"]);
        assert_eq!(request.requirements(), vec!["b", "a"]);
    }

    #[test]
    fn test_request_wire_format() {
        let json = r#"{
            "task": "translate corpus",
            "requiredCapabilities": ["translate-v3"],
            "priority": "critical",
            "deadline": 1750000000000,
            "constraints": {"maxAgents": 5, "budget": 12.5}
        }"#;
        let request: SwarmCoordinationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.priority, Priority::Critical);
        assert_eq!(request.constraints.max_agents, Some(5));
        assert_eq!(request.deadline.unwrap().timestamp_millis(), 1_750_000_000_000);
        assert!(request.swarm_id.is_none());
    }
}
