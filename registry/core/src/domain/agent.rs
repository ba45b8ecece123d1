// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Agent Record Aggregate
//!
//! [`AgentRecord`] is the aggregate root owned by the registry. It bundles the
//! metadata an owner submitted at registration ([`AgentMetadata`]) with the
//! fields only the registry may assign: `id`, `registered_at`, `last_seen`,
//! `status` and the trusted reputation score.
//!
//! ## Lifecycle
//!
//! ```text
//! registering ──heartbeat──▶ active ◀──heartbeat── inactive
//!      │                      │  ▲                    ▲
//!      │ late heartbeat/sweep │  │ reinstate          │ sweep/operator
//!      ▼                      ▼  │                    │
//!   inactive              suspended              active
//!
//! any state ──deprecate──▶ deprecated (absorbing)
//! ```
//!
//! Legality of each edge, including *who* may drive it, lives in
//! [`AgentStatus::transition`] so services cannot bypass it.
//!
//! ## Invariants
//!
//! - `last_seen >= registered_at`
//! - `security.reputation` stays within `[0, 1]`
//! - `status == Registering` only until the first heartbeat

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::capability::CapabilityDescriptor;

/// Registry-assigned agent identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub Uuid);

impl AgentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed set of agent categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentCategory {
    // Core AI capabilities
    NaturalLanguage,
    ComputerVision,
    SpeechRecognition,
    GenerativeAi,
    // Specialized domains
    Medical,
    Financial,
    Scientific,
    Creative,
    // Infrastructure
    Coordination,
    Validation,
    Indexing,
    Gateway,
    // Utilities
    DataProcessing,
    Monitoring,
    Security,
}

impl AgentCategory {
    pub const ALL: [AgentCategory; 15] = [
        AgentCategory::NaturalLanguage,
        AgentCategory::ComputerVision,
        AgentCategory::SpeechRecognition,
        AgentCategory::GenerativeAi,
        AgentCategory::Medical,
        AgentCategory::Financial,
        AgentCategory::Scientific,
        AgentCategory::Creative,
        AgentCategory::Coordination,
        AgentCategory::Validation,
        AgentCategory::Indexing,
        AgentCategory::Gateway,
        AgentCategory::DataProcessing,
        AgentCategory::Monitoring,
        AgentCategory::Security,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentCategory::NaturalLanguage => "natural_language",
            AgentCategory::ComputerVision => "computer_vision",
            AgentCategory::SpeechRecognition => "speech_recognition",
            AgentCategory::GenerativeAi => "generative_ai",
            AgentCategory::Medical => "medical",
            AgentCategory::Financial => "financial",
            AgentCategory::Scientific => "scientific",
            AgentCategory::Creative => "creative",
            AgentCategory::Coordination => "coordination",
            AgentCategory::Validation => "validation",
            AgentCategory::Indexing => "indexing",
            AgentCategory::Gateway => "gateway",
            AgentCategory::DataProcessing => "data_processing",
            AgentCategory::Monitoring => "monitoring",
            AgentCategory::Security => "security",
        }
    }
}

impl fmt::Display for AgentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        AgentCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| format!("unknown agent category '{}'", s))
    }
}

/// Lifecycle state of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Registering,
    Active,
    Inactive,
    Suspended,
    Deprecated,
}

/// What is driving a status change. Some edges are only reachable through a
/// specific cause (e.g. `inactive -> active` only via heartbeat).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionCause {
    /// Direct `update_status` call by an operator or service.
    Operator,
    /// Agent heartbeat.
    Heartbeat,
    /// Periodic expiry sweep.
    Sweep,
    /// Externally authorised reinstatement of a suspended agent.
    Authorized,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Registering => "registering",
            AgentStatus::Active => "active",
            AgentStatus::Inactive => "inactive",
            AgentStatus::Suspended => "suspended",
            AgentStatus::Deprecated => "deprecated",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentStatus::Deprecated)
    }

    /// Returns the target status if the edge `self -> target` is legal for `cause`.
    pub fn transition(self, target: AgentStatus, cause: TransitionCause) -> Option<AgentStatus> {
        use AgentStatus::*;
        use TransitionCause::*;

        let legal = match (self, target) {
            (Deprecated, _) => false,
            (_, Deprecated) => cause == Operator,
            (Registering, Active) => matches!(cause, Heartbeat | Operator),
            (Registering, Inactive) => matches!(cause, Heartbeat | Sweep | Operator),
            (Active, Inactive) => matches!(cause, Sweep | Operator),
            (Active, Suspended) => cause == Operator,
            (Inactive, Active) => cause == Heartbeat,
            (Suspended, Active) => cause == Authorized,
            _ => false,
        };

        legal.then_some(target)
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "registering" => Ok(AgentStatus::Registering),
            "active" => Ok(AgentStatus::Active),
            "inactive" => Ok(AgentStatus::Inactive),
            "suspended" => Ok(AgentStatus::Suspended),
            "deprecated" => Ok(AgentStatus::Deprecated),
            other => Err(format!("unknown agent status '{}'", other)),
        }
    }
}

/// Transport an endpoint speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportKind {
    Http,
    Websocket,
    Grpc,
    /// On-chain program endpoint.
    #[serde(alias = "solana")]
    ChainNative,
}

/// Network endpoint through which an agent can be reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentEndpoint {
    #[serde(rename = "type")]
    pub transport: TransportKind,
    /// URL or on-chain address.
    #[serde(alias = "url")]
    pub address: String,
    #[serde(default, alias = "protocols")]
    pub supported_protocols: BTreeSet<String>,
    #[serde(default)]
    pub auth_required: bool,
}

/// Declared resource capacity of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceProfile {
    #[serde(alias = "cpu")]
    pub cpu_cores: f64,
    #[serde(alias = "memory")]
    pub memory_mb: f64,
    #[serde(alias = "storage")]
    pub storage_mb: f64,
    #[serde(alias = "network")]
    pub network_mbps: f64,
}

impl ResourceProfile {
    pub(crate) fn fields(&self) -> [(&'static str, f64); 4] {
        [
            ("cpuCores", self.cpu_cores),
            ("memoryMb", self.memory_mb),
            ("storageMb", self.storage_mb),
            ("networkMbps", self.network_mbps),
        ]
    }
}

/// Security posture claimed at registration. `reputation` is only accepted
/// when absent or zero; trust is granted by the registry, never self-asserted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityClaims {
    #[serde(default)]
    pub encryption: bool,
    #[serde(default)]
    pub authentication: bool,
    #[serde(default)]
    pub audit_logging: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reputation: Option<f64>,
}

/// Security posture of an accepted agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityProfile {
    pub encryption: bool,
    pub authentication: bool,
    pub audit_logging: bool,
    /// Trust score in `[0, 1]`, maintained by the registry.
    pub reputation: f64,
}

/// Owner-submitted description of an agent: everything in a record except
/// the registry-assigned fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMetadata {
    /// Owner public key (hex-encoded Ed25519). Filled in by the signer.
    #[serde(default)]
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub version: String,
    pub category: AgentCategory,
    pub capabilities: Vec<CapabilityDescriptor>,
    /// Capability ids this agent needs from peers. Weak references: they may
    /// name capabilities nobody has registered yet.
    #[serde(default)]
    pub dependencies: BTreeSet<String>,
    pub resources: ResourceProfile,
    #[serde(default)]
    pub security: SecurityClaims,
    pub endpoints: Vec<AgentEndpoint>,
}

/// Aggregate root for a registered agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRecord {
    pub id: AgentId,
    pub owner: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub category: AgentCategory,
    pub capabilities: Vec<CapabilityDescriptor>,
    pub dependencies: BTreeSet<String>,
    pub resources: ResourceProfile,
    pub security: SecurityProfile,
    pub endpoints: Vec<AgentEndpoint>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub registered_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_seen: DateTime<Utc>,
    pub status: AgentStatus,
    /// First time the agent reached `active`. `None` means it never did, so a
    /// later `inactive` status came from a missed registration window.
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub activated_at: Option<DateTime<Utc>>,
}

impl AgentRecord {
    /// Build a freshly accepted record from validated metadata.
    pub fn accept(metadata: AgentMetadata, id: AgentId, now: DateTime<Utc>, reputation: f64) -> Self {
        Self {
            id,
            owner: metadata.owner,
            name: metadata.name,
            description: metadata.description,
            version: metadata.version,
            category: metadata.category,
            capabilities: metadata.capabilities,
            dependencies: metadata.dependencies,
            resources: metadata.resources,
            security: SecurityProfile {
                encryption: metadata.security.encryption,
                authentication: metadata.security.authentication,
                audit_logging: metadata.security.audit_logging,
                reputation: reputation.clamp(0.0, 1.0),
            },
            endpoints: metadata.endpoints,
            registered_at: now,
            last_seen: now,
            status: AgentStatus::Registering,
            activated_at: None,
        }
    }

    pub fn reputation(&self) -> f64 {
        self.security.reputation
    }

    pub fn provides(&self, capability_id: &str) -> bool {
        self.capabilities.iter().any(|c| c.id == capability_id)
    }

    pub fn capability_ids(&self) -> impl Iterator<Item = &str> {
        self.capabilities.iter().map(|c| c.id.as_str())
    }

    /// Milliseconds since the last heartbeat, as observed at `now`.
    pub fn silence_ms(&self, now: DateTime<Utc>) -> i64 {
        (now - self.last_seen).num_milliseconds()
    }

    /// Record liveness. Never moves `last_seen` backwards.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.last_seen {
            self.last_seen = now;
        }
    }

    /// Apply a status transition, returning the previous status on success.
    pub fn transition(
        &mut self,
        target: AgentStatus,
        cause: TransitionCause,
        now: DateTime<Utc>,
    ) -> Option<AgentStatus> {
        let next = self.status.transition(target, cause)?;
        let previous = self.status;
        self.status = next;
        if next == AgentStatus::Active && self.activated_at.is_none() {
            self.activated_at = Some(now);
        }
        Some(previous)
    }

    /// Shift reputation by `delta`, clamped to `[0, 1]`. Returns `(old, new)`.
    pub fn adjust_reputation(&mut self, delta: f64) -> (f64, f64) {
        let old = self.security.reputation;
        let new = (old + delta).clamp(0.0, 1.0);
        self.security.reputation = new;
        (old, new)
    }
}
