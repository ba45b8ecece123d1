// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Protocol Constants
//!
//! Fixed values of the agent protocol (v1.0.0) and the [`ProtocolSettings`]
//! runtime view derived from them. Deployments may tune the timing values
//! through `RegistryConfig`, but the defaults below are what every
//! conforming registry starts with.

use std::time::Duration;

/// Wire version of the agent registration protocol.
pub const AGENT_PROTOCOL_VERSION: &str = "1.0.0";

/// Upper bound on coordinator + participants in a single swarm.
pub const MAX_AGENTS_PER_SWARM: usize = 50;

/// Reputation assigned to every newly accepted agent.
pub const MIN_AGENT_REPUTATION: f64 = 0.1;

/// Expected interval between agent heartbeats, in milliseconds.
pub const HEARTBEAT_INTERVAL_MS: u64 = 30_000;

/// Window in which a registering agent must send its first heartbeat.
pub const REGISTRATION_TIMEOUT_MS: u64 = 300_000;

/// Maximum age of a cached discovery result.
pub const DISCOVERY_CACHE_TTL_MS: u64 = 60_000;

/// Number of missed heartbeat intervals before an agent is swept to `inactive`.
pub const MISSED_HEARTBEATS_BEFORE_EXPIRY: u32 = 3;

/// Runtime protocol parameters shared by the registry, discovery and swarm services.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolSettings {
    pub heartbeat_interval: Duration,
    pub registration_timeout: Duration,
    pub discovery_cache_ttl: Duration,
    pub max_agents_per_swarm: usize,
    pub min_reputation: f64,
}

impl ProtocolSettings {
    /// Silence window after which an `active` agent is considered gone.
    pub fn expiry_window(&self) -> Duration {
        self.heartbeat_interval * MISSED_HEARTBEATS_BEFORE_EXPIRY
    }
}

impl Default for ProtocolSettings {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_millis(HEARTBEAT_INTERVAL_MS),
            registration_timeout: Duration::from_millis(REGISTRATION_TIMEOUT_MS),
            discovery_cache_ttl: Duration::from_millis(DISCOVERY_CACHE_TTL_MS),
            max_agents_per_swarm: MAX_AGENTS_PER_SWARM,
            min_reputation: MIN_AGENT_REPUTATION,
        }
    }
}
