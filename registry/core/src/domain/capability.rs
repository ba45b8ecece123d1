// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Capability Descriptor Value Object
//!
//! A [`CapabilityDescriptor`] describes one function an agent offers to its
//! peers. Descriptors are immutable once published inside an agent record;
//! an agent that changes a capability re-registers with a new record version.
//!
//! Performance figures are optional. When present they are self-reported by
//! the agent and used by discovery's `max_latency` filter.

use serde::{Deserialize, Serialize};

/// Self-reported performance of a capability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    /// Typical latency in milliseconds (>= 0).
    pub latency_ms: f64,
    /// Sustained throughput in requests per second (>= 0).
    pub throughput_rps: f64,
    /// Accuracy on a 0-1 scale.
    pub accuracy: f64,
}

impl PerformanceMetrics {
    pub(crate) fn check(&self) -> Result<(), String> {
        if self.latency_ms.is_nan() || self.latency_ms < 0.0 {
            return Err(format!("latencyMs must be >= 0, got {}", self.latency_ms));
        }
        if self.throughput_rps.is_nan() || self.throughput_rps < 0.0 {
            return Err(format!("throughputRps must be >= 0, got {}", self.throughput_rps));
        }
        if !(0.0..=1.0).contains(&self.accuracy) {
            return Err(format!("accuracy must be between 0.0 and 1.0, got {}", self.accuracy));
        }
        Ok(())
    }
}

/// One named, versioned function an agent claims to perform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityDescriptor {
    /// Capability identifier, unique within an agent record (e.g. `"route-v1"`).
    pub id: String,
    pub name: String,
    /// Semantic version of the capability contract.
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceMetrics>,
}

impl CapabilityDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            description: String::new(),
            input_schema: None,
            output_schema: None,
            performance: None,
        }
    }

    pub fn with_performance(mut self, performance: PerformanceMetrics) -> Self {
        self.performance = Some(performance);
        self
    }

    /// Latency bound check used by discovery. Capabilities without a
    /// performance figure always pass.
    pub fn within_latency(&self, max_latency_ms: f64) -> bool {
        match &self.performance {
            Some(perf) => perf.latency_ms <= max_latency_ms,
            None => true,
        }
    }

    /// Validate the descriptor's own fields. Returns `(field, reason)` on the
    /// first failure so the caller can prefix the field with its position.
    pub(crate) fn check(&self) -> Result<(), (&'static str, String)> {
        if self.id.trim().is_empty() {
            return Err(("id", "capability id cannot be empty".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(("name", format!("capability '{}' has an empty name", self.id)));
        }
        if !is_semver(&self.version) {
            return Err((
                "version",
                format!("capability '{}' version '{}' is not a semantic version", self.id, self.version),
            ));
        }
        if let Some(perf) = &self.performance {
            perf.check().map_err(|reason| ("performance", reason))?;
        }
        Ok(())
    }
}

/// Accepts `MAJOR.MINOR.PATCH` with optional `-prerelease` / `+build` suffixes.
pub fn is_semver(version: &str) -> bool {
    let core = version
        .split(['-', '+'])
        .next()
        .unwrap_or_default();
    let parts: Vec<&str> = core.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}
