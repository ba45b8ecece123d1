// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Registration Request
//!
//! A [`RegistrationRequest`] carries the owner-supplied [`AgentMetadata`] and
//! the owner's signature over the canonical hash of that metadata. The
//! registry checks it in a fixed order (first failure wins):
//!
//! 1. [`validate_schema`] - required fields, numeric ranges, reputation claim
//! 2. signature verification (infrastructure collaborator)
//! 3. [`find_duplicate_capability`] - capability ids unique within the request

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::agent::AgentMetadata;
use crate::domain::error::RegistryError;
use crate::domain::repository::RepositoryError;

/// Signed registration submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub metadata: AgentMetadata,
    /// Owner's signature (base64) over the canonical metadata hash.
    pub signature: String,
}

impl RegistrationRequest {
    /// The document whose canonical hash the owner signs.
    pub fn signing_document(&self) -> Result<serde_json::Value, RepositoryError> {
        signing_document(&self.metadata)
    }
}

pub fn signing_document(metadata: &AgentMetadata) -> Result<serde_json::Value, RepositoryError> {
    Ok(serde_json::to_value(metadata)?)
}

/// Schema completeness and range checks.
pub fn validate_schema(metadata: &AgentMetadata) -> Result<(), RegistryError> {
    require_text("owner", &metadata.owner)?;
    require_text("name", &metadata.name)?;
    require_text("version", &metadata.version)?;

    for (index, capability) in metadata.capabilities.iter().enumerate() {
        capability.check().map_err(|(field, reason)| {
            RegistryError::validation(format!("capabilities[{}].{}", index, field), reason)
        })?;
    }

    if metadata.dependencies.iter().any(|d| d.trim().is_empty()) {
        return Err(RegistryError::validation(
            "dependencies",
            "dependency capability ids cannot be empty",
        ));
    }

    for (field, value) in metadata.resources.fields() {
        if value.is_nan() || value < 0.0 {
            return Err(RegistryError::validation(
                format!("resources.{}", field),
                format!("must be a non-negative number, got {}", value),
            ));
        }
    }

    if let Some(claimed) = metadata.security.reputation {
        if claimed != 0.0 {
            return Err(RegistryError::InvalidReputationClaim { claimed });
        }
    }

    if metadata.endpoints.is_empty() {
        return Err(RegistryError::validation(
            "endpoints",
            "an agent must expose at least one endpoint",
        ));
    }
    for (index, endpoint) in metadata.endpoints.iter().enumerate() {
        require_text(&format!("endpoints[{}].address", index), &endpoint.address)?;
    }

    Ok(())
}

/// First capability id that appears more than once, if any.
pub fn find_duplicate_capability(metadata: &AgentMetadata) -> Option<&str> {
    let mut seen = HashSet::new();
    metadata
        .capabilities
        .iter()
        .map(|c| c.id.as_str())
        .find(|id| !seen.insert(*id))
}

fn require_text(field: &str, value: &str) -> Result<(), RegistryError> {
    if value.trim().is_empty() {
        return Err(RegistryError::validation(field, "cannot be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::{
        AgentCategory, AgentEndpoint, ResourceProfile, SecurityClaims, TransportKind,
    };
    use crate::domain::capability::CapabilityDescriptor;
    use crate::domain::error::ErrorKind;
    use std::collections::BTreeSet;

    fn metadata() -> AgentMetadata {
        AgentMetadata {
            owner: "aa".repeat(32),
            name: "vision-1".to_string(),
            description: "labels images".to_string(),
            version: "0.4.2".to_string(),
            category: AgentCategory::ComputerVision,
            capabilities: vec![
                CapabilityDescriptor::new("detect-v1", "Detect", "1.0.0"),
                CapabilityDescriptor::new("segment-v1", "Segment", "1.1.0"),
            ],
            dependencies: BTreeSet::from(["storage-v1".to_string()]),
            resources: ResourceProfile { cpu_cores: 4.0, memory_mb: 8192.0, storage_mb: 0.0, network_mbps: 100.0 },
            security: SecurityClaims::default(),
            endpoints: vec![AgentEndpoint {
                transport: TransportKind::Grpc,
                address: "grpc://vision:7000".to_string(),
                supported_protocols: BTreeSet::new(),
                auth_required: true,
            }],
        }
    }

    #[test]
    fn test_valid_metadata_passes() {
        assert!(validate_schema(&metadata()).is_ok());
    }

    #[test]
    fn test_negative_resource_is_rejected_with_field() {
        let mut m = metadata();
        m.resources.memory_mb = -1.0;
        match validate_schema(&m) {
            Err(RegistryError::Validation { field, .. }) => assert_eq!(field, "resources.memoryMb"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_reputation_claim_must_be_zero() {
        let mut m = metadata();
        m.security.reputation = Some(0.0);
        assert!(validate_schema(&m).is_ok());

        m.security.reputation = Some(0.7);
        let err = validate_schema(&m).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidReputationClaim { claimed } if claimed == 0.7));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_empty_dependency_is_rejected() {
        let mut m = metadata();
        m.dependencies.insert(String::new());
        assert!(matches!(
            validate_schema(&m),
            Err(RegistryError::Validation { field, .. }) if field == "dependencies"
        ));
    }

    #[test]
    fn test_missing_endpoints_is_rejected() {
        let mut m = metadata();
        m.endpoints.clear();
        assert!(validate_schema(&m).is_err());
    }

    #[test]
    fn test_bad_capability_version_reports_position() {
        let mut m = metadata();
        m.capabilities[1].version = "latest".to_string();
        match validate_schema(&m) {
            Err(RegistryError::Validation { field, .. }) => assert_eq!(field, "capabilities[1].version"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_consumer_only_agent_passes() {
        let mut m = metadata();
        m.capabilities.clear();
        assert!(validate_schema(&m).is_ok());
    }

    #[test]
    fn test_agent_version_is_free_form() {
        let mut m = metadata();
        m.version = "2024.10".to_string();
        assert!(validate_schema(&m).is_ok());

        m.version = "  ".to_string();
        assert!(matches!(
            validate_schema(&m),
            Err(RegistryError::Validation { field, .. }) if field == "version"
        ));
    }

    #[test]
    fn test_duplicate_capability_detection() {
        let mut m = metadata();
        assert_eq!(find_duplicate_capability(&m), None);
        m.capabilities.push(CapabilityDescriptor::new("detect-v1", "Detect again", "2.0.0"));
        assert_eq!(find_duplicate_capability(&m), Some("detect-v1"));
    }
}
