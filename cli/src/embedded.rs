// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Embedded registry
//!
//! Builds the registry, discovery and swarm services in-process, loads a
//! fleet into them and runs queries directly. Nothing is persisted.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, warn};

use neuroswarm_core::application::{RegistryService, RegistryServices};
use neuroswarm_core::domain::agent::AgentRecord;
use neuroswarm_core::domain::config::RegistryConfig;
use neuroswarm_core::infrastructure::clock::SystemClock;
use neuroswarm_core::infrastructure::crypto::Sha256CanonicalHasher;
use neuroswarm_swarm::application::{CostFunction, FlatCost};
use neuroswarm_swarm::infrastructure::repositories::InMemorySwarmRepository;
use neuroswarm_swarm::StandardSwarmCoordinator;

use crate::fleet::Fleet;

pub struct EmbeddedRegistry {
    pub services: RegistryServices,
    pub swarms: StandardSwarmCoordinator,
}

impl EmbeddedRegistry {
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        Self::with_cost(config, Arc::new(FlatCost::default()))
    }

    pub fn with_cost(config: &RegistryConfig, cost: Arc<dyn CostFunction>) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;

        let services = RegistryServices::builder(config.clone()).build();
        let swarms = StandardSwarmCoordinator::new(
            services.discovery.clone(),
            Arc::new(InMemorySwarmRepository::new()),
            cost,
            Arc::new(SystemClock),
            services.event_bus.clone(),
            services.settings.clone(),
            services.query_timeout,
        );
        Ok(Self { services, swarms })
    }

    /// Register, heartbeat and seed reputation for every fleet entry.
    ///
    /// Entries the registry rejects are logged and skipped; the returned
    /// records are the agents that made it to `active`.
    pub async fn load_fleet(&self, fleet: &Fleet) -> Result<Vec<AgentRecord>> {
        let registry = self.services.registry.as_ref();
        let mut loaded = Vec::with_capacity(fleet.agents.len());

        for entry in &fleet.agents {
            let request = entry.request(&Sha256CanonicalHasher)?;
            let name = request.metadata.name.clone();
            let record = match registry.register(request).await {
                Ok(record) => record,
                Err(e) => {
                    warn!(agent = %name, kind = %e.kind(), "Fleet agent rejected: {}", e);
                    continue;
                }
            };

            let mut record = registry
                .heartbeat(record.id)
                .await
                .with_context(|| format!("Failed to activate agent '{}'", name))?;
            if let Some(reputation) = entry.reputation {
                record = registry
                    .adjust_reputation(record.id, reputation - record.reputation())
                    .await
                    .with_context(|| format!("Failed to seed reputation for agent '{}'", name))?;
            }
            debug!(agent_id = %record.id, agent = %name, "Fleet agent loaded");
            loaded.push(record);
        }

        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuroswarm_core::domain::agent::AgentStatus;
    use neuroswarm_core::domain::discovery::DiscoveryQuery;
    use neuroswarm_core::application::DiscoveryService;
    use neuroswarm_swarm::{SwarmCoordinationRequest, SwarmService};

    const FLEET: &str = r#"
agents:
  - metadata:
      name: planner
      version: 1.2.0
      category: coordination
      capabilities:
        - { id: plan-v1, name: Planner, version: 1.0.0 }
      resources: { cpuCores: 2, memoryMb: 2048, storageMb: 0, networkMbps: 50 }
      endpoints:
        - { type: grpc, address: "grpc://planner.example:443" }
    secretKey: "0101010101010101010101010101010101010101010101010101010101010101"
    reputation: 0.9
  - metadata:
      name: captioner
      version: 0.4.1
      category: computer_vision
      capabilities:
        - { id: caption-v2, name: Captioner, version: 2.0.0 }
      resources: { cpuCores: 4, memoryMb: 8192, storageMb: 1024, networkMbps: 100 }
      endpoints:
        - { type: http, address: "https://captioner.example" }
    secretKey: "0202020202020202020202020202020202020202020202020202020202020202"
    reputation: 0.5
  - metadata:
      name: impostor
      version: 1.0.0
      category: security
      capabilities:
        - { id: audit-v1, name: Auditor, version: 1.0.0 }
      resources: { cpuCores: 1, memoryMb: 256, storageMb: 0, networkMbps: 10 }
      endpoints:
        - { type: http, address: "https://impostor.example" }
    signature: "bm90IGEgc2lnbmF0dXJl"
"#;

    #[tokio::test]
    async fn test_fleet_loads_active_agents_and_skips_rejections() {
        let embedded = EmbeddedRegistry::new(&RegistryConfig::default()).unwrap();
        let fleet = Fleet::from_yaml_str(FLEET).unwrap();

        let loaded = embedded.load_fleet(&fleet).await.unwrap();

        assert_eq!(loaded.len(), 2);
        assert!(loaded.iter().all(|a| a.status == AgentStatus::Active));
        assert!((loaded[0].reputation() - 0.9).abs() < 1e-9);
        assert_eq!(embedded.services.registry.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_loaded_fleet_is_discoverable_and_forms_swarms() {
        let embedded = EmbeddedRegistry::new(&RegistryConfig::default()).unwrap();
        let fleet = Fleet::from_yaml_str(FLEET).unwrap();
        let loaded = embedded.load_fleet(&fleet).await.unwrap();

        let result = embedded
            .services
            .discovery
            .discover(DiscoveryQuery::new().with_capabilities(["caption-v2"]))
            .await
            .unwrap();
        assert_eq!(result.agents.len(), 1);
        assert_eq!(result.agents[0].name, "captioner");

        let formation = embedded
            .swarms
            .form_swarm(SwarmCoordinationRequest::new(["plan-v1", "caption-v2"]))
            .await
            .unwrap();
        assert_eq!(formation.coordinator, loaded[0].id);
        assert_eq!(formation.participants, vec![loaded[1].id]);
    }

    #[tokio::test]
    async fn test_example_fleet_loads_completely() {
        let embedded = EmbeddedRegistry::new(&RegistryConfig::default()).unwrap();
        let fleet = Fleet::from_yaml_str(include_str!("../templates/fleet-example.yaml")).unwrap();

        let loaded = embedded.load_fleet(&fleet).await.unwrap();
        assert_eq!(loaded.len(), fleet.agents.len());

        let captioner = loaded.iter().find(|a| a.name == "captioner").unwrap();
        let resolution = embedded
            .services
            .discovery
            .resolve_dependencies(captioner.id)
            .await
            .unwrap();
        assert!(resolution.is_complete());
    }
}
