// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

use crate::domain::agent::{AgentId, AgentStatus};
use crate::domain::collaborators::Clock;
use crate::domain::discovery::{DiscoveryQuery, DiscoveryResult};
use crate::domain::error::DiscoveryError;
use crate::domain::repository::AgentRepository;
use crate::infrastructure::discovery_cache::DiscoveryCache;

/// Active providers for each dependency of one agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyResolution {
    pub agent_id: AgentId,
    /// Dependency id to providers, best first.
    pub resolved: BTreeMap<String, Vec<AgentId>>,
    /// Dependencies no active agent currently provides.
    pub unresolved: Vec<String>,
}

impl DependencyResolution {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

#[async_trait]
pub trait DiscoveryService: Send + Sync {
    async fn discover(&self, query: DiscoveryQuery) -> Result<DiscoveryResult, DiscoveryError>;

    /// Like `discover`, but fails with `QueryTimeout` instead of returning
    /// late or partial results.
    async fn discover_with_timeout(
        &self,
        query: DiscoveryQuery,
        timeout: Duration,
    ) -> Result<DiscoveryResult, DiscoveryError>;

    async fn resolve_dependencies(&self, agent_id: AgentId) -> Result<DependencyResolution, DiscoveryError>;
}

pub struct StandardDiscoveryService {
    repository: Arc<dyn AgentRepository>,
    clock: Arc<dyn Clock>,
    cache: Option<Arc<DiscoveryCache>>,
}

impl StandardDiscoveryService {
    pub fn new(repository: Arc<dyn AgentRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            clock,
            cache: None,
        }
    }

    /// Serve identical queries from `cache`. The same cache must be attached
    /// to the registry service so mutations invalidate it.
    pub fn with_cache(mut self, cache: Arc<DiscoveryCache>) -> Self {
        self.cache = Some(cache);
        self
    }
}

#[async_trait]
impl DiscoveryService for StandardDiscoveryService {
    #[instrument(skip_all)]
    async fn discover(&self, query: DiscoveryQuery) -> Result<DiscoveryResult, DiscoveryError> {
        query.validate()?;
        let started = Instant::now();
        let now = self.clock.now();

        if let Some(cached) = self.cache.as_ref().and_then(|c| c.get(&query, now)) {
            counter!("neuroswarm_discovery_queries_total", "cache" => "hit").increment(1);
            debug!(matches = cached.total_count, "Discovery served from cache");
            return Ok(cached);
        }

        let generation = self.cache.as_ref().map(|c| c.generation());
        let snapshot = self.repository.snapshot().await?;
        let scanned = snapshot.len();
        let agents = query.apply(snapshot);
        let result = DiscoveryResult::new(query.clone(), agents, now);

        if let (Some(cache), Some(generation)) = (&self.cache, generation) {
            cache.put(&query, result.clone(), now, generation);
        }

        counter!("neuroswarm_discovery_queries_total", "cache" => "miss").increment(1);
        histogram!("neuroswarm_discovery_latency_seconds").record(started.elapsed().as_secs_f64());
        debug!(scanned, matches = result.total_count, "Discovery query evaluated");
        Ok(result)
    }

    async fn discover_with_timeout(
        &self,
        query: DiscoveryQuery,
        timeout: Duration,
    ) -> Result<DiscoveryResult, DiscoveryError> {
        tokio::time::timeout(timeout, self.discover(query))
            .await
            .map_err(|_| DiscoveryError::QueryTimeout {
                timeout_ms: timeout.as_millis() as u64,
            })?
    }

    #[instrument(skip_all, fields(agent_id = %agent_id))]
    async fn resolve_dependencies(&self, agent_id: AgentId) -> Result<DependencyResolution, DiscoveryError> {
        let agent = self
            .repository
            .find_by_id(agent_id)
            .await?
            .ok_or(DiscoveryError::NotFound(agent_id))?;

        let mut resolution = DependencyResolution {
            agent_id,
            ..DependencyResolution::default()
        };
        for dependency in &agent.dependencies {
            let query = DiscoveryQuery::new()
                .with_capabilities([dependency.as_str()])
                .with_status(AgentStatus::Active);
            let providers: Vec<AgentId> = self
                .discover(query)
                .await?
                .agents
                .into_iter()
                .map(|a| a.id)
                .filter(|id| *id != agent_id)
                .collect();

            if providers.is_empty() {
                resolution.unresolved.push(dependency.clone());
            } else {
                resolution.resolved.insert(dependency.clone(), providers);
            }
        }
        Ok(resolution)
    }
}
