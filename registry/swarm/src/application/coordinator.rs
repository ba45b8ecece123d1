// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Swarm Coordinator
//!
//! Forms swarms from discovery results and supervises their lifecycle.
//!
//! ## Formation
//!
//! 1. One discovery query: `status = active` plus the request's
//!    `minReputation` and `maxLatency`. Candidates are the matches that
//!    provide at least one required capability. This candidate list is a
//!    fixed snapshot; selection never re-queries.
//! 2. If the candidates together cannot cover every requirement, fail with
//!    `InsufficientAgents`.
//! 3. The best-ranked candidate (reputation, then earliest registration)
//!    becomes coordinator. Its capabilities count toward coverage and its
//!    cost toward the budget.
//! 4. Remaining candidates are taken greedily in rank order when they cover
//!    something still missing, until everything is covered or the swarm
//!    reaches `maxAgents`. A candidate whose cost would overrun the budget
//!    is skipped.
//! 5. Anything still uncovered fails the formation; nothing is stored.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::counter;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use neuroswarm_core::application::DiscoveryService;
use neuroswarm_core::domain::agent::{AgentRecord, AgentStatus};
use neuroswarm_core::domain::collaborators::Clock;
use neuroswarm_core::domain::discovery::{rank_by_reputation, DiscoveryQuery};
use neuroswarm_core::domain::events::SwarmLifecycleEvent;
use neuroswarm_core::domain::protocol::ProtocolSettings;
use neuroswarm_core::domain::repository::RepositoryError;
use neuroswarm_core::domain::swarm::{SwarmId, SwarmStatus};
use neuroswarm_core::infrastructure::event_bus::EventBus;

use crate::application::cost::CostFunction;
use crate::domain::error::SwarmError;
use crate::domain::formation::{SwarmCoordinationRequest, SwarmFormation, SwarmSignal};
use crate::domain::repository::SwarmRepository;

#[async_trait]
pub trait SwarmService: Send + Sync {
    async fn form_swarm(&self, request: SwarmCoordinationRequest) -> Result<SwarmFormation, SwarmError>;
    async fn advance(&self, swarm_id: &SwarmId, signal: SwarmSignal) -> Result<SwarmFormation, SwarmError>;
    async fn get(&self, swarm_id: &SwarmId) -> Result<SwarmFormation, SwarmError>;
    async fn list(&self) -> Result<Vec<SwarmFormation>, SwarmError>;
    /// Live swarms whose expected completion is before `now`.
    async fn overdue(&self, now: DateTime<Utc>) -> Result<Vec<SwarmFormation>, SwarmError>;
}

/// Agents chosen for a formation, best-ranked first.
#[derive(Debug)]
pub struct Selection<'a> {
    pub coordinator: &'a AgentRecord,
    pub participants: Vec<&'a AgentRecord>,
    pub total_cost: f64,
}

/// Greedy capability cover over `candidates` (already ranked best first).
pub fn select_agents<'a>(
    candidates: &'a [AgentRecord],
    requirements: &[&str],
    max_agents: usize,
    budget: Option<f64>,
    cost: &dyn CostFunction,
) -> Result<Selection<'a>, SwarmError> {
    let missing_from = |covered: &HashSet<&str>| -> Vec<String> {
        requirements
            .iter()
            .filter(|id| !covered.contains(**id))
            .map(|id| id.to_string())
            .collect()
    };

    let offered: HashSet<&str> = candidates.iter().flat_map(|a| a.capability_ids()).collect();
    let unprovided = missing_from(&offered);
    if !unprovided.is_empty() {
        return Err(SwarmError::InsufficientAgents {
            uncovered: unprovided,
            candidates: candidates.len(),
        });
    }

    let Some((coordinator, rest)) = candidates.split_first() else {
        return Err(SwarmError::InsufficientAgents {
            uncovered: missing_from(&HashSet::new()),
            candidates: 0,
        });
    };

    // The top-ranked candidate always coordinates; it is never passed over for
    // a cheaper one, so its cost alone can exhaust the budget.
    let mut total_cost = cost.cost(coordinator);
    if let Some(budget) = budget {
        if total_cost > budget {
            return Err(SwarmError::BudgetExceeded { budget, required: total_cost });
        }
    }

    let mut covered: HashSet<&str> = coordinator.capability_ids().collect();
    let mut participants = Vec::new();
    for candidate in rest {
        if requirements.iter().all(|id| covered.contains(id)) || participants.len() + 1 >= max_agents {
            break;
        }
        let adds_coverage = requirements
            .iter()
            .any(|id| !covered.contains(id) && candidate.provides(id));
        if !adds_coverage {
            continue;
        }
        let candidate_cost = cost.cost(candidate);
        if let Some(budget) = budget {
            if total_cost + candidate_cost > budget {
                debug!(agent_id = %candidate.id, candidate_cost, "Candidate skipped: over budget");
                continue;
            }
        }
        total_cost += candidate_cost;
        covered.extend(candidate.capability_ids());
        participants.push(candidate);
    }

    let uncovered = missing_from(&covered);
    if !uncovered.is_empty() {
        return Err(SwarmError::InsufficientAgents {
            uncovered,
            candidates: candidates.len(),
        });
    }

    Ok(Selection {
        coordinator,
        participants,
        total_cost,
    })
}

pub struct StandardSwarmCoordinator {
    discovery: Arc<dyn DiscoveryService>,
    repository: Arc<dyn SwarmRepository>,
    cost: Arc<dyn CostFunction>,
    clock: Arc<dyn Clock>,
    event_bus: EventBus,
    settings: ProtocolSettings,
    query_timeout: Duration,
}

impl StandardSwarmCoordinator {
    pub fn new(
        discovery: Arc<dyn DiscoveryService>,
        repository: Arc<dyn SwarmRepository>,
        cost: Arc<dyn CostFunction>,
        clock: Arc<dyn Clock>,
        event_bus: EventBus,
        settings: ProtocolSettings,
        query_timeout: Duration,
    ) -> Self {
        Self {
            discovery,
            repository,
            cost,
            clock,
            event_bus,
            settings,
            query_timeout,
        }
    }

    fn max_agents(&self, request: &SwarmCoordinationRequest) -> usize {
        let limit = self.settings.max_agents_per_swarm;
        request.constraints.max_agents.map_or(limit, |n| n.min(limit))
    }

    async fn try_form(
        &self,
        swarm_id: SwarmId,
        request: &SwarmCoordinationRequest,
        now: DateTime<Utc>,
    ) -> Result<SwarmFormation, SwarmError> {
        request.validate(now)?;
        if self.repository.find_by_id(&swarm_id).await?.is_some() {
            return Err(SwarmError::DuplicateSwarmId(swarm_id));
        }

        let requirements = request.requirements();
        let mut query = DiscoveryQuery::new().with_status(AgentStatus::Active);
        query.min_reputation = request.constraints.min_reputation;
        query.max_latency = request.constraints.max_latency;

        let result = self.discovery.discover_with_timeout(query, self.query_timeout).await?;
        let mut candidates: Vec<AgentRecord> = result
            .agents
            .into_iter()
            .filter(|agent| requirements.iter().any(|id| agent.provides(id)))
            .collect();
        candidates.sort_by(rank_by_reputation);
        debug!(candidates = candidates.len(), "Swarm candidates selected");

        let selection = select_agents(
            &candidates,
            &requirements,
            self.max_agents(request),
            request.constraints.budget,
            self.cost.as_ref(),
        )?;

        let formation = SwarmFormation::assemble(
            swarm_id,
            request,
            selection.coordinator,
            &selection.participants,
            now,
        );
        self.repository.insert(formation.clone()).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => SwarmError::DuplicateSwarmId(formation.id.clone()),
            other => other.into(),
        })?;
        Ok(formation)
    }
}

#[async_trait]
impl SwarmService for StandardSwarmCoordinator {
    #[instrument(skip_all, fields(task = %request.task, priority = %request.priority))]
    async fn form_swarm(&self, request: SwarmCoordinationRequest) -> Result<SwarmFormation, SwarmError> {
        let now = self.clock.now();
        let swarm_id = request.swarm_id.clone().unwrap_or_default();

        match self.try_form(swarm_id.clone(), &request, now).await {
            Ok(formation) => {
                info!(
                    swarm_id = %formation.id,
                    coordinator = %formation.coordinator,
                    size = formation.size(),
                    "Swarm formed"
                );
                counter!("neuroswarm_swarms_formed_total").increment(1);
                self.event_bus.publish_swarm_event(SwarmLifecycleEvent::SwarmFormed {
                    swarm_id: formation.id.clone(),
                    coordinator: formation.coordinator,
                    participants: formation.participants.clone(),
                    formed_at: now,
                });
                Ok(formation)
            }
            Err(e) => {
                warn!(swarm_id = %swarm_id, kind = %e.kind(), "Swarm formation failed: {}", e);
                counter!("neuroswarm_swarm_formation_failed_total", "kind" => e.kind().as_str()).increment(1);
                self.event_bus.publish_swarm_event(SwarmLifecycleEvent::SwarmFormationFailed {
                    swarm_id,
                    reason: e.to_string(),
                    failed_at: now,
                });
                Err(e)
            }
        }
    }

    #[instrument(skip_all, fields(swarm_id = %swarm_id, signal = %signal))]
    async fn advance(&self, swarm_id: &SwarmId, signal: SwarmSignal) -> Result<SwarmFormation, SwarmError> {
        let now = self.clock.now();
        let slot: Arc<Mutex<Option<SwarmStatus>>> = Arc::new(Mutex::new(None));
        let out = Arc::clone(&slot);
        let formation = self
            .repository
            .update(
                swarm_id,
                Box::new(move |f: &mut SwarmFormation| {
                    *out.lock() = Some(f.apply(&signal)?);
                    Ok(())
                }),
            )
            .await?;
        let previous = slot.lock().take().ok_or_else(|| {
            RepositoryError::Storage(format!("update of swarm {} produced no outcome", swarm_id))
        })?;

        info!(from = %previous, to = %formation.status, "Swarm transitioned");
        counter!("neuroswarm_swarm_transitions_total", "to" => formation.status.as_str()).increment(1);
        self.event_bus.publish_swarm_event(SwarmLifecycleEvent::SwarmTransitioned {
            swarm_id: swarm_id.clone(),
            from: previous,
            to: formation.status,
            transitioned_at: now,
        });
        Ok(formation)
    }

    async fn get(&self, swarm_id: &SwarmId) -> Result<SwarmFormation, SwarmError> {
        self.repository
            .find_by_id(swarm_id)
            .await?
            .ok_or_else(|| SwarmError::NotFound(swarm_id.clone()))
    }

    async fn list(&self) -> Result<Vec<SwarmFormation>, SwarmError> {
        Ok(self.repository.list().await?)
    }

    async fn overdue(&self, now: DateTime<Utc>) -> Result<Vec<SwarmFormation>, SwarmError> {
        Ok(self
            .repository
            .list()
            .await?
            .into_iter()
            .filter(|f| f.is_overdue(now))
            .collect())
    }
}
