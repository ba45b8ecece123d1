// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Registry Service
//!
//! Owns every [`AgentRecord`] mutation. Discovery and swarm formation read
//! records but never write them; all writes go through this service and from
//! there through [`AgentRepository::update`], which applies each change to
//! one record atomically.
//!
//! ## Registration pipeline
//!
//! 1. Schema completeness and ranges ([`validate_schema`])
//! 2. Owner signature over the canonical metadata hash
//! 3. Capability id uniqueness
//!
//! The first failing stage decides the error. Nothing is stored on failure.
//!
//! ## Liveness
//!
//! | From | Event | To |
//! |------|-------|----|
//! | `registering` | heartbeat within the registration timeout | `active` |
//! | `registering` | heartbeat after the registration timeout | `inactive` (must re-register) |
//! | `inactive` (previously active) | heartbeat | `active` |
//! | `active` | silent for 3 heartbeat intervals, on sweep | `inactive` |
//! | `registering` | silent past the registration timeout, on sweep | `inactive` |
//!
//! Every committed change is published as a [`RegistryEvent`] and fed to the
//! discovery cache before the call returns.

use async_trait::async_trait;
use metrics::counter;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::domain::agent::{AgentId, AgentRecord, AgentStatus, TransitionCause};
use crate::domain::collaborators::{CanonicalHasher, Clock, SignatureVerifier};
use crate::domain::error::RegistryError;
use crate::domain::events::RegistryEvent;
use crate::domain::protocol::ProtocolSettings;
use crate::domain::registration::{
    find_duplicate_capability, signing_document, validate_schema, RegistrationRequest,
};
use crate::domain::repository::{AgentRepository, RepositoryError};
use crate::infrastructure::discovery_cache::DiscoveryCache;
use crate::infrastructure::event_bus::EventBus;

/// Grant from an external authority allowing a suspended agent back into service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Authorization {
    pub granted_by: String,
    pub reason: String,
}

/// Outcome of one expiry sweep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepReport {
    pub expired: Vec<AgentId>,
    pub examined: usize,
}

#[async_trait]
pub trait RegistryService: Send + Sync {
    async fn register(&self, request: RegistrationRequest) -> Result<AgentRecord, RegistryError>;
    async fn heartbeat(&self, agent_id: AgentId) -> Result<AgentRecord, RegistryError>;
    async fn update_status(&self, agent_id: AgentId, target: AgentStatus) -> Result<AgentRecord, RegistryError>;
    async fn reinstate(&self, agent_id: AgentId, authorization: Authorization) -> Result<AgentRecord, RegistryError>;
    async fn deprecate(&self, agent_id: AgentId) -> Result<AgentRecord, RegistryError>;
    async fn adjust_reputation(&self, agent_id: AgentId, delta: f64) -> Result<AgentRecord, RegistryError>;
    async fn sweep_expired(&self) -> Result<SweepReport, RegistryError>;
    async fn get(&self, agent_id: AgentId) -> Result<AgentRecord, RegistryError>;
    async fn count(&self) -> Result<usize, RegistryError>;
}

pub struct StandardRegistryService {
    repository: Arc<dyn AgentRepository>,
    verifier: Arc<dyn SignatureVerifier>,
    hasher: Arc<dyn CanonicalHasher>,
    clock: Arc<dyn Clock>,
    event_bus: EventBus,
    cache: Option<Arc<DiscoveryCache>>,
    settings: ProtocolSettings,
}

impl StandardRegistryService {
    pub fn new(
        repository: Arc<dyn AgentRepository>,
        verifier: Arc<dyn SignatureVerifier>,
        hasher: Arc<dyn CanonicalHasher>,
        clock: Arc<dyn Clock>,
        event_bus: EventBus,
        settings: ProtocolSettings,
    ) -> Self {
        Self {
            repository,
            verifier,
            hasher,
            clock,
            event_bus,
            cache: None,
            settings,
        }
    }

    /// Keep `cache` coherent with every mutation this service commits.
    pub fn with_cache(mut self, cache: Arc<DiscoveryCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn settings(&self) -> &ProtocolSettings {
        &self.settings
    }

    fn emit(&self, event: RegistryEvent) {
        if let Some(cache) = &self.cache {
            cache.invalidate_for(&event);
        }
        self.event_bus.publish_registry_event(event);
    }

    fn reject(&self, owner: &str, error: RegistryError) -> RegistryError {
        warn!(owner, kind = %error.kind(), "Registration rejected: {}", error);
        counter!("neuroswarm_registration_rejected_total", "kind" => error.kind().as_str()).increment(1);
        self.emit(RegistryEvent::RegistrationRejected {
            owner: owner.to_string(),
            reason: error.to_string(),
            rejected_at: self.clock.now(),
        });
        error
    }

    /// Run `mutation` atomically and hand back whatever it produced alongside
    /// the committed record.
    async fn mutate<T, F>(&self, agent_id: AgentId, mutation: F) -> Result<(AgentRecord, T), RegistryError>
    where
        T: Send + 'static,
        F: FnOnce(&mut AgentRecord) -> Result<T, RegistryError> + Send + 'static,
    {
        let slot: Arc<Mutex<Option<T>>> = Arc::new(Mutex::new(None));
        let out = Arc::clone(&slot);
        let record = self
            .repository
            .update(
                agent_id,
                Box::new(move |record: &mut AgentRecord| {
                    let value = mutation(record)?;
                    *out.lock() = Some(value);
                    Ok(())
                }),
            )
            .await?;
        let value = slot
            .lock()
            .take()
            .ok_or_else(|| RepositoryError::Storage(format!("update of agent {} produced no outcome", agent_id)))?;
        Ok((record, value))
    }

    /// Operator-driven status change shared by `update_status` and `deprecate`.
    async fn apply_transition(
        &self,
        agent_id: AgentId,
        target: AgentStatus,
        cause: TransitionCause,
    ) -> Result<AgentRecord, RegistryError> {
        let now = self.clock.now();
        let (record, previous) = self
            .mutate(agent_id, move |record| {
                if record.status == AgentStatus::Deprecated {
                    return Err(RegistryError::AgentDeprecated(agent_id));
                }
                let from = record.status;
                record
                    .transition(target, cause, now)
                    .ok_or(RegistryError::InvalidTransition { agent_id, from, to: target })
            })
            .await?;

        info!(%agent_id, from = %previous, to = %record.status, "Agent status changed");
        self.emit(RegistryEvent::AgentStatusChanged {
            agent_id,
            from: previous,
            to: record.status,
            cause,
            changed_at: now,
        });
        Ok(record)
    }
}

/// What a heartbeat did to the record's status.
enum HeartbeatOutcome {
    Unchanged,
    Changed(AgentStatus),
    Late(AgentStatus),
}

#[async_trait]
impl RegistryService for StandardRegistryService {
    #[instrument(skip_all, fields(owner = %request.metadata.owner, name = %request.metadata.name))]
    async fn register(&self, request: RegistrationRequest) -> Result<AgentRecord, RegistryError> {
        let RegistrationRequest { metadata, signature } = request;

        if let Err(e) = validate_schema(&metadata) {
            return Err(self.reject(&metadata.owner, e));
        }

        let document = match signing_document(&metadata) {
            Ok(document) => document,
            Err(e) => return Err(self.reject(&metadata.owner, e.into())),
        };
        let payload_hash = self.hasher.hash(&document);
        if !self.verifier.verify(&metadata.owner, &payload_hash, &signature) {
            let error = RegistryError::SignatureInvalid { owner: metadata.owner.clone() };
            return Err(self.reject(&metadata.owner, error));
        }

        if let Some(duplicate) = find_duplicate_capability(&metadata) {
            let error = RegistryError::DuplicateCapabilityId(duplicate.to_string());
            return Err(self.reject(&metadata.owner, error));
        }

        let now = self.clock.now();
        let record = AgentRecord::accept(metadata, AgentId::new(), now, self.settings.min_reputation);
        self.repository.insert(record.clone()).await?;

        info!(agent_id = %record.id, category = %record.category, "Agent registered");
        counter!("neuroswarm_agents_registered_total").increment(1);
        self.emit(RegistryEvent::AgentRegistered {
            agent_id: record.id,
            owner: record.owner.clone(),
            category: record.category,
            registered_at: now,
        });
        Ok(record)
    }

    #[instrument(skip_all, fields(agent_id = %agent_id))]
    async fn heartbeat(&self, agent_id: AgentId) -> Result<AgentRecord, RegistryError> {
        let now = self.clock.now();
        let registration_timeout_ms = self.settings.registration_timeout.as_millis() as i64;

        let (record, outcome) = self
            .mutate(agent_id, move |record| {
                let from = record.status;
                let outcome = match from {
                    AgentStatus::Deprecated => return Err(RegistryError::AgentDeprecated(agent_id)),
                    AgentStatus::Registering if record.silence_ms(now) > registration_timeout_ms => {
                        record.transition(AgentStatus::Inactive, TransitionCause::Heartbeat, now);
                        HeartbeatOutcome::Late(from)
                    }
                    AgentStatus::Registering => {
                        record.transition(AgentStatus::Active, TransitionCause::Heartbeat, now);
                        HeartbeatOutcome::Changed(from)
                    }
                    AgentStatus::Inactive if record.activated_at.is_none() => {
                        return Err(RegistryError::RegistrationExpired(agent_id));
                    }
                    AgentStatus::Inactive => {
                        record.transition(AgentStatus::Active, TransitionCause::Heartbeat, now);
                        HeartbeatOutcome::Changed(from)
                    }
                    AgentStatus::Active | AgentStatus::Suspended => HeartbeatOutcome::Unchanged,
                };
                record.touch(now);
                Ok(outcome)
            })
            .await?;

        counter!("neuroswarm_heartbeats_total").increment(1);
        self.emit(RegistryEvent::HeartbeatReceived { agent_id, seen_at: now });

        let from = match outcome {
            HeartbeatOutcome::Unchanged => {
                debug!("Heartbeat recorded");
                return Ok(record);
            }
            HeartbeatOutcome::Late(from) => {
                warn!("First heartbeat arrived after the registration timeout; agent must re-register");
                from
            }
            HeartbeatOutcome::Changed(from) => {
                info!(from = %from, to = %record.status, "Agent status changed");
                from
            }
        };
        self.emit(RegistryEvent::AgentStatusChanged {
            agent_id,
            from,
            to: record.status,
            cause: TransitionCause::Heartbeat,
            changed_at: now,
        });
        Ok(record)
    }

    #[instrument(skip_all, fields(agent_id = %agent_id, target = %target))]
    async fn update_status(&self, agent_id: AgentId, target: AgentStatus) -> Result<AgentRecord, RegistryError> {
        self.apply_transition(agent_id, target, TransitionCause::Operator).await
    }

    #[instrument(skip_all, fields(agent_id = %agent_id, granted_by = %authorization.granted_by))]
    async fn reinstate(&self, agent_id: AgentId, authorization: Authorization) -> Result<AgentRecord, RegistryError> {
        if authorization.granted_by.trim().is_empty() {
            return Err(RegistryError::validation("authorization.grantedBy", "must not be empty"));
        }

        let now = self.clock.now();
        let (record, previous) = self
            .mutate(agent_id, move |record| {
                if record.status == AgentStatus::Deprecated {
                    return Err(RegistryError::AgentDeprecated(agent_id));
                }
                let from = record.status;
                let previous = record
                    .transition(AgentStatus::Active, TransitionCause::Authorized, now)
                    .ok_or(RegistryError::InvalidTransition {
                        agent_id,
                        from,
                        to: AgentStatus::Active,
                    })?;
                // Reinstatement opens a fresh liveness window.
                record.touch(now);
                Ok(previous)
            })
            .await?;

        info!(reason = %authorization.reason, "Agent reinstated");
        self.emit(RegistryEvent::AgentStatusChanged {
            agent_id,
            from: previous,
            to: record.status,
            cause: TransitionCause::Authorized,
            changed_at: now,
        });
        self.emit(RegistryEvent::AgentReinstated {
            agent_id,
            granted_by: authorization.granted_by,
            reinstated_at: now,
        });
        Ok(record)
    }

    #[instrument(skip_all, fields(agent_id = %agent_id))]
    async fn deprecate(&self, agent_id: AgentId) -> Result<AgentRecord, RegistryError> {
        self.apply_transition(agent_id, AgentStatus::Deprecated, TransitionCause::Operator).await
    }

    #[instrument(skip_all, fields(agent_id = %agent_id, delta = delta))]
    async fn adjust_reputation(&self, agent_id: AgentId, delta: f64) -> Result<AgentRecord, RegistryError> {
        if delta.is_nan() {
            return Err(RegistryError::validation("delta", "must be a number"));
        }

        let (record, (old, new)) = self
            .mutate(agent_id, move |record| {
                if record.status == AgentStatus::Deprecated {
                    return Err(RegistryError::AgentDeprecated(agent_id));
                }
                Ok(record.adjust_reputation(delta))
            })
            .await?;

        if old != new {
            debug!(old, new, "Reputation adjusted");
            self.emit(RegistryEvent::ReputationAdjusted {
                agent_id,
                old_reputation: old,
                new_reputation: new,
                adjusted_at: self.clock.now(),
            });
        }
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn sweep_expired(&self) -> Result<SweepReport, RegistryError> {
        let now = self.clock.now();
        let window_ms = self.settings.expiry_window().as_millis() as i64;
        let is_expired = move |record: &AgentRecord| {
            matches!(record.status, AgentStatus::Active | AgentStatus::Registering)
                && record.silence_ms(now) > window_ms
        };

        let snapshot = self.repository.snapshot().await?;
        let mut report = SweepReport {
            examined: snapshot.len(),
            ..SweepReport::default()
        };

        for candidate in snapshot.into_iter().filter(|r| is_expired(r)) {
            let agent_id = candidate.id;
            // Re-check under the record lock: a heartbeat may have landed since the snapshot.
            let result = self
                .mutate(agent_id, move |record| {
                    if !is_expired(record) {
                        return Ok(None);
                    }
                    Ok(record.transition(AgentStatus::Inactive, TransitionCause::Sweep, now))
                })
                .await;

            match result {
                Ok((_, Some(from))) => {
                    info!(%agent_id, from = %from, "Agent expired");
                    counter!("neuroswarm_agents_expired_total").increment(1);
                    self.emit(RegistryEvent::AgentStatusChanged {
                        agent_id,
                        from,
                        to: AgentStatus::Inactive,
                        cause: TransitionCause::Sweep,
                        changed_at: now,
                    });
                    report.expired.push(agent_id);
                }
                Ok((_, None)) => debug!(%agent_id, "Agent recovered before sweep"),
                Err(RegistryError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }

        if !report.expired.is_empty() {
            info!(expired = report.expired.len(), examined = report.examined, "Expiry sweep complete");
        }
        Ok(report)
    }

    async fn get(&self, agent_id: AgentId) -> Result<AgentRecord, RegistryError> {
        self.repository
            .find_by_id(agent_id)
            .await?
            .ok_or(RegistryError::NotFound(agent_id))
    }

    async fn count(&self) -> Result<usize, RegistryError> {
        Ok(self.repository.count().await?)
    }
}
