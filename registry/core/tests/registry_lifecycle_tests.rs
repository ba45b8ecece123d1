// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0
// Registry lifecycle integration tests: registration pipeline, heartbeats,
// status transitions, expiry sweep and reputation under concurrency.

use std::collections::BTreeSet;
use std::sync::Arc;

use ed25519_dalek::SigningKey;
use neuroswarm_core::application::{Authorization, RegistryService, RegistryServices};
use neuroswarm_core::domain::agent::{
    AgentCategory, AgentEndpoint, AgentId, AgentMetadata, AgentStatus, ResourceProfile,
    SecurityClaims, TransportKind,
};
use neuroswarm_core::domain::capability::CapabilityDescriptor;
use neuroswarm_core::domain::config::RegistryConfig;
use neuroswarm_core::domain::error::{ErrorKind, RegistryError};
use neuroswarm_core::domain::events::RegistryEvent;
use neuroswarm_core::domain::registration::RegistrationRequest;
use neuroswarm_core::infrastructure::clock::ManualClock;
use neuroswarm_core::infrastructure::crypto::{sign_metadata, Sha256CanonicalHasher};
use neuroswarm_core::infrastructure::event_bus::DomainEvent;

const START_MS: i64 = 1_750_000_000_000;

struct Harness {
    services: RegistryServices,
    clock: Arc<ManualClock>,
}

impl Harness {
    fn new() -> Self {
        let clock = Arc::new(ManualClock::starting_at_millis(START_MS));
        let services = RegistryServices::builder(RegistryConfig::default())
            .with_clock(clock.clone())
            .build();
        Self { services, clock }
    }

    fn registry(&self) -> &dyn RegistryService {
        self.services.registry.as_ref()
    }

    async fn register_active(&self, name: &str, capabilities: &[&str]) -> AgentId {
        let request = signed(metadata(name, AgentCategory::Coordination, capabilities), 1);
        let record = self.registry().register(request).await.unwrap();
        self.registry().heartbeat(record.id).await.unwrap();
        record.id
    }
}

fn metadata(name: &str, category: AgentCategory, capabilities: &[&str]) -> AgentMetadata {
    AgentMetadata {
        owner: String::new(),
        name: name.to_string(),
        description: format!("{} agent", name),
        version: "1.0.0".to_string(),
        category,
        capabilities: capabilities
            .iter()
            .map(|id| CapabilityDescriptor::new(*id, *id, "1.0.0"))
            .collect(),
        dependencies: BTreeSet::new(),
        resources: ResourceProfile {
            cpu_cores: 2.0,
            memory_mb: 2048.0,
            storage_mb: 10_240.0,
            network_mbps: 100.0,
        },
        security: SecurityClaims::default(),
        endpoints: vec![AgentEndpoint {
            transport: TransportKind::Http,
            address: format!("https://{}.agents.example", name),
            supported_protocols: BTreeSet::from(["neuroswarm/1.0".to_string()]),
            auth_required: true,
        }],
    }
}

fn signed(metadata: AgentMetadata, key_seed: u8) -> RegistrationRequest {
    let key = SigningKey::from_bytes(&[key_seed; 32]);
    sign_metadata(metadata, &key, &Sha256CanonicalHasher).unwrap()
}

#[tokio::test]
async fn test_valid_registration_starts_registering_at_minimum_reputation() {
    let h = Harness::new();
    let request = signed(metadata("router", AgentCategory::Coordination, &["route-v1"]), 1);

    let record = h.registry().register(request).await.unwrap();

    assert_eq!(record.status, AgentStatus::Registering);
    assert_eq!(record.reputation(), 0.1);
    assert_eq!(record.registered_at, record.last_seen);
    assert_eq!(record.registered_at.timestamp_millis(), START_MS);
    assert!(record.activated_at.is_none());
    assert_eq!(h.registry().count().await.unwrap(), 1);
    assert_eq!(h.registry().get(record.id).await.unwrap(), record);
}

#[tokio::test]
async fn test_each_registration_gets_a_fresh_id() {
    let h = Harness::new();
    let meta = metadata("router", AgentCategory::Coordination, &["route-v1"]);
    let a = h.registry().register(signed(meta.clone(), 1)).await.unwrap();
    let b = h.registry().register(signed(meta, 1)).await.unwrap();
    assert_ne!(a.id, b.id);
    assert_eq!(h.registry().count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_wrong_signature_is_auth_error_and_stores_nothing() {
    let h = Harness::new();
    let mut request = signed(metadata("router", AgentCategory::Coordination, &["route-v1"]), 1);
    // Signed by key 2, claimed by key 1.
    request.signature = signed(request.metadata.clone(), 2).signature;

    let err = h.registry().register(request).await.unwrap_err();

    assert!(matches!(err, RegistryError::SignatureInvalid { .. }));
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert_eq!(h.registry().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_metadata_altered_after_signing_is_rejected() {
    let h = Harness::new();
    let mut request = signed(metadata("router", AgentCategory::Coordination, &["route-v1"]), 1);
    request.metadata.resources.cpu_cores = 64.0;

    let err = h.registry().register(request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
}

#[tokio::test]
async fn test_self_asserted_reputation_is_rejected() {
    let h = Harness::new();
    let mut meta = metadata("router", AgentCategory::Coordination, &["route-v1"]);
    meta.security.reputation = Some(0.9);

    let err = h.registry().register(signed(meta.clone(), 1)).await.unwrap_err();
    assert!(matches!(err, RegistryError::InvalidReputationClaim { claimed } if claimed == 0.9));
    assert_eq!(err.kind(), ErrorKind::Validation);

    meta.security.reputation = Some(0.0);
    let record = h.registry().register(signed(meta, 1)).await.unwrap();
    assert_eq!(record.reputation(), 0.1);
}

#[tokio::test]
async fn test_schema_is_checked_before_signature() {
    let h = Harness::new();
    let mut meta = metadata("", AgentCategory::Coordination, &["route-v1"]);
    meta.owner = "00".repeat(32);
    let request = RegistrationRequest {
        metadata: meta,
        signature: "not-a-signature".to_string(),
    };

    let err = h.registry().register(request).await.unwrap_err();
    match err {
        RegistryError::Validation { field, .. } => assert_eq!(field, "name"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_negative_resources_name_the_field() {
    let h = Harness::new();
    let mut meta = metadata("router", AgentCategory::Coordination, &["route-v1"]);
    meta.resources.memory_mb = -1.0;

    let err = h.registry().register(signed(meta, 1)).await.unwrap_err();
    match err {
        RegistryError::Validation { field, .. } => assert_eq!(field, "resources.memoryMb"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_duplicate_capability_ids_conflict() {
    let h = Harness::new();
    let meta = metadata("router", AgentCategory::Coordination, &["route-v1", "route-v1"]);

    let err = h.registry().register(signed(meta, 1)).await.unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateCapabilityId(ref id) if id == "route-v1"));
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(h.registry().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_consumer_only_agent_with_calendar_version_registers() {
    let h = Harness::new();
    let mut meta = metadata("reporter", AgentCategory::Monitoring, &[]);
    meta.version = "2024.10".to_string();
    meta.dependencies.insert("route-v1".to_string());

    let record = h.registry().register(signed(meta, 1)).await.unwrap();

    assert_eq!(record.status, AgentStatus::Registering);
    assert_eq!(record.version, "2024.10");
    assert_eq!(record.capability_ids().count(), 0);
}

#[tokio::test]
async fn test_first_heartbeat_within_timeout_activates() {
    let h = Harness::new();
    let request = signed(metadata("router", AgentCategory::Coordination, &["route-v1"]), 1);
    let record = h.registry().register(request).await.unwrap();

    h.clock.advance_millis(10_000);
    let record = h.registry().heartbeat(record.id).await.unwrap();

    assert_eq!(record.status, AgentStatus::Active);
    assert_eq!(record.last_seen.timestamp_millis(), START_MS + 10_000);
    assert!(record.last_seen >= record.registered_at);
    assert!(record.activated_at.is_some());
}

#[tokio::test]
async fn test_late_first_heartbeat_forfeits_activation() {
    let h = Harness::new();
    let request = signed(metadata("router", AgentCategory::Coordination, &["route-v1"]), 1);
    let record = h.registry().register(request).await.unwrap();

    h.clock.advance_millis(300_001);
    let record = h.registry().heartbeat(record.id).await.unwrap();
    assert_eq!(record.status, AgentStatus::Inactive);

    // Never activated, so further heartbeats cannot revive it.
    let err = h.registry().heartbeat(record.id).await.unwrap_err();
    assert!(matches!(err, RegistryError::RegistrationExpired(id) if id == record.id));
    assert_eq!(h.registry().get(record.id).await.unwrap().status, AgentStatus::Inactive);
}

#[tokio::test]
async fn test_heartbeat_unknown_agent_is_not_found() {
    let h = Harness::new();
    let err = h.registry().heartbeat(AgentId::new()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_sweep_expires_silent_active_agents_and_heartbeat_revives() {
    let h = Harness::new();
    let quiet = h.register_active("quiet", &["route-v1"]).await;
    let chatty = h.register_active("chatty", &["route-v1"]).await;

    h.clock.advance_millis(60_000);
    h.registry().heartbeat(chatty).await.unwrap();
    h.clock.advance_millis(30_001);

    let report = h.registry().sweep_expired().await.unwrap();
    assert_eq!(report.expired, vec![quiet]);
    assert_eq!(report.examined, 2);
    assert_eq!(h.registry().get(quiet).await.unwrap().status, AgentStatus::Inactive);
    assert_eq!(h.registry().get(chatty).await.unwrap().status, AgentStatus::Active);

    let revived = h.registry().heartbeat(quiet).await.unwrap();
    assert_eq!(revived.status, AgentStatus::Active);
}

#[tokio::test]
async fn test_sweep_expires_abandoned_registrations() {
    let h = Harness::new();
    let request = signed(metadata("router", AgentCategory::Coordination, &["route-v1"]), 1);
    let record = h.registry().register(request).await.unwrap();

    h.clock.advance_millis(90_000);
    assert!(h.registry().sweep_expired().await.unwrap().expired.is_empty());

    h.clock.advance_millis(1);
    let report = h.registry().sweep_expired().await.unwrap();
    assert_eq!(report.expired, vec![record.id]);
    assert_eq!(h.registry().get(record.id).await.unwrap().status, AgentStatus::Inactive);
}

#[tokio::test]
async fn test_operator_transitions_follow_the_state_machine() {
    let h = Harness::new();
    let id = h.register_active("router", &["route-v1"]).await;

    let record = h.registry().update_status(id, AgentStatus::Suspended).await.unwrap();
    assert_eq!(record.status, AgentStatus::Suspended);

    // Suspended agents only come back through an authorised reinstatement.
    let err = h.registry().update_status(id, AgentStatus::Active).await.unwrap_err();
    assert!(matches!(
        err,
        RegistryError::InvalidTransition { from: AgentStatus::Suspended, to: AgentStatus::Active, .. }
    ));
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let record = h
        .registry()
        .reinstate(
            id,
            Authorization {
                granted_by: "trust-council".to_string(),
                reason: "appeal upheld".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(record.status, AgentStatus::Active);

    let record = h.registry().update_status(id, AgentStatus::Inactive).await.unwrap();
    assert_eq!(record.status, AgentStatus::Inactive);

    // inactive -> active is reachable only through a heartbeat.
    let err = h.registry().update_status(id, AgentStatus::Active).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(h.registry().heartbeat(id).await.unwrap().status, AgentStatus::Active);
}

#[tokio::test]
async fn test_same_state_transition_is_rejected() {
    let h = Harness::new();
    let id = h.register_active("router", &["route-v1"]).await;
    let err = h.registry().update_status(id, AgentStatus::Active).await.unwrap_err();
    assert!(matches!(err, RegistryError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_reinstate_requires_a_suspended_agent_and_a_grantor() {
    let h = Harness::new();
    let id = h.register_active("router", &["route-v1"]).await;
    let auth = Authorization {
        granted_by: "trust-council".to_string(),
        reason: "routine".to_string(),
    };

    let err = h.registry().reinstate(id, auth.clone()).await.unwrap_err();
    assert!(matches!(err, RegistryError::InvalidTransition { from: AgentStatus::Active, .. }));

    h.registry().update_status(id, AgentStatus::Suspended).await.unwrap();
    let anonymous = Authorization {
        granted_by: " ".to_string(),
        reason: "routine".to_string(),
    };
    let err = h.registry().reinstate(id, anonymous).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_deprecated_is_terminal() {
    let h = Harness::new();
    let id = h.register_active("router", &["route-v1"]).await;

    let record = h.registry().deprecate(id).await.unwrap();
    assert_eq!(record.status, AgentStatus::Deprecated);

    for err in [
        h.registry().heartbeat(id).await.unwrap_err(),
        h.registry().update_status(id, AgentStatus::Active).await.unwrap_err(),
        h.registry().deprecate(id).await.unwrap_err(),
        h.registry().adjust_reputation(id, 0.2).await.unwrap_err(),
    ] {
        assert!(matches!(err, RegistryError::AgentDeprecated(agent) if agent == id));
    }
    assert_eq!(h.registry().get(id).await.unwrap().status, AgentStatus::Deprecated);
}

#[tokio::test]
async fn test_any_live_state_can_be_deprecated() {
    let h = Harness::new();
    let request = signed(metadata("router", AgentCategory::Coordination, &["route-v1"]), 1);
    let registering = h.registry().register(request).await.unwrap();
    assert_eq!(
        h.registry().deprecate(registering.id).await.unwrap().status,
        AgentStatus::Deprecated
    );

    let suspended = h.register_active("suspended", &["route-v1"]).await;
    h.registry().update_status(suspended, AgentStatus::Suspended).await.unwrap();
    assert_eq!(h.registry().deprecate(suspended).await.unwrap().status, AgentStatus::Deprecated);
}

#[tokio::test]
async fn test_reputation_is_clamped_to_unit_interval() {
    let h = Harness::new();
    let id = h.register_active("router", &["route-v1"]).await;

    assert_eq!(h.registry().adjust_reputation(id, 5.0).await.unwrap().reputation(), 1.0);
    assert_eq!(h.registry().adjust_reputation(id, -7.5).await.unwrap().reputation(), 0.0);
    assert_eq!(h.registry().count().await.unwrap(), 1);

    let err = h.registry().adjust_reputation(id, f64::NAN).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_lifecycle_events_are_published_in_order() {
    let h = Harness::new();
    let mut receiver = h.services.event_bus.subscribe();

    let id = h.register_active("router", &["route-v1"]).await;

    let events: Vec<RegistryEvent> = receiver
        .drain()
        .into_iter()
        .filter_map(|e| match e {
            DomainEvent::Registry(event) => Some(event),
            DomainEvent::Swarm(_) => None,
        })
        .collect();

    assert!(matches!(events[0], RegistryEvent::AgentRegistered { agent_id, .. } if agent_id == id));
    assert!(matches!(events[1], RegistryEvent::HeartbeatReceived { agent_id, .. } if agent_id == id));
    assert!(matches!(
        events[2],
        RegistryEvent::AgentStatusChanged {
            from: AgentStatus::Registering,
            to: AgentStatus::Active,
            ..
        }
    ));
    assert_eq!(events.len(), 3);
}

#[tokio::test]
async fn test_rejections_are_published() {
    let h = Harness::new();
    let mut receiver = h.services.event_bus.subscribe();
    let meta = metadata("router", AgentCategory::Coordination, &["route-v1", "route-v1"]);

    let _ = h.registry().register(signed(meta, 1)).await;

    let events = receiver.drain();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        DomainEvent::Registry(RegistryEvent::RegistrationRejected { reason, .. }) if reason.contains("route-v1")
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_updates_are_never_lost_or_torn() {
    let h = Harness::new();
    let id = h.register_active("router", &["route-v1"]).await;
    let registry = h.services.registry.clone();

    let mut tasks = Vec::new();
    for i in 0..40 {
        let registry = registry.clone();
        tasks.push(tokio::spawn(async move {
            if i % 2 == 0 {
                registry.adjust_reputation(id, 0.01).await.map(|_| ())
            } else {
                registry.heartbeat(id).await.map(|_| ())
            }
        }));
    }
    for task in futures::future::join_all(tasks).await {
        task.unwrap().unwrap();
    }

    let record = h.registry().get(id).await.unwrap();
    assert!((record.reputation() - 0.3).abs() < 1e-9, "got {}", record.reputation());
    assert_eq!(record.status, AgentStatus::Active);
    assert!(record.last_seen >= record.registered_at);
}
