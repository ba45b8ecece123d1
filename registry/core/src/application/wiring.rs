// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Service assembly - Application Layer
//!
//! Builds the registry and discovery services from a [`RegistryConfig`] so
//! both share one repository, one clock, one event bus and (when enabled) one
//! discovery cache. Sharing the cache is what keeps discovery results
//! coherent with registry mutations.

use std::sync::Arc;
use std::time::Duration;

use crate::application::discovery::StandardDiscoveryService;
use crate::application::registry::StandardRegistryService;
use crate::domain::collaborators::{CanonicalHasher, Clock, SignatureVerifier};
use crate::domain::config::RegistryConfig;
use crate::domain::protocol::ProtocolSettings;
use crate::domain::repository::AgentRepository;
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::crypto::{Ed25519SignatureVerifier, Sha256CanonicalHasher};
use crate::infrastructure::discovery_cache::DiscoveryCache;
use crate::infrastructure::event_bus::EventBus;
use crate::infrastructure::repositories::InMemoryAgentRepository;

#[derive(Clone)]
pub struct RegistryServices {
    pub registry: Arc<StandardRegistryService>,
    pub discovery: Arc<StandardDiscoveryService>,
    pub event_bus: EventBus,
    pub cache: Option<Arc<DiscoveryCache>>,
    pub settings: ProtocolSettings,
    /// Default budget for discovery calls that do not supply their own.
    pub query_timeout: Duration,
}

pub struct RegistryServicesBuilder {
    config: RegistryConfig,
    repository: Arc<dyn AgentRepository>,
    verifier: Arc<dyn SignatureVerifier>,
    hasher: Arc<dyn CanonicalHasher>,
    clock: Arc<dyn Clock>,
}

impl RegistryServicesBuilder {
    /// In-memory store, Ed25519 signatures, SHA-256 canonical hashing, wall clock.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            repository: Arc::new(InMemoryAgentRepository::new()),
            verifier: Arc::new(Ed25519SignatureVerifier),
            hasher: Arc::new(Sha256CanonicalHasher),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_repository(mut self, repository: Arc<dyn AgentRepository>) -> Self {
        self.repository = repository;
        self
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn SignatureVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn with_hasher(mut self, hasher: Arc<dyn CanonicalHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> RegistryServices {
        let settings = self.config.settings();
        let event_bus = EventBus::new(self.config.spec.events.capacity);
        let cache = self
            .config
            .spec
            .discovery
            .cache_enabled
            .then(|| Arc::new(DiscoveryCache::new(settings.discovery_cache_ttl)));

        let mut registry = StandardRegistryService::new(
            Arc::clone(&self.repository),
            self.verifier,
            self.hasher,
            Arc::clone(&self.clock),
            event_bus.clone(),
            settings.clone(),
        );
        let mut discovery = StandardDiscoveryService::new(self.repository, self.clock);
        if let Some(cache) = &cache {
            registry = registry.with_cache(Arc::clone(cache));
            discovery = discovery.with_cache(Arc::clone(cache));
        }

        RegistryServices {
            registry: Arc::new(registry),
            discovery: Arc::new(discovery),
            event_bus,
            cache,
            settings,
            query_timeout: self.config.spec.discovery.query_timeout,
        }
    }
}

impl RegistryServices {
    pub fn builder(config: RegistryConfig) -> RegistryServicesBuilder {
        RegistryServicesBuilder::new(config)
    }
}
