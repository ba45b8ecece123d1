// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Time-bounded discovery result cache.
//!
//! Entries are keyed by [`DiscoveryQuery::cache_key`] and expire after the
//! configured TTL. The registry feeds every [`RegistryEvent`] it emits into
//! [`DiscoveryCache::invalidate_for`] before returning to the caller:
//!
//! - events that may make an agent match a query it did not match before
//!   (registration, status change, reinstatement, reputation increase) flush
//!   the whole cache, since any cached result might now be missing that agent;
//! - every other event only evicts entries whose result set contains the agent.
//!
//! A query issued after a mutation returns therefore never observes a stale
//! entry for the mutated agent. Every invalidation also bumps a generation
//! counter; a result computed from a snapshot taken before the bump is not
//! stored.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::domain::discovery::{DiscoveryQuery, DiscoveryResult};
use crate::domain::events::RegistryEvent;

#[derive(Debug, Clone)]
struct CachedResult {
    result: DiscoveryResult,
    cached_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct DiscoveryCache {
    ttl: chrono::Duration,
    entries: DashMap<String, CachedResult>,
    generation: AtomicU64,
}

impl DiscoveryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::zero()),
            entries: DashMap::new(),
            generation: AtomicU64::new(0),
        }
    }

    /// Fresh cached result for `query`, if any. Expired entries are dropped.
    pub fn get(&self, query: &DiscoveryQuery, now: DateTime<Utc>) -> Option<DiscoveryResult> {
        let key = query.cache_key();
        let fresh = {
            let entry = self.entries.get(&key)?;
            (now - entry.cached_at < self.ttl).then(|| entry.result.clone())
        };
        if fresh.is_none() {
            self.entries.remove_if(&key, |_, cached| now - cached.cached_at >= self.ttl);
        }
        fresh
    }

    /// Current invalidation generation. Read it before taking the snapshot a
    /// result is computed from and pass it back to [`DiscoveryCache::put`].
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Store `result` unless an invalidation happened since `observed_generation`.
    pub fn put(
        &self,
        query: &DiscoveryQuery,
        result: DiscoveryResult,
        now: DateTime<Utc>,
        observed_generation: u64,
    ) {
        if self.ttl <= chrono::Duration::zero() || self.generation() != observed_generation {
            return;
        }
        let key = query.cache_key();
        self.entries.insert(key.clone(), CachedResult { result, cached_at: now });
        if self.generation() != observed_generation {
            self.entries.remove_if(&key, |_, cached| cached.cached_at == now);
        }
    }

    /// Evict entries affected by `event`. Returns the number of entries removed.
    pub fn invalidate_for(&self, event: &RegistryEvent) -> usize {
        self.generation.fetch_add(1, Ordering::AcqRel);
        if event.may_widen_results() {
            let evicted = self.entries.len();
            self.entries.clear();
            if evicted > 0 {
                debug!(evicted, "Discovery cache flushed");
            }
            return evicted;
        }

        let Some(agent_id) = event.agent_id() else {
            return 0;
        };
        let before = self.entries.len();
        self.entries.retain(|_, cached| !cached.result.contains(agent_id));
        let evicted = before.saturating_sub(self.entries.len());
        if evicted > 0 {
            debug!(%agent_id, evicted, "Discovery cache entries invalidated");
        }
        evicted
    }

    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
