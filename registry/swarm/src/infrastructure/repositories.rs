// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;

use neuroswarm_core::domain::repository::RepositoryError;
use neuroswarm_core::domain::swarm::SwarmId;

use crate::domain::error::SwarmError;
use crate::domain::formation::SwarmFormation;
use crate::domain::repository::{FormationMutation, SwarmRepository};

#[derive(Clone, Default)]
pub struct InMemorySwarmRepository {
    formations: Arc<RwLock<BTreeMap<SwarmId, SwarmFormation>>>,
}

impl InMemorySwarmRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SwarmRepository for InMemorySwarmRepository {
    async fn insert(&self, formation: SwarmFormation) -> Result<(), RepositoryError> {
        let mut formations = self.formations.write();
        match formations.entry(formation.id.clone()) {
            Entry::Occupied(_) => Err(RepositoryError::Conflict(format!("swarm {}", formation.id))),
            Entry::Vacant(slot) => {
                slot.insert(formation);
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: &SwarmId) -> Result<Option<SwarmFormation>, RepositoryError> {
        Ok(self.formations.read().get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<SwarmFormation>, RepositoryError> {
        Ok(self.formations.read().values().cloned().collect())
    }

    async fn update(&self, id: &SwarmId, mutation: FormationMutation) -> Result<SwarmFormation, SwarmError> {
        let mut formations = self.formations.write();
        let stored = formations
            .get_mut(id)
            .ok_or_else(|| SwarmError::NotFound(id.clone()))?;
        let mut draft = stored.clone();
        mutation(&mut draft)?;
        *stored = draft.clone();
        Ok(draft)
    }
}
