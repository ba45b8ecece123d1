// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;

use neuroswarm_core::domain::repository::RepositoryError;
use neuroswarm_core::domain::swarm::SwarmId;

use crate::domain::error::SwarmError;
use crate::domain::formation::SwarmFormation;

/// Mutation applied atomically to one stored formation.
pub type FormationMutation = Box<dyn FnOnce(&mut SwarmFormation) -> Result<(), SwarmError> + Send>;

/// Repository interface for swarm formations.
///
/// Same contract as the agent repository: `update` runs the mutation on a
/// copy under the formation's write lock and commits only on success.
#[async_trait]
pub trait SwarmRepository: Send + Sync {
    /// Insert a new formation. Fails with `Conflict` if the id is taken.
    async fn insert(&self, formation: SwarmFormation) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: &SwarmId) -> Result<Option<SwarmFormation>, RepositoryError>;

    /// Every formation, ordered by id.
    async fn list(&self) -> Result<Vec<SwarmFormation>, RepositoryError>;

    async fn update(&self, id: &SwarmId, mutation: FormationMutation) -> Result<SwarmFormation, SwarmError>;
}
