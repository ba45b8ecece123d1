// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Agent Repository Interface
//!
//! Persistence contract for the [`AgentRecord`] aggregate, following the
//! repository pattern: the interface lives in the domain layer, and
//! implementations live in `crate::infrastructure::repositories`.
//!
//! ## Atomicity
//!
//! [`AgentRepository::update`] is the only way to change a stored record.
//! Implementations must run the mutation against a private copy and publish
//! it only if the closure succeeds, while holding a per-record write lock.
//! Readers therefore observe either the old or the new record, never a mix.
//! There is no global lock: updates to different agents proceed in parallel.

use async_trait::async_trait;

use crate::domain::agent::{AgentId, AgentRecord};
use crate::domain::error::RegistryError;

/// Mutation applied atomically to one stored record.
pub type RecordMutation = Box<dyn FnOnce(&mut AgentRecord) -> Result<(), RegistryError> + Send>;

/// Repository interface for agent records.
#[async_trait]
pub trait AgentRepository: Send + Sync {
    /// Insert a new record. Fails with `Conflict` if the id is already taken.
    async fn insert(&self, record: AgentRecord) -> Result<(), RepositoryError>;

    /// Find a record by id.
    async fn find_by_id(&self, id: AgentId) -> Result<Option<AgentRecord>, RepositoryError>;

    /// Point-in-time copy of every record.
    async fn snapshot(&self) -> Result<Vec<AgentRecord>, RepositoryError>;

    /// Apply `mutation` to the record atomically and return the new state.
    ///
    /// If the mutation returns an error, the stored record is left untouched
    /// and the error is passed through.
    async fn update(&self, id: AgentId, mutation: RecordMutation) -> Result<AgentRecord, RegistryError>;

    /// Number of stored records.
    async fn count(&self) -> Result<usize, RepositoryError>;
}

/// Repository errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Entity already exists: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}
