// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use crate::domain::agent::{AgentId, AgentRecord};
use crate::domain::error::RegistryError;
use crate::domain::repository::{AgentRepository, RecordMutation, RepositoryError};

/// In-memory agent store.
///
/// Each record sits in its own DashMap slot; `update` holds that slot's write
/// guard while the mutation runs on a copy, so writers to one agent are
/// serialised and readers only ever clone a committed record.
#[derive(Clone, Default)]
pub struct InMemoryAgentRepository {
    records: Arc<DashMap<AgentId, AgentRecord>>,
}

impl InMemoryAgentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AgentRepository for InMemoryAgentRepository {
    async fn insert(&self, record: AgentRecord) -> Result<(), RepositoryError> {
        match self.records.entry(record.id) {
            Entry::Occupied(_) => Err(RepositoryError::Conflict(format!("agent {}", record.id))),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: AgentId) -> Result<Option<AgentRecord>, RepositoryError> {
        Ok(self.records.get(&id).map(|r| r.value().clone()))
    }

    async fn snapshot(&self) -> Result<Vec<AgentRecord>, RepositoryError> {
        Ok(self.records.iter().map(|r| r.value().clone()).collect())
    }

    async fn update(&self, id: AgentId, mutation: RecordMutation) -> Result<AgentRecord, RegistryError> {
        let mut slot = self.records.get_mut(&id).ok_or(RegistryError::NotFound(id))?;
        let mut draft = slot.value().clone();
        mutation(&mut draft)?;
        *slot.value_mut() = draft.clone();
        Ok(draft)
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::{
        AgentCategory, AgentEndpoint, AgentMetadata, ResourceProfile, SecurityClaims, TransportKind,
    };
    use crate::domain::capability::CapabilityDescriptor;
    use chrono::Utc;
    use std::collections::BTreeSet;

    fn record() -> AgentRecord {
        let metadata = AgentMetadata {
            owner: "owner".to_string(),
            name: "indexer".to_string(),
            description: String::new(),
            version: "0.1.0".to_string(),
            category: AgentCategory::Indexing,
            capabilities: vec![CapabilityDescriptor::new("index-v1", "Index", "0.1.0")],
            dependencies: BTreeSet::new(),
            resources: ResourceProfile::default(),
            security: SecurityClaims::default(),
            endpoints: vec![AgentEndpoint {
                transport: TransportKind::Grpc,
                address: "grpc://indexer:50051".to_string(),
                supported_protocols: BTreeSet::new(),
                auth_required: true,
            }],
        };
        AgentRecord::accept(metadata, AgentId::new(), Utc::now(), 0.1)
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_id() {
        let repo = InMemoryAgentRepository::new();
        let rec = record();
        repo.insert(rec.clone()).await.unwrap();
        let err = repo.insert(rec).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_record_untouched() {
        let repo = InMemoryAgentRepository::new();
        let rec = record();
        let id = rec.id;
        repo.insert(rec.clone()).await.unwrap();

        let result = repo
            .update(
                id,
                Box::new(|r: &mut AgentRecord| {
                    r.name = "half-applied".to_string();
                    Err(RegistryError::validation("name", "rejected"))
                }),
            )
            .await;

        assert!(result.is_err());
        assert_eq!(repo.find_by_id(id).await.unwrap().unwrap(), rec);
    }

    #[tokio::test]
    async fn test_update_unknown_agent_is_not_found() {
        let repo = InMemoryAgentRepository::new();
        let id = AgentId::new();
        let err = repo.update(id, Box::new(|_| Ok(()))).await.unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(missing) if missing == id));
    }
}
