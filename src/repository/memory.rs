//! In-memory credential store for development and tests.
//!
//! Data is lost when the process exits.

use super::CredentialStore;
use crate::{
    db::HealthStatus,
    error::AppError,
    models::credential::{CredentialRecord, NewCredential},
};
use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::atomic::{AtomicI64, Ordering};

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    records: DashMap<String, CredentialRecord>,
    next_id: AtomicI64,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<CredentialRecord>, AppError> {
        Ok(self.records.get(username).map(|r| r.value().clone()))
    }

    async fn insert(&self, credential: NewCredential) -> Result<CredentialRecord, AppError> {
        // entry() holds the shard lock, so check-and-insert is atomic
        match self.records.entry(credential.username) {
            Entry::Occupied(_) => Err(AppError::AlreadyExists),
            Entry::Vacant(slot) => {
                let record = CredentialRecord {
                    id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
                    username: slot.key().clone(),
                    password_hash: credential.password_hash,
                    created_at: chrono::Utc::now(),
                };
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn health_check(&self) -> HealthStatus {
        HealthStatus::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_credential(username: &str, hash: &str) -> NewCredential {
        NewCredential {
            username: username.to_string(),
            password_hash: hash.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = MemoryCredentialStore::new();
        assert!(store.is_empty());

        let record = store.insert(new_credential("alice", "hash-a")).await.unwrap();
        assert_eq!(record.id, 1);
        assert_eq!(record.username, "alice");

        let found = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.password_hash, "hash-a");
        assert!(store.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_insert_keeps_original() {
        let store = MemoryCredentialStore::new();
        store.insert(new_credential("alice", "hash-a")).await.unwrap();

        let err = store.insert(new_credential("alice", "hash-b")).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists));

        let found = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.password_hash, "hash-a");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_single_winner() {
        let store = Arc::new(MemoryCredentialStore::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .insert(new_credential("contended", &format!("hash-{}", i)))
                        .await
                })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);
        assert_eq!(store.len(), 1);
    }
}
