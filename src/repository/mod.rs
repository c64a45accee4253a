//! Credential persistence layer

pub mod credential_repo;
pub mod memory;

pub use credential_repo::PgCredentialStore;
pub use memory::MemoryCredentialStore;

use crate::{
    db::HealthStatus,
    error::AppError,
    models::credential::{CredentialRecord, NewCredential},
};
use async_trait::async_trait;

/// Username -> credential record mapping.
///
/// `insert` must be atomic per username: when the name is taken it returns
/// [`AppError::AlreadyExists`] and leaves the existing record untouched.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<CredentialRecord>, AppError>;

    async fn insert(&self, credential: NewCredential) -> Result<CredentialRecord, AppError>;

    async fn health_check(&self) -> HealthStatus;
}
