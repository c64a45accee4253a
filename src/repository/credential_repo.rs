//! PostgreSQL credential store

use super::CredentialStore;
use crate::{
    db::{self, HealthStatus},
    error::AppError,
    models::credential::{CredentialRecord, NewCredential},
};
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PgCredentialStore {
    db: PgPool,
}

impl PgCredentialStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    /// 根据用户名查找凭据
    async fn find_by_username(&self, username: &str) -> Result<Option<CredentialRecord>, AppError> {
        let record = sqlx::query_as::<_, CredentialRecord>(
            "SELECT id, username, password_hash, created_at FROM credentials WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;

        Ok(record)
    }

    /// 创建凭据，用户名唯一约束冲突映射为 AlreadyExists
    async fn insert(&self, credential: NewCredential) -> Result<CredentialRecord, AppError> {
        let result = sqlx::query_as::<_, CredentialRecord>(
            r#"
            INSERT INTO credentials (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(&credential.username)
        .bind(&credential.password_hash)
        .fetch_one(&self.db)
        .await;

        match result {
            Ok(record) => Ok(record),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AppError::AlreadyExists)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn health_check(&self) -> HealthStatus {
        db::health_check(&self.db).await
    }
}
