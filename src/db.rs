//! 凭据库连接
//! 启动时建池并应用 migrations/ 下的表结构，/ready 通过 credentials 表判断可用性

use crate::config::DatabaseConfig;
use secrecy::{ExposeSecret, Secret};
use sqlx::{
    migrate::{MigrateError, Migrator},
    postgres::PgPoolOptions,
    PgPool,
};
use std::time::Duration;

/// 编译期嵌入的迁移脚本
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// 连接凭据库并应用迁移，返回可直接交给 `PgCredentialStore` 的连接池
pub async fn connect(url: &Secret<String>, config: &DatabaseConfig) -> Result<PgPool, DbError> {
    let pool = pool_options(config)
        .connect(url.expose_secret())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to credential database");
            DbError::Connect(e)
        })?;

    MIGRATOR.run(&pool).await.map_err(|e| {
        tracing::error!(error = %e, "Credential schema migration failed");
        DbError::Migrate(e)
    })?;

    tracing::info!(
        max_connections = config.max_connections,
        migrations = MIGRATOR.iter().count(),
        "Credential database ready"
    );

    Ok(pool)
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .test_before_acquire(true)
}

/// 连接可用但 credentials 表不可读（例如未迁移）同样视为不健康
pub async fn health_check(pool: &PgPool) -> HealthStatus {
    match sqlx::query("SELECT 1 FROM credentials LIMIT 1")
        .fetch_optional(pool)
        .await
    {
        Ok(_) => HealthStatus::Healthy,
        Err(e) => {
            tracing::warn!(error = %e, "Credential store health check failed");
            HealthStatus::Unhealthy(e.to_string())
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database connection failed: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("Schema migration failed: {0}")]
    Migrate(#[source] MigrateError),
}

/// 存储健康状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}
