//! Stored credential records

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One row per registered user. The hash is a PHC string, never plaintext.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CredentialRecord {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload; the store assigns `id` and `created_at`
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub username: String,
    pub password_hash: String,
}

/// Public view of a credential record
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<CredentialRecord> for UserResponse {
    fn from(record: CredentialRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
            created_at: record.created_at,
        }
    }
}
