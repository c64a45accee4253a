//! 凭据服务：注册、认证、签发与校验访问令牌

use crate::{
    auth::{
        jwt::{AccessToken, TokenService},
        password::PasswordHasher,
    },
    error::AppError,
    models::credential::{CredentialRecord, NewCredential},
    repository::CredentialStore,
};
use std::sync::Arc;

/// Fixed secret hashed at startup so unknown usernames cost one verify too
const DUMMY_SECRET: &str = "credential-service-timing-equalizer";

pub struct CredentialService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
    dummy_hash: String,
}

impl CredentialService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        tokens: Arc<TokenService>,
    ) -> Result<Self, AppError> {
        let dummy_hash = hasher.hash(DUMMY_SECRET)?;

        Ok(Self {
            store,
            hasher,
            tokens,
            dummy_hash,
        })
    }

    /// 注册新用户，用户名已存在时失败，不覆盖
    pub async fn register(&self, username: &str, password: &str) -> Result<CredentialRecord, AppError> {
        if self.store.find_by_username(username).await?.is_some() {
            tracing::info!(%username, "Registration rejected: username taken");
            return Err(AppError::AlreadyExists);
        }

        PasswordHasher::check_length(password)?;

        let password_hash = self.hash_blocking(password).await?;

        // 并发注册由存储层唯一约束兜底
        let record = self
            .store
            .insert(NewCredential {
                username: username.to_string(),
                password_hash,
            })
            .await?;

        metrics::counter!("auth_registrations_total").increment(1);
        tracing::info!(%username, user_id = record.id, "User registered");

        Ok(record)
    }

    /// 校验用户名与密码。用户不存在与密码错误返回同一错误
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<CredentialRecord, AppError> {
        let record = self.store.find_by_username(username).await?;

        let stored_hash = record
            .as_ref()
            .map(|r| r.password_hash.clone())
            .unwrap_or_else(|| self.dummy_hash.clone());

        let verified = self.verify_blocking(password, stored_hash).await?;

        match record {
            Some(record) if verified => {
                metrics::counter!("auth_logins_total", "outcome" => "success").increment(1);
                Ok(record)
            }
            _ => {
                metrics::counter!("auth_logins_total", "outcome" => "failure").increment(1);
                tracing::info!(%username, "Authentication failed");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    /// 认证成功后签发访问令牌
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(CredentialRecord, AccessToken), AppError> {
        let record = self.authenticate(username, password).await?;
        let token = self.tokens.issue(&record.username)?;

        tracing::info!(
            %username,
            expires_at = %token.expires_at,
            "Access token issued"
        );

        Ok((record, token))
    }

    /// 校验访问令牌，返回 subject
    pub fn validate_token(&self, token: &str) -> Result<String, AppError> {
        Ok(self.tokens.validate(token)?.sub)
    }

    async fn hash_blocking(&self, password: &str) -> Result<String, AppError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
    }

    async fn verify_blocking(&self, password: &str, hash: String) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))
    }
}
