//! JWT access token generation and validation

use crate::{
    auth::clock::{Clock, SystemClock},
    config::AppConfig,
    error::AppError,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Every token is signed and checked with this algorithm only
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Token type label returned to clients alongside the token
pub const TOKEN_TYPE: &str = "bearer";

/// Minimum signing key length accepted for HS256
pub const MIN_SECRET_LEN: usize = 32;

/// JWT claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,

    /// Issued at
    pub iat: i64,

    /// Expiration
    pub exp: i64,
}

/// A freshly issued access token
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub subject: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Seconds between issuance and expiry
    pub fn expires_in(&self) -> u64 {
        (self.expires_at - self.issued_at).num_seconds().max(0) as u64
    }
}

/// Issues and validates signed access tokens.
///
/// There is no revocation list: a token stays valid until `exp` no matter
/// what happens to the account behind it.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(AppError::Config(format!(
                "JWT secret too short (min {} chars)",
                MIN_SECRET_LEN
            )));
        }

        if ttl <= Duration::zero() {
            return Err(AppError::Config("Token TTL must be positive".to_string()));
        }

        // exp is checked against our own clock in validate()
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
            clock,
        })
    }

    /// Create JWT service from config, backed by the system clock
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    pub fn from_config_with_clock(
        config: &AppConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        Self::new(
            config.security.jwt_secret.expose_secret().as_bytes(),
            Duration::seconds(config.security.access_token_ttl_secs as i64),
            clock,
        )
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Generate an access token asserting `subject`
    pub fn issue(&self, subject: &str) -> Result<AccessToken, AppError> {
        let issued_at = self.clock.now();
        let expires_at = issued_at + self.ttl;

        let claims = Claims {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.encoding_key).map_err(
            |e| {
                tracing::error!("Failed to encode access token: {:?}", e);
                AppError::Internal(format!("Failed to encode access token: {}", e))
            },
        )?;

        Ok(AccessToken {
            token,
            subject: claims.sub,
            issued_at,
            expires_at,
        })
    }

    /// Validate signature and expiry, returning the claims.
    ///
    /// Tampered, malformed and expired tokens all surface as
    /// [`AppError::InvalidToken`]; the cause only reaches the debug log.
    pub fn validate(&self, token: &str) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {:?}", e);
                AppError::InvalidToken
            })?
            .claims;

        let now = self.clock.now().timestamp();
        if now >= claims.exp {
            tracing::debug!(sub = %claims.sub, exp = claims.exp, now, "Token expired");
            return Err(AppError::InvalidToken);
        }

        Ok(claims)
    }
}
