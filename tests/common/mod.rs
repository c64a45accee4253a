//! 测试公共模块
//! 提供测试配置、应用状态和请求辅助函数

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use chrono::{DateTime, Utc};
use credential_service::{
    auth::{clock::ManualClock, jwt::TokenService, password::PasswordHasher},
    config::{AppConfig, DatabaseConfig, LoggingConfig, SecurityConfig, ServerConfig},
    middleware::AppState,
    repository::{CredentialStore, MemoryCredentialStore},
    routes,
    services::CredentialService,
};
use http_body_util::BodyExt;
use secrecy::Secret;
use std::sync::Arc;

pub const TEST_SECRET: &str = "test-secret-key-for-testing-only-min-32-chars";

/// 创建测试配置（低开销 Argon2 参数）
pub fn create_test_config() -> AppConfig {
    let database_url = std::env::var("TEST_DATABASE_URL").ok().map(Secret::new);

    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(),
            max_body_bytes: 16 * 1024,
        },
        database: DatabaseConfig {
            url: database_url,
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 5,
            idle_timeout_secs: 300,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            jwt_secret: Secret::new(TEST_SECRET.to_string()),
            access_token_ttl_secs: 30 * 60,
            argon2_memory_kib: 1024,
            argon2_iterations: 1,
            argon2_parallelism: 1,
        },
    }
}

pub fn test_start_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

/// 测试应用：状态、可控时钟与内存存储
pub struct TestApp {
    pub state: Arc<AppState>,
    pub clock: Arc<ManualClock>,
    pub store: Arc<MemoryCredentialStore>,
}

impl TestApp {
    pub fn router(&self) -> Router {
        routes::create_router(self.state.clone())
    }
}

/// 创建基于内存存储的测试应用
pub fn create_test_app() -> TestApp {
    let config = create_test_config();
    let clock = Arc::new(ManualClock::new(test_start_time()));
    let memory_store = Arc::new(MemoryCredentialStore::new());
    let store: Arc<dyn CredentialStore> = memory_store.clone();

    let token_service = Arc::new(
        TokenService::from_config_with_clock(&config, clock.clone())
            .expect("Failed to create token service"),
    );
    let hasher = PasswordHasher::from_config(&config.security).expect("Invalid argon2 params");
    let credential_service = Arc::new(
        CredentialService::new(store.clone(), hasher, token_service.clone())
            .expect("Failed to create credential service"),
    );

    let state = Arc::new(AppState {
        config,
        store,
        credential_service,
        token_service,
    });

    TestApp {
        state,
        clock,
        store: memory_store,
    }
}

/// 构造 JSON POST 请求
pub fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// 构造带 Bearer 令牌的 GET 请求
pub fn bearer_get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

/// 读取响应体为 JSON
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// 将签名段第一个字符替换为另一个字符
pub fn flip_signature_char(token: &str) -> String {
    let (unsigned, signature) = token.rsplit_once('.').unwrap();
    let mut chars: Vec<char> = signature.chars().collect();
    chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
    format!("{}.{}", unsigned, chars.into_iter().collect::<String>())
}
