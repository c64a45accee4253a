//! 凭据服务集成测试
//!
//! 在内存存储上走完注册、认证、签发、校验的完整流程

use chrono::Duration;
use credential_service::{error::AppError, repository::CredentialStore};
use std::sync::Arc;

mod common;
use common::create_test_app;

#[tokio::test]
async fn test_bob_scenario() {
    let app = create_test_app();
    let service = &app.state.credential_service;

    service.register("bob", "hunter2").await.unwrap();

    let (_, token) = service.login("bob", "hunter2").await.unwrap();
    assert_eq!(service.validate_token(&token.token).unwrap(), "bob");

    let err = service.login("bob", "wrong").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials));
}

#[tokio::test]
async fn test_duplicate_registration_keeps_first_secret() {
    let app = create_test_app();
    let service = &app.state.credential_service;

    service.register("alice", "pw").await.unwrap();
    let err = service.register("alice", "anything").await.unwrap_err();
    assert!(matches!(err, AppError::AlreadyExists));

    // 原密码仍然有效，新密码无效
    assert!(service.authenticate("alice", "pw").await.is_ok());
    assert!(service.authenticate("alice", "anything").await.is_err());
}

#[tokio::test]
async fn test_token_expires_after_thirty_minutes() {
    let app = create_test_app();
    let service = &app.state.credential_service;

    service.register("bob", "hunter2").await.unwrap();
    let (_, token) = service.login("bob", "hunter2").await.unwrap();

    assert!(service.validate_token(&token.token).is_ok());

    app.clock.advance(Duration::minutes(30) + Duration::seconds(1));
    assert!(matches!(
        service.validate_token(&token.token),
        Err(AppError::InvalidToken)
    ));
}

#[tokio::test]
async fn test_authenticate_has_no_side_effects() {
    let app = create_test_app();
    let service = &app.state.credential_service;

    service.register("bob", "hunter2").await.unwrap();
    let before = app.store.find_by_username("bob").await.unwrap().unwrap();

    let _ = service.authenticate("bob", "wrong").await;
    let _ = service.authenticate("bob", "hunter2").await;

    let after = app.store.find_by_username("bob").await.unwrap().unwrap();
    assert_eq!(before.password_hash, after.password_hash);
    assert_eq!(app.store.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registration_single_winner() {
    let app = create_test_app();
    let service = app.state.credential_service.clone();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.register("race", &format!("pw-{}", i)).await })
        })
        .collect();

    let mut ok = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(e) => assert!(matches!(e, AppError::AlreadyExists)),
        }
    }

    assert_eq!(ok, 1);
    assert_eq!(app.store.len(), 1);
}

#[tokio::test]
async fn test_concurrent_logins_all_succeed() {
    let app = create_test_app();
    let service = app.state.credential_service.clone();
    service.register("bob", "hunter2").await.unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.login("bob", "hunter2").await })
        })
        .collect();

    for handle in handles {
        let (_, token) = handle.await.unwrap().unwrap();
        assert_eq!(service.validate_token(&token.token).unwrap(), "bob");
    }
}
