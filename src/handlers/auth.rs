//! 认证相关的 HTTP 处理器

use crate::{
    auth::{jwt::TOKEN_TYPE, middleware::AuthContext},
    error::AppError,
    middleware::AppState,
    models::{auth::*, credential::UserResponse},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

/// 注册
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    req.validate()?;

    let record = state
        .credential_service
        .register(&req.username, &req.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user: UserResponse::from(record),
        }),
    ))
}

/// 登录，成功时返回访问令牌
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;

    // 登录不做用户名格式校验，统一按凭据错误处理
    let (record, token) = state
        .credential_service
        .login(&req.username, &req.password)
        .await?;

    Ok(Json(LoginResponse {
        expires_in: token.expires_in(),
        access_token: token.token,
        token_type: TOKEN_TYPE.to_string(),
        user: UserResponse::from(record),
    }))
}

/// 受保护资源
pub async fn protected(auth_context: AuthContext) -> Result<impl IntoResponse, AppError> {
    Ok(Json(ProtectedResponse {
        message: "Protected route accessed!".to_string(),
        user: auth_context.username,
    }))
}

/// 获取当前令牌信息
pub async fn get_current_user(auth_context: AuthContext) -> Result<impl IntoResponse, AppError> {
    Ok(Json(json!({
        "username": auth_context.username,
        "issued_at": auth_context.issued_at,
        "expires_at": auth_context.expires_at,
    })))
}
