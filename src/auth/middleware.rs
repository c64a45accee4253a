//! Bearer token 认证中间件

use crate::{auth::jwt::TokenService, error::AppError};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// 认证上下文（附加到请求扩展）
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub username: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

// 在 handler 中直接提取 AuthContext
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AppError::MissingCredentials)
    }
}

/// 从 Authorization 头提取 Bearer 令牌
pub fn extract_token(headers: &HeaderMap) -> Result<String, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::MissingCredentials)?;

    // scheme 不区分大小写
    let (scheme, token) = value.split_once(' ').ok_or(AppError::MissingCredentials)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::MissingCredentials);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::MissingCredentials);
    }

    Ok(token.to_string())
}

/// Bearer 认证中间件 - 必须认证
pub async fn bearer_auth_middleware(
    State(token_service): State<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(req.headers())?;

    let claims = token_service.validate(&token)?;

    req.extensions_mut().insert(AuthContext {
        username: claims.sub,
        issued_at: claims.iat,
        expires_at: claims.exp,
    });

    Ok(next.run(req).await)
}
