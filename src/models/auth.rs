//! Authentication-related models

use super::credential::UserResponse;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register / login request body
#[derive(Debug, Deserialize, Validate)]
pub struct CredentialsRequest {
    #[validate(length(min = 1, max = 64, message = "username must be 1-64 characters"))]
    pub username: String,
    pub password: String,
}

/// Registration response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserResponse,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: UserResponse,
}

/// Protected resource response
#[derive(Debug, Serialize)]
pub struct ProtectedResponse {
    pub message: String,
    pub user: String,
}
