//! Domain models and request/response DTOs

pub mod auth;
pub mod credential;
