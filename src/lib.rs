//! 凭据与令牌服务库
//! 密码哈希、注册、认证以及访问令牌的签发与校验

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod telemetry;
