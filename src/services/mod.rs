//! 业务服务层

pub mod credential_service;

pub use credential_service::CredentialService;
