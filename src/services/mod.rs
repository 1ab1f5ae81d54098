pub mod access_policy;
pub mod auth_service;
