// Authentication: credentials, tokens and the request authentication layer

pub mod password;
pub mod credential_store;
pub mod token;
pub mod auth_middleware;
pub mod audit_logger;
