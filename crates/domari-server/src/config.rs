//! Server configuration, read from the environment.

use std::env;

use domari_db::DbConfig;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address the HTTP listener binds to.
    pub bind_addr: String,
    pub db: DbConfig,
    /// Base URL of the hosted-payments collaborator.
    pub payments_url: String,
    /// Bearer token for the payments API.
    pub payments_token: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        fn var(key: &str, default: &str) -> String {
            env::var(key).unwrap_or_else(|_| default.to_string())
        }
        Self {
            bind_addr: var("DOMARI_BIND_ADDR", "0.0.0.0:8080"),
            db: DbConfig::from_env(),
            payments_url: var("DOMARI_PAYMENTS_URL", "http://127.0.0.1:9090"),
            payments_token: var("DOMARI_PAYMENTS_TOKEN", ""),
        }
    }
}
