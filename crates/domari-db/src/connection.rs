//! SurrealDB connection management.
//!
//! The server connects over WebSocket with root credentials taken from
//! the environment, applies pending migrations, and hands out cloned
//! client handles (a `Surreal<C>` clone shares the underlying
//! connection).

use std::env;

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;
use crate::schema::run_migrations;

/// Configuration for connecting to SurrealDB.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket URL (e.g., `127.0.0.1:8000`).
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl DbConfig {
    /// Read the connection settings from `DOMARI_DB_*` environment
    /// variables, falling back to local-development defaults.
    pub fn from_env() -> Self {
        fn var(key: &str, default: &str) -> String {
            env::var(key).unwrap_or_else(|_| default.to_string())
        }
        Self {
            url: var("DOMARI_DB_URL", "127.0.0.1:8000"),
            namespace: var("DOMARI_DB_NAMESPACE", "domari"),
            database: var("DOMARI_DB_DATABASE", "main"),
            username: var("DOMARI_DB_USERNAME", "root"),
            password: var("DOMARI_DB_PASSWORD", "root"),
        }
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "domari".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

/// Owns the SurrealDB connection for the lifetime of the process.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Connect, select the namespace/database, and bring the schema up
    /// to date. The returned manager is ready for repository use.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "connecting to SurrealDB"
        );

        let db = Surreal::new::<Ws>(&config.url).await?;

        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;

        db.use_ns(&config.namespace).use_db(&config.database).await?;

        run_migrations(&db).await?;

        Ok(Self { db })
    }

    /// A cloned client handle sharing this manager's connection.
    pub fn client(&self) -> Surreal<Client> {
        self.db.clone()
    }

    /// Round-trip liveness probe; backs the server's health endpoint.
    pub async fn health(&self) -> Result<(), DbError> {
        self.db.health().await.map_err(DbError::from)
    }
}
