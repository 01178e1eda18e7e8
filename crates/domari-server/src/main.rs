//! Domari Server — application entry point.

use std::sync::Arc;

use domari_db::DbManager;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod extract;
mod gateway;
mod handlers;
mod routes;
mod state;

use config::ServerConfig;
use gateway::HttpPaymentGateway;
use state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("domari=info".parse()?))
        .json()
        .init();

    let config = ServerConfig::from_env();

    let db = DbManager::connect(&config.db).await?;
    let gateway = HttpPaymentGateway::new(config.payments_url.clone(), config.payments_token.clone());
    let state = Arc::new(AppState::new(db, gateway));

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "Domari server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
