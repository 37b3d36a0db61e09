//! rally-auth service binary

use std::sync::Arc;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use rally_auth::config::AppConfig;
use rally_auth::state::{self, AppState};
use rally_auth::store::PgUserStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rally_auth=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::load()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    let store = Arc::new(PgUserStore::new(pool));

    let addr = format!("{}:{}", config.service.host, config.service.port);
    let state = AppState::new(config, store)?;
    let app = state::router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
