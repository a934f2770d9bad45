//! Serve command - run the HTTP API

use super::build_sync;
use crate::config::Config;
use crate::db::GeoDb;
use crate::error::Result;
use crate::server::{serve, AppState};
use tokio::net::TcpListener;
use tracing::info;

/// Bind the configured address and serve until ctrl-c
pub async fn cmd_serve(config: &Config, db: GeoDb) -> Result<()> {
    let sync = build_sync(config, db)?;

    let addr = config.listen_addr();
    info!("Binding {}", addr);
    let listener = TcpListener::bind(addr.as_str()).await?;

    serve(listener, AppState::new(sync)).await
}
