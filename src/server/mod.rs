//! HTTP API
//!
//! ## Endpoints
//!
//! - `GET /countries` - all countries
//! - `GET /states` - all states
//! - `GET /cities` - all cities
//! - `GET /states/:id` - states of country `:id`
//! - `GET /cities/:id` - cities of state `:id`
//! - `GET /populateLocationTables` - run the full sync
//! - `GET /updateStates` - re-run the city stage (the route name is historical)
//!
//! Every failure answers `500 {"error": "Internal Server Error"}`.

mod routes;

pub use routes::*;

use crate::db::GeoDb;
use crate::error::{Error, Result};
use crate::sync::LocationSync;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use tokio::net::TcpListener;
use tracing::{error, info};

/// Shared handles for request handlers
#[derive(Clone)]
pub struct AppState {
    pub db: GeoDb,
    pub sync: LocationSync,
}

impl AppState {
    pub fn new(sync: LocationSync) -> Self {
        Self {
            db: sync.db().clone(),
            sync,
        }
    }
}

/// Any handler failure; always rendered as a bare 500
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "Request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "Internal Server Error" })),
        )
            .into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Serve the API on an already bound listener until ctrl-c
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let addr = listener.local_addr()?;
    info!("Server is running on http://{}", addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
