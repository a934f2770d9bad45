use super::{ApiResult, AppState};
use crate::error::Error;
use crate::models::{City, Country, State as StateRow};
use crate::sync::PopulateReport;
use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::debug;

/// Create the router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/countries", get(list_countries))
        .route("/states", get(list_states))
        .route("/cities", get(list_cities))
        .route("/states/:id", get(states_by_country))
        .route("/cities/:id", get(cities_by_state))
        .route("/populateLocationTables", get(populate_location_tables))
        .route("/updateStates", get(update_states))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /countries
async fn list_countries(State(state): State<AppState>) -> ApiResult<Json<Vec<Country>>> {
    Ok(Json(state.db.list_countries().await?))
}

/// GET /states
async fn list_states(State(state): State<AppState>) -> ApiResult<Json<Vec<StateRow>>> {
    Ok(Json(state.db.list_states().await?))
}

/// GET /cities
async fn list_cities(State(state): State<AppState>) -> ApiResult<Json<Vec<City>>> {
    Ok(Json(state.db.list_cities().await?))
}

/// GET /states/:id
/// States whose `country_id` is `:id`
async fn states_by_country(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<StateRow>>> {
    let country_id = parse_id(&id)?;
    debug!(country_id, "Listing states for country");
    Ok(Json(state.db.states_by_country(country_id).await?))
}

/// GET /cities/:id
/// Cities whose `state_id` is `:id`
async fn cities_by_state(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<City>>> {
    let state_id = parse_id(&id)?;
    debug!(state_id, "Listing cities for state");
    Ok(Json(state.db.cities_by_state(state_id).await?))
}

/// GET /populateLocationTables
async fn populate_location_tables(
    State(state): State<AppState>,
) -> ApiResult<Json<PopulateReport>> {
    Ok(Json(state.sync.populate_location_tables().await?))
}

/// GET /updateStates
///
/// Refreshes cities, not states. The route keeps its published name.
async fn update_states(State(state): State<AppState>) -> ApiResult<Json<String>> {
    Ok(Json(state.sync.refresh_cities().await?))
}

// Malformed ids are reported like any other failure.
fn parse_id(raw: &str) -> Result<i64, Error> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Other(format!("Invalid id: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("5").unwrap(), 5);
        assert_eq!(parse_id(" 12 ").unwrap(), 12);
        assert!(parse_id("5; DROP TABLE states").is_err());
        assert!(parse_id("").is_err());
    }
}
