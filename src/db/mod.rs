//! Location storage using SQLite
//!
//! This module owns every SQL statement geosync issues:
//! - Upserts for countries, states and cities (primary key is the conflict target)
//! - The state code cleanup pass
//! - Join-key reads that feed the fetch pipeline
//! - Read-only listings for the HTTP API
//! - Sync run history

mod schema;

pub use schema::*;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{City, Country, CountryCode, State, StateCode};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

/// Which orchestrator entry point a sync run came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOperation {
    /// Full countries → states → fix → cities run
    Populate,
    /// City stage only
    Cities,
}

impl std::fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncOperation::Populate => write!(f, "populate"),
            SyncOperation::Cities => write!(f, "cities"),
        }
    }
}

/// Sync run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Running => write!(f, "running"),
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for RunStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "running" => Ok(RunStatus::Running),
            "completed" => Ok(RunStatus::Completed),
            "failed" => Ok(RunStatus::Failed),
            _ => Err(Error::Other(format!("Unknown run status: {}", s))),
        }
    }
}

/// A sync run record
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SyncRun {
    pub id: String,
    pub operation: String,
    pub started_at: String,
    pub completed_at: Option<String>,
    pub status: String,
    pub countries: i64,
    pub states: i64,
    pub cities: i64,
    pub error: Option<String>,
}

impl SyncRun {
    pub fn new(operation: SyncOperation) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            operation: operation.to_string(),
            started_at: Utc::now().to_rfc3339(),
            completed_at: None,
            status: RunStatus::Running.to_string(),
            countries: 0,
            states: 0,
            cities: 0,
            error: None,
        }
    }

    pub fn get_status(&self) -> Result<RunStatus> {
        self.status.parse()
    }
}

/// Rows written by one sync run, per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCounts {
    pub countries: i64,
    pub states: i64,
    pub cities: i64,
}

/// Row counts for the three location tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableStats {
    pub country_count: i64,
    pub state_count: i64,
    pub city_count: i64,
}

/// Location database handle
///
/// Cloning is cheap; every clone shares the same pool.
#[derive(Clone)]
pub struct GeoDb {
    pool: SqlitePool,
}

impl GeoDb {
    /// Connect to the database named by the configuration, creating the schema if needed
    pub async fn connect(config: &Config) -> Result<Self> {
        Self::open(&config.paths.db_file, config.database.max_connections).await
    }

    /// Open a database file directly (without full config)
    pub async fn open(db_path: &Path, max_connections: u32) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        debug!("Connecting to SQLite database at {:?}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let db = Self { pool };

        if !db.is_initialized().await? {
            db.init_schema().await?;
        }

        Ok(db)
    }

    /// Initialize the database schema
    pub async fn init_schema(&self) -> Result<()> {
        info!("Initializing database schema");
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    /// Check if database is initialized
    pub async fn is_initialized(&self) -> Result<bool> {
        let result: Option<(i32,)> =
            sqlx::query_as("SELECT 1 FROM sqlite_master WHERE type='table' AND name='sync_runs'")
                .fetch_optional(&self.pool)
                .await?;
        Ok(result.is_some())
    }

    // ===== Upserts =====

    /// Insert a country, or overwrite its name and code
    pub async fn upsert_country(&self, country: &Country) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO countries (id, name, code)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                code = excluded.code
            "#,
        )
        .bind(country.id)
        .bind(&country.name)
        .bind(&country.code)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert a state, or overwrite its name, code and parent country
    pub async fn upsert_state(&self, state: &State) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO states (id, name, code, country_id)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                code = excluded.code,
                country_id = excluded.country_id
            "#,
        )
        .bind(state.id)
        .bind(&state.name)
        .bind(&state.code)
        .bind(state.country_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert a city, or overwrite its name and parent state
    pub async fn upsert_city(&self, city: &City) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO cities (id, name, state_id)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                state_id = excluded.state_id
            "#,
        )
        .bind(city.id)
        .bind(&city.name)
        .bind(city.state_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Strip the separator from every persisted state code.
    ///
    /// Returns the number of codes that changed.
    pub async fn fix_state_codes(&self) -> Result<u64> {
        let pattern = format!("%{}%", STATE_CODE_SEPARATOR);
        let result = sqlx::query("UPDATE states SET code = REPLACE(code, ?, '') WHERE code LIKE ?")
            .bind(STATE_CODE_SEPARATOR.to_string())
            .bind(pattern)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // ===== Pipeline join keys =====

    /// `(id, code)` for every persisted country, ordered by id
    pub async fn country_codes(&self) -> Result<Vec<CountryCode>> {
        let codes = sqlx::query_as::<_, CountryCode>(
            "SELECT id, code FROM countries ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(codes)
    }

    /// `(country_code, state_id, state_code)` for every persisted state,
    /// ordered by country id then state id
    pub async fn state_codes(&self) -> Result<Vec<StateCode>> {
        let codes = sqlx::query_as::<_, StateCode>(
            r#"
            SELECT c.code AS country_code, s.id AS state_id, s.code AS state_code
            FROM countries c
            JOIN states s ON c.id = s.country_id
            ORDER BY c.id, s.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(codes)
    }

    // ===== Reads =====

    /// List all countries
    pub async fn list_countries(&self) -> Result<Vec<Country>> {
        let countries = sqlx::query_as::<_, Country>("SELECT * FROM countries ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(countries)
    }

    /// List all states
    pub async fn list_states(&self) -> Result<Vec<State>> {
        let states = sqlx::query_as::<_, State>("SELECT * FROM states ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(states)
    }

    /// List all cities
    pub async fn list_cities(&self) -> Result<Vec<City>> {
        let cities = sqlx::query_as::<_, City>("SELECT * FROM cities ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(cities)
    }

    /// List states belonging to a country
    pub async fn states_by_country(&self, country_id: i64) -> Result<Vec<State>> {
        let states = sqlx::query_as::<_, State>(
            "SELECT * FROM states WHERE country_id = ? ORDER BY id",
        )
        .bind(country_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(states)
    }

    /// List cities belonging to a state
    pub async fn cities_by_state(&self, state_id: i64) -> Result<Vec<City>> {
        let cities = sqlx::query_as::<_, City>("SELECT * FROM cities WHERE state_id = ? ORDER BY id")
            .bind(state_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(cities)
    }

    // ===== Sync Run Operations =====

    /// Record the start of a sync run
    pub async fn start_sync_run(&self, operation: SyncOperation) -> Result<SyncRun> {
        let run = SyncRun::new(operation);
        sqlx::query(
            r#"
            INSERT INTO sync_runs (id, operation, started_at, status, countries, states, cities)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&run.id)
        .bind(&run.operation)
        .bind(&run.started_at)
        .bind(&run.status)
        .bind(run.countries)
        .bind(run.states)
        .bind(run.cities)
        .execute(&self.pool)
        .await?;
        Ok(run)
    }

    /// Close a sync run with its final status
    pub async fn complete_sync_run(
        &self,
        id: &str,
        status: RunStatus,
        counts: SyncCounts,
        error: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE sync_runs SET
                completed_at = ?,
                status = ?,
                countries = ?,
                states = ?,
                cities = ?,
                error = ?
            WHERE id = ?
            "#,
        )
        .bind(Utc::now().to_rfc3339())
        .bind(status.to_string())
        .bind(counts.countries)
        .bind(counts.states)
        .bind(counts.cities)
        .bind(error)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Get the most recently started sync run
    pub async fn latest_sync_run(&self) -> Result<Option<SyncRun>> {
        let run = sqlx::query_as::<_, SyncRun>(
            "SELECT * FROM sync_runs ORDER BY started_at DESC, rowid DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(run)
    }

    // ===== Statistics =====

    /// Row counts for the location tables
    pub async fn get_stats(&self) -> Result<TableStats> {
        let country_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM countries")
            .fetch_one(&self.pool)
            .await?;

        let state_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM states")
            .fetch_one(&self.pool)
            .await?;

        let city_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cities")
            .fetch_one(&self.pool)
            .await?;

        Ok(TableStats {
            country_count,
            state_count,
            city_count,
        })
    }
}
