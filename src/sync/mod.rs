//! Reference data synchronization
//!
//! The pipeline runs strictly in this order:
//! 1. countries are fetched and upserted
//! 2. states are fetched per persisted country and upserted
//! 3. stray separators are stripped from state codes
//! 4. cities are fetched per persisted (cleaned) state and upserted
//!
//! States depend on persisted countries and city URLs depend on cleaned state
//! codes, so the order cannot change. Every write is its own statement: a
//! failure part way leaves earlier rows in place.

mod fetch;

pub use fetch::*;

use crate::client::RegionalClient;
use crate::config::Config;
use crate::db::{GeoDb, RunStatus, SyncCounts, SyncOperation, SyncRun};
use crate::error::{Error, Result};
use crate::models::Country;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

pub const COUNTRIES_UPDATED: &str = "Countries Table Updated..";
pub const STATES_UPDATED: &str = "States Table Updated..";
pub const STATE_CODES_FIXED: &str = "States Table TYPO's Fixed..";
pub const CITIES_UPDATED: &str = "Cities Table Updated..";

/// Status messages from a full populate run, one per step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PopulateReport {
    pub countries: String,
    pub states: String,
    pub states_code_typos: String,
    pub cities: String,
}

/// Drives the fetch stages and the upserts against one database
#[derive(Clone)]
pub struct LocationSync {
    db: GeoDb,
    client: Arc<RegionalClient>,
    fetch_concurrency: usize,
}

impl LocationSync {
    pub fn new(db: GeoDb, client: Arc<RegionalClient>, fetch_concurrency: usize) -> Self {
        Self {
            db,
            client,
            fetch_concurrency: fetch_concurrency.max(1),
        }
    }

    /// Build from configuration with an already constructed client
    pub fn from_config(config: &Config, db: GeoDb, client: Arc<RegionalClient>) -> Self {
        Self::new(db, client, config.sync.fetch_concurrency)
    }

    pub fn db(&self) -> &GeoDb {
        &self.db
    }

    // ===== Upsert steps =====

    /// Fetch countries and upsert each one. Returns rows written.
    pub async fn update_countries(&self) -> Result<usize> {
        let countries = self.fetch_countries().await?;
        let written = countries.len();
        for country in countries {
            self.db.upsert_country(&Country::from(country)).await?;
        }
        info!(written, "Countries table updated");
        Ok(written)
    }

    /// Fetch states for persisted countries and upsert each one. Returns rows written.
    pub async fn update_states(&self) -> Result<usize> {
        let states = self.fetch_states().await?;
        for state in &states {
            self.db.upsert_state(state).await?;
        }
        info!(written = states.len(), "States table updated");
        Ok(states.len())
    }

    /// Strip separators from persisted state codes. Returns codes changed.
    pub async fn fix_state_codes(&self) -> Result<u64> {
        let changed = self.db.fix_state_codes().await?;
        info!(changed, "State codes cleaned");
        Ok(changed)
    }

    /// Fetch cities for persisted states and upsert each one. Returns rows written.
    pub async fn update_cities(&self) -> Result<usize> {
        let cities = self.fetch_cities().await?;
        for city in &cities {
            self.db.upsert_city(city).await?;
        }
        info!(written = cities.len(), "Cities table updated");
        Ok(cities.len())
    }

    // ===== Orchestration =====

    /// Run the whole pipeline: countries, states, code cleanup, cities.
    ///
    /// The first failing step stops the run and its error is returned; rows
    /// written by earlier steps stay.
    pub async fn populate_location_tables(&self) -> Result<PopulateReport> {
        let run = self.db.start_sync_run(SyncOperation::Populate).await?;
        info!(run_id = %run.id, "Starting populate run");

        let mut counts = SyncCounts::default();
        let outcome = self.populate_steps(&mut counts).await;
        self.finish_run(&run, counts, outcome.as_ref().err()).await;
        outcome
    }

    async fn populate_steps(&self, counts: &mut SyncCounts) -> Result<PopulateReport> {
        counts.countries = to_count(self.update_countries().await?);
        info!("{}", COUNTRIES_UPDATED);

        counts.states = to_count(self.update_states().await?);
        info!("{}", STATES_UPDATED);

        self.fix_state_codes().await?;
        info!("{}", STATE_CODES_FIXED);

        counts.cities = to_count(self.update_cities().await?);
        info!("{}", CITIES_UPDATED);

        Ok(PopulateReport {
            countries: COUNTRIES_UPDATED.to_string(),
            states: STATES_UPDATED.to_string(),
            states_code_typos: STATE_CODES_FIXED.to_string(),
            cities: CITIES_UPDATED.to_string(),
        })
    }

    /// Re-run only the city stage against the current states table
    pub async fn refresh_cities(&self) -> Result<String> {
        let run = self.db.start_sync_run(SyncOperation::Cities).await?;
        info!(run_id = %run.id, "Starting city refresh");

        let outcome = self.update_cities().await;
        let counts = SyncCounts {
            cities: outcome.as_ref().map_or(0, |n| to_count(*n)),
            ..SyncCounts::default()
        };
        self.finish_run(&run, counts, outcome.as_ref().err()).await;
        outcome.map(|_| CITIES_UPDATED.to_string())
    }

    async fn finish_run(&self, run: &SyncRun, counts: SyncCounts, failure: Option<&Error>) {
        let (status, message) = match failure {
            Some(e) => {
                error!(run_id = %run.id, error = %e, "Sync run failed");
                (RunStatus::Failed, Some(e.to_string()))
            }
            None => (RunStatus::Completed, None),
        };

        if let Err(e) = self
            .db
            .complete_sync_run(&run.id, status, counts, message.as_deref())
            .await
        {
            warn!(run_id = %run.id, error = %e, "Could not record sync run outcome");
        }
    }
}

fn to_count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
