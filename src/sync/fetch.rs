//! Upstream fetch stages
//!
//! Each stage reads its join keys back from the store rather than from the
//! previous stage's output, so a stage can be re-run on its own as long as
//! its parent table is populated.

use super::LocationSync;
use crate::error::{Error, Result};
use crate::models::{City, State, UpstreamCity, UpstreamCountry, UpstreamState};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::future::Future;
use tracing::{debug, info};

/// Countries listing
pub const COUNTRIES_PATH: &str = "countries/";

/// States of one country
pub fn states_path(country_code: &str) -> String {
    format!("countries/{}/states", country_code)
}

/// Cities of one state
pub fn cities_path(country_code: &str, state_code: &str) -> String {
    format!("countries/{}/states/{}/cities", country_code, state_code)
}

impl LocationSync {
    /// Fetch the full country list
    pub async fn fetch_countries(&self) -> Result<Vec<UpstreamCountry>> {
        let countries: Vec<UpstreamCountry> = self.client.fetch_list(COUNTRIES_PATH).await?;
        info!(count = countries.len(), "Fetched countries");
        Ok(countries)
    }

    /// Fetch the states of every persisted country, linked by `country_id`
    pub async fn fetch_states(&self) -> Result<Vec<State>> {
        let countries = self.db.country_codes().await?;
        info!(countries = countries.len(), "Fetching states");

        let client = &self.client;
        let states = self
            .fan_out(countries, |country| async move {
                let found: Vec<UpstreamState> =
                    client.fetch_list(&states_path(&country.code)).await?;
                if found.is_empty() {
                    debug!(country = %country.code, "No states");
                }
                Ok::<_, Error>(
                    found
                        .into_iter()
                        .map(|s| s.into_state(country.id))
                        .collect::<Vec<_>>(),
                )
            })
            .await?;

        info!(count = states.len(), "Fetched states");
        Ok(states)
    }

    /// Fetch the cities of every persisted state, linked by `state_id`
    pub async fn fetch_cities(&self) -> Result<Vec<City>> {
        let keys = self.db.state_codes().await?;
        info!(states = keys.len(), "Fetching cities");

        let client = &self.client;
        let cities = self
            .fan_out(keys, |key| async move {
                let path = cities_path(&key.country_code, &key.state_code);
                let found: Vec<UpstreamCity> = client.fetch_list(&path).await?;
                if found.is_empty() {
                    debug!(country = %key.country_code, state = %key.state_code, "No cities");
                }
                Ok::<_, Error>(
                    found
                        .into_iter()
                        .map(|c| c.into_city(key.state_id))
                        .collect::<Vec<_>>(),
                )
            })
            .await?;

        info!(count = cities.len(), "Fetched cities");
        Ok(cities)
    }

    /// Run one request per key with at most `fetch_concurrency` in flight.
    ///
    /// Output keeps key order. The first error drops every pending request
    /// and fails the whole stage.
    async fn fan_out<K, T, F, Fut>(&self, keys: Vec<K>, fetch: F) -> Result<Vec<T>>
    where
        F: FnMut(K) -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        let batches: Vec<Vec<T>> = stream::iter(keys)
            .map(fetch)
            .buffered(self.fetch_concurrency.max(1))
            .try_collect()
            .await?;
        Ok(batches.into_iter().flatten().collect())
    }
}
