//! Location records as stored locally and as served by the upstream API

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A country row
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Country {
    pub id: i64,
    pub name: String,
    pub code: String,
}

/// A state row, linked to its country
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct State {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub country_id: i64,
}

/// A city row, linked to its state
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct City {
    pub id: i64,
    pub name: String,
    pub state_id: i64,
}

/// `(id, code)` of a persisted country, used to build state URLs
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CountryCode {
    pub id: i64,
    pub code: String,
}

/// Join key for a persisted state, used to build city URLs
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct StateCode {
    pub country_code: String,
    pub state_id: i64,
    pub state_code: String,
}

/// Country as returned by `countries/`
///
/// Only the fields we persist are decoded; the API sends many more.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamCountry {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub iso2: Option<String>,
}

/// State as returned by `countries/{code}/states`
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamState {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub iso2: Option<String>,
}

/// City as returned by `countries/{code}/states/{code}/cities`
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamCity {
    pub id: i64,
    pub name: String,
}

impl From<UpstreamCountry> for Country {
    fn from(c: UpstreamCountry) -> Self {
        Self {
            id: c.id,
            name: c.name,
            code: c.iso2.unwrap_or_default(),
        }
    }
}

impl UpstreamState {
    /// Attach the parent country the state was fetched for
    pub fn into_state(self, country_id: i64) -> State {
        State {
            id: self.id,
            name: self.name,
            code: self.iso2.unwrap_or_default(),
            country_id,
        }
    }
}

impl UpstreamCity {
    /// Attach the parent state the city was fetched for
    pub fn into_city(self, state_id: i64) -> City {
        City {
            id: self.id,
            name: self.name,
            state_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_country_ignores_extra_fields() {
        let json = r#"{"id": 167, "name": "Pakistan", "iso2": "PK", "iso3": "PAK", "phonecode": "92"}"#;
        let country: Country = serde_json::from_str::<UpstreamCountry>(json).unwrap().into();
        assert_eq!(
            country,
            Country {
                id: 167,
                name: "Pakistan".to_string(),
                code: "PK".to_string()
            }
        );
    }

    #[test]
    fn test_missing_iso2_becomes_empty_code() {
        let state: UpstreamState = serde_json::from_str(r#"{"id": 7, "name": "Nowhere"}"#).unwrap();
        let state = state.into_state(3);
        assert_eq!(state.code, "");
        assert_eq!(state.country_id, 3);
    }
}
