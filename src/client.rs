//! HTTP client for the upstream geography API
//!
//! Every request is a single authenticated GET against a path relative to the
//! configured base URL. There is no retry and no timeout: a failed call is
//! reported once and the caller decides what to abort.

use crate::config::{Config, UpstreamConfig};
use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

/// Authenticated client for the regional data API
#[derive(Debug, Clone)]
pub struct RegionalClient {
    client: Client,
    base_url: Url,
}

impl RegionalClient {
    /// Build a client from configuration, reading the API key from the environment
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            Error::Config(format!(
                "Upstream API key missing: set the {} environment variable",
                config.upstream.api_key_env
            ))
        })?;
        Self::new(&config.upstream, &api_key)
    }

    /// Build a client with an explicit API key
    pub fn new(config: &UpstreamConfig, api_key: &str) -> Result<Self> {
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;

        let header = HeaderName::from_bytes(config.api_key_header.as_bytes()).map_err(|e| {
            Error::Config(format!(
                "Invalid API key header '{}': {}",
                config.api_key_header, e
            ))
        })?;
        let mut value = HeaderValue::from_str(api_key.trim())
            .map_err(|e| Error::Config(format!("Invalid API key value: {}", e)))?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header, value);

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    /// Resolve a resource path, dropping any whitespace that leaked in from
    /// interpolated codes
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let cleaned: String = path.chars().filter(|c| !c.is_whitespace()).collect();
        Ok(self.base_url.join(cleaned.trim_start_matches('/'))?)
    }

    /// GET a resource and return the parsed JSON body
    pub async fn fetch(&self, path: &str) -> Result<serde_json::Value> {
        self.fetch_as(path).await
    }

    /// GET a resource that is a JSON array and decode each element
    pub async fn fetch_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        self.fetch_as(path).await
    }

    async fn fetch_as<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!("GET {}", url);

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            warn!(%url, error = %e, "Upstream request failed");
            Error::upstream(url.as_str(), e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                format!("HTTP {}", status)
            } else {
                body
            };
            warn!(%url, %status, %message, "Upstream returned an error");
            return Err(Error::upstream(url.as_str(), message));
        }

        response.json::<T>().await.map_err(|e| {
            warn!(%url, error = %e, "Upstream body could not be decoded");
            Error::upstream(url.as_str(), format!("invalid response body: {}", e))
        })
    }
}
