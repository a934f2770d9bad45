//! Default values for configuration

/// Default upstream base URL (countrystatecity.in v1 API)
pub fn default_upstream_base_url() -> String {
    std::env::var("GEOSYNC_UPSTREAM_URL")
        .unwrap_or_else(|_| "https://api.countrystatecity.in/v1/".to_string())
}

/// Default environment variable holding the upstream API key
pub fn default_upstream_api_key_env() -> String {
    "CSC_API_KEY".to_string()
}

/// Default header the API key is sent in
pub fn default_upstream_api_key_header() -> String {
    "X-CSCAPI-KEY".to_string()
}

/// Default user agent
pub fn default_upstream_user_agent() -> String {
    format!("geosync/{}", env!("CARGO_PKG_VERSION"))
}

/// Default listen address
pub fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

/// Default listen port, honouring `PORT` when set
pub fn default_server_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000)
}

/// Default SQLite pool size
pub fn default_database_max_connections() -> u32 {
    5
}

/// Default upstream requests in flight per fan-out stage (1 = sequential)
pub fn default_fetch_concurrency() -> usize {
    1
}
