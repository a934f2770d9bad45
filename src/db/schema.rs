//! SQLite schema definition

/// SQL schema for the location database
pub const SCHEMA_SQL: &str = r#"
-- Countries: ids are assigned upstream, never locally
CREATE TABLE IF NOT EXISTS countries (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    code TEXT NOT NULL
);

-- States: code may carry a stray '-' until fix_state_codes runs
CREATE TABLE IF NOT EXISTS states (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    code TEXT NOT NULL,
    country_id INTEGER NOT NULL REFERENCES countries(id)
);

-- Cities
CREATE TABLE IF NOT EXISTS cities (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    state_id INTEGER NOT NULL REFERENCES states(id)
);

-- Sync runs: one row per orchestrator invocation
CREATE TABLE IF NOT EXISTS sync_runs (
    id TEXT PRIMARY KEY,
    operation TEXT NOT NULL,
    started_at TEXT NOT NULL,
    completed_at TEXT,
    status TEXT NOT NULL,
    countries INTEGER NOT NULL DEFAULT 0,
    states INTEGER NOT NULL DEFAULT 0,
    cities INTEGER NOT NULL DEFAULT 0,
    error TEXT
);

CREATE INDEX IF NOT EXISTS idx_states_country ON states(country_id);
CREATE INDEX IF NOT EXISTS idx_cities_state ON cities(state_id);
CREATE INDEX IF NOT EXISTS idx_sync_runs_started ON sync_runs(started_at);
"#;

/// Separator the upstream API leaves in some state codes
pub const STATE_CODE_SEPARATOR: char = '-';
