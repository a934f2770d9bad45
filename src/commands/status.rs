//! Status command implementation

use crate::config::Config;
use crate::db::{GeoDb, SyncRun, TableStats};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Status information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusInfo {
    pub config_path: String,
    pub db_path: String,
    pub upstream_url: String,
    pub api_key_env: String,
    pub api_key_set: bool,
    pub db_stats: TableStats,
    pub last_sync: Option<SyncRun>,
}

/// Get system status
pub async fn cmd_status(config: &Config, db: &GeoDb) -> Result<StatusInfo> {
    info!("Getting status");

    Ok(StatusInfo {
        config_path: config.paths.config_file.display().to_string(),
        db_path: config.paths.db_file.display().to_string(),
        upstream_url: config.upstream.base_url.clone(),
        api_key_env: config.upstream.api_key_env.clone(),
        api_key_set: config.api_key().is_some(),
        db_stats: db.get_stats().await?,
        last_sync: db.latest_sync_run().await?,
    })
}

/// Print status to console
pub fn print_status(status: &StatusInfo) {
    println!("\n📊 geosync Status\n");
    println!("Configuration: {}", status.config_path);
    println!("Database: {}", status.db_path);
    println!("\nUpstream:");
    println!("  URL: {}", status.upstream_url);
    let key_status = if status.api_key_set {
        "✓ Set"
    } else {
        "✗ Not set"
    };
    println!("  API key ({}): {}", status.api_key_env, key_status);
    println!("\nDatabase Stats:");
    println!("  Countries: {}", status.db_stats.country_count);
    println!("  States: {}", status.db_stats.state_count);
    println!("  Cities: {}", status.db_stats.city_count);

    match &status.last_sync {
        Some(run) => {
            println!("\nLast Sync:");
            println!("  Operation: {}", run.operation);
            println!("  Status: {}", run.status);
            println!("  Started: {}", run.started_at);
            if let Some(done) = &run.completed_at {
                println!("  Completed: {}", done);
            }
            println!(
                "  Rows: {} countries, {} states, {} cities",
                run.countries, run.states, run.cities
            );
            if let Some(err) = &run.error {
                println!("  Error: {}", err);
            }
        }
        None => println!("\nNo sync has run yet. Use 'geosync sync' to populate."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{RunStatus, SyncCounts, SyncOperation};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_status_reports_latest_run() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.init_paths(Some(tmp.path().to_path_buf()));
        let db = GeoDb::connect(&config).await.unwrap();

        let run = db.start_sync_run(SyncOperation::Cities).await.unwrap();
        db.complete_sync_run(&run.id, RunStatus::Failed, SyncCounts::default(), Some("boom"))
            .await
            .unwrap();

        let status = cmd_status(&config, &db).await.unwrap();
        assert_eq!(status.db_stats.country_count, 0);
        let last = status.last_sync.unwrap();
        assert_eq!(last.status, "failed");
        assert_eq!(last.error.as_deref(), Some("boom"));
    }
}
