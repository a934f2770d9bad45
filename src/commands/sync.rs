//! Sync command - run the pipeline once from the shell

use super::build_sync;
use crate::config::Config;
use crate::db::{GeoDb, TableStats};
use crate::error::Result;
use crate::sync::PopulateReport;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Sync options
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Only re-run the city stage
    pub cities_only: bool,
}

/// What a sync invocation did
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSummary {
    /// Step messages of a full run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<PopulateReport>,
    /// Message of a city-only run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cities: Option<String>,
    /// Table sizes afterwards
    pub stats: TableStats,
}

/// Execute sync command
pub async fn cmd_sync(config: &Config, db: &GeoDb, options: SyncOptions) -> Result<SyncSummary> {
    let sync = build_sync(config, db.clone())?;

    let (report, cities) = if options.cities_only {
        info!("Refreshing cities");
        (None, Some(sync.refresh_cities().await?))
    } else {
        info!("Populating location tables");
        (Some(sync.populate_location_tables().await?), None)
    };

    let stats = db.get_stats().await?;
    Ok(SyncSummary {
        report,
        cities,
        stats,
    })
}

/// Print sync summary to console
pub fn print_sync_summary(summary: &SyncSummary) {
    println!("\n🌍 Sync Complete\n");
    if let Some(report) = &summary.report {
        println!("  {}", report.countries);
        println!("  {}", report.states);
        println!("  {}", report.states_code_typos);
        println!("  {}", report.cities);
    }
    if let Some(cities) = &summary.cities {
        println!("  {}", cities);
    }
    println!("\nRows:");
    println!("  Countries: {}", summary.stats.country_count);
    println!("  States: {}", summary.stats.state_count);
    println!("  Cities: {}", summary.stats.city_count);
}
