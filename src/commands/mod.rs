//! CLI commands implementation

pub mod init;
pub mod serve;
pub mod status;
pub mod sync;

pub use init::*;
pub use serve::*;
pub use status::*;
pub use sync::*;

use crate::client::RegionalClient;
use crate::config::Config;
use crate::db::GeoDb;
use crate::error::Result;
use crate::sync::LocationSync;
use std::sync::Arc;

/// Wire the upstream client and the database into a sync driver
pub fn build_sync(config: &Config, db: GeoDb) -> Result<LocationSync> {
    let client = Arc::new(RegionalClient::from_config(config)?);
    Ok(LocationSync::from_config(config, db, client))
}
