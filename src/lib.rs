//! geosync - reference geography sync service
//!
//! Pulls countries, states and cities from a third-party REST API, upserts
//! them into SQLite keyed by upstream ids, and serves the tables over HTTP.

pub mod client;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod server;
pub mod sync;

pub use error::{Error, Result};
