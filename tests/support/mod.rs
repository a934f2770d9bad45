//! Shared fixtures: a mocked upstream API and a throwaway database.

#![allow(dead_code)]

use geosync::client::RegionalClient;
use geosync::config::UpstreamConfig;
use geosync::db::GeoDb;
use geosync::sync::LocationSync;
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "test-key";

pub async fn mount_json(server: &MockServer, route: &str, body: Value) {
    mount_response(server, route, ResponseTemplate::new(200).set_body_json(body)).await;
}

pub async fn mount_delayed_json(server: &MockServer, route: &str, body: Value, delay: Duration) {
    mount_response(
        server,
        route,
        ResponseTemplate::new(200).set_body_json(body).set_delay(delay),
    )
    .await;
}

pub async fn mount_response(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/{}", route)))
        .and(header("X-CSCAPI-KEY", API_KEY))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Three countries: one with a state, one with two states (one carrying a
/// stray separator in its code) and one with none.
pub async fn mount_world(server: &MockServer) {
    mount_json(
        server,
        "countries/",
        json!([
            {"id": 1, "name": "Afghanistan", "iso2": "AF", "iso3": "AFG"},
            {"id": 2, "name": "Pakistan", "iso2": "PK", "iso3": "PAK"},
            {"id": 3, "name": "Nauru", "iso2": "NR", "iso3": "NRU"}
        ]),
    )
    .await;

    mount_json(
        server,
        "countries/AF/states",
        json!([{"id": 10, "name": "Badakhshan", "iso2": "BDS"}]),
    )
    .await;
    mount_json(
        server,
        "countries/PK/states",
        json!([
            {"id": 20, "name": "Islamabad Capital Territory", "iso2": "-IS"},
            {"id": 21, "name": "Punjab", "iso2": "PB"}
        ]),
    )
    .await;
    mount_json(server, "countries/NR/states", json!([])).await;

    mount_json(
        server,
        "countries/AF/states/BDS/cities",
        json!([{"id": 100, "name": "Fayzabad"}]),
    )
    .await;
    // Only reachable once the state code has been cleaned.
    mount_json(
        server,
        "countries/PK/states/IS/cities",
        json!([{"id": 200, "name": "Islamabad"}]),
    )
    .await;
    mount_json(
        server,
        "countries/PK/states/PB/cities",
        json!([
            {"id": 201, "name": "Lahore"},
            {"id": 202, "name": "Multan"}
        ]),
    )
    .await;
}

pub fn client_for(server: &MockServer) -> Arc<RegionalClient> {
    let config = UpstreamConfig {
        base_url: format!("{}/v1/", server.uri()),
        ..UpstreamConfig::default()
    };
    Arc::new(RegionalClient::new(&config, API_KEY).expect("client should build"))
}

pub const DB_FILE: &str = "geo.db";

pub async fn test_db() -> (GeoDb, TempDir) {
    let tmp = TempDir::new().expect("tempdir");
    let db = GeoDb::open(&tmp.path().join(DB_FILE), 5)
        .await
        .expect("database should open");
    (db, tmp)
}

pub async fn sync_for(server: &MockServer, concurrency: usize) -> (LocationSync, TempDir) {
    let (db, tmp) = test_db().await;
    (LocationSync::new(db, client_for(server), concurrency), tmp)
}

/// Make SQLite abort any insert of `id` into `table` in the test database
pub async fn reject_inserts(tmp: &TempDir, table: &str, id: i64) {
    let options = SqliteConnectOptions::new().filename(tmp.path().join(DB_FILE));
    let pool = SqlitePool::connect_with(options)
        .await
        .expect("second connection should open");
    let sql = format!(
        "CREATE TRIGGER reject_{table}_{id} BEFORE INSERT ON {table} \
         WHEN NEW.id = {id} BEGIN SELECT RAISE(ABORT, 'row rejected'); END"
    );
    sqlx::query(&sql)
        .execute(&pool)
        .await
        .expect("trigger should install");
    pool.close().await;
}
