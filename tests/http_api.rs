mod support;

use geosync::server::{create_router, AppState};
use geosync::sync::{CITIES_UPDATED, STATE_CODES_FIXED};
use serde_json::Value;
use std::net::SocketAddr;
use support::*;
use tempfile::TempDir;
use tokio::net::TcpListener;
use wiremock::{MockServer, ResponseTemplate};

async fn start_api(upstream: &MockServer) -> (SocketAddr, TempDir) {
    let (sync, tmp) = sync_for(upstream, 1).await;
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_router(AppState::new(sync));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, tmp)
}

async fn get(addr: SocketAddr, route: &str) -> (u16, Value) {
    let response = reqwest::get(format!("http://{}{}", addr, route))
        .await
        .unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

fn ids(body: &Value) -> Vec<i64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|row| row["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn populate_then_query() {
    let upstream = MockServer::start().await;
    mount_world(&upstream).await;
    let (addr, _tmp) = start_api(&upstream).await;

    let (status, body) = get(addr, "/countries").await;
    assert_eq!(status, 200);
    assert_eq!(body, serde_json::json!([]));

    let (status, report) = get(addr, "/populateLocationTables").await;
    assert_eq!(status, 200);
    assert_eq!(report["STATES_CODE_TYPOS"], STATE_CODES_FIXED);
    assert_eq!(report["CITIES"], CITIES_UPDATED);
    assert_eq!(report.as_object().unwrap().len(), 4);

    let (_, countries) = get(addr, "/countries").await;
    assert_eq!(ids(&countries), vec![1, 2, 3]);
    assert_eq!(countries[1]["code"], "PK");

    let (_, states) = get(addr, "/states").await;
    assert_eq!(ids(&states), vec![10, 20, 21]);

    let (_, cities) = get(addr, "/cities").await;
    assert_eq!(ids(&cities), vec![100, 200, 201, 202]);

    let (status, pakistan) = get(addr, "/states/2").await;
    assert_eq!(status, 200);
    assert_eq!(ids(&pakistan), vec![20, 21]);
    assert_eq!(pakistan[0]["code"], "IS");
    assert_eq!(pakistan[0]["country_id"], 2);

    let (_, nauru) = get(addr, "/states/3").await;
    assert!(nauru.as_array().unwrap().is_empty());

    let (_, punjab) = get(addr, "/cities/21").await;
    assert_eq!(ids(&punjab), vec![201, 202]);
}

#[tokio::test]
async fn update_states_route_refreshes_cities() {
    let upstream = MockServer::start().await;
    mount_world(&upstream).await;
    let (addr, _tmp) = start_api(&upstream).await;

    get(addr, "/populateLocationTables").await;
    let (status, body) = get(addr, "/updateStates").await;
    assert_eq!(status, 200);
    assert_eq!(body, Value::String(CITIES_UPDATED.to_string()));
}

#[tokio::test]
async fn malformed_id_is_internal_error() {
    let upstream = MockServer::start().await;
    let (addr, _tmp) = start_api(&upstream).await;

    for route in ["/states/abc", "/cities/1.5"] {
        let (status, body) = get(addr, route).await;
        assert_eq!(status, 500);
        assert_eq!(body, serde_json::json!({"error": "Internal Server Error"}));
    }
}

#[tokio::test]
async fn upstream_failure_is_internal_error() {
    let upstream = MockServer::start().await;
    mount_response(
        &upstream,
        "countries/",
        ResponseTemplate::new(401).set_body_string("Unauthorized."),
    )
    .await;
    let (addr, _tmp) = start_api(&upstream).await;

    let (status, body) = get(addr, "/populateLocationTables").await;
    assert_eq!(status, 500);
    assert_eq!(body, serde_json::json!({"error": "Internal Server Error"}));

    let (_, countries) = get(addr, "/countries").await;
    assert!(countries.as_array().unwrap().is_empty());
}
