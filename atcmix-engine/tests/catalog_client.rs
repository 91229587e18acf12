//! Catalog client integration tests
//!
//! Stands up an in-process HTTP fixture serving the catalog API's JSON
//! envelope and drives the real client against it.

use axum::extract::Query;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};
use std::collections::HashMap;

use atcmix_engine::catalog::CatalogClient;

async fn stations() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": [
            {
                "id": "kjfk-twr",
                "name": "JFK Tower",
                "airport_code": "KJFK",
                "frequency": "119.100",
                "description": "New York JFK tower",
                "stream_url": "https://d.liveatc.net/kjfk_twr"
            },
            {
                "id": "ksfo-twr",
                "name": "SFO Tower",
                "airport_code": "KSFO",
                "frequency": "120.500",
                "description": "San Francisco tower",
                "stream_url": "https://d.liveatc.net/ksfo_twr"
            }
        ]
    }))
}

async fn sources() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": [
            {
                "id": "lofi-1",
                "name": "Lofi Radio",
                "source_type": "stream",
                "stream_url": "https://example.com/lofi",
                "thumbnail": null
            }
        ]
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "success": true, "data": { "status": "ok" } }))
}

async fn extract(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let url = params.get("url").cloned().unwrap_or_default();
    Json(json!({
        "success": true,
        "data": {
            "stream_url": format!("{url}#resolved"),
            "title": "Extracted stream"
        }
    }))
}

/// Bind the fixture on an ephemeral port and return the API base URL
async fn spawn_fixture() -> String {
    let app = Router::new()
        .route("/api/atc-stations", get(stations))
        .route("/api/music-sources", get(sources))
        .route("/api/health", get(health))
        .route("/api/youtube/extract", get(extract));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}/api")
}

#[tokio::test]
async fn fetches_and_unwraps_station_list() {
    let base = spawn_fixture().await;
    let client = CatalogClient::new(base);

    let stations = client.atc_stations().await.unwrap();
    assert_eq!(stations.len(), 2);
    assert_eq!(stations[0].airport_code, "KJFK");
    assert_eq!(stations[1].stream_url, "https://d.liveatc.net/ksfo_twr");
}

#[tokio::test]
async fn fetches_music_sources() {
    let base = spawn_fixture().await;
    let client = CatalogClient::new(base);

    let sources = client.music_sources().await.unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].source_type, "stream");
    assert!(sources[0].thumbnail.is_none());
}

#[tokio::test]
async fn health_reports_success_flag() {
    let base = spawn_fixture().await;
    let client = CatalogClient::new(base);
    assert!(client.health().await.unwrap());
}

#[tokio::test]
async fn extract_round_trips_the_video_url() {
    let base = spawn_fixture().await;
    let client = CatalogClient::new(base);

    let info = client
        .extract_youtube("https://youtube.com/watch?v=abc123")
        .await
        .unwrap();
    assert_eq!(info.stream_url, "https://youtube.com/watch?v=abc123#resolved");
    assert_eq!(info.title, "Extracted stream");
}

#[tokio::test]
async fn transport_failure_maps_to_catalog_error() {
    // Nothing is listening here
    let client = CatalogClient::new("http://127.0.0.1:9/api");
    let err = client.atc_stations().await.unwrap_err();
    assert!(matches!(err, atcmix_engine::Error::Catalog(_)));
}
