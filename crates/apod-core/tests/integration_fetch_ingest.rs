//! Integration test: local HTTP server standing in for the APOD API and image
//! host; fetch metadata, download, ingest, and check dedup across dates.

mod common;

use apod_core::apod::{ApodClient, RemoteError};
use apod_core::config::ApiConfig;
use apod_core::{fingerprint, Catalog, IngestOutcome, Ingestor};
use chrono::NaiveDate;
use common::http_server::{self, Canned};
use std::collections::HashMap;
use tempfile::tempdir;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn image_bytes() -> Vec<u8> {
    (0u8..251).cycle().take(12_345).collect()
}

fn metadata_json(base: &str, day: &str, image_path: &str) -> String {
    format!(
        r#"{{"date":"{}","title":"Test Nebula","media_type":"image","url":"{}{}","hdurl":"{}{}"}}"#,
        day, base, image_path, base, image_path
    )
}

fn client_for(base_url: &str) -> ApodClient {
    ApodClient::new(&ApiConfig {
        base_url: format!("{}/planetary/apod", base_url),
        api_key: "test-key".to_string(),
        connect_timeout_secs: 5,
        timeout_secs: 10,
    })
}

#[tokio::test]
async fn fetch_download_ingest_dedups_reused_image() {
    let mut routes = HashMap::new();
    routes.insert(
        "/image/2401/nebula.jpg".to_string(),
        Canned::ok(image_bytes()),
    );
    let images_host = http_server::start(routes);
    let mut routes = HashMap::new();
    routes.insert(
        "/planetary/apod".to_string(),
        Canned::ok(metadata_json(
            &images_host.base_url,
            "2024-01-05",
            "/image/2401/nebula.jpg",
        )),
    );
    let api = http_server::start(routes);

    let client = client_for(&api.base_url);
    let info = tokio::task::spawn_blocking({
        let client = client.clone();
        move || client.fetch_metadata(date("2024-01-05"))
    })
    .await
    .unwrap()
    .unwrap();
    assert_eq!(info.date, date("2024-01-05"));
    assert_eq!(info.suggested_name(), "nebula.jpg");
    let first_req = &api.requests()[0];
    assert!(first_req.contains("api_key=test-key"), "{}", first_req);
    assert!(first_req.contains("date=2024-01-05"), "{}", first_req);

    let url = info.image_url().to_string();
    let bytes = tokio::task::spawn_blocking({
        let client = client.clone();
        move || client.download(&url)
    })
    .await
    .unwrap()
    .unwrap();
    assert_eq!(bytes, image_bytes());

    let images = tempdir().unwrap();
    let catalog = Catalog::open_or_create(images.path().join("apod_images.db"))
        .await
        .unwrap();
    let ingestor = Ingestor::new(catalog);
    let out = ingestor
        .ingest(info.date, &info.suggested_name(), &bytes, images.path())
        .await
        .unwrap();
    let stored = images.path().canonicalize().unwrap().join("nebula.jpg");
    assert_eq!(
        out,
        IngestOutcome::Ingested {
            digest: fingerprint(&bytes),
            path: stored.clone(),
            size: 12_345,
        }
    );

    // The same picture published again on a later date is not stored twice.
    let again = ingestor
        .ingest(date("2024-01-06"), "nebula_repost.jpg", &bytes, images.path())
        .await
        .unwrap();
    assert_eq!(
        again,
        IngestOutcome::AlreadyCached {
            digest: fingerprint(&bytes),
            existing_path: stored,
        }
    );
    assert_eq!(ingestor.catalog().count().await.unwrap(), 1);
    assert!(ingestor.catalog().verify().await.unwrap().is_empty());
}

#[tokio::test]
async fn metadata_errors_are_classified() {
    let mut routes = HashMap::new();
    routes.insert(
        "/planetary/apod".to_string(),
        Canned::status(
            400,
            r#"{"code":400,"msg":"Date must be between Jun 16, 1995 and Jan 05, 2024.","service_version":"v1"}"#,
        ),
    );
    routes.insert("/broken/apod".to_string(), Canned::status(503, "down"));
    routes.insert("/garbage/apod".to_string(), Canned::ok("<html>nope</html>"));
    let server = http_server::start(routes);

    let client = client_for(&server.base_url);
    let err = tokio::task::spawn_blocking(move || client.fetch_metadata(date("2024-01-05")))
        .await
        .unwrap()
        .unwrap_err();
    match err {
        RemoteError::NotFound {
            status, message, url, ..
        } => {
            assert_eq!(status, 400);
            assert!(message.unwrap().starts_with("Date must be between"));
            assert!(!url.contains("test-key"), "api key leaked into {}", url);
        }
        other => panic!("expected NotFound, got {:?}", other),
    }

    let broken = ApodClient::new(&ApiConfig {
        base_url: format!("{}/broken/apod", server.base_url),
        ..ApiConfig::default()
    });
    let err = tokio::task::spawn_blocking(move || broken.fetch_metadata(date("2024-01-05")))
        .await
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, RemoteError::RemoteUnavailable { .. }), "got {:?}", err);

    let garbage = ApodClient::new(&ApiConfig {
        base_url: format!("{}/garbage/apod", server.base_url),
        ..ApiConfig::default()
    });
    let err = tokio::task::spawn_blocking(move || garbage.fetch_metadata(date("2024-01-05")))
        .await
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, RemoteError::InvalidResponse { .. }), "got {:?}", err);
}

#[tokio::test]
async fn download_errors_are_classified() {
    let mut routes = HashMap::new();
    routes.insert("/empty.jpg".to_string(), Canned::ok(Vec::new()));
    let server = http_server::start(routes);
    let client = client_for(&server.base_url);

    let empty_url = server.url("/empty.jpg");
    let c = client.clone();
    let err = tokio::task::spawn_blocking(move || c.download(&empty_url))
        .await
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, RemoteError::EmptyBody { .. }), "got {:?}", err);

    let missing_url = server.url("/missing.jpg");
    let err = tokio::task::spawn_blocking(move || client.download(&missing_url))
        .await
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, RemoteError::NotFound { status: 404, .. }), "got {:?}", err);

    // Nothing listens on port 9 of a closed local socket.
    let unreachable = ApodClient::new(&ApiConfig {
        connect_timeout_secs: 2,
        timeout_secs: 2,
        ..ApiConfig::default()
    });
    let err = tokio::task::spawn_blocking(move || unreachable.download("http://127.0.0.1:9/x.jpg"))
        .await
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, RemoteError::RemoteUnavailable { .. }), "got {:?}", err);
}
