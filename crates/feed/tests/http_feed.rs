use std::time::Duration;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use secrecy::SecretString;
use serde_json::{json, Value};
use shelf_core::{FeedError, ProductFeed};
use shelf_feed::HttpFeed;

fn feed_page() -> Value {
    json!({
        "resources": [
            {
                "offerId": "OLJCESPC7Z",
                "title": "Sunglasses",
                "description": "Add a modern touch to your outfits.",
                "imageLink": "/static/img/products/sunglasses.jpg",
                "price": { "value": "19.99", "currency": "USD" },
                "productTypes": ["accessories"]
            },
            {
                "offerId": "66VCHSJNUP",
                "title": "Tank Top",
                "description": "Perfectly cropped cotton tank.",
                "imageLink": "/static/img/products/tank-top.jpg",
                "price": { "value": "18.99", "currency": "USD" },
                "productTypes": ["clothing"]
            }
        ]
    })
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("fixture bind");
    let address = listener.local_addr().expect("fixture local address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("fixture server should run");
    });
    format!("http://{address}")
}

fn timeout() -> Duration {
    Duration::from_secs(5)
}

#[tokio::test]
async fn fetches_records_from_a_remote_feed() {
    let base = serve(Router::new().route("/products", get(|| async { Json(feed_page()) }))).await;

    let feed =
        HttpFeed::new(format!("{base}/products"), None, timeout()).expect("client should build");
    let records = feed.fetch().await.expect("fetch should succeed");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].offer_id, "OLJCESPC7Z");
    assert_eq!(records[1].title, "Tank Top");
}

#[tokio::test]
async fn server_errors_surface_as_transport_failures() {
    let base = serve(
        Router::new().route("/products", get(|| async { StatusCode::INTERNAL_SERVER_ERROR })),
    )
    .await;

    let feed =
        HttpFeed::new(format!("{base}/products"), None, timeout()).expect("client should build");
    let error = feed.fetch().await.expect_err("fetch must fail");

    assert!(matches!(error, FeedError::Transport(_)));
}

#[tokio::test]
async fn non_json_bodies_surface_as_decode_failures() {
    let base =
        serve(Router::new().route("/products", get(|| async { "plain text, not a page" }))).await;

    let feed =
        HttpFeed::new(format!("{base}/products"), None, timeout()).expect("client should build");
    let error = feed.fetch().await.expect_err("fetch must fail");

    assert!(matches!(error, FeedError::Decode(_)));
}

#[tokio::test]
async fn the_configured_credential_is_presented_as_a_bearer_token() {
    let guarded = |headers: HeaderMap| async move {
        let authorized = headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value == "Bearer feed-api-key");
        if authorized {
            Ok(Json(feed_page()))
        } else {
            Err(StatusCode::UNAUTHORIZED)
        }
    };
    let base = serve(Router::new().route("/products", get(guarded))).await;

    let anonymous =
        HttpFeed::new(format!("{base}/products"), None, timeout()).expect("client should build");
    assert!(matches!(anonymous.fetch().await, Err(FeedError::Transport(_))));

    let credentialed = HttpFeed::new(
        format!("{base}/products"),
        Some(SecretString::from("feed-api-key".to_string())),
        timeout(),
    )
    .expect("client should build");
    let records = credentialed.fetch().await.expect("authorized fetch should succeed");

    assert_eq!(records.len(), 2);
}
