#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use chrono::{TimeZone, Utc};
use datafono_mock::application::lifecycle::{DriverMode, TransactionLifecycle};
use datafono_mock::application::status::StatusResolver;
use datafono_mock::application::store::TransactionStore;
use datafono_mock::application::vault::TokenVault;
use datafono_mock::domain::ports::{PersistenceAdapterArc, RandomSourceArc};
use datafono_mock::infrastructure::clock::ManualClock;
use datafono_mock::infrastructure::in_memory::InMemoryAdapter;
use datafono_mock::interfaces::http::{AppState, router};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub clock: Arc<ManualClock>,
    pub store: TransactionStore,
    pub vault: TokenVault,
}

/// Builds an app wired with a manual clock and the given randomness, so
/// tests control both the simulated delays and the outcome draws.
pub async fn test_app(random: RandomSourceArc) -> TestApp {
    let adapter: PersistenceAdapterArc = Arc::new(InMemoryAdapter::new());
    let store = TransactionStore::open(adapter).await;
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2023, 1, 1, 10, 0, 0).unwrap(),
    ));
    let vault = TokenVault::new(clock.clone());
    let lifecycle = TransactionLifecycle::new(
        store.clone(),
        vault.clone(),
        clock.clone(),
        random.clone(),
        DriverMode::Lazy,
    );
    let resolver = StatusResolver::new(store.clone(), lifecycle.clone(), clock.clone(), random);

    TestApp {
        router: router(AppState {
            store: store.clone(),
            lifecycle,
            resolver,
        }),
        clock,
        store,
        vault,
    }
}

/// POSTs a JSON body with the expected X-SOURCE header and returns the
/// parsed response body.
pub async fn post(app: &Router, path: &str, body: Value) -> Value {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("X-SOURCE", "COMERCIA")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn get(app: &Router, path: &str) -> Value {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .header("X-SOURCE", "COMERCIA")
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn send(app: &Router, request: Request<Body>) -> Value {
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
