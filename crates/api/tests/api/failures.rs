use crate::helpers::{spawn_app, MockClimateAccess};
use axum::{body::Body, http::Request};
use climate_api::Error;
use hyper::Method;
use std::sync::Arc;
use tower::ServiceExt;

#[tokio::test]
async fn storage_failure_surfaces_as_server_error() {
    let mut climate_db = MockClimateAccess::new();
    climate_db
        .expect_precipitation()
        .times(1)
        .returning(|| Err(Error::Query(sqlx::Error::PoolTimedOut)));

    let test_app = spawn_app(Arc::new(climate_db));

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1.0/precipitation")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_server_error());
}

#[tokio::test]
async fn empty_dataset_error_surfaces_as_server_error() {
    let mut climate_db = MockClimateAccess::new();
    climate_db
        .expect_trailing_year_observations()
        .times(1)
        .returning(|| Err(Error::EmptyDataset));

    let test_app = spawn_app(Arc::new(climate_db));

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1.0/tobs")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_server_error());
}

#[tokio::test]
async fn stats_failure_surfaces_as_server_error() {
    let mut climate_db = MockClimateAccess::new();
    climate_db
        .expect_temperature_stats()
        .times(1)
        .returning(|_| Err(Error::Query(sqlx::Error::PoolTimedOut)));

    let test_app = spawn_app(Arc::new(climate_db));

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1.0/2017-01-01")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_server_error());
}
