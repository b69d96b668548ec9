use axum::{
    body::{to_bytes, Body},
    response::Response,
    Router,
};
use climate_api::{
    app, AppState, BoundedTemperatureStats, ClimateAccess, ClimateData, Database, Error,
    PrecipitationRecord, TemperatureObservation, TemperatureStats,
};
use mockall::mock;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::{path::Path, str::FromStr, sync::Arc};
use tempfile::TempDir;

mock! {
    pub ClimateAccess {}

    #[async_trait::async_trait]
    impl ClimateData for ClimateAccess {
        async fn precipitation(&self) -> Result<Vec<PrecipitationRecord>, Error>;
        async fn station_names(&self) -> Result<Vec<String>, Error>;
        async fn trailing_year_observations(&self) -> Result<Vec<TemperatureObservation>, Error>;
        async fn temperature_stats(&self, start_date: &str) -> Result<TemperatureStats, Error>;
        async fn temperature_stats_between(
            &self,
            start_date: &str,
            end_date: &str,
        ) -> Result<BoundedTemperatureStats, Error>;
    }
}

pub struct TestApp {
    pub app: Router,
    // Keeps the dataset file alive for as long as the app runs.
    _data_dir: Option<TempDir>,
}

/// Build the app over an arbitrary data-access implementation (mocks).
pub fn spawn_app(climate_db: Arc<dyn ClimateData>) -> TestApp {
    let app_state = AppState {
        remote_url: "http://127.0.0.1:5000".to_string(),
        climate_db,
    };

    TestApp {
        app: app(app_state),
        _data_dir: None,
    }
}

/// Build the app over a real SQLite dataset seeded with the given rows.
///
/// `stations` are `(identifier, name)` pairs; `measurements` are
/// `(station, date, precipitation, temperature_observation)` tuples inserted
/// in order, so storage-native order equals insertion order.
pub async fn spawn_app_with_dataset(
    stations: Vec<(&str, &str)>,
    measurements: Vec<(&str, &str, Option<f64>, f64)>,
) -> TestApp {
    let data_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = data_dir.path().join("climate.sqlite");

    seed_dataset(&db_path, stations, measurements).await;

    let db = Database::new(db_path.to_str().unwrap())
        .await
        .expect("Failed to open seeded dataset");

    let app_state = AppState {
        remote_url: "http://127.0.0.1:5000".to_string(),
        climate_db: Arc::new(ClimateAccess::new(db)),
    };

    TestApp {
        app: app(app_state),
        _data_dir: Some(data_dir),
    }
}

async fn seed_dataset(
    path: &Path,
    stations: Vec<(&str, &str)>,
    measurements: Vec<(&str, &str, Option<f64>, f64)>,
) {
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
        .unwrap()
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to create seed pool");

    sqlx::query(
        "CREATE TABLE station (\
             identifier TEXT PRIMARY KEY, \
             name TEXT NOT NULL, \
             latitude REAL, \
             longitude REAL, \
             elevation REAL)",
    )
    .execute(&pool)
    .await
    .expect("Failed to create station table");

    sqlx::query(
        "CREATE TABLE measurement (\
             id INTEGER PRIMARY KEY, \
             station TEXT NOT NULL, \
             date TEXT NOT NULL, \
             precipitation REAL, \
             temperature_observation REAL NOT NULL)",
    )
    .execute(&pool)
    .await
    .expect("Failed to create measurement table");

    for (identifier, name) in stations {
        sqlx::query("INSERT INTO station (identifier, name) VALUES (?1, ?2)")
            .bind(identifier)
            .bind(name)
            .execute(&pool)
            .await
            .expect("Failed to insert station");
    }

    for (station, date, precipitation, temperature_observation) in measurements {
        sqlx::query(
            "INSERT INTO measurement (station, date, precipitation, temperature_observation) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(station)
        .bind(date)
        .bind(precipitation)
        .bind(temperature_observation)
        .execute(&pool)
        .await
        .expect("Failed to insert measurement");
    }

    pool.close().await;
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body")
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("Response body is not valid JSON")
}
