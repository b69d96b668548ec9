use anyhow::{bail, Context, Result};
use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::{path::Path, str::FromStr, time::Duration};

/// Bumped whenever the required column layout below changes.
pub const SCHEMA_VERSION: u32 = 1;

const MEASUREMENT_COLUMNS: [&str; 5] = [
    "id",
    "station",
    "date",
    "precipitation",
    "temperature_observation",
];
const STATION_COLUMNS: [&str; 2] = ["identifier", "name"];

/// Read-only handle to the SQLite dataset.
///
/// The dataset is provisioned entirely outside this service; the pool is
/// opened with `SQLITE_OPEN_READONLY` and never issues a write.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            bail!("dataset file not found: {}", path);
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .read_only(true)
            .pragma("busy_timeout", "5000")
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "MEMORY");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .context("Failed to create database connection pool")?;

        let db = Self { pool };

        db.verify_schema().await?;
        info!(
            "SQLite dataset opened read-only at: {} (schema v{})",
            path, SCHEMA_VERSION
        );

        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check the live store against the expected table layout, failing fast
    /// on mismatch instead of silently adapting to whatever is present.
    async fn verify_schema(&self) -> Result<()> {
        self.require_columns("measurement", &MEASUREMENT_COLUMNS)
            .await?;
        self.require_columns("station", &STATION_COLUMNS).await?;
        Ok(())
    }

    /// The required set is a subset check: datasets may carry extra columns
    /// (geographic attributes vary by source).
    async fn require_columns(&self, table: &str, required: &[&str]) -> Result<()> {
        let live: Vec<String> =
            sqlx::query_scalar(&format!("SELECT name FROM pragma_table_info('{}')", table))
                .fetch_all(&self.pool)
                .await
                .with_context(|| format!("Failed to inspect columns of table '{}'", table))?;

        if live.is_empty() {
            bail!("dataset is missing the '{}' table", table);
        }

        let missing: Vec<&str> = required
            .iter()
            .filter(|column| !live.iter().any(|name| name == *column))
            .copied()
            .collect();
        if !missing.is_empty() {
            bail!(
                "table '{}' is missing required columns: {} (expected schema v{})",
                table,
                missing.join(", "),
                SCHEMA_VERSION
            );
        }

        Ok(())
    }

    /// Check database connectivity and integrity.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("Database connectivity check failed")?;

        let result: String = sqlx::query_scalar("PRAGMA quick_check;")
            .fetch_one(&self.pool)
            .await
            .context("Database integrity check failed")?;
        if result != "ok" {
            bail!("Database integrity check returned: {}", result);
        }

        Ok(())
    }
}
