use async_trait::async_trait;
use serde::{ser::SerializeMap, Serialize, Serializer};
use sqlx::FromRow;
use time::{format_description::BorrowedFormatItem, macros::format_description, Date, Month};
use utoipa::ToSchema;

use crate::Database;

/// The dataset's native date encoding. Zero-padded, so lexicographic
/// comparison on the stored strings matches calendar order.
const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("no measurement rows in the dataset")]
    EmptyDataset,
    #[error("failed to parse stored date: {0}")]
    MalformedDate(#[from] time::error::Parse),
    #[error("derived date has no calendar counterpart: {0}")]
    DateOutOfRange(#[from] time::error::ComponentRange),
    #[error("failed to format derived date: {0}")]
    DateFormat(#[from] time::error::Format),
    #[error("failed to query dataset: {0}")]
    Query(#[from] sqlx::Error),
}

#[async_trait]
pub trait ClimateData: Sync + Send {
    /// Every stored `(date, precipitation)` pair, one record per row in
    /// storage-native order. Dates are not unique across records.
    async fn precipitation(&self) -> Result<Vec<PrecipitationRecord>, Error>;
    /// Every station name, storage-native order.
    async fn station_names(&self) -> Result<Vec<String>, Error>;
    /// One year of observations from the most active station, ending at the
    /// latest stored date.
    async fn trailing_year_observations(&self) -> Result<Vec<TemperatureObservation>, Error>;
    /// Min/avg/max temperature over all rows with `date >= start_date`.
    async fn temperature_stats(&self, start_date: &str) -> Result<TemperatureStats, Error>;
    /// Min/avg/max temperature over `start_date..=end_date`.
    async fn temperature_stats_between(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<BoundedTemperatureStats, Error>;
}

pub struct ClimateAccess {
    db: Database,
}

impl ClimateAccess {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ClimateData for ClimateAccess {
    async fn precipitation(&self) -> Result<Vec<PrecipitationRecord>, Error> {
        let mut conn = self.db.pool().acquire().await?;

        let records =
            sqlx::query_as::<_, PrecipitationRecord>("SELECT date, precipitation FROM measurement")
                .fetch_all(&mut *conn)
                .await?;

        Ok(records)
    }

    async fn station_names(&self) -> Result<Vec<String>, Error> {
        let mut conn = self.db.pool().acquire().await?;

        let names = sqlx::query_scalar("SELECT name FROM station")
            .fetch_all(&mut *conn)
            .await?;

        Ok(names)
    }

    async fn trailing_year_observations(&self) -> Result<Vec<TemperatureObservation>, Error> {
        // One checked-out connection for the whole derivation so every step
        // reads the same snapshot; dropped on every exit path.
        let mut conn = self.db.pool().acquire().await?;

        let last_date: Option<String> = sqlx::query_scalar("SELECT MAX(date) FROM measurement")
            .fetch_one(&mut *conn)
            .await?;
        let last_date = last_date.ok_or(Error::EmptyDataset)?;
        let window_start = trailing_year_start(&last_date)?;

        let most_active: String = sqlx::query_scalar(
            "SELECT station FROM measurement \
             GROUP BY station \
             ORDER BY COUNT(id) DESC, station ASC \
             LIMIT 1",
        )
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(Error::EmptyDataset)?;

        let observations = sqlx::query_as::<_, TemperatureObservation>(
            "SELECT date, temperature_observation FROM measurement \
             WHERE station = ?1 AND date >= ?2",
        )
        .bind(&most_active)
        .bind(&window_start)
        .fetch_all(&mut *conn)
        .await?;

        Ok(observations)
    }

    async fn temperature_stats(&self, start_date: &str) -> Result<TemperatureStats, Error> {
        let mut conn = self.db.pool().acquire().await?;

        let stats = sqlx::query_as::<_, TemperatureStats>(
            "SELECT MIN(temperature_observation) AS min, \
                    AVG(temperature_observation) AS avg, \
                    MAX(temperature_observation) AS max \
             FROM measurement \
             WHERE date >= ?1",
        )
        .bind(start_date)
        .fetch_one(&mut *conn)
        .await?;

        Ok(stats)
    }

    async fn temperature_stats_between(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<BoundedTemperatureStats, Error> {
        let mut conn = self.db.pool().acquire().await?;

        let stats = sqlx::query_as::<_, BoundedTemperatureStats>(
            "SELECT MIN(temperature_observation) AS min, \
                    AVG(temperature_observation) AS average, \
                    MAX(temperature_observation) AS max \
             FROM measurement \
             WHERE date >= ?1 AND date <= ?2",
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&mut *conn)
        .await?;

        Ok(stats)
    }
}

/// Start of the one-year window ending at `last_date`: same month and day,
/// year decremented. A Feb 29 input clamps to Feb 28, since the preceding
/// year never carries a leap day.
fn trailing_year_start(last_date: &str) -> Result<String, Error> {
    let latest = Date::parse(last_date, DATE_FORMAT)?;

    let mut day = latest.day();
    if latest.month() == Month::February && day == 29 {
        day = 28;
    }

    let start = Date::from_calendar_date(latest.year() - 1, latest.month(), day)?;
    Ok(start.format(DATE_FORMAT)?)
}

/// One raw precipitation reading. Serialized as a single-entry map keyed by
/// the reading's date, so a response is a list of `{date: value}` objects
/// with duplicate dates preserved across records.
#[derive(Debug, FromRow, ToSchema)]
pub struct PrecipitationRecord {
    pub date: String,
    pub precipitation: Option<f64>,
}

impl Serialize for PrecipitationRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.date, &self.precipitation)?;
        map.end()
    }
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct TemperatureObservation {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Temperature observations")]
    pub temperature_observation: f64,
}

/// Aggregates for an open-ended date range. `None` fields serialize as JSON
/// null, the aggregate-of-empty-set result.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct TemperatureStats {
    #[serde(rename = "Min")]
    pub min: Option<f64>,
    #[serde(rename = "Avg")]
    pub avg: Option<f64>,
    #[serde(rename = "Max")]
    pub max: Option<f64>,
}

/// Aggregates for an inclusive date range. The mean is labeled "Average"
/// here, unlike the open-ended variant's "Avg"; existing consumers depend on
/// the difference.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct BoundedTemperatureStats {
    #[serde(rename = "Min")]
    pub min: Option<f64>,
    #[serde(rename = "Average")]
    pub average: Option<f64>,
    #[serde(rename = "Max")]
    pub max: Option<f64>,
}
