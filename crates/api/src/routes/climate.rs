use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use log::error;
use std::sync::Arc;

use crate::{
    AppState, BoundedTemperatureStats, PrecipitationRecord, TemperatureObservation,
    TemperatureStats,
};

#[utoipa::path(
    get,
    path = "/api/v1.0/precipitation",
    responses(
        (status = OK, description = "Every stored (date, precipitation) pair, one record per measurement row", body = Vec<PrecipitationRecord>),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read the dataset")
    ))]
pub async fn precipitation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PrecipitationRecord>>, (StatusCode, String)> {
    state
        .climate_db
        .precipitation()
        .await
        .map(Json)
        .map_err(|err| {
            error!("error listing precipitation: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to list precipitation: {}", err),
            )
        })
}

#[utoipa::path(
    get,
    path = "/api/v1.0/stations",
    responses(
        (status = OK, description = "Name of every station in the dataset", body = Vec<String>),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read the dataset")
    ))]
pub async fn stations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, (StatusCode, String)> {
    state
        .climate_db
        .station_names()
        .await
        .map(Json)
        .map_err(|err| {
            error!("error listing stations: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to list stations: {}", err),
            )
        })
}

#[utoipa::path(
    get,
    path = "/api/v1.0/tobs",
    responses(
        (status = OK, description = "One year of temperature observations from the most active station, ending at the latest stored date", body = Vec<TemperatureObservation>),
        (status = INTERNAL_SERVER_ERROR, description = "Dataset is empty or could not be read")
    ))]
pub async fn tobs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TemperatureObservation>>, (StatusCode, String)> {
    state
        .climate_db
        .trailing_year_observations()
        .await
        .map(Json)
        .map_err(|err| {
            error!("error deriving trailing-year observations: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to derive trailing-year observations: {}", err),
            )
        })
}

/// The start date is deliberately unvalidated; it takes part in string
/// comparison against stored dates, so a malformed value yields the
/// null-aggregate record rather than an error.
#[utoipa::path(
    get,
    path = "/api/v1.0/{start_date}",
    params(
        ("start_date" = String, Path, description = "Inclusive lower bound, compared as a string against stored yyyy-mm-dd dates"),
    ),
    responses(
        (status = OK, description = "Min/avg/max temperature over all rows on or after the start date", body = Vec<TemperatureStats>),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read the dataset")
    ))]
pub async fn temperature_stats_from(
    State(state): State<Arc<AppState>>,
    Path(start_date): Path<String>,
) -> Result<Json<Vec<TemperatureStats>>, (StatusCode, String)> {
    state
        .climate_db
        .temperature_stats(&start_date)
        .await
        .map(|stats| Json(vec![stats]))
        .map_err(|err| {
            error!("error aggregating temperatures from {}: {}", start_date, err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to aggregate temperatures: {}", err),
            )
        })
}

#[utoipa::path(
    get,
    path = "/api/v1.0/{start_date}/{end_date}",
    params(
        ("start_date" = String, Path, description = "Inclusive lower bound, compared as a string"),
        ("end_date" = String, Path, description = "Inclusive upper bound, compared as a string"),
    ),
    responses(
        (status = OK, description = "Min/avg/max temperature over rows between the two dates inclusive", body = Vec<BoundedTemperatureStats>),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read the dataset")
    ))]
pub async fn temperature_stats_from_to(
    State(state): State<Arc<AppState>>,
    Path((start_date, end_date)): Path<(String, String)>,
) -> Result<Json<Vec<BoundedTemperatureStats>>, (StatusCode, String)> {
    state
        .climate_db
        .temperature_stats_between(&start_date, &end_date)
        .await
        .map(|stats| Json(vec![stats]))
        .map_err(|err| {
            error!(
                "error aggregating temperatures {} to {}: {}",
                start_date, end_date, err
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to aggregate temperatures: {}", err),
            )
        })
}
