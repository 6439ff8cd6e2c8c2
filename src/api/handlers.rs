use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use utoipa::OpenApi;

use super::{
    dto::{ReadingCreatedDto, ReadingDto},
    errors::AppError,
};
use crate::{
    db::models::SensorType,
    readings::{
        DeviceSummary, Metric, MetricResult, NewReading, Quartiles, ReadingError, ReadingService,
        ReadingsQuery,
    },
};

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Record a reading for a device. `date_created` is assigned by the server.
#[utoipa::path(
    post,
    path = "/devices/{uuid}/readings",
    params(
        ("uuid" = String, Path, description = "Device identifier"),
    ),
    request_body(content = NewReading, content_type = "application/json"),
    responses(
        (status = 201, description = "Reading stored", body = ReadingCreatedDto),
        (status = 400, description = "Empty or invalid body"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "readings"
)]
pub async fn post_reading(
    State(service): State<ReadingService>,
    Path(device_uuid): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<ReadingCreatedDto>), AppError> {
    let payload = parse_new_reading(&body)?;
    let reading = service.record(&device_uuid, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ReadingCreatedDto {
            data: reading.into(),
        }),
    ))
}

/// Fetch a device's readings, oldest first. Dates are inclusive calendar days.
#[utoipa::path(
    get,
    path = "/devices/{uuid}/readings",
    params(
        ("uuid" = String, Path, description = "Device identifier"),
        ReadingsQuery,
    ),
    responses(
        (status = 200, description = "Matching readings", body = Vec<ReadingDto>),
        (status = 400, description = "Invalid type or date"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "readings"
)]
pub async fn get_readings(
    State(service): State<ReadingService>,
    Path(device_uuid): Path<String>,
    Query(query): Query<ReadingsQuery>,
) -> Result<Json<Vec<ReadingDto>>, AppError> {
    let rows = service.list(&device_uuid, &query).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// Compute a statistic over a device's filtered readings.
///
/// `summary` ignores the path device and returns one record per known device,
/// each filtered by the same query parameters.
#[utoipa::path(
    get,
    path = "/devices/{uuid}/readings/{metric}",
    params(
        ("uuid" = String, Path, description = "Device identifier"),
        ("metric" = String, Path, description = "min, max, median, mean, mode, quartiles or summary"),
        ReadingsQuery,
    ),
    responses(
        (status = 200, description = "`{value}`, `{quartile_1, quartile_3}` or a summary array", body = MetricResult),
        (status = 400, description = "Invalid type or date"),
        (status = 404, description = "Unknown metric"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "readings"
)]
pub async fn get_metric(
    State(service): State<ReadingService>,
    Path((device_uuid, metric)): Path<(String, String)>,
    Query(query): Query<ReadingsQuery>,
) -> Result<Json<MetricResult>, AppError> {
    let metric = metric.parse::<Metric>()?;
    Ok(Json(service.metric(&device_uuid, metric, &query).await?))
}

/// Returns `200 OK` with `{"status":"ok"}` when the server is running.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "system"
)]
pub async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Any JSON body is accepted regardless of content type; `null`, `{}` and
/// an empty body are all rejected as empty.
fn parse_new_reading(body: &[u8]) -> Result<NewReading, ReadingError> {
    let value: Value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(body)
            .map_err(|e| ReadingError::Validation(format!("body is not valid JSON: {e}")))?
    };

    let empty = match &value {
        Value::Null => true,
        Value::Object(fields) => fields.is_empty(),
        _ => false,
    };
    if empty {
        return Err(ReadingError::Validation("Body can't be empty".into()));
    }

    serde_json::from_value(value)
        .map_err(|e| ReadingError::Validation(format!("invalid reading: {e}")))
}

// ---------------------------------------------------------------------------
// OpenAPI spec
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(post_reading, get_readings, get_metric, health),
    components(schemas(
        ReadingDto,
        ReadingCreatedDto,
        NewReading,
        SensorType,
        MetricResult,
        Quartiles,
        DeviceSummary
    )),
    tags(
        (name = "readings", description = "Device reading endpoints"),
        (name = "system",   description = "System endpoints"),
    ),
    info(
        title = "Device Readings API",
        version = "0.1.0",
        description = "Records temperature and humidity readings and reports statistics over them"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
