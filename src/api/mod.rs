pub mod dto;
pub mod errors;
pub mod handlers;

use axum::{routing::get, Router};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::readings::ReadingService;
use handlers::ApiDoc;

pub fn router(service: ReadingService) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route(
            "/devices/{uuid}/readings",
            get(handlers::get_readings).post(handlers::post_reading),
        )
        .route(
            "/devices/{uuid}/readings/{metric}",
            get(handlers::get_metric),
        )
        .with_state(service)
        .split_for_parts();

    router
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
}
