//! HTTP handlers for travel ingest and search.

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, post},
};
use axum_helpers::{AppError, ErrorResponse};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::index::VectorIndex;
use crate::models::{SearchQuery, SearchResponse, TravelRecord};
use crate::service::TravelService;

pub const TAG: &str = "travel";

/// OpenAPI documentation for the Travel API
#[derive(OpenApi)]
#[openapi(
    paths(ingest, search),
    components(schemas(TravelRecord, SearchResponse, ErrorResponse)),
    tags(
        (name = TAG, description = "Travel destination ingest and AI-assisted search")
    )
)]
pub struct TravelApiDoc;

/// Routes mounted under `/travel`.
pub fn router<I: VectorIndex + 'static>(service: Arc<TravelService<I>>) -> Router {
    Router::new()
        .route("/travel/ingest", post(ingest::<I>))
        .route("/travel/search", get(search::<I>))
        .with_state(service)
}

/// Ingest travel destinations
///
/// Records are embedded and upserted; an existing id is overwritten.
#[utoipa::path(
    post,
    path = "/ingest",
    tag = TAG,
    request_body = Vec<TravelRecord>,
    responses(
        (status = 200, description = "All records ingested"),
        (status = 400, description = "Invalid record id or body", body = ErrorResponse),
        (status = 500, description = "Embedding or vector index failure", body = ErrorResponse)
    )
)]
pub async fn ingest<I: VectorIndex>(
    State(service): State<Arc<TravelService<I>>>,
    payload: Result<Json<Vec<TravelRecord>>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(records) = payload?;
    service.ingest(records).await?;
    Ok(StatusCode::OK)
}

/// Search travel destinations
///
/// Returns the closest destinations and a generated recommendation.
#[utoipa::path(
    get,
    path = "/search",
    tag = TAG,
    params(SearchQuery),
    responses(
        (status = 200, description = "Recommendation with matching destinations", body = SearchResponse),
        (status = 400, description = "Missing or empty query", body = ErrorResponse),
        (status = 500, description = "Embedding, vector search or generation failure", body = ErrorResponse)
    )
)]
pub async fn search<I: VectorIndex>(
    State(service): State<Arc<TravelService<I>>>,
    params: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<SearchResponse>, AppError> {
    let Query(params) = params?;
    let response = service.search(&params.query).await?;
    Ok(Json(response))
}
