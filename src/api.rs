//! HTTP routes over the analytics engine

use crate::error::RootsError;
use crate::facets::{OccurrenceFacet, VersePage};
use crate::lexicon::{ChapterProfile, RootLengthListing};
use crate::service::AnalyticsResult;
use crate::state::AppState;
use crate::statistics::TimelineOrder;
use crate::tokens::Verse;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

// === Request/Response types ===

#[derive(Deserialize)]
struct RootQuery {
    root: String,
    order: Option<TimelineOrder>,
}

#[derive(Deserialize)]
struct VersesQuery {
    root: String,
    facet: Option<String>,
    value: Option<String>,
    limit: Option<usize>,
    offset: Option<usize>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    verses: usize,
    chapters: usize,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(err: RootsError) -> ApiError {
    let status = match err {
        RootsError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        RootsError::NotFound(_) => StatusCode::NOT_FOUND,
        RootsError::Cancelled => StatusCode::REQUEST_TIMEOUT,
        RootsError::CorpusUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        RootsError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse { error: err.to_string() }))
}

// === Handlers ===

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        verses: state.index().verse_count(),
        chapters: state.index().chapter_count(),
    })
}

async fn root_analytics(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RootQuery>,
) -> Result<Json<AnalyticsResult>, ApiError> {
    let result = state
        .service
        .get_root_analytics(&params.root)
        .await
        .map_err(api_error)?;

    let mut body = (*result).clone();
    let order = params.order.unwrap_or_default();
    body.statistics.timeline = result.statistics.timeline_in(order).into_iter().cloned().collect();
    Ok(Json(body))
}

async fn root_verses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VersesQuery>,
) -> Result<Json<VersePage>, ApiError> {
    let facet = OccurrenceFacet::parse(params.facet.as_deref(), params.value.as_deref())
        .map_err(api_error)?;
    state
        .service
        .get_root_verses(&params.root, &facet, params.limit, params.offset)
        .await
        .map(Json)
        .map_err(api_error)
}

async fn roots_by_length(
    State(state): State<Arc<AppState>>,
    Path(len): Path<usize>,
) -> Result<Json<RootLengthListing>, ApiError> {
    state.lexicon.roots_by_length(len).map(Json).map_err(api_error)
}

async fn chapter_profile(
    State(state): State<Arc<AppState>>,
    Path(chapter_no): Path<u32>,
) -> Result<Json<ChapterProfile>, ApiError> {
    state.lexicon.chapter_profile(chapter_no).map(Json).map_err(api_error)
}

async fn verses_by_page(
    State(state): State<Arc<AppState>>,
    Path(page): Path<u32>,
) -> Json<Vec<Verse>> {
    Json(state.index().verses_by_page(page).into_iter().cloned().collect())
}

async fn verses_by_section(
    State(state): State<Arc<AppState>>,
    Path(section): Path<u32>,
) -> Json<Vec<Verse>> {
    Json(state.index().verses_by_section(section).into_iter().cloned().collect())
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/roots/analytics", get(root_analytics))
        .route("/roots/verses", get(root_verses))
        .route("/roots/by-length/:len", get(roots_by_length))
        .route("/chapters/:chapter_no/profile", get(chapter_profile))
        .route("/mushaf/by-page/:page", get(verses_by_page))
        .route("/mushaf/by-section/:section", get(verses_by_section))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
