//! HTTP route handlers.
//!
//! Every query runs on the blocking pool: routing is CPU bound and must not
//! stall the async workers.

use std::sync::Arc;

use axum::{
    BoxError, Json, Router,
    error_handling::HandleErrorLayer,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tranzit::TransitModel;

use crate::config::ServerConfig;
use crate::dto::*;
use crate::error::ApiError;
use crate::state::AppState;

/// Create the application router with timeout and concurrency limits from `config`.
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/model", get(model_info))
        .route("/route", post(route))
        .route("/route/one-to-many", post(route_one_to_many))
        .route("/route/detailed", post(route_detailed))
        .route("/matrix", post(matrix))
        .route("/isochrone", post(isochrone))
        .route("/range", post(range))
        .route("/range/pareto", post(range_pareto))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(config.request_timeout())
                .concurrency_limit(config.concurrency_limit.max(1)),
        )
        .with_state(state)
}

async fn handle_middleware_error(err: BoxError) -> impl IntoResponse {
    if err.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(serde_json::json!({ "error": "Request timed out" })),
        )
    } else {
        tracing::error!("Unhandled middleware error: {err}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": err.to_string() })),
        )
    }
}

/// Runs `query` against the shared model on the blocking pool.
///
/// The query permit lives inside the blocking task, so a request that times
/// out keeps its slot until the work really stops.
async fn with_model<T, F>(state: AppState, query: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&TransitModel) -> Result<T, ApiError> + Send + 'static,
{
    let permit = Arc::clone(&state.query_permits)
        .acquire_owned()
        .await
        .map_err(|e| ApiError::Internal(format!("Query pool closed: {e}")))?;

    tokio::task::spawn_blocking(move || {
        let _permit = permit;
        query(state.model.as_ref())
    })
    .await?
}

async fn health() -> &'static str {
    "ok"
}

async fn model_info(State(state): State<AppState>) -> Result<Json<ModelResponse>, ApiError> {
    let info = serde_json::from_str(&state.model.feeds_info())
        .map_err(|e| ApiError::Internal(format!("Malformed model info: {e}")))?;

    Ok(Json(ModelResponse {
        summary: state.model.to_string(),
        info,
    }))
}

async fn route(
    State(state): State<AppState>,
    Json(req): Json<RouteRequest>,
) -> Result<Json<RouteResponse>, ApiError> {
    req.validate()?;
    let route = with_model(state, move |model| {
        let start = req.start.snap(model)?;
        let end = req.end.snap(model)?;
        Ok(tranzit::find_route(
            model,
            &start,
            &end,
            req.departure_time,
            req.max_transfers,
        )?)
    })
    .await?;

    Ok(Json(RouteResponse { route }))
}

async fn route_one_to_many(
    State(state): State<AppState>,
    Json(req): Json<OneToManyRequest>,
) -> Result<Json<OneToManyResponse>, ApiError> {
    req.validate()?;
    let routes = with_model(state, move |model| {
        let start = req.start.snap(model)?;
        let ends = snap_all(&req.ends, model)?;
        Ok(tranzit::find_routes_one_to_many(
            model,
            &start,
            &ends,
            req.departure_time,
            req.max_transfers,
        )?)
    })
    .await?;

    Ok(Json(OneToManyResponse { routes }))
}

async fn route_detailed(
    State(state): State<AppState>,
    Json(req): Json<RouteRequest>,
) -> Result<Json<DetailedRouteResponse>, ApiError> {
    req.validate()?;
    let geojson = with_model(state, move |model| {
        let start = req.start.snap(model)?;
        let end = req.end.snap(model)?;
        Ok(tranzit::find_detailed_route(
            model,
            &start,
            &end,
            req.departure_time,
            req.max_transfers,
        )?)
    })
    .await?;

    let journey = geojson
        .map(|text| serde_json::from_str(&text))
        .transpose()
        .map_err(|e| ApiError::Internal(format!("Malformed GeoJSON: {e}")))?;

    Ok(Json(DetailedRouteResponse { journey }))
}

async fn matrix(
    State(state): State<AppState>,
    Json(req): Json<MatrixRequest>,
) -> Result<Json<MatrixResponse>, ApiError> {
    req.validate()?;
    let travel_times = with_model(state, move |model| {
        let points = snap_all(&req.points, model)?;
        Ok(tranzit::travel_time_matrix(
            model,
            &points,
            req.departure_time,
            req.max_transfers,
        ))
    })
    .await?;

    Ok(Json(MatrixResponse { travel_times }))
}

async fn isochrone(
    State(state): State<AppState>,
    Json(req): Json<IsochroneRequest>,
) -> Result<Json<IsochroneResponse>, ApiError> {
    req.validate()?;
    let response = with_model(state, move |model| {
        let start = req.start.snap(model)?;
        let index = tranzit::create_isochrone_index(model, &req.area, req.resolution)?;
        let wkt = tranzit::calculate_isochrone(
            model,
            &start,
            req.departure_time,
            req.max_transfers,
            req.cutoff,
            &index,
        )?;

        Ok(IsochroneResponse {
            wkt,
            cells: index.len(),
        })
    })
    .await?;

    Ok(Json(response))
}

async fn range(
    State(state): State<AppState>,
    Json(req): Json<RangeRequest>,
) -> Result<Json<RangeResponse>, ApiError> {
    run_range(state, req, tranzit::range_multimodal_routing).await
}

async fn range_pareto(
    State(state): State<AppState>,
    Json(req): Json<RangeRequest>,
) -> Result<Json<RangeResponse>, ApiError> {
    run_range(state, req, tranzit::pareto_range_multimodal_routing).await
}

type RangeQuery = fn(
    &TransitModel,
    &tranzit::TransitPoint,
    &tranzit::TransitPoint,
    (tranzit::Time, tranzit::Time),
    usize,
) -> Result<tranzit::RangeResult, tranzit::Error>;

async fn run_range(
    state: AppState,
    req: RangeRequest,
    query: RangeQuery,
) -> Result<Json<RangeResponse>, ApiError> {
    req.validate()?;
    let result = with_model(state, move |model| {
        let start = req.start.snap(model)?;
        let end = req.end.snap(model)?;
        Ok(query(
            model,
            &start,
            &end,
            (req.earliest_departure, req.latest_departure),
            req.max_transfers,
        )?)
    })
    .await?;

    Ok(Json(RangeResponse {
        departure_times: result.departure_times(),
        travel_times: result.travel_times(),
        median_travel_time: result.median_travel_time(),
    }))
}
