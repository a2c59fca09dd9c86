use crate::infra::{AppState, InlineSources};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use observation_report::error::AppError;
use observation_report::observations::report::{
    FilterOptions, ObservationDetail, ObservationReport, TeacherDetail,
};
use observation_report::observations::ObservationFilter;
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::Ordering;
use tracing::info;

/// Filters, role, and optional inline CSV shared by every report request.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ReportRequest {
    #[serde(flatten)]
    pub(crate) filter: ObservationFilter,
    #[serde(default)]
    pub(crate) role: Option<String>,
    #[serde(default)]
    pub(crate) inline: Option<InlineSources>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TeacherRequest {
    pub(crate) teacher: String,
    #[serde(flatten)]
    pub(crate) request: ReportRequest,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DetailRequest {
    pub(crate) row: usize,
    #[serde(default)]
    pub(crate) role: Option<String>,
    #[serde(default)]
    pub(crate) inline: Option<InlineSources>,
}

pub(crate) fn observation_routes() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/observations/report", post(report_endpoint))
        .route("/api/v1/observations/options", post(options_endpoint))
        .route("/api/v1/observations/teacher", post(teacher_endpoint))
        .route("/api/v1/observations/detail", post(detail_endpoint))
        .route("/api/v1/sources/refresh", post(refresh_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn report_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ReportRequest>,
) -> Result<Json<ObservationReport>, AppError> {
    let ReportRequest {
        filter,
        role,
        inline,
    } = payload;

    let scope = state.roles.scope_for(role.as_deref());
    let dataset = state.dataset(inline)?;
    Ok(Json(dataset.report(&filter, &scope)))
}

pub(crate) async fn options_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ReportRequest>,
) -> Result<Json<FilterOptions>, AppError> {
    let scope = state.roles.scope_for(payload.role.as_deref());
    let dataset = state.dataset(payload.inline)?;
    Ok(Json(dataset.options(&scope)))
}

pub(crate) async fn teacher_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<TeacherRequest>,
) -> Result<Json<TeacherDetail>, AppError> {
    let TeacherRequest { teacher, request } = payload;
    let scope = state.roles.scope_for(request.role.as_deref());
    let dataset = state.dataset(request.inline)?;
    Ok(Json(dataset.teacher(&teacher, &request.filter, &scope)))
}

pub(crate) async fn detail_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<DetailRequest>,
) -> Result<Json<ObservationDetail>, AppError> {
    let scope = state.roles.scope_for(payload.role.as_deref());
    let dataset = state.dataset(payload.inline)?;
    Ok(Json(dataset.observation(payload.row, &scope)?))
}

pub(crate) async fn refresh_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    state.sources.invalidate();
    info!("source cache cleared");
    (StatusCode::ACCEPTED, Json(json!({ "status": "refreshed" })))
}
