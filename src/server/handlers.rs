use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::assess::PipelineSession;
use crate::core::cancel::CancellationToken;
use crate::core::errors::ApiError;
use crate::core::language::Language;
use crate::export::export_csv;
use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = state.session.read().await;
    let dataset = session
        .as_ref()
        .and_then(|s| s.pool().map(|p| p.dataset_name().to_string()));

    Json(json!({
        "status": "ok",
        "dataset": dataset,
        "history_count": state.history.read().await.len(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct LoadDatasetRequest {
    pub name: String,
    pub api_key: Option<String>,
}

/// Load a dataset and (re)build the retrieval pool. Replaces any
/// existing session wholesale.
pub async fn load_dataset(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoadDatasetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let api_key = payload
        .api_key
        .or_else(|| state.config.api_key.clone())
        .ok_or_else(|| ApiError::BadRequest("no API key configured or provided".to_string()))?;

    let mut session = PipelineSession::new(&state.config, &api_key)?;
    let records = session.load_dataset(&payload.name).await?;

    *state.session.write().await = Some(session);

    Ok(Json(json!({
        "dataset": payload.name,
        "records": records,
    })))
}

#[derive(Debug, Deserialize)]
pub struct AssessRequest {
    pub activity: String,
    pub output_language: Option<String>,
    /// Save the result into the session history (default true).
    pub save: Option<bool>,
}

pub async fn assess(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AssessRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let output_language = payload
        .output_language
        .as_deref()
        .map(Language::parse)
        .unwrap_or(state.config.working_language);

    let cancel = CancellationToken::new();
    *state.active_run.lock().await = cancel.clone();

    let session = state.session.read().await;
    let session = session.as_ref().ok_or_else(|| {
        ApiError::BadRequest("load a dataset before running an assessment".to_string())
    })?;

    let assessment = session
        .run_assessment(&payload.activity, output_language, &cancel)
        .await?;

    if payload.save.unwrap_or(true) {
        let entry = state.history.write().await.save(assessment);
        return Ok(Json(serde_json::to_value(&entry).map_err(ApiError::internal)?));
    }

    Ok(Json(serde_json::to_value(&assessment).map_err(ApiError::internal)?))
}

/// Cancel the assessment currently in flight, if any.
pub async fn cancel_assessment(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.active_run.lock().await.cancel();
    Json(json!({ "status": "cancelling" }))
}

pub async fn get_history(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let history = state.history.read().await;
    Json(json!({
        "summary": history.summary(),
        "entries": history.entries(),
    }))
}

/// Download one history entry as CSV bytes.
pub async fn export_history_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let history = state.history.read().await;
    let entry = history
        .get(id)
        .ok_or_else(|| ApiError::NotFound(format!("no assessment with id {id}")))?;

    let bytes = export_csv(&entry.assessment.result, &entry.assessment.similar)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"assessment-{id}.csv\""),
            ),
        ],
        bytes,
    ))
}

/// Drop the current session (dataset + index).
pub async fn clear_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    *state.session.write().await = None;
    Json(json!({ "status": "cleared" }))
}
