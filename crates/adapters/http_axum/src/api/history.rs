//! JSON handlers for history notes and their credential pair.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use techserv_domain::history_line::HistoryLine;

use crate::api::parse_id;
use crate::error::ApiError;
use crate::state::{AppState, Backend};

/// Request body for adding a note or filling its description.
#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    #[serde(default)]
    pub description: String,
}

/// Request body for storing or checking a credential.
#[derive(Deserialize)]
pub struct CredentialRequest {
    pub user: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub verified: bool,
}

/// `GET /api/services/{id}/history`
pub async fn list<B: Backend>(
    State(state): State<AppState<B>>,
    Path(service_id): Path<String>,
) -> Result<Json<Vec<HistoryLine>>, ApiError> {
    let notes = state.history.list_notes(parse_id(&service_id)?).await?;
    Ok(Json(notes))
}

/// `POST /api/services/{id}/history`
pub async fn create<B: Backend>(
    State(state): State<AppState<B>>,
    Path(service_id): Path<String>,
    Json(req): Json<NoteRequest>,
) -> Result<(StatusCode, Json<HistoryLine>), ApiError> {
    let note = state
        .history
        .add_note(parse_id(&service_id)?, req.description)
        .await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// `GET /api/history/{id}`
pub async fn get<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<Json<HistoryLine>, ApiError> {
    let note = state.history.get_note(parse_id(&id)?).await?;
    Ok(Json(note))
}

/// `PUT /api/history/{id}`
pub async fn update<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
    Json(req): Json<NoteRequest>,
) -> Result<Json<HistoryLine>, ApiError> {
    let note = state
        .history
        .update_note(parse_id(&id)?, req.description)
        .await?;
    Ok(Json(note))
}

/// `DELETE /api/history/{id}`
pub async fn delete<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.history.delete_note(parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /api/history/{id}/credential`
pub async fn set_credential<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
    Json(req): Json<CredentialRequest>,
) -> Result<Json<HistoryLine>, ApiError> {
    let note = state
        .history
        .set_credential(parse_id(&id)?, &req.user, &req.password)
        .await?;
    Ok(Json(note))
}

/// `POST /api/history/{id}/verify`
pub async fn verify_credential<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
    Json(req): Json<CredentialRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let verified = state
        .history
        .verify_credential(parse_id(&id)?, &req.user, &req.password)
        .await?;
    Ok(Json(VerifyResponse { verified }))
}
