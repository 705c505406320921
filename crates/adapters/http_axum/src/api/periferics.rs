//! JSON handlers for periferics.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use techserv_domain::periferic::Periferic;

use crate::api::parse_id;
use crate::error::ApiError;
use crate::state::{AppState, Backend};

/// Request body for creating or renaming a periferic.
#[derive(Debug, Deserialize)]
pub struct PeriphericRequest {
    pub name: String,
}

/// `GET /api/periferics`
pub async fn list<B: Backend>(
    State(state): State<AppState<B>>,
) -> Result<Json<Vec<Periferic>>, ApiError> {
    Ok(Json(state.periferics.list_periferics().await?))
}

/// `GET /api/periferics/{id}`
pub async fn get<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<Json<Periferic>, ApiError> {
    Ok(Json(state.periferics.get_periferic(parse_id(&id)?).await?))
}

/// `POST /api/periferics`
pub async fn create<B: Backend>(
    State(state): State<AppState<B>>,
    Json(req): Json<PeriphericRequest>,
) -> Result<(StatusCode, Json<Periferic>), ApiError> {
    let periferic = Periferic::new(req.name)?;
    let created = state.periferics.create_periferic(periferic).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/periferics/{id}`
pub async fn update<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
    Json(req): Json<PeriphericRequest>,
) -> Result<Json<Periferic>, ApiError> {
    let periferic = Periferic {
        id: parse_id(&id)?,
        name: req.name,
    };
    Ok(Json(state.periferics.update_periferic(periferic).await?))
}

/// `DELETE /api/periferics/{id}`
pub async fn delete<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.periferics.delete_periferic(parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
