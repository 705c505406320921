//! JSON handlers for service lines.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;

use techserv_domain::id::{
    EmployeeId, PeriphericId, ProductId, ServiceId, ServiceLineId, TrademarkId,
};
use techserv_domain::service_line::{DEFAULT_SERIES, ServiceLine};

use crate::api::parse_id;
use crate::error::ApiError;
use crate::state::{AppState, Backend};

/// Request body for adding or editing a line.
#[derive(Debug, Deserialize)]
pub struct LineRequest {
    pub product_id: Option<ProductId>,
    pub periferic_id: Option<PeriphericId>,
    pub trademark_id: Option<TrademarkId>,
    pub model: Option<String>,
    /// Defaults to `S/S` when the device has no readable serial.
    pub series: Option<String>,
    pub failure: Option<String>,
    /// Defaults to the product cost price on creation.
    pub reference_amount: Option<Decimal>,
    pub technical_id: Option<EmployeeId>,
}

impl LineRequest {
    fn into_line(self, id: ServiceLineId, service_id: ServiceId) -> ServiceLine {
        ServiceLine {
            id,
            service_id,
            product_id: self.product_id,
            periferic_id: self.periferic_id,
            trademark_id: self.trademark_id,
            model: self.model,
            series: Some(self.series.unwrap_or_else(|| DEFAULT_SERIES.to_string())),
            failure: self.failure,
            reference_amount: self.reference_amount,
            technical_id: self.technical_id,
        }
    }
}

/// `GET /api/services/{id}/lines`
pub async fn list<B: Backend>(
    State(state): State<AppState<B>>,
    Path(service_id): Path<String>,
) -> Result<Json<Vec<ServiceLine>>, ApiError> {
    let lines = state.lines.list_lines(parse_id(&service_id)?).await?;
    Ok(Json(lines))
}

/// `POST /api/services/{id}/lines`
pub async fn create<B: Backend>(
    State(state): State<AppState<B>>,
    Path(service_id): Path<String>,
    Json(req): Json<LineRequest>,
) -> Result<(StatusCode, Json<ServiceLine>), ApiError> {
    let line = req.into_line(ServiceLineId::new(), parse_id(&service_id)?);
    let created = state.lines.add_line(line).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/lines/{id}`
pub async fn get<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<Json<ServiceLine>, ApiError> {
    let line = state.lines.get_line(parse_id(&id)?).await?;
    Ok(Json(line))
}

/// `PUT /api/lines/{id}`
pub async fn update<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
    Json(req): Json<LineRequest>,
) -> Result<Json<ServiceLine>, ApiError> {
    let id: ServiceLineId = parse_id(&id)?;
    let stored = state.lines.get_line(id).await?;
    let updated = state
        .lines
        .update_line(req.into_line(id, stored.service_id))
        .await?;
    Ok(Json(updated))
}

/// `DELETE /api/lines/{id}`
pub async fn delete<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.lines.delete_line(parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
