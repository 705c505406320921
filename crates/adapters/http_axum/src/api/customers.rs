//! Per-customer repair history.

use axum::Json;
use axum::extract::{Path, State};

use techserv_domain::customer::CustomerServiceRow;

use crate::api::parse_id;
use crate::error::ApiError;
use crate::state::{AppState, Backend};

/// `GET /api/customers/{party_id}/services`
pub async fn services_of<B: Backend>(
    State(state): State<AppState<B>>,
    Path(party_id): Path<String>,
) -> Result<Json<Vec<CustomerServiceRow>>, ApiError> {
    let rows = state.customers.services_of(parse_id(&party_id)?).await?;
    Ok(Json(rows))
}
