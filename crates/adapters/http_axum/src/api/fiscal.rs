//! JSON handlers for strict sequences, fiscal years and periods.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use techserv_domain::context::RequestContext;
use techserv_domain::fiscal::{FiscalYear, Period, PeriodKind, PeriodState, ServiceSequences};
use techserv_domain::id::{CompanyId, FiscalYearId, PeriodId, SequenceId};
use techserv_domain::sequence::StrictSequence;
use techserv_domain::time::Date;

use crate::api::parse_id;
use crate::context::Ctx;
use crate::error::ApiError;
use crate::state::{AppState, Backend};

#[derive(Debug, Deserialize)]
pub struct SequenceRequest {
    pub name: String,
    /// Absent means shared by every company.
    pub company_id: Option<CompanyId>,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub padding: u32,
    pub number_next: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct FiscalYearRequest {
    pub name: String,
    /// Defaults to the `x-company-id` header.
    pub company_id: Option<CompanyId>,
    pub start_date: Date,
    pub end_date: Date,
    #[serde(default)]
    pub sequences: ServiceSequences,
}

impl FiscalYearRequest {
    fn into_fiscal_year(
        self,
        ctx: &RequestContext,
        id: FiscalYearId,
    ) -> Result<FiscalYear, ApiError> {
        Ok(FiscalYear {
            id,
            name: self.name,
            company_id: ctx.company_or(self.company_id)?,
            start_date: self.start_date,
            end_date: self.end_date,
            sequences: self.sequences,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct PeriodRequest {
    pub name: String,
    pub fiscal_year_id: FiscalYearId,
    pub start_date: Date,
    pub end_date: Date,
    #[serde(default)]
    pub kind: PeriodKind,
    #[serde(default)]
    pub state: PeriodState,
    #[serde(default)]
    pub sequences: ServiceSequences,
}

impl PeriodRequest {
    fn into_period(self, id: PeriodId) -> Period {
        Period {
            id,
            name: self.name,
            fiscal_year_id: self.fiscal_year_id,
            start_date: self.start_date,
            end_date: self.end_date,
            kind: self.kind,
            state: self.state,
            sequences: self.sequences,
        }
    }
}

/// `GET /api/sequences`
pub async fn list_sequences<B: Backend>(
    State(state): State<AppState<B>>,
) -> Result<Json<Vec<StrictSequence>>, ApiError> {
    Ok(Json(state.fiscal.list_sequences().await?))
}

/// `POST /api/sequences`
pub async fn create_sequence<B: Backend>(
    State(state): State<AppState<B>>,
    Json(req): Json<SequenceRequest>,
) -> Result<(StatusCode, Json<StrictSequence>), ApiError> {
    let sequence = StrictSequence {
        id: SequenceId::new(),
        name: req.name,
        company_id: req.company_id,
        prefix: req.prefix,
        padding: req.padding,
        number_next: req.number_next.unwrap_or(1),
    };
    let created = state.fiscal.create_sequence(sequence).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/fiscal-years`
pub async fn list_fiscal_years<B: Backend>(
    State(state): State<AppState<B>>,
) -> Result<Json<Vec<FiscalYear>>, ApiError> {
    Ok(Json(state.fiscal.list_fiscal_years().await?))
}

/// `GET /api/fiscal-years/{id}`
pub async fn get_fiscal_year<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<Json<FiscalYear>, ApiError> {
    Ok(Json(state.fiscal.get_fiscal_year(parse_id(&id)?).await?))
}

/// `POST /api/fiscal-years`
pub async fn create_fiscal_year<B: Backend>(
    State(state): State<AppState<B>>,
    Ctx(ctx): Ctx,
    Json(req): Json<FiscalYearRequest>,
) -> Result<(StatusCode, Json<FiscalYear>), ApiError> {
    let fiscal_year = req.into_fiscal_year(&ctx, FiscalYearId::new())?;
    let created = state.fiscal.create_fiscal_year(fiscal_year).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/fiscal-years/{id}`
pub async fn update_fiscal_year<B: Backend>(
    State(state): State<AppState<B>>,
    Ctx(ctx): Ctx,
    Path(id): Path<String>,
    Json(req): Json<FiscalYearRequest>,
) -> Result<Json<FiscalYear>, ApiError> {
    let fiscal_year = req.into_fiscal_year(&ctx, parse_id(&id)?)?;
    Ok(Json(state.fiscal.update_fiscal_year(fiscal_year).await?))
}

/// `GET /api/periods`
pub async fn list_periods<B: Backend>(
    State(state): State<AppState<B>>,
) -> Result<Json<Vec<Period>>, ApiError> {
    Ok(Json(state.fiscal.list_periods().await?))
}

/// `GET /api/periods/{id}`
pub async fn get_period<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<Json<Period>, ApiError> {
    Ok(Json(state.fiscal.get_period(parse_id(&id)?).await?))
}

/// `POST /api/periods`
pub async fn create_period<B: Backend>(
    State(state): State<AppState<B>>,
    Json(req): Json<PeriodRequest>,
) -> Result<(StatusCode, Json<Period>), ApiError> {
    let created = state
        .fiscal
        .create_period(req.into_period(PeriodId::new()))
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/periods/{id}`
pub async fn update_period<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
    Json(req): Json<PeriodRequest>,
) -> Result<Json<Period>, ApiError> {
    let period = req.into_period(parse_id(&id)?);
    Ok(Json(state.fiscal.update_period(period).await?))
}
