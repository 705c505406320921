//! JSON handlers for services (repair orders) and their report.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use techserv_domain::id::{CompanyId, EmployeeId, PartyId, ServiceId};
use techserv_domain::report::RenderedReport;
use techserv_domain::service::view::ServiceView;
use techserv_domain::service::{Service, ServiceKind, ServiceState, WarrantyDetails};
use techserv_domain::time::Date;

use crate::api::{Selection, parse_id};
use crate::context::Ctx;
use crate::error::ApiError;
use crate::state::{AppState, Backend};

/// Request body for creating or editing a service.
///
/// State and number are owned by the workflow and cannot be set here.
#[derive(Debug, Deserialize)]
pub struct ServiceRequest {
    /// Defaults to the `x-company-id` header.
    pub company_id: Option<CompanyId>,
    pub party_id: Option<PartyId>,
    #[serde(default)]
    pub kind: ServiceKind,
    pub entry_date: Option<Date>,
    pub delivery_date: Option<Date>,
    pub technical_id: Option<EmployeeId>,
    #[serde(default)]
    pub garanty: bool,
    #[serde(default)]
    pub warranty: WarrantyDetails,
    pub accessories: Option<String>,
    pub observations: Option<String>,
}

impl ServiceRequest {
    fn into_service(self, id: ServiceId, company_id: CompanyId) -> Service {
        Service {
            id,
            company_id,
            party_id: self.party_id,
            number_service: None,
            kind: self.kind,
            state: ServiceState::Pending,
            entry_date: self.entry_date,
            delivery_date: self.delivery_date,
            technical_id: self.technical_id,
            garanty: self.garanty,
            warranty: self.warranty,
            accessories: self.accessories,
            observations: self.observations,
        }
    }
}

/// Response body of the total endpoint.
#[derive(Debug, Serialize)]
pub struct TotalResponse {
    pub total: Decimal,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Service>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get and update endpoints.
pub enum GetResponse {
    Ok(Json<Service>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Service>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete endpoints.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// A rendered report, sent as the document itself.
///
/// The title and direct-print flag travel in `x-report-title` and
/// `x-direct-print`.
pub struct ReportResponse(RenderedReport);

impl IntoResponse for ReportResponse {
    fn into_response(self) -> Response {
        let RenderedReport {
            format,
            content,
            direct_print,
            title,
        } = self.0;
        let content_type = match format.as_str() {
            "json" => "application/json",
            "txt" => "text/plain; charset=utf-8",
            _ => "application/octet-stream",
        };
        let disposition = format!("inline; filename=\"{title}.{format}\"");

        let mut response = content.into_response();
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        if let Ok(value) = HeaderValue::from_str(&disposition) {
            headers.insert(header::CONTENT_DISPOSITION, value);
        }
        if let Ok(value) = HeaderValue::from_str(&title) {
            headers.insert("x-report-title", value);
        }
        headers.insert(
            "x-direct-print",
            HeaderValue::from_static(if direct_print { "true" } else { "false" }),
        );
        response
    }
}

/// `GET /api/services`
pub async fn list<B: Backend>(State(state): State<AppState<B>>) -> Result<ListResponse, ApiError> {
    let services = state.service_orders.list_services().await?;
    Ok(ListResponse::Ok(Json(services)))
}

/// `GET /api/services/{id}`
pub async fn get<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError> {
    let service = state.service_orders.get_service(parse_id(&id)?).await?;
    Ok(GetResponse::Ok(Json(service)))
}

/// `POST /api/services`
pub async fn create<B: Backend>(
    State(state): State<AppState<B>>,
    Ctx(ctx): Ctx,
    Json(req): Json<ServiceRequest>,
) -> Result<CreateResponse, ApiError> {
    let company_id = ctx.company_or(req.company_id)?;
    let service = req.into_service(ServiceId::new(), company_id);
    let created = state.service_orders.create_service(&ctx, service).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/services/{id}`
pub async fn update<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
    Json(req): Json<ServiceRequest>,
) -> Result<GetResponse, ApiError> {
    let id: ServiceId = parse_id(&id)?;
    let stored = state.service_orders.get_service(id).await?;
    let incoming = req.into_service(id, stored.company_id);
    let updated = state.service_orders.update_service(id, incoming).await?;
    Ok(GetResponse::Ok(Json(updated)))
}

/// `DELETE /api/services/{id}`
pub async fn delete<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError> {
    state.service_orders.delete_services(&[parse_id(&id)?]).await?;
    Ok(DeleteResponse::NoContent)
}

/// `DELETE /api/services` with a `{"ids": [...]}` body. All or nothing.
pub async fn delete_many<B: Backend>(
    State(state): State<AppState<B>>,
    Json(selection): Json<Selection>,
) -> Result<DeleteResponse, ApiError> {
    state.service_orders.delete_services(&selection.ids).await?;
    Ok(DeleteResponse::NoContent)
}

/// `GET /api/services/{id}/total`
pub async fn total<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<Json<TotalResponse>, ApiError> {
    let total = state.service_orders.total(parse_id(&id)?).await?;
    Ok(Json(TotalResponse { total }))
}

/// `GET /api/services/{id}/view`
pub async fn view<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<Json<ServiceView>, ApiError> {
    let view = state.service_orders.view(parse_id(&id)?).await?;
    Ok(Json(view))
}

/// `POST /api/services/report`
pub async fn report<B: Backend>(
    State(state): State<AppState<B>>,
    Json(selection): Json<Selection>,
) -> Result<ReportResponse, ApiError> {
    let report = state.reports.render(&selection.ids).await?;
    Ok(ReportResponse(report))
}
