//! JSON handlers for catalog records and party addresses.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;

use techserv_domain::address::Address;
use techserv_domain::catalog::{Company, Employee, Party, Product, Trademark};
use techserv_domain::id::{AddressId, PartyId};

use crate::api::parse_id;
use crate::error::ApiError;
use crate::state::{AppState, Backend};

/// Request body for records that only carry a name.
#[derive(Debug, Deserialize)]
pub struct NamedRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    #[serde(default)]
    pub cost_price: Decimal,
}

/// Country and subdivision left out are filled from the configured defaults.
#[derive(Debug, Deserialize)]
pub struct AddressRequest {
    pub party_id: PartyId,
    pub street: Option<String>,
    pub city: Option<String>,
    pub country_code: Option<String>,
    pub subdivision_code: Option<String>,
}

/// `POST /api/companies`
pub async fn create_company<B: Backend>(
    State(state): State<AppState<B>>,
    Json(req): Json<NamedRequest>,
) -> Result<(StatusCode, Json<Company>), ApiError> {
    let created = state.catalog.create_company(Company::new(req.name)?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `POST /api/parties`
pub async fn create_party<B: Backend>(
    State(state): State<AppState<B>>,
    Json(req): Json<NamedRequest>,
) -> Result<(StatusCode, Json<Party>), ApiError> {
    let created = state.catalog.create_party(Party::new(req.name)?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `POST /api/employees`
pub async fn create_employee<B: Backend>(
    State(state): State<AppState<B>>,
    Json(req): Json<NamedRequest>,
) -> Result<(StatusCode, Json<Employee>), ApiError> {
    let created = state.catalog.create_employee(Employee::new(req.name)?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `POST /api/trademarks`
pub async fn create_trademark<B: Backend>(
    State(state): State<AppState<B>>,
    Json(req): Json<NamedRequest>,
) -> Result<(StatusCode, Json<Trademark>), ApiError> {
    let created = state
        .catalog
        .create_trademark(Trademark::new(req.name)?)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/products`
pub async fn list_products<B: Backend>(
    State(state): State<AppState<B>>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.catalog.list_products().await?))
}

/// `POST /api/products`
pub async fn create_product<B: Backend>(
    State(state): State<AppState<B>>,
    Json(req): Json<ProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = Product::builder()
        .name(req.name)
        .cost_price(req.cost_price)
        .build()?;
    let created = state.catalog.create_product(product).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `POST /api/addresses`
pub async fn create_address<B: Backend>(
    State(state): State<AppState<B>>,
    Json(req): Json<AddressRequest>,
) -> Result<(StatusCode, Json<Address>), ApiError> {
    let address = Address {
        id: AddressId::new(),
        party_id: req.party_id,
        street: req.street,
        city: req.city,
        country_code: req.country_code,
        subdivision_code: req.subdivision_code,
    };
    let created = state.addresses.create_address(address).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/addresses/{id}`
pub async fn get_address<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<Json<Address>, ApiError> {
    Ok(Json(state.addresses.get_address(parse_id(&id)?).await?))
}

/// `GET /api/parties/{id}/addresses`
pub async fn list_addresses<B: Backend>(
    State(state): State<AppState<B>>,
    Path(party_id): Path<String>,
) -> Result<Json<Vec<Address>>, ApiError> {
    let addresses = state.addresses.list_addresses(parse_id(&party_id)?).await?;
    Ok(Json(addresses))
}
