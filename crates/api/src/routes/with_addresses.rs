//! Customer route handlers that embed the address list.
//!
//! Updates here are a full replace: the stored address list is discarded
//! and rebuilt from the body, and every address gets a brand-new id.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use univali_core::{AddressId, CustomerId};

use super::customers::{ensure_ids_match, map_not_found};
use crate::{
    error::{AppError, Result},
    extract::{AppJson, AppPath},
    models::{Address, Customer, CustomerFields, NewAddress, NewCustomer, ValidationErrors},
    state::AppState,
};

/// Address as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDto {
    pub id: AddressId,
    pub street: String,
    pub city: String,
}

/// Customer with its addresses as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerWithAddressesDto {
    pub id: CustomerId,
    pub name: String,
    pub cpf: String,
    pub addresses: Vec<AddressDto>,
}

/// One element of an `addresses` request array.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

/// Body of `POST /api/customers/with-addresses`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerWithAddressesForCreation {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub addresses: Vec<AddressInput>,
}

/// Body of `PUT /api/customers/with-addresses/{customerId}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerWithAddressesForUpdate {
    #[serde(default)]
    pub id: Option<CustomerId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub addresses: Vec<AddressInput>,
}

// =============================================================================
// Type Conversions
// =============================================================================

impl From<&Address> for AddressDto {
    fn from(address: &Address) -> Self {
        Self {
            id: address.id,
            street: address.street.as_str().to_owned(),
            city: address.city.as_str().to_owned(),
        }
    }
}

impl From<&Customer> for CustomerWithAddressesDto {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.name.as_str().to_owned(),
            cpf: customer.cpf.as_str().to_owned(),
            addresses: customer.addresses.iter().map(AddressDto::from).collect(),
        }
    }
}

/// Validate scalars and every address, reporting all failures together.
fn validate(
    name: Option<&str>,
    cpf: Option<&str>,
    addresses: &[AddressInput],
) -> std::result::Result<(CustomerFields, Vec<NewAddress>), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let fields = CustomerFields::collect(&mut errors, name, cpf);

    // Collect into a Vec first so every address is checked, not just up to
    // the first failure.
    let addresses: Vec<Option<NewAddress>> = addresses
        .iter()
        .enumerate()
        .map(|(i, a)| NewAddress::collect(&mut errors, i, a.street.as_deref(), a.city.as_deref()))
        .collect();
    let addresses: Option<Vec<NewAddress>> = addresses.into_iter().collect();

    errors.into_result(fields.zip(addresses))
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /api/customers/with-addresses`
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<CustomerWithAddressesDto>>> {
    let customers = state.customers().list_customers().await?;
    Ok(Json(
        customers.iter().map(CustomerWithAddressesDto::from).collect(),
    ))
}

/// `GET /api/customers/with-addresses/{customerId}`
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    AppPath(customer_id): AppPath<CustomerId>,
) -> Result<Json<CustomerWithAddressesDto>> {
    let customer = state
        .customers()
        .find_customer_by_id(customer_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("customer {customer_id}")))?;

    Ok(Json(CustomerWithAddressesDto::from(&customer)))
}

/// `POST /api/customers/with-addresses`
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    AppJson(body): AppJson<CustomerWithAddressesForCreation>,
) -> Result<impl IntoResponse> {
    let (fields, addresses) = validate(body.name.as_deref(), body.cpf.as_deref(), &body.addresses)?;

    let customer = state
        .customers()
        .add_customer(NewCustomer { fields, addresses })
        .await?;

    tracing::info!(
        customer_id = %customer.id,
        addresses = customer.addresses.len(),
        "Customer with addresses created"
    );

    Ok((
        StatusCode::CREATED,
        [(
            header::LOCATION,
            format!("/api/customers/with-addresses/{}", customer.id),
        )],
        Json(CustomerWithAddressesDto::from(&customer)),
    ))
}

/// `PUT /api/customers/with-addresses/{customerId}`
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    AppPath(customer_id): AppPath<CustomerId>,
    AppJson(body): AppJson<CustomerWithAddressesForUpdate>,
) -> Result<StatusCode> {
    ensure_ids_match(customer_id, body.id)?;
    let (fields, addresses) = validate(body.name.as_deref(), body.cpf.as_deref(), &body.addresses)?;

    let customer = state
        .customers()
        .replace_customer(customer_id, fields, addresses)
        .await
        .map_err(|e| map_not_found(e, customer_id))?;

    tracing::info!(
        customer_id = %customer_id,
        addresses = customer.addresses.len(),
        "Customer addresses replaced"
    );
    Ok(StatusCode::NO_CONTENT)
}
