//! Read-only catalog listings for editors running away from the database.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::{Deserialize, Serialize};
use storebooks_core::catalog::{Account, CashLocation, Counterparty, Store};
use storebooks_shared::types::{CompanyId, StoreId};

use crate::error::ApiError;
use crate::routes::journal::ensure_company;
use crate::{AppState, middleware::AuthRequester};

/// Creates the catalog routes (requires the identity middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/companies/{company_id}/accounts", get(list_accounts))
        .route("/companies/{company_id}/stores", get(list_stores))
        .route(
            "/companies/{company_id}/cash-locations",
            get(list_company_cash_locations),
        )
        .route(
            "/companies/{company_id}/stores/{store_id}/cash-locations",
            get(list_store_cash_locations),
        )
        .route(
            "/companies/{company_id}/counterparties",
            get(list_counterparties),
        )
}

/// Response for the account listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountsResponse {
    /// Accounts ordered by name.
    pub accounts: Vec<Account>,
}

/// Response for the store listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct StoresResponse {
    /// Stores ordered by name.
    pub stores: Vec<Store>,
}

/// Response for a cash location listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct CashLocationsResponse {
    /// Cash locations ordered by name.
    pub cash_locations: Vec<CashLocation>,
}

/// Response for the counterparty listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct CounterpartiesResponse {
    /// Counterparties ordered by name.
    pub counterparties: Vec<Counterparty>,
}

/// GET `/companies/{company_id}/accounts`
async fn list_accounts(
    State(state): State<AppState>,
    auth: AuthRequester,
    Path(company_id): Path<CompanyId>,
) -> Result<Json<AccountsResponse>, ApiError> {
    ensure_company(&auth, company_id)?;
    let accounts = state.lookups.accounts(company_id).await?;
    Ok(Json(AccountsResponse { accounts }))
}

/// GET `/companies/{company_id}/stores`
async fn list_stores(
    State(state): State<AppState>,
    auth: AuthRequester,
    Path(company_id): Path<CompanyId>,
) -> Result<Json<StoresResponse>, ApiError> {
    ensure_company(&auth, company_id)?;
    let stores = state.lookups.stores(company_id).await?;
    Ok(Json(StoresResponse { stores }))
}

/// GET `/companies/{company_id}/cash-locations` - Every location of the company.
async fn list_company_cash_locations(
    State(state): State<AppState>,
    auth: AuthRequester,
    Path(company_id): Path<CompanyId>,
) -> Result<Json<CashLocationsResponse>, ApiError> {
    ensure_company(&auth, company_id)?;
    let cash_locations = state.lookups.cash_locations(company_id, None).await?;
    Ok(Json(CashLocationsResponse { cash_locations }))
}

/// GET `/companies/{company_id}/stores/{store_id}/cash-locations`
async fn list_store_cash_locations(
    State(state): State<AppState>,
    auth: AuthRequester,
    Path((company_id, store_id)): Path<(CompanyId, StoreId)>,
) -> Result<Json<CashLocationsResponse>, ApiError> {
    ensure_company(&auth, company_id)?;
    let cash_locations = state
        .lookups
        .cash_locations(company_id, Some(store_id))
        .await?;
    Ok(Json(CashLocationsResponse { cash_locations }))
}

/// GET `/companies/{company_id}/counterparties`
async fn list_counterparties(
    State(state): State<AppState>,
    auth: AuthRequester,
    Path(company_id): Path<CompanyId>,
) -> Result<Json<CounterpartiesResponse>, ApiError> {
    ensure_company(&auth, company_id)?;
    let counterparties = state.lookups.counterparties(company_id).await?;
    Ok(Json(CounterpartiesResponse { counterparties }))
}
