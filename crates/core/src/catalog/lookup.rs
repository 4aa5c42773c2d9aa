//! Collaborator read contracts: stores, cash locations, counterparties.
//!
//! These listings are owned by other parts of the system. The journal engine
//! only reads them, through [`LookupSource`], and validates against an
//! immutable [`ReferenceData`] snapshot.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use storebooks_shared::types::{CashLocationId, CompanyId, CounterpartyId, StoreId};
use thiserror::Error;

use super::account::Account;

/// Kind of place cash is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    /// Till or cash drawer.
    Cash,
    /// Safe or vault.
    Vault,
    /// Bank account.
    Bank,
}

impl LocationType {
    /// Returns true if journal lines on a cash account may point at this location.
    #[must_use]
    pub fn holds_physical_cash(self) -> bool {
        matches!(self, Self::Cash | Self::Vault)
    }
}

/// A place where a store keeps cash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashLocation {
    /// Location ID.
    pub id: CashLocationId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Store the location belongs to; `None` for company-level locations.
    pub store_id: Option<StoreId>,
    /// Display name.
    pub name: String,
    /// Location type.
    pub location_type: LocationType,
}

/// A party on the other side of a receivable or payable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterparty {
    /// Counterparty ID.
    pub id: CounterpartyId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Display name.
    pub name: String,
    /// Internal counterparties are other stores/companies of the same organization.
    pub is_internal: bool,
    /// The company an internal counterparty stands for.
    pub linked_company_id: Option<CompanyId>,
}

/// A store of a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    /// Store ID.
    pub id: StoreId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Display name.
    pub name: String,
}

/// Errors from a lookup source.
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    /// Source could not be reached.
    #[error("Lookup source unavailable: {0}")]
    Unavailable(String),

    /// Source refused the request.
    #[error("Lookup rejected: {0}")]
    Rejected(String),
}

impl LookupError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "LOOKUP_UNAVAILABLE",
            Self::Rejected(_) => "LOOKUP_REJECTED",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Unavailable(_) => 503,
            Self::Rejected(_) => 403,
        }
    }
}

/// Read-only listings consumed by the journal engine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LookupSource: Send + Sync {
    /// Lists the company's chart of accounts.
    async fn accounts(&self, company_id: CompanyId) -> Result<Vec<Account>, LookupError>;

    /// Lists the company's stores.
    async fn stores(&self, company_id: CompanyId) -> Result<Vec<Store>, LookupError>;

    /// Lists cash locations, narrowed to one store when given.
    async fn cash_locations(
        &self,
        company_id: CompanyId,
        store_id: Option<StoreId>,
    ) -> Result<Vec<CashLocation>, LookupError>;

    /// Lists the company's counterparties.
    async fn counterparties(&self, company_id: CompanyId)
    -> Result<Vec<Counterparty>, LookupError>;
}

/// Immutable snapshot of the listings a validation run needs.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    cash_locations: Vec<CashLocation>,
    counterparties: Vec<Counterparty>,
}

impl ReferenceData {
    /// Creates a snapshot from already fetched listings.
    #[must_use]
    pub fn new(cash_locations: Vec<CashLocation>, counterparties: Vec<Counterparty>) -> Self {
        Self {
            cash_locations,
            counterparties,
        }
    }

    /// Finds a cash location by ID.
    #[must_use]
    pub fn cash_location(&self, id: CashLocationId) -> Option<&CashLocation> {
        self.cash_locations.iter().find(|l| l.id == id)
    }

    /// Finds a counterparty by ID.
    #[must_use]
    pub fn counterparty(&self, id: CounterpartyId) -> Option<&Counterparty> {
        self.counterparties.iter().find(|c| c.id == id)
    }

    /// Cash locations a cash line of `store_id` may choose from.
    pub fn selectable_locations(
        &self,
        store_id: StoreId,
    ) -> impl Iterator<Item = &CashLocation> {
        self.cash_locations.iter().filter(move |l| {
            l.store_id == Some(store_id) && l.location_type.holds_physical_cash()
        })
    }

    /// All counterparties.
    #[must_use]
    pub fn counterparties(&self) -> &[Counterparty] {
        &self.counterparties
    }
}
