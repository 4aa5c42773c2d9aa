//! Session-scoped lookup caching using Moka.
//!
//! An editing session fetches each collaborator listing once and keeps it
//! until [`SessionLookups::invalidate_all`] is called.

use std::sync::Arc;

use moka::sync::Cache;
use storebooks_shared::types::{CompanyId, StoreId};
use tracing::debug;

use super::account::AccountCatalog;
use super::lookup::{CashLocation, Counterparty, LookupError, LookupSource, ReferenceData, Store};

/// Maximum number of store-scoped cash location listings kept per session.
const LOCATION_CACHE_CAPACITY: u64 = 64;

/// Listings cached for one company during one editing session.
#[derive(Clone)]
pub struct SessionLookups {
    source: Arc<dyn LookupSource>,
    company_id: CompanyId,
    catalog: Cache<CompanyId, Arc<AccountCatalog>>,
    stores: Cache<CompanyId, Arc<Vec<Store>>>,
    cash_locations: Cache<Option<StoreId>, Arc<Vec<CashLocation>>>,
    counterparties: Cache<CompanyId, Arc<Vec<Counterparty>>>,
}

impl SessionLookups {
    /// Creates an empty cache over `source` for `company_id`.
    #[must_use]
    pub fn new(source: Arc<dyn LookupSource>, company_id: CompanyId) -> Self {
        Self {
            source,
            company_id,
            catalog: Cache::new(1),
            stores: Cache::new(1),
            cash_locations: Cache::new(LOCATION_CACHE_CAPACITY),
            counterparties: Cache::new(1),
        }
    }

    /// Company this session reads for.
    #[must_use]
    pub fn company_id(&self) -> CompanyId {
        self.company_id
    }

    /// Returns the account catalog, fetching it on first use.
    ///
    /// # Errors
    ///
    /// Returns the source's error; failures are not cached.
    pub async fn catalog(&self) -> Result<Arc<AccountCatalog>, LookupError> {
        if let Some(catalog) = self.catalog.get(&self.company_id) {
            return Ok(catalog);
        }

        let accounts = self.source.accounts(self.company_id).await?;
        debug!(company_id = %self.company_id, count = accounts.len(), "Fetched account catalog");
        let catalog = Arc::new(AccountCatalog::new(accounts));
        self.catalog.insert(self.company_id, Arc::clone(&catalog));
        Ok(catalog)
    }

    /// Returns the company's stores, fetching them on first use.
    ///
    /// # Errors
    ///
    /// Returns the source's error; failures are not cached.
    pub async fn stores(&self) -> Result<Arc<Vec<Store>>, LookupError> {
        if let Some(stores) = self.stores.get(&self.company_id) {
            return Ok(stores);
        }

        let stores = Arc::new(self.source.stores(self.company_id).await?);
        self.stores.insert(self.company_id, Arc::clone(&stores));
        Ok(stores)
    }

    /// Builds the reference snapshot for validating lines of `store_id`.
    ///
    /// # Errors
    ///
    /// Returns the source's error; failures are not cached.
    pub async fn reference_data(
        &self,
        store_id: Option<StoreId>,
    ) -> Result<ReferenceData, LookupError> {
        let locations = self.cash_locations(store_id).await?;
        let counterparties = self.counterparties().await?;
        Ok(ReferenceData::new(
            locations.as_ref().clone(),
            counterparties.as_ref().clone(),
        ))
    }

    async fn cash_locations(
        &self,
        store_id: Option<StoreId>,
    ) -> Result<Arc<Vec<CashLocation>>, LookupError> {
        if let Some(locations) = self.cash_locations.get(&store_id) {
            return Ok(locations);
        }

        let locations = Arc::new(self.source.cash_locations(self.company_id, store_id).await?);
        debug!(
            company_id = %self.company_id,
            store_id = ?store_id,
            count = locations.len(),
            "Fetched cash locations"
        );
        self.cash_locations.insert(store_id, Arc::clone(&locations));
        Ok(locations)
    }

    async fn counterparties(&self) -> Result<Arc<Vec<Counterparty>>, LookupError> {
        if let Some(counterparties) = self.counterparties.get(&self.company_id) {
            return Ok(counterparties);
        }

        let counterparties = Arc::new(self.source.counterparties(self.company_id).await?);
        self.counterparties
            .insert(self.company_id, Arc::clone(&counterparties));
        Ok(counterparties)
    }

    /// Drops every cached listing; the next call refetches.
    pub fn invalidate_all(&self) {
        self.catalog.invalidate_all();
        self.stores.invalidate_all();
        self.cash_locations.invalidate_all();
        self.counterparties.invalidate_all();
    }
}
