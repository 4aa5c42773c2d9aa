//! Catalog repository for the read-only listings the journal editor needs.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};
use storebooks_core::catalog::{
    Account, CashLocation, Counterparty, LookupError, LookupSource, ReferenceData, Store,
};
use storebooks_shared::types::{CompanyId, StoreId};
use tracing::warn;

use crate::entities::{accounts, cash_locations, counterparties, stores};

impl From<accounts::Model> for Account {
    fn from(model: accounts::Model) -> Self {
        Self {
            id: model.id.into(),
            name: model.name,
            account_type: model.account_type.into(),
            category_tag: model.category_tag.map(Into::into),
        }
    }
}

impl From<stores::Model> for Store {
    fn from(model: stores::Model) -> Self {
        Self {
            id: model.id.into(),
            company_id: model.company_id.into(),
            name: model.name,
        }
    }
}

impl From<cash_locations::Model> for CashLocation {
    fn from(model: cash_locations::Model) -> Self {
        Self {
            id: model.id.into(),
            company_id: model.company_id.into(),
            store_id: model.store_id.map(Into::into),
            name: model.name,
            location_type: model.location_type.into(),
        }
    }
}

impl From<counterparties::Model> for Counterparty {
    fn from(model: counterparties::Model) -> Self {
        Self {
            id: model.id.into(),
            company_id: model.company_id.into(),
            name: model.name,
            is_internal: model.is_internal,
            linked_company_id: model.linked_company_id.map(Into::into),
        }
    }
}

/// Catalog repository over accounts, stores, cash locations and counterparties.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    db: DatabaseConnection,
}

impl CatalogRepository {
    /// Creates a new catalog repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists the company's accounts ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(&self, company_id: CompanyId) -> Result<Vec<Account>, DbErr> {
        let rows = accounts::Entity::find()
            .filter(accounts::Column::CompanyId.eq(company_id.into_inner()))
            .order_by_asc(accounts::Column::Name)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Account::from).collect())
    }

    /// Lists the company's stores ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_stores(&self, company_id: CompanyId) -> Result<Vec<Store>, DbErr> {
        let rows = stores::Entity::find()
            .filter(stores::Column::CompanyId.eq(company_id.into_inner()))
            .order_by_asc(stores::Column::Name)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Store::from).collect())
    }

    /// Lists cash locations, narrowed to one store when `store_id` is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_cash_locations(
        &self,
        company_id: CompanyId,
        store_id: Option<StoreId>,
    ) -> Result<Vec<CashLocation>, DbErr> {
        let mut query = cash_locations::Entity::find()
            .filter(cash_locations::Column::CompanyId.eq(company_id.into_inner()));

        if let Some(store_id) = store_id {
            query = query.filter(cash_locations::Column::StoreId.eq(store_id.into_inner()));
        }

        let rows = query
            .order_by_asc(cash_locations::Column::Name)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(CashLocation::from).collect())
    }

    /// Lists the company's counterparties ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_counterparties(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<Counterparty>, DbErr> {
        let rows = counterparties::Entity::find()
            .filter(counterparties::Column::CompanyId.eq(company_id.into_inner()))
            .order_by_asc(counterparties::Column::Name)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Counterparty::from).collect())
    }

    /// Loads the listings a validation run for `store_id` needs.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn reference_data(
        &self,
        company_id: CompanyId,
        store_id: Option<StoreId>,
    ) -> Result<ReferenceData, DbErr> {
        let locations = self.list_cash_locations(company_id, store_id).await?;
        let counterparties = self.list_counterparties(company_id).await?;
        Ok(ReferenceData::new(locations, counterparties))
    }
}

fn lookup_error(err: DbErr) -> LookupError {
    warn!(error = %err, "Catalog lookup failed");
    LookupError::Unavailable(err.to_string())
}

#[async_trait]
impl LookupSource for CatalogRepository {
    async fn accounts(&self, company_id: CompanyId) -> Result<Vec<Account>, LookupError> {
        self.list_accounts(company_id).await.map_err(lookup_error)
    }

    async fn stores(&self, company_id: CompanyId) -> Result<Vec<Store>, LookupError> {
        self.list_stores(company_id).await.map_err(lookup_error)
    }

    async fn cash_locations(
        &self,
        company_id: CompanyId,
        store_id: Option<StoreId>,
    ) -> Result<Vec<CashLocation>, LookupError> {
        self.list_cash_locations(company_id, store_id)
            .await
            .map_err(lookup_error)
    }

    async fn counterparties(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<Counterparty>, LookupError> {
        self.list_counterparties(company_id)
            .await
            .map_err(lookup_error)
    }
}
