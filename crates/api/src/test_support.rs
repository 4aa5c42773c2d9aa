//! In-memory books used by the route tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use storebooks_core::catalog::{
    Account, CashLocation, Counterparty, LookupError, LookupSource, Store,
};
use storebooks_core::journal::{
    CommitError, CommitPayload, PersistenceGateway, ReconcileError, ReconciliationRequest,
    Reconciler, Requester, Rule,
};
use storebooks_shared::types::{
    BALANCE_TOLERANCE, CommitKey, CompanyId, EntryId, StoreId,
};

use crate::AppState;

#[derive(Default)]
struct Ledger {
    committed: Vec<(CommitKey, EntryId)>,
    accounts: Vec<Account>,
    stores: Vec<Store>,
    cash_locations: Vec<CashLocation>,
}

/// Shared fake standing in for the database repositories.
#[derive(Clone, Default)]
pub struct FakeBooks {
    ledger: Arc<Mutex<Ledger>>,
}

impl FakeBooks {
    pub fn state(&self) -> AppState {
        AppState {
            gateway: Arc::new(self.clone()),
            reconciler: Arc::new(self.clone()),
            lookups: Arc::new(self.clone()),
        }
    }

    pub fn committed(&self) -> Vec<(CommitKey, EntryId)> {
        self.ledger.lock().unwrap().committed.clone()
    }

    pub fn with_accounts(self, accounts: Vec<Account>) -> Self {
        self.ledger.lock().unwrap().accounts = accounts;
        self
    }

    pub fn with_stores(self, stores: Vec<Store>) -> Self {
        self.ledger.lock().unwrap().stores = stores;
        self
    }

    pub fn with_cash_locations(self, locations: Vec<CashLocation>) -> Self {
        self.ledger.lock().unwrap().cash_locations = locations;
        self
    }
}

#[async_trait]
impl PersistenceGateway for FakeBooks {
    async fn commit(
        &self,
        requester: &Requester,
        payload: &CommitPayload,
    ) -> Result<EntryId, CommitError> {
        if requester.company_id != payload.company_id {
            return Err(CommitError::Authorization {
                requester: requester.company_id,
                declared: payload.company_id,
            });
        }

        let debit: Decimal = payload.lines.iter().map(|l| l.debit).sum();
        let credit: Decimal = payload.lines.iter().map(|l| l.credit).sum();
        if (debit - credit).abs() >= BALANCE_TOLERANCE {
            return Err(CommitError::Validation {
                line_index: None,
                rule: Some(Rule::Unbalanced),
                message: format!("Debits and credits differ by {}", (debit - credit).abs()),
            });
        }

        let mut ledger = self.ledger.lock().unwrap();
        if let Some((_, entry_id)) = ledger
            .committed
            .iter()
            .find(|(key, _)| *key == payload.idempotency_key)
        {
            return Ok(*entry_id);
        }
        let entry_id = EntryId::new();
        ledger.committed.push((payload.idempotency_key, entry_id));
        Ok(entry_id)
    }
}

#[async_trait]
impl Reconciler for FakeBooks {
    async fn attach_counterparty_cash_location(
        &self,
        _requester: &Requester,
        _request: &ReconciliationRequest,
    ) -> Result<bool, ReconcileError> {
        Ok(true)
    }
}

#[async_trait]
impl LookupSource for FakeBooks {
    async fn accounts(&self, _company_id: CompanyId) -> Result<Vec<Account>, LookupError> {
        Ok(self.ledger.lock().unwrap().accounts.clone())
    }

    async fn stores(&self, company_id: CompanyId) -> Result<Vec<Store>, LookupError> {
        let ledger = self.ledger.lock().unwrap();
        Ok(ledger
            .stores
            .iter()
            .filter(|s| s.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn cash_locations(
        &self,
        _company_id: CompanyId,
        store_id: Option<StoreId>,
    ) -> Result<Vec<CashLocation>, LookupError> {
        let ledger = self.ledger.lock().unwrap();
        Ok(ledger
            .cash_locations
            .iter()
            .filter(|l| store_id.is_none() || l.store_id == store_id)
            .cloned()
            .collect())
    }

    async fn counterparties(
        &self,
        _company_id: CompanyId,
    ) -> Result<Vec<Counterparty>, LookupError> {
        Err(LookupError::Unavailable("counterparty service offline".to_string()))
    }
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
