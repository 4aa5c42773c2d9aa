//! Chart of accounts as seen by the journal editor.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use storebooks_shared::types::AccountId;

/// Fundamental account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Asset account.
    Asset,
    /// Liability account.
    Liability,
    /// Equity account.
    Equity,
    /// Income account.
    Income,
    /// Expense account.
    Expense,
}

/// Category tag deciding which extension a journal line may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CategoryTag {
    /// Cash-like account; lines need a cash location.
    Cash,
    /// Accounts payable.
    Payable,
    /// Accounts receivable.
    Receivable,
    /// Fixed asset; lines may carry acquisition terms.
    FixedAsset,
}

impl CategoryTag {
    /// Returns true for receivable and payable tags.
    #[must_use]
    pub fn is_debt(self) -> bool {
        matches!(self, Self::Payable | Self::Receivable)
    }
}

/// A single account from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account ID.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// Account type.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Optional category tag.
    pub category_tag: Option<CategoryTag>,
}

/// Read-only registry of accounts for one company.
#[derive(Debug, Clone, Default)]
pub struct AccountCatalog {
    accounts: Vec<Account>,
    index: HashMap<AccountId, usize>,
}

impl AccountCatalog {
    /// Builds a catalog, keeping the listing order.
    ///
    /// If the same ID appears twice the later record wins.
    #[must_use]
    pub fn new(accounts: Vec<Account>) -> Self {
        let mut index = HashMap::with_capacity(accounts.len());
        for (position, account) in accounts.iter().enumerate() {
            index.insert(account.id, position);
        }
        Self { accounts, index }
    }

    /// Looks up an account by ID.
    #[must_use]
    pub fn get(&self, id: AccountId) -> Option<&Account> {
        self.index.get(&id).map(|&position| &self.accounts[position])
    }

    /// Iterates accounts in listing order.
    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    /// Iterates accounts carrying the given tag.
    pub fn by_category(&self, tag: CategoryTag) -> impl Iterator<Item = &Account> {
        self.accounts
            .iter()
            .filter(move |a| a.category_tag == Some(tag))
    }

    /// Number of accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Returns true if the catalog has no accounts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
