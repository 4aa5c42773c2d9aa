//! Account catalog and collaborator lookups.
//!
//! - `account` - Chart of accounts and category tags
//! - `lookup` - Stores, cash locations, counterparties and the read contract
//! - `cache` - Session-scoped caching of lookups

pub mod account;
pub mod cache;
pub mod lookup;

pub use account::{Account, AccountCatalog, AccountType, CategoryTag};
pub use cache::SessionLookups;
pub use lookup::{
    CashLocation, Counterparty, LocationType, LookupError, LookupSource, ReferenceData, Store,
};

#[cfg(test)]
pub use lookup::MockLookupSource;
