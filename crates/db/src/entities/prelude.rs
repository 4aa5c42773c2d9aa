//! `SeaORM` entity prelude.

pub use super::accounts::Entity as Accounts;
pub use super::cash_locations::Entity as CashLocations;
pub use super::companies::Entity as Companies;
pub use super::counterparties::Entity as Counterparties;
pub use super::journal_entries::Entity as JournalEntries;
pub use super::journal_line_cash::Entity as JournalLineCash;
pub use super::journal_line_debts::Entity as JournalLineDebts;
pub use super::journal_line_fixed_assets::Entity as JournalLineFixedAssets;
pub use super::journal_lines::Entity as JournalLines;
pub use super::stores::Entity as Stores;
