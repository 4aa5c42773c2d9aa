//! `SeaORM` entities.

pub mod prelude;

pub mod accounts;
pub mod cash_locations;
pub mod companies;
pub mod counterparties;
pub mod journal_entries;
pub mod journal_line_cash;
pub mod journal_line_debts;
pub mod journal_line_fixed_assets;
pub mod journal_lines;
pub mod sea_orm_active_enums;
pub mod stores;
