//! `SeaORM` active enums mirroring the Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use storebooks_core::catalog;
use storebooks_core::journal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
pub enum AccountType {
    #[sea_orm(string_value = "asset")]
    Asset,
    #[sea_orm(string_value = "liability")]
    Liability,
    #[sea_orm(string_value = "equity")]
    Equity,
    #[sea_orm(string_value = "income")]
    Income,
    #[sea_orm(string_value = "expense")]
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "category_tag")]
pub enum CategoryTag {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "payable")]
    Payable,
    #[sea_orm(string_value = "receivable")]
    Receivable,
    #[sea_orm(string_value = "fixed_asset")]
    FixedAsset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "location_type")]
pub enum LocationType {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "vault")]
    Vault,
    #[sea_orm(string_value = "bank")]
    Bank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_status")]
pub enum EntryStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "posted")]
    Posted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "debt_direction")]
pub enum DebtDirection {
    #[sea_orm(string_value = "receivable")]
    Receivable,
    #[sea_orm(string_value = "payable")]
    Payable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "debt_category")]
pub enum DebtCategory {
    #[sea_orm(string_value = "trade")]
    Trade,
    #[sea_orm(string_value = "loan")]
    Loan,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "depreciation_method")]
pub enum DepreciationMethod {
    #[sea_orm(string_value = "straight_line")]
    StraightLine,
    #[sea_orm(string_value = "declining_balance")]
    DecliningBalance,
    #[sea_orm(string_value = "double_declining")]
    DoubleDeclining,
}

/// Generates `From` conversions in both directions between a domain enum and its column enum.
macro_rules! mirror_enum {
    ($db:ident, $module:ident :: $domain:ident, [$($variant:ident),+ $(,)?]) => {
        impl From<$module::$domain> for $db {
            fn from(value: $module::$domain) -> Self {
                match value {
                    $($module::$domain::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$db> for $module::$domain {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }
    };
}

mirror_enum!(AccountType, catalog::AccountType, [Asset, Liability, Equity, Income, Expense]);
mirror_enum!(CategoryTag, catalog::CategoryTag, [Cash, Payable, Receivable, FixedAsset]);
mirror_enum!(LocationType, catalog::LocationType, [Cash, Vault, Bank]);
mirror_enum!(EntryStatus, journal::EntryStatus, [Draft, Posted]);
mirror_enum!(DebtDirection, journal::DebtDirection, [Receivable, Payable]);
mirror_enum!(DebtCategory, journal::DebtCategory, [Trade, Loan, Other]);
mirror_enum!(
    DepreciationMethod,
    journal::DepreciationMethod,
    [StraightLine, DecliningBalance, DoubleDeclining]
);
