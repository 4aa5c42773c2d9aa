//! `SeaORM` Entity for journal_lines table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub journal_entry_id: Uuid,
    pub line_no: i32,
    pub account_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub debit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub credit: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::journal_entries::Entity",
        from = "Column::JournalEntryId",
        to = "super::journal_entries::Column::Id",
        on_delete = "Cascade"
    )]
    JournalEntries,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
    #[sea_orm(has_one = "super::journal_line_cash::Entity")]
    JournalLineCash,
    #[sea_orm(has_one = "super::journal_line_debts::Entity")]
    JournalLineDebts,
    #[sea_orm(has_one = "super::journal_line_fixed_assets::Entity")]
    JournalLineFixedAssets,
}

impl Related<super::journal_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalEntries.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::journal_line_cash::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalLineCash.def()
    }
}

impl Related<super::journal_line_debts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalLineDebts.def()
    }
}

impl Related<super::journal_line_fixed_assets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalLineFixedAssets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
