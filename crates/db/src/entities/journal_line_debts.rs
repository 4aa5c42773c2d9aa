//! `SeaORM` Entity for journal_line_debts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{DebtCategory, DebtDirection};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_line_debts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub journal_line_id: Uuid,
    pub direction: DebtDirection,
    pub category: DebtCategory,
    pub issue_date: Date,
    pub due_date: Date,
    #[sea_orm(column_type = "Decimal(Some((7, 4)))")]
    pub interest_rate: Decimal,
    pub interest_account_id: Option<Uuid>,
    pub interest_due_day: Option<i16>,
    pub counterparty_id: Uuid,
    pub linked_store_id: Option<Uuid>,
    pub counterparty_cash_location_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::journal_lines::Entity",
        from = "Column::JournalLineId",
        to = "super::journal_lines::Column::Id",
        on_delete = "Cascade"
    )]
    JournalLines,
}

impl Related<super::journal_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
