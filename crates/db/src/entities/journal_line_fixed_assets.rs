//! `SeaORM` Entity for journal_line_fixed_assets table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::DepreciationMethod;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_line_fixed_assets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub journal_line_id: Uuid,
    pub asset_name: String,
    pub acquisition_date: Date,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub acquisition_cost: Decimal,
    pub useful_life_years: i32,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub salvage_value: Decimal,
    pub depreciation_method: DepreciationMethod,
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
