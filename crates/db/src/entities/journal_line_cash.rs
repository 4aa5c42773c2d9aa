//! `SeaORM` Entity for journal_line_cash table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_line_cash")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub journal_line_id: Uuid,
    pub cash_location_id: Uuid,
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
