//! `SeaORM` Entity for the payments table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub plot_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    pub paid_on: Date,
    pub method: Option<String>,
    pub notes: Option<String>,
    pub voided_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::plots::Entity",
        from = "Column::PlotId",
        to = "super::plots::Column::Id"
    )]
    Plots,
}

impl Related<super::plots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
