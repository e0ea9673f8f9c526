//! `SeaORM` Entity for the wallet_transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::WalletTxnKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "wallet_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub broker_id: Uuid,
    pub kind: WalletTxnKind,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    pub plot_id: Option<Uuid>,
    pub level: Option<i16>,
    pub description: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::brokers::Entity",
        from = "Column::BrokerId",
        to = "super::brokers::Column::Id"
    )]
    Brokers,
    #[sea_orm(
        belongs_to = "super::plots::Entity",
        from = "Column::PlotId",
        to = "super::plots::Column::Id"
    )]
    Plots,
}

impl Related<super::brokers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Brokers.def()
    }
}

impl Related<super::plots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
