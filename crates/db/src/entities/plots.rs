//! `SeaORM` Entity for the plots table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{CommissionStatus, PlotStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "plots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project: String,
    pub plot_number: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub area_sqft: Option<Decimal>,
    pub description: Option<String>,
    pub status: PlotStatus,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub total_amount: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub booking_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub remaining_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((7, 4)))")]
    pub paid_percent: Decimal,
    pub broker_id: Option<Uuid>,
    pub buyer_name: Option<String>,
    pub commission_status: CommissionStatus,
    pub booked_at: Option<DateTimeWithTimeZone>,
    pub sold_at: Option<DateTimeWithTimeZone>,
    pub cancelled_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::brokers::Entity",
        from = "Column::BrokerId",
        to = "super::brokers::Column::Id"
    )]
    Brokers,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
}

impl Related<super::brokers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Brokers.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
