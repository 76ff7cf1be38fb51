use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    #[sea_orm(string_value = "absolute")]
    #[strum(serialize = "absolute")]
    Absolute,
    #[sea_orm(string_value = "percentage")]
    #[strum(serialize = "percentage")]
    Percentage,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum DiscountStatus {
    #[sea_orm(string_value = "active")]
    #[strum(serialize = "active")]
    Active,
    #[sea_orm(string_value = "expired")]
    #[strum(serialize = "expired")]
    Expired,
    #[sea_orm(string_value = "redeemed")]
    #[strum(serialize = "redeemed")]
    Redeemed,
    #[sea_orm(string_value = "suspended")]
    #[strum(serialize = "suspended")]
    Suspended,
}

/// The `discounts` table. Codes are created by administrators and mutated
/// only by redemption, which increments `times_used`. Orders keep a
/// SET NULL reference so a deleted code never cascades into order history.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "discounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub code: String,

    pub discount_type: DiscountType,
    pub value: Decimal,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    pub max_uses_total: Option<i32>,
    pub max_uses_per_user: Option<i32>,
    pub times_used: i32,

    /// When set, the same discount also applies against the transport cost.
    pub applicable_to_transport: bool,

    pub status: DiscountStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,

    #[sea_orm(has_many = "super::user_discount::Entity")]
    UserDiscounts,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Related<super::user_discount::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserDiscounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
