use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Payment axis of the order lifecycle.
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
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "pending")]
    #[strum(serialize = "pending")]
    Pending,
    #[sea_orm(string_value = "in_progress")]
    #[strum(serialize = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "paid")]
    #[strum(serialize = "paid")]
    Paid,
    #[sea_orm(string_value = "failed")]
    #[strum(serialize = "failed")]
    Failed,
    #[sea_orm(string_value = "refunded")]
    #[strum(serialize = "refunded")]
    Refunded,
}

/// Shipping axis of the order lifecycle.
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
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum ShippingStatus {
    #[sea_orm(string_value = "pending_preparation")]
    #[strum(serialize = "pending_preparation")]
    PendingPreparation,
    #[sea_orm(string_value = "preparing")]
    #[strum(serialize = "preparing")]
    Preparing,
    #[sea_orm(string_value = "ready_to_ship")]
    #[strum(serialize = "ready_to_ship")]
    ReadyToShip,
    #[sea_orm(string_value = "in_transit")]
    #[strum(serialize = "in_transit")]
    InTransit,
    #[sea_orm(string_value = "delivered")]
    #[strum(serialize = "delivered")]
    Delivered,
    #[sea_orm(string_value = "returned")]
    #[strum(serialize = "returned")]
    Returned,
}

/// Overall order status, derived from the payment and shipping axes.
/// Never written directly by callers.
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
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "pending")]
    #[strum(serialize = "pending")]
    Pending,
    #[sea_orm(string_value = "in_preparation")]
    #[strum(serialize = "in_preparation")]
    InPreparation,
    #[sea_orm(string_value = "in_transit")]
    #[strum(serialize = "in_transit")]
    InTransit,
    #[sea_orm(string_value = "delivered_paid")]
    #[strum(serialize = "delivered_paid")]
    DeliveredPaid,
    #[sea_orm(string_value = "delivered_pending_payment")]
    #[strum(serialize = "delivered_pending_payment")]
    DeliveredPendingPayment,
    #[sea_orm(string_value = "canceled")]
    #[strum(serialize = "canceled")]
    Canceled,
    #[sea_orm(string_value = "returned")]
    #[strum(serialize = "returned")]
    Returned,
}

impl OrderStatus {
    /// Derives the overall status from the two lifecycle axes.
    ///
    /// Rules are evaluated in precedence order; the first match wins. The
    /// match is total over every `(PaymentStatus, ShippingStatus)` pair.
    pub fn derive(payment: PaymentStatus, shipping: ShippingStatus) -> Self {
        use PaymentStatus as P;
        use ShippingStatus as S;

        match (payment, shipping) {
            (P::Failed | P::Refunded, _) => Self::Canceled,
            (P::InProgress | P::Paid, S::PendingPreparation) => Self::InPreparation,
            (P::Paid, S::Delivered) => Self::DeliveredPaid,
            (P::Pending, S::Delivered) => Self::DeliveredPendingPayment,
            (P::Paid, S::InTransit) => Self::InTransit,
            (_, S::Returned) => Self::Returned,
            _ => Self::Pending,
        }
    }
}

/// How the customer pays for the order.
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
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "online")]
    #[strum(serialize = "online")]
    Online,
    #[sea_orm(string_value = "in_person")]
    #[strum(serialize = "in_person")]
    InPerson,
}

/// The `orders` table. Aggregate root for checkout.
///
/// The orderer is either a person (firstname/lastname/document fields) or a
/// company (company_id plus a name snapshot), never both. Monetary fields
/// are fixed-point and non-negative; `total` is recomputed by the pricing
/// engine at creation and never patched directly.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Externally visible order identity, unique across all orders.
    #[sea_orm(unique)]
    pub custom_order_id: String,

    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: String,
    pub phone: String,
    pub document_type: Option<String>,
    pub document_number: Option<String>,

    pub company_id: Option<Uuid>,
    pub company_name: Option<String>,

    pub address_id: Uuid,
    pub delivery_date: NaiveDate,
    pub delivery_slot: NaiveTime,

    pub subtotal: Decimal,
    pub transport_cost: Decimal,
    pub discount_id: Option<Uuid>,
    pub discount_value: Decimal,
    pub discount_on_transport: Decimal,
    pub tax: Option<Decimal>,
    pub total: Decimal,

    pub payment_status: PaymentStatus,
    pub shipping_status: ShippingStatus,
    pub order_status: OrderStatus,

    /// True until the payment status first leaves `pending`; temporary
    /// orders are excluded from reporting and fulfillment.
    pub is_temporary: bool,

    pub payment_method: PaymentMethod,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,

    #[sea_orm(has_many = "super::order_status_log::Entity")]
    StatusLogs,

    #[sea_orm(
        belongs_to = "super::address::Entity",
        from = "Column::AddressId",
        to = "super::address::Column::Id"
    )]
    Address,

    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::CompanyId",
        to = "super::company::Column::Id"
    )]
    Company,

    #[sea_orm(
        belongs_to = "super::discount::Entity",
        from = "Column::DiscountId",
        to = "super::discount::Column::Id",
        on_delete = "SetNull"
    )]
    Discount,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl Related<super::order_status_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusLogs.def()
    }
}

impl Related<super::address::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Address.def()
    }
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::discount::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Discount.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
