//! Order query and post-creation update surface.
//!
//! Orders are never hard-deleted; cancellation is a payment status, and the
//! only mutable fields after checkout are the customer contact data, the
//! delivery metadata, and the payment status (which is routed through the
//! lifecycle service, never written directly).

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::address::Entity as Address,
    entities::order::{
        self, Entity as Order, Model as OrderModel, OrderStatus, PaymentMethod, PaymentStatus,
        ShippingStatus,
    },
    entities::order_item::{self, Entity as OrderItem, Model as OrderItemModel},
    errors::ServiceError,
    services::order_status::OrderStatusService,
};

pub const DELIVERY_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DELIVERY_SLOT_FORMAT: &str = "%H:%M";

/// Fields a caller may change after checkout. Everything else on the order
/// is immutable once created.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderRequest {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address_id: Option<Uuid>,
    /// `%Y-%m-%d`
    pub delivery_date: Option<String>,
    /// `%H:%M`
    pub delivery_slot: Option<String>,
    /// Routed through the lifecycle state machine, never written directly.
    pub payment_status: Option<PaymentStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub variation_id: Option<Uuid>,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub tax: Option<Decimal>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
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
    pub is_temporary: bool,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub items: Vec<OrderItemResponse>,
}

impl OrderResponse {
    pub fn from_models(order: OrderModel, items: Vec<OrderItemModel>) -> Self {
        Self {
            id: order.id,
            custom_order_id: order.custom_order_id,
            firstname: order.firstname,
            lastname: order.lastname,
            email: order.email,
            phone: order.phone,
            document_type: order.document_type,
            document_number: order.document_number,
            company_id: order.company_id,
            company_name: order.company_name,
            address_id: order.address_id,
            delivery_date: order.delivery_date,
            delivery_slot: order.delivery_slot,
            subtotal: order.subtotal,
            transport_cost: order.transport_cost,
            discount_id: order.discount_id,
            discount_value: order.discount_value,
            discount_on_transport: order.discount_on_transport,
            tax: order.tax,
            total: order.total,
            payment_status: order.payment_status,
            shipping_status: order.shipping_status,
            order_status: order.order_status,
            is_temporary: order.is_temporary,
            payment_method: order.payment_method,
            created_at: order.created_at,
            updated_at: order.updated_at,
            items: items
                .into_iter()
                .map(|item| OrderItemResponse {
                    id: item.id,
                    product_id: item.product_id,
                    variation_id: item.variation_id,
                    product_name: item.product_name,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    subtotal: item.subtotal,
                    tax: item.tax,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Parses the delivery date accepted on the wire.
pub fn parse_delivery_date(raw: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(raw, DELIVERY_DATE_FORMAT).map_err(|_| {
        ServiceError::ValidationError(format!(
            "Invalid delivery date '{raw}', expected {DELIVERY_DATE_FORMAT}"
        ))
    })
}

/// Parses the delivery time slot accepted on the wire.
pub fn parse_delivery_slot(raw: &str) -> Result<NaiveTime, ServiceError> {
    NaiveTime::parse_from_str(raw, DELIVERY_SLOT_FORMAT).map_err(|_| {
        ServiceError::ValidationError(format!(
            "Invalid delivery time '{raw}', expected {DELIVERY_SLOT_FORMAT}"
        ))
    })
}

#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    status: Arc<OrderStatusService>,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>, status: Arc<OrderStatusService>) -> Self {
        Self { db, status }
    }

    async fn load_items(&self, order_id: Uuid) -> Result<Vec<OrderItemModel>, ServiceError> {
        let items = OrderItem::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .all(&*self.db)
            .await?;
        Ok(items)
    }

    /// Retrieves an order with its items by internal id.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderResponse, ServiceError> {
        let order = Order::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {order_id} not found")))?;

        let items = self.load_items(order.id).await?;
        Ok(OrderResponse::from_models(order, items))
    }

    /// Retrieves an order by its externally visible identity.
    #[instrument(skip(self), fields(custom_order_id = %custom_order_id))]
    pub async fn get_order_by_custom_id(
        &self,
        custom_order_id: &str,
    ) -> Result<OrderResponse, ServiceError> {
        let order = Order::find()
            .filter(order::Column::CustomOrderId.eq(custom_order_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Order {custom_order_id} not found"))
            })?;

        let items = self.load_items(order.id).await?;
        Ok(OrderResponse::from_models(order, items))
    }

    /// Internal id for a public order identity, used by the payment
    /// notification intake.
    pub async fn find_order_id_by_custom_id(
        &self,
        custom_order_id: &str,
    ) -> Result<Option<Uuid>, ServiceError> {
        let order = Order::find()
            .filter(order::Column::CustomOrderId.eq(custom_order_id))
            .one(&*self.db)
            .await?;

        Ok(order.map(|o| o.id))
    }

    /// Lists orders with pagination, newest first. Temporary orders (no
    /// payment attempt yet) are excluded unless explicitly requested.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        page: u64,
        per_page: u64,
        include_temporary: bool,
    ) -> Result<OrderListResponse, ServiceError> {
        let page = page.max(1);

        let mut query = Order::find().order_by_desc(order::Column::CreatedAt);
        if !include_temporary {
            query = query.filter(order::Column::IsTemporary.eq(false));
        }

        let paginator = query.paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page - 1).await?;

        let mut responses = Vec::with_capacity(orders.len());
        for order in orders {
            let items = self.load_items(order.id).await?;
            responses.push(OrderResponse::from_models(order, items));
        }

        Ok(OrderListResponse {
            orders: responses,
            total,
            page,
            per_page,
        })
    }

    /// Partial update of the mutable slice of an order: contact fields,
    /// address reference, and delivery metadata. A payment status in the
    /// patch is applied afterwards through the lifecycle service so the
    /// transition is logged like any other.
    #[instrument(skip(self, request), fields(order_id = %order_id))]
    pub async fn update_order(
        &self,
        order_id: Uuid,
        request: UpdateOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        request.validate()?;

        let delivery_date = request
            .delivery_date
            .as_deref()
            .map(parse_delivery_date)
            .transpose()?;
        let delivery_slot = request
            .delivery_slot
            .as_deref()
            .map(parse_delivery_slot)
            .transpose()?;

        let txn = self.db.begin().await?;

        let order = Order::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {order_id} not found")))?;

        if let Some(address_id) = request.address_id {
            Address::find_by_id(address_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Address {address_id} not found"))
                })?;
        }

        let mut active: order::ActiveModel = order.into();
        if let Some(firstname) = request.firstname {
            active.firstname = Set(Some(firstname));
        }
        if let Some(lastname) = request.lastname {
            active.lastname = Set(Some(lastname));
        }
        if let Some(email) = request.email {
            active.email = Set(email);
        }
        if let Some(phone) = request.phone {
            active.phone = Set(phone);
        }
        if let Some(address_id) = request.address_id {
            active.address_id = Set(address_id);
        }
        if let Some(date) = delivery_date {
            active.delivery_date = Set(date);
        }
        if let Some(slot) = delivery_slot {
            active.delivery_slot = Set(slot);
        }
        active.updated_at = Set(Some(Utc::now()));

        active.update(&txn).await?;
        txn.commit().await?;

        if let Some(payment_status) = request.payment_status {
            self.status.set_payment_status(order_id, payment_status).await?;
        }

        info!(order_id = %order_id, "order updated");

        self.get_order(order_id).await
    }
}
