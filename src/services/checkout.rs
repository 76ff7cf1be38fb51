//! Checkout assembly: turns a validated cart into a priced, persisted
//! order inside one transaction.
//!
//! Everything that can fail without touching the database (date parsing,
//! serviceability, identity shape) is checked first; the transaction then
//! resolves the address, redeems the discount, snapshots item prices, runs
//! the pricing engine, and persists the order with its items. Any failure
//! rolls the whole thing back — no partial order, no stray counter
//! increment, no orphan address.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, Set, SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::address::{self, Entity as Address},
    entities::company::Entity as Company,
    entities::order::{self, OrderStatus, PaymentMethod, PaymentStatus, ShippingStatus},
    entities::order_item,
    entities::product::Entity as Product,
    entities::product_variation::Entity as ProductVariation,
    errors::ServiceError,
    events::{Event, EventSender},
    services::discounts::DiscountService,
    services::orders::{parse_delivery_date, parse_delivery_slot, OrderResponse},
    services::pricing,
    services::transport::TransportResolver,
};

/// Delivery address as submitted by the storefront.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddressInput {
    pub user_id: Option<Uuid>,
    #[validate(length(min = 1, message = "Street is required"))]
    pub street: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "State is required"))]
    pub state: String,
    #[validate(length(min = 1, message = "Postal code is required"))]
    pub postal_code: String,
    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,
}

/// One cart line. The price is resolved server-side; the client never
/// supplies it.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItemInput {
    pub product_id: Uuid,
    pub variation_id: Option<Uuid>,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    /// Externally visible identity; generated when absent.
    pub custom_order_id: Option<String>,

    /// Company orders reference a company; person orders carry the name
    /// and document fields. Exactly one of the two shapes must be used.
    pub company_id: Option<Uuid>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub document_type: Option<String>,
    pub document_number: Option<String>,

    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,

    #[validate]
    pub address: AddressInput,

    /// `%Y-%m-%d`
    pub delivery_date: String,
    /// `%H:%M`
    pub delivery_slot: String,

    pub discount_code: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub tax: Option<Decimal>,

    #[validate(length(min = 1, message = "Order must contain at least one item"))]
    pub items: Vec<OrderItemInput>,
}

/// Orderer contact block after identity resolution.
struct Orderer {
    firstname: Option<String>,
    lastname: Option<String>,
    document_type: Option<String>,
    document_number: Option<String>,
    company_id: Option<Uuid>,
    company_name: Option<String>,
    email: String,
    phone: String,
}

#[derive(Clone)]
pub struct CheckoutService {
    db: Arc<DatabaseConnection>,
    transport: Arc<TransportResolver>,
    discounts: Arc<DiscountService>,
    event_sender: EventSender,
}

impl CheckoutService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        transport: Arc<TransportResolver>,
        discounts: Arc<DiscountService>,
        event_sender: EventSender,
    ) -> Self {
        Self {
            db,
            transport,
            discounts,
            event_sender,
        }
    }

    /// Assembles and persists an order. See module docs for the sequence;
    /// the returned representation is fully priced.
    #[instrument(skip(self, request), fields(city = %request.address.city))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        request.validate()?;

        let delivery_date = parse_delivery_date(&request.delivery_date)?;
        let delivery_slot = parse_delivery_slot(&request.delivery_slot)?;

        if !self.transport.is_serviceable(&request.address.city) {
            return Err(ServiceError::UnserviceableLocation(
                request.address.city.clone(),
            ));
        }

        let now = Utc::now();
        let order_id = Uuid::new_v4();
        let custom_order_id = request.custom_order_id.clone().unwrap_or_else(|| {
            format!("ORD-{}", order_id.to_string()[..8].to_uppercase())
        });

        let txn = self.db.begin().await?;

        let orderer = self.resolve_orderer(&txn, &request).await?;
        let delivery_address = self.find_or_create_address(&txn, &request.address).await?;

        let disc = match &request.discount_code {
            Some(code) => {
                let disc = self
                    .discounts
                    .validate(&txn, code, &orderer.email, now)
                    .await?;
                self.discounts.redeem(&txn, &disc, &orderer.email).await?;
                Some(disc)
            }
            None => None,
        };

        let transport_cost = self.transport.resolve(&request.address.city);

        let mut subtotal = Decimal::ZERO;
        let mut item_rows = Vec::with_capacity(request.items.len());
        for line in &request.items {
            if line.quantity < 1 {
                return Err(ServiceError::ValidationError(format!(
                    "Quantity must be positive for product {}",
                    line.product_id
                )));
            }

            let (product_name, unit_price) = self.resolve_price(&txn, line).await?;
            let line_subtotal = unit_price * Decimal::from(line.quantity);
            subtotal += line_subtotal;

            item_rows.push(order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(line.product_id),
                variation_id: Set(line.variation_id),
                product_name: Set(product_name),
                quantity: Set(line.quantity),
                unit_price: Set(unit_price),
                subtotal: Set(line_subtotal),
                tax: Set(None),
                created_at: Set(now),
            });
        }

        let breakdown =
            pricing::compute_totals(Some(subtotal), Some(transport_cost), disc.as_ref());

        let payment_status = PaymentStatus::Pending;
        let shipping_status = ShippingStatus::PendingPreparation;

        let order_model = order::ActiveModel {
            id: Set(order_id),
            custom_order_id: Set(custom_order_id.clone()),
            firstname: Set(orderer.firstname),
            lastname: Set(orderer.lastname),
            email: Set(orderer.email),
            phone: Set(orderer.phone),
            document_type: Set(orderer.document_type),
            document_number: Set(orderer.document_number),
            company_id: Set(orderer.company_id),
            company_name: Set(orderer.company_name),
            address_id: Set(delivery_address.id),
            delivery_date: Set(delivery_date),
            delivery_slot: Set(delivery_slot),
            subtotal: Set(subtotal),
            transport_cost: Set(transport_cost),
            discount_id: Set(disc.as_ref().map(|d| d.id)),
            discount_value: Set(breakdown.discount_value),
            discount_on_transport: Set(breakdown.discount_on_transport),
            tax: Set(request.tax),
            total: Set(breakdown.total),
            payment_status: Set(payment_status),
            shipping_status: Set(shipping_status),
            order_status: Set(OrderStatus::derive(payment_status, shipping_status)),
            is_temporary: Set(true),
            payment_method: Set(request.payment_method.unwrap_or(PaymentMethod::Online)),
            created_at: Set(now),
            updated_at: Set(None),
        };

        let inserted = order_model.insert(&txn).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                ServiceError::Conflict(format!("Order {custom_order_id} already exists"))
            } else {
                ServiceError::DatabaseError(e)
            }
        })?;

        let mut items = Vec::with_capacity(item_rows.len());
        for row in item_rows {
            items.push(row.insert(&txn).await?);
        }

        txn.commit().await?;

        info!(
            order_id = %order_id,
            custom_order_id = %custom_order_id,
            total = %inserted.total,
            "order created"
        );

        if let Err(e) = self.event_sender.send(Event::OrderCreated(order_id)).await {
            warn!(error = %e, order_id = %order_id, "failed to send order created event");
        }
        if let Some(disc) = &disc {
            if let Err(e) = self
                .event_sender
                .send(Event::DiscountRedeemed {
                    order_id,
                    code: disc.code.clone(),
                })
                .await
            {
                warn!(error = %e, order_id = %order_id, "failed to send discount redeemed event");
            }
        }

        Ok(OrderResponse::from_models(inserted, items))
    }

    /// Resolves the orderer identity: a company reference or a person,
    /// never both, never neither.
    async fn resolve_orderer(
        &self,
        txn: &DatabaseTransaction,
        request: &CreateOrderRequest,
    ) -> Result<Orderer, ServiceError> {
        let has_person_fields = request.firstname.is_some()
            || request.lastname.is_some()
            || request.document_number.is_some();

        match request.company_id {
            Some(company_id) => {
                if has_person_fields {
                    return Err(ServiceError::ValidationError(
                        "Provide either a company or a person, not both".to_string(),
                    ));
                }

                let company = Company::find_by_id(company_id)
                    .one(txn)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Company {company_id} not found"))
                    })?;

                let email = request.email.clone().unwrap_or(company.email);
                let phone = match request.phone.clone().or(company.phone) {
                    Some(phone) => phone,
                    None => {
                        return Err(ServiceError::ValidationError(
                            "A contact phone is required".to_string(),
                        ))
                    }
                };

                Ok(Orderer {
                    firstname: None,
                    lastname: None,
                    document_type: None,
                    document_number: None,
                    company_id: Some(company.id),
                    company_name: Some(company.name),
                    email,
                    phone,
                })
            }
            None => {
                let firstname = required(&request.firstname, "firstname")?;
                let lastname = required(&request.lastname, "lastname")?;
                let document_type = required(&request.document_type, "document_type")?;
                let document_number = required(&request.document_number, "document_number")?;
                let email = required(&request.email, "email")?;
                let phone = required(&request.phone, "phone")?;

                Ok(Orderer {
                    firstname: Some(firstname),
                    lastname: Some(lastname),
                    document_type: Some(document_type),
                    document_number: Some(document_number),
                    company_id: None,
                    company_name: None,
                    email,
                    phone,
                })
            }
        }
    }

    /// Exact-match address lookup; inserts a new row only on a miss.
    async fn find_or_create_address(
        &self,
        txn: &DatabaseTransaction,
        input: &AddressInput,
    ) -> Result<address::Model, ServiceError> {
        let mut query = Address::find()
            .filter(address::Column::Street.eq(input.street.clone()))
            .filter(address::Column::City.eq(input.city.clone()))
            .filter(address::Column::State.eq(input.state.clone()))
            .filter(address::Column::PostalCode.eq(input.postal_code.clone()))
            .filter(address::Column::Country.eq(input.country.clone()));

        query = match input.user_id {
            Some(user_id) => query.filter(address::Column::UserId.eq(user_id)),
            None => query.filter(address::Column::UserId.is_null()),
        };

        if let Some(existing) = query.one(txn).await? {
            return Ok(existing);
        }

        let created = address::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(input.user_id),
            street: Set(input.street.clone()),
            city: Set(input.city.clone()),
            state: Set(input.state.clone()),
            postal_code: Set(input.postal_code.clone()),
            country: Set(input.country.clone()),
            is_default: Set(false),
        }
        .insert(txn)
        .await?;

        Ok(created)
    }

    /// Resolves the snapshot price for a cart line: the variation's price
    /// when one is named (and it must belong to the product), otherwise
    /// the product's own price.
    async fn resolve_price(
        &self,
        txn: &DatabaseTransaction,
        line: &OrderItemInput,
    ) -> Result<(String, Decimal), ServiceError> {
        let product = Product::find_by_id(line.product_id)
            .one(txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found", line.product_id))
            })?;

        match line.variation_id {
            Some(variation_id) => {
                let variation = ProductVariation::find_by_id(variation_id)
                    .one(txn)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!(
                            "Product variation {variation_id} not found"
                        ))
                    })?;

                if variation.product_id != product.id {
                    return Err(ServiceError::ValidationError(format!(
                        "Variation {variation_id} does not belong to product {}",
                        product.id
                    )));
                }

                Ok((format!("{} ({})", product.name, variation.sku), variation.price))
            }
            None => Ok((product.name, product.price)),
        }
    }
}

fn required(field: &Option<String>, name: &str) -> Result<String, ServiceError> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value.clone()),
        _ => Err(ServiceError::ValidationError(format!("{name} is required"))),
    }
}
