//! Order lifecycle transitions.
//!
//! `payment_status` and `shipping_status` evolve independently; every write
//! goes through the named transition functions here, never through a raw
//! update. A transition compares against the persisted value, appends the
//! audit-log row, recomputes the derived `order_status`, and clears the
//! `is_temporary` flag the first time payment leaves `pending` — all in one
//! transaction, in a single pass. The log write and the status write commit
//! or roll back together.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    entities::order::{
        self, Entity as Order, Model as OrderModel, OrderStatus, PaymentStatus, ShippingStatus,
    },
    entities::order_status_log::{self, Entity as OrderStatusLog, StatusField},
    errors::ServiceError,
    events::{Event, EventSender},
};

/// A requested write to one of the two lifecycle axes.
#[derive(Debug, Clone, Copy)]
enum StatusChange {
    Payment(PaymentStatus),
    Shipping(ShippingStatus),
}

#[derive(Clone)]
pub struct OrderStatusService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl OrderStatusService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Moves the payment axis. The derived status and the temporary flag
    /// follow automatically; a write equal to the persisted value is a
    /// no-op and leaves no log row.
    #[instrument(skip(self), fields(order_id = %order_id, new_status = %new_status))]
    pub async fn set_payment_status(
        &self,
        order_id: Uuid,
        new_status: PaymentStatus,
    ) -> Result<OrderModel, ServiceError> {
        self.transition(order_id, StatusChange::Payment(new_status))
            .await
    }

    /// Moves the shipping axis.
    #[instrument(skip(self), fields(order_id = %order_id, new_status = %new_status))]
    pub async fn set_shipping_status(
        &self,
        order_id: Uuid,
        new_status: ShippingStatus,
    ) -> Result<OrderModel, ServiceError> {
        self.transition(order_id, StatusChange::Shipping(new_status))
            .await
    }

    async fn transition(
        &self,
        order_id: Uuid,
        change: StatusChange,
    ) -> Result<OrderModel, ServiceError> {
        let txn = self.db.begin().await?;

        // The previous value recorded in the log must be the persisted one,
        // so the read happens inside the same transaction as the write.
        let current = Order::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {order_id} not found")))?;

        let (field, previous_value, new_value) = match change {
            StatusChange::Payment(new) => (
                StatusField::PaymentStatus,
                current.payment_status.to_string(),
                new.to_string(),
            ),
            StatusChange::Shipping(new) => (
                StatusField::ShippingStatus,
                current.shipping_status.to_string(),
                new.to_string(),
            ),
        };

        if previous_value == new_value {
            txn.commit().await?;
            return Ok(current);
        }

        let (payment_status, shipping_status) = match change {
            StatusChange::Payment(new) => (new, current.shipping_status),
            StatusChange::Shipping(new) => (current.payment_status, new),
        };

        let derived = OrderStatus::derive(payment_status, shipping_status);

        // An order stops being temporary the first time payment moves off
        // pending; the flag never comes back.
        let is_temporary = current.is_temporary
            && !matches!(change, StatusChange::Payment(new) if new != PaymentStatus::Pending);

        order_status_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            field: Set(field),
            previous_value: Set(previous_value.clone()),
            new_value: Set(new_value.clone()),
            changed_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;

        let mut active: order::ActiveModel = current.into();
        active.payment_status = Set(payment_status);
        active.shipping_status = Set(shipping_status);
        active.order_status = Set(derived);
        active.is_temporary = Set(is_temporary);
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&txn).await?;

        txn.commit().await?;

        info!(
            order_id = %order_id,
            field = %field,
            previous = %previous_value,
            new = %new_value,
            order_status = %updated.order_status,
            "order status transitioned"
        );

        // Post-commit notification only; a send failure never affects the
        // committed transition.
        if let Err(e) = self
            .event_sender
            .send(Event::OrderStatusChanged {
                order_id,
                field,
                previous_value,
                new_value,
            })
            .await
        {
            warn!(error = %e, order_id = %order_id, "failed to send status change event");
        }

        Ok(updated)
    }

    /// Audit feed for a single order, oldest first.
    pub async fn status_log(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<order_status_log::Model>, ServiceError> {
        let logs = OrderStatusLog::find()
            .filter(order_status_log::Column::OrderId.eq(order_id))
            .order_by_asc(order_status_log::Column::ChangedAt)
            .all(&*self.db)
            .await?;

        Ok(logs)
    }

    /// Audit feed across all orders for a time window, consumed by the
    /// reporting collaborator for daily summaries.
    pub async fn status_log_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<order_status_log::Model>, ServiceError> {
        let logs = OrderStatusLog::find()
            .filter(order_status_log::Column::ChangedAt.gte(from))
            .filter(order_status_log::Column::ChangedAt.lte(to))
            .order_by_asc(order_status_log::Column::ChangedAt)
            .all(&*self.db)
            .await?;

        Ok(logs)
    }
}
