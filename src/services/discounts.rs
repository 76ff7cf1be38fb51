//! Discount code validation, quoting, and redemption.
//!
//! Validation is read-only and shared by the quote endpoint and the
//! checkout path. Redemption is the only mutating operation: it runs
//! inside the caller's checkout transaction and increments both usage
//! counters with guarded updates, so two checkouts racing for the last
//! use of a capped code cannot both succeed.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, QueryFilter, Set,
};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    entities::discount::{self, DiscountStatus, Entity as Discount},
    entities::user_discount::{self, Entity as UserDiscount},
    errors::ServiceError,
    services::pricing,
};

/// Outcome of a read-only discount quote.
#[derive(Debug, Clone, Serialize)]
pub struct DiscountQuote {
    pub valid: bool,
    pub code: String,
    pub discount_value: Decimal,
    pub applies_to_transport: bool,
    pub transport_discount: Decimal,
    pub total: Decimal,
    /// Machine-readable rejection kind when `valid` is false.
    pub reason: Option<String>,
}

#[derive(Clone)]
pub struct DiscountService {
    db: Arc<DatabaseConnection>,
}

/// Pure validity check against an already-loaded discount row. Checks run
/// in a fixed order and the first failure wins.
fn check_discount(
    disc: &discount::Model,
    today: NaiveDate,
    per_user_used: i32,
) -> Result<(), ServiceError> {
    match disc.status {
        DiscountStatus::Active => {}
        DiscountStatus::Expired => return Err(ServiceError::DiscountExpired),
        DiscountStatus::Redeemed | DiscountStatus::Suspended => {
            return Err(ServiceError::NotFound(format!(
                "Discount code {} not found",
                disc.code
            )))
        }
    }

    if today < disc.start_date || today > disc.end_date {
        return Err(ServiceError::DiscountExpired);
    }

    if let Some(max_total) = disc.max_uses_total {
        if disc.times_used >= max_total {
            return Err(ServiceError::DiscountGlobalLimitReached);
        }
    }

    if let Some(max_per_user) = disc.max_uses_per_user {
        if per_user_used >= max_per_user {
            return Err(ServiceError::DiscountPerUserLimitReached);
        }
    }

    Ok(())
}

impl DiscountService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Validates a discount code for a customer without mutating anything.
    /// Used both for quotes and as the pre-check of the committing path.
    pub async fn validate<C: ConnectionTrait>(
        &self,
        conn: &C,
        code: &str,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<discount::Model, ServiceError> {
        let disc = Discount::find()
            .filter(discount::Column::Code.eq(code))
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Discount code {code} not found")))?;

        let per_user_used = UserDiscount::find()
            .filter(user_discount::Column::DiscountId.eq(disc.id))
            .filter(user_discount::Column::Email.eq(email))
            .one(conn)
            .await?
            .map(|row| row.times_used)
            .unwrap_or(0);

        check_discount(&disc, now.date_naive(), per_user_used)?;

        Ok(disc)
    }

    /// Read-only quote: reports what a code would be worth against the
    /// given amounts. Never increments a counter; the committing side
    /// effect lives solely in [`DiscountService::redeem`].
    #[instrument(skip(self), fields(code = %code))]
    pub async fn quote(
        &self,
        code: &str,
        email: &str,
        subtotal: Decimal,
        transport_cost: Decimal,
        now: DateTime<Utc>,
    ) -> Result<DiscountQuote, ServiceError> {
        match self.validate(&*self.db, code, email, now).await {
            Ok(disc) => {
                let breakdown =
                    pricing::compute_totals(Some(subtotal), Some(transport_cost), Some(&disc));
                Ok(DiscountQuote {
                    valid: true,
                    code: disc.code,
                    discount_value: breakdown.discount_value,
                    applies_to_transport: disc.applicable_to_transport,
                    transport_discount: breakdown.discount_on_transport,
                    total: breakdown.total,
                    reason: None,
                })
            }
            Err(
                err @ (ServiceError::NotFound(_)
                | ServiceError::DiscountExpired
                | ServiceError::DiscountGlobalLimitReached
                | ServiceError::DiscountPerUserLimitReached),
            ) => Ok(DiscountQuote {
                valid: false,
                code: code.to_string(),
                discount_value: Decimal::ZERO,
                applies_to_transport: false,
                transport_discount: Decimal::ZERO,
                total: subtotal + transport_cost,
                reason: Some(err.kind().to_string()),
            }),
            Err(err) => Err(err),
        }
    }

    /// Commits a redemption inside the caller's transaction: increments
    /// `discounts.times_used` and the per-customer counter by exactly one.
    ///
    /// Both increments are guarded `UPDATE ... WHERE times_used < cap`
    /// statements, so of two concurrent redemptions racing past the
    /// validation read, only one can take the final use; the other sees
    /// zero affected rows and aborts its whole checkout.
    pub async fn redeem(
        &self,
        txn: &DatabaseTransaction,
        disc: &discount::Model,
        email: &str,
    ) -> Result<(), ServiceError> {
        let result = Discount::update_many()
            .col_expr(
                discount::Column::TimesUsed,
                Expr::col(discount::Column::TimesUsed).add(1),
            )
            .col_expr(discount::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(discount::Column::Id.eq(disc.id))
            .filter(
                Condition::any()
                    .add(discount::Column::MaxUsesTotal.is_null())
                    .add(
                        Expr::col(discount::Column::TimesUsed)
                            .lt(Expr::col(discount::Column::MaxUsesTotal)),
                    ),
            )
            .exec(txn)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::DiscountGlobalLimitReached);
        }

        let existing = UserDiscount::find()
            .filter(user_discount::Column::DiscountId.eq(disc.id))
            .filter(user_discount::Column::Email.eq(email))
            .one(txn)
            .await?;

        match existing {
            Some(row) => {
                let mut update = UserDiscount::update_many()
                    .col_expr(
                        user_discount::Column::TimesUsed,
                        Expr::col(user_discount::Column::TimesUsed).add(1),
                    )
                    .filter(user_discount::Column::Id.eq(row.id));

                if let Some(cap) = disc.max_uses_per_user {
                    update = update.filter(user_discount::Column::TimesUsed.lt(cap));
                }

                let result = update.exec(txn).await?;
                if result.rows_affected == 0 {
                    return Err(ServiceError::DiscountPerUserLimitReached);
                }
            }
            None => {
                // Lazy creation on first redemption. The unique index on
                // (email, discount_id) turns a creation race into a
                // conflict that aborts one of the two checkouts.
                if matches!(disc.max_uses_per_user, Some(cap) if cap < 1) {
                    return Err(ServiceError::DiscountPerUserLimitReached);
                }

                user_discount::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    email: Set(email.to_string()),
                    discount_id: Set(disc.id),
                    times_used: Set(1),
                    created_at: Set(Utc::now()),
                }
                .insert(txn)
                .await
                .map_err(|e| {
                    ServiceError::Conflict(format!("concurrent discount redemption: {e}"))
                })?;
            }
        }

        info!(code = %disc.code, "discount redeemed");
        Ok(())
    }
}
