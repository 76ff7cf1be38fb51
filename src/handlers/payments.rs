use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    entities::order::PaymentStatus, errors::ServiceError, ApiResponse, AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/notifications", post(payment_notification))
}

/// Asynchronous payment-status notification, keyed by the public order
/// identity. This is the only input that mutates `payment_status` outside
/// the original checkout request; gateway signature verification happens
/// upstream of this service.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PaymentNotificationRequest {
    #[validate(length(min = 1, message = "custom_order_id is required"))]
    pub custom_order_id: String,
    #[validate(length(min = 1, message = "status is required"))]
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentNotificationResponse {
    pub custom_order_id: String,
    pub payment_status: PaymentStatus,
    pub order_status: crate::entities::order::OrderStatus,
}

/// Maps gateway status vocabulary onto the payment axis. Our own
/// snake_case values are accepted as-is; a gateway "pending" means the
/// payment attempt has started, which is `in_progress` on our axis.
fn map_gateway_status(raw: &str) -> Result<PaymentStatus, ServiceError> {
    match raw.to_ascii_lowercase().as_str() {
        "approved" | "paid" => Ok(PaymentStatus::Paid),
        "declined" | "error" | "failed" => Ok(PaymentStatus::Failed),
        "voided" | "refunded" => Ok(PaymentStatus::Refunded),
        "pending" | "in_progress" | "in_process" => Ok(PaymentStatus::InProgress),
        other => Err(ServiceError::ValidationError(format!(
            "Unknown payment status: {other}"
        ))),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/notifications",
    request_body = PaymentNotificationRequest,
    responses(
        (status = 200, description = "Notification applied", body = PaymentNotificationResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
        (status = 400, description = "Unknown status", body = crate::errors::ErrorResponse)
    ),
    tag = "Payments"
)]
pub async fn payment_notification(
    State(state): State<AppState>,
    Json(payload): Json<PaymentNotificationRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;

    let new_status = map_gateway_status(&payload.status)?;

    let order_id = state
        .services
        .orders
        .find_order_id_by_custom_id(&payload.custom_order_id)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("Order {} not found", payload.custom_order_id))
        })?;

    let updated = state
        .services
        .order_status
        .set_payment_status(order_id, new_status)
        .await?;

    info!(
        custom_order_id = %payload.custom_order_id,
        payment_status = %updated.payment_status,
        "payment notification applied"
    );

    Ok(Json(ApiResponse::success(PaymentNotificationResponse {
        custom_order_id: payload.custom_order_id,
        payment_status: updated.payment_status,
        order_status: updated.order_status,
    })))
}
