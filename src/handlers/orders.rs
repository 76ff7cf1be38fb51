use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entities::order::{PaymentStatus, ShippingStatus},
    entities::order_status_log::{self, StatusField},
    errors::ServiceError,
    services::checkout::CreateOrderRequest,
    services::orders::{OrderListResponse, OrderResponse, UpdateOrderRequest},
    ApiResponse, AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order).get(list_orders))
        .route("/status-log", get(status_log_range))
        .route("/customid/:custom_order_id", get(get_order_by_custom_id))
        .route("/:id", get(get_order).patch(update_order))
        .route("/:id/payment-status", post(set_payment_status))
        .route("/:id/shipping-status", post(set_shipping_status))
        .route("/:id/status-log", get(status_log))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub include_temporary: bool,
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    20
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePaymentStatusRequest {
    pub status: PaymentStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateShippingStatusRequest {
    pub status: ShippingStatus,
}

/// Window for the cross-order audit feed; defaults to the last 24 hours.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusLogRangeQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusLogEntry {
    pub id: Uuid,
    pub order_id: Uuid,
    pub field: StatusField,
    pub previous_value: String,
    pub new_value: String,
    pub changed_at: DateTime<Utc>,
}

impl From<order_status_log::Model> for StatusLogEntry {
    fn from(model: order_status_log::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            field: model.field,
            previous_value: model.previous_value,
            new_value: model.new_value,
            changed_at: model.changed_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 422, description = "Unserviceable city or discount rejected", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.checkout.create_order(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(order))))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders",
    responses(
        (status = 200, description = "Paginated orders", body = OrderListResponse)
    ),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let orders = state
        .services
        .orders
        .list_orders(query.page, query.limit, query.include_temporary)
        .await?;
    Ok(Json(ApiResponse::success(orders)))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.orders.get_order(id).await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/customid/{custom_order_id}",
    params(("custom_order_id" = String, Path, description = "Public order identity")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn get_order_by_custom_id(
    State(state): State<AppState>,
    Path(custom_order_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state
        .services
        .orders
        .get_order_by_custom_id(&custom_order_id)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.orders.update_order(id, payload).await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/payment-status",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdatePaymentStatusRequest,
    responses(
        (status = 200, description = "Payment status transitioned", body = OrderResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn set_payment_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePaymentStatusRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .order_status
        .set_payment_status(id, payload.status)
        .await?;
    let order = state.services.orders.get_order(id).await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/shipping-status",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateShippingStatusRequest,
    responses(
        (status = 200, description = "Shipping status transitioned", body = OrderResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn set_shipping_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateShippingStatusRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .order_status
        .set_shipping_status(id, payload.status)
        .await?;
    let order = state.services.orders.get_order(id).await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/status-log",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Audit log for the order", body = [StatusLogEntry])
    ),
    tag = "Orders"
)]
pub async fn status_log(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    // 404 for unknown orders rather than an empty feed.
    state.services.orders.get_order(id).await?;

    let entries: Vec<StatusLogEntry> = state
        .services
        .order_status
        .status_log(id)
        .await?
        .into_iter()
        .map(StatusLogEntry::from)
        .collect();

    Ok(Json(ApiResponse::success(entries)))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/status-log",
    responses(
        (status = 200, description = "Audit log across orders for a time window", body = [StatusLogEntry])
    ),
    tag = "Orders"
)]
pub async fn status_log_range(
    State(state): State<AppState>,
    Query(query): Query<StatusLogRangeQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let to = query.to.unwrap_or_else(Utc::now);
    let from = query.from.unwrap_or(to - Duration::hours(24));

    if from > to {
        return Err(ServiceError::ValidationError(
            "'from' must not be after 'to'".to_string(),
        ));
    }

    let entries: Vec<StatusLogEntry> = state
        .services
        .order_status
        .status_log_range(from, to)
        .await?
        .into_iter()
        .map(StatusLogEntry::from)
        .collect();

    Ok(Json(ApiResponse::success(entries)))
}
