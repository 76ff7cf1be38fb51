use axum::Json;
use utoipa::OpenApi;

/// Aggregated OpenAPI document for the HTTP surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "tienda-api",
        description = "Order management, checkout pricing, and discount redemption for a local-delivery storefront"
    ),
    paths(
        crate::handlers::health::health,
        crate::handlers::orders::create_order,
        crate::handlers::orders::list_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::get_order_by_custom_id,
        crate::handlers::orders::update_order,
        crate::handlers::orders::set_payment_status,
        crate::handlers::orders::set_shipping_status,
        crate::handlers::orders::status_log,
        crate::handlers::orders::status_log_range,
        crate::handlers::discounts::quote_discount,
        crate::handlers::payments::payment_notification,
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        crate::entities::order::PaymentStatus,
        crate::entities::order::ShippingStatus,
        crate::entities::order::OrderStatus,
        crate::entities::order::PaymentMethod,
        crate::entities::order_status_log::StatusField,
        crate::services::checkout::CreateOrderRequest,
        crate::services::checkout::AddressInput,
        crate::services::checkout::OrderItemInput,
        crate::services::orders::UpdateOrderRequest,
        crate::services::orders::OrderResponse,
        crate::services::orders::OrderItemResponse,
        crate::services::orders::OrderListResponse,
        crate::handlers::orders::UpdatePaymentStatusRequest,
        crate::handlers::orders::UpdateShippingStatusRequest,
        crate::handlers::orders::StatusLogEntry,
        crate::handlers::discounts::DiscountQuoteRequest,
        crate::handlers::discounts::DiscountQuoteResponse,
        crate::handlers::payments::PaymentNotificationRequest,
        crate::handlers::payments::PaymentNotificationResponse,
        crate::handlers::health::HealthResponse,
    )),
    tags(
        (name = "Orders", description = "Checkout and order lifecycle"),
        (name = "Discounts", description = "Discount code quotes"),
        (name = "Payments", description = "Payment notification intake"),
        (name = "Health", description = "Service health")
    )
)]
pub struct ApiDoc;

/// Serves the raw OpenAPI document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
