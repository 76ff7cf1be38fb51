use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{errors::ServiceError, ApiResponse, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/quote", post(quote_discount))
}

/// Read-only discount preview. Transport cost is derived from the delivery
/// city when given, so the quoted transport discount matches what checkout
/// would compute.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DiscountQuoteRequest {
    #[validate(length(min = 1, message = "Discount code is required"))]
    pub code: String,
    #[validate(email)]
    pub email: String,
    pub subtotal: Decimal,
    pub city: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DiscountQuoteResponse {
    pub valid: bool,
    pub code: String,
    pub discount_value: Decimal,
    pub applies_to_transport: bool,
    pub transport_discount: Decimal,
    pub total: Decimal,
    pub reason: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/discounts/quote",
    request_body = DiscountQuoteRequest,
    responses(
        (status = 200, description = "Quote computed; check `valid`", body = DiscountQuoteResponse),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse)
    ),
    tag = "Discounts"
)]
pub async fn quote_discount(
    State(state): State<AppState>,
    Json(payload): Json<DiscountQuoteRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;

    let transport_cost = payload
        .city
        .as_deref()
        .map(|city| state.services.transport.resolve(city))
        .unwrap_or(Decimal::ZERO);

    let quote = state
        .services
        .discounts
        .quote(
            &payload.code,
            &payload.email,
            payload.subtotal,
            transport_cost,
            Utc::now(),
        )
        .await?;

    Ok(Json(ApiResponse::success(DiscountQuoteResponse {
        valid: quote.valid,
        code: quote.code,
        discount_value: quote.discount_value,
        applies_to_transport: quote.applies_to_transport,
        transport_discount: quote.transport_discount,
        total: quote.total,
        reason: quote.reason,
    })))
}
