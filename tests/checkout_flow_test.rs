//! End-to-end checkout tests: identity resolution, serviceability,
//! pricing, snapshots, and transaction atomicity.

mod common;

use std::str::FromStr;

use axum::http::{Method, StatusCode};
use common::{person_order_payload, response_json, TestApp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::PaginatorTrait;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::json;
use uuid::Uuid;

use tienda_api::entities::{address, discount, order, user_discount};

fn money(value: &serde_json::Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("money as string")).expect("decimal")
}

#[tokio::test]
async fn checkout_prices_order_with_percentage_discount() {
    let app = TestApp::new().await;
    let product = app.seed_product("Papa pastusa", dec!(50000)).await;
    app.seed_discount(
        "SAVE10",
        discount::DiscountType::Percentage,
        dec!(10),
        None,
        None,
        false,
    )
    .await;

    let mut payload = person_order_payload(product.id, 2, "BOGOTA");
    payload["discount_code"] = json!("SAVE10");

    let response = app.request(Method::POST, "/api/v1/orders", Some(payload)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    let data = &body["data"];

    assert_eq!(money(&data["subtotal"]), dec!(100000));
    assert_eq!(money(&data["transport_cost"]), dec!(8000));
    assert_eq!(money(&data["discount_value"]), dec!(10000));
    assert_eq!(money(&data["discount_on_transport"]), dec!(0));
    assert_eq!(money(&data["total"]), dec!(98000));

    assert_eq!(data["payment_status"], "pending");
    assert_eq!(data["shipping_status"], "pending_preparation");
    assert_eq!(data["order_status"], "pending");
    assert_eq!(data["is_temporary"], true);

    let items = data["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(money(&items[0]["unit_price"]), dec!(50000));
    assert_eq!(money(&items[0]["subtotal"]), dec!(100000));
}

#[tokio::test]
async fn checkout_without_discount_sums_subtotal_and_transport() {
    let app = TestApp::new().await;
    let product = app.seed_product("Aguacate hass", dec!(12000)).await;

    let payload = person_order_payload(product.id, 3, "Chía");
    let response = app.request(Method::POST, "/api/v1/orders", Some(payload)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    let data = &body["data"];
    assert_eq!(money(&data["subtotal"]), dec!(36000));
    // Chía normalizes to CHIA, which has a 5000 fee.
    assert_eq!(money(&data["transport_cost"]), dec!(5000));
    assert_eq!(money(&data["total"]), dec!(41000));
}

#[tokio::test]
async fn unserviceable_city_rejects_checkout_without_persisting() {
    let app = TestApp::new().await;
    let product = app.seed_product("Tomate chonto", dec!(4000)).await;

    let payload = person_order_payload(product.id, 1, "Medellín");
    let response = app.request(Method::POST, "/api/v1/orders", Some(payload)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = response_json(response).await;
    assert_eq!(body["error"], "unserviceable_location");

    let orders = order::Entity::find().count(&*app.state.db).await.unwrap();
    assert_eq!(orders, 0);
    let addresses = address::Entity::find().count(&*app.state.db).await.unwrap();
    assert_eq!(addresses, 0);
}

#[tokio::test]
async fn malformed_delivery_date_is_rejected() {
    let app = TestApp::new().await;
    let product = app.seed_product("Cebolla larga", dec!(3000)).await;

    let mut payload = person_order_payload(product.id, 1, "BOGOTA");
    payload["delivery_date"] = json!("15/06/2025");

    let response = app.request(Method::POST, "/api/v1/orders", Some(payload)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn company_order_copies_contact_from_company() {
    let app = TestApp::new().await;
    let product = app.seed_product("Café de finca", dec!(28000)).await;
    let company = app.seed_company("Restaurante La Huerta", "900123456-7").await;

    let payload = json!({
        "company_id": company.id,
        "address": {
            "street": "Calle 93 # 11-27",
            "city": "BOGOTA",
            "state": "Cundinamarca",
            "postal_code": "110221",
            "country": "Colombia"
        },
        "delivery_date": "2025-06-20",
        "delivery_slot": "08:00",
        "items": [{"product_id": product.id, "quantity": 4}]
    });

    let response = app.request(Method::POST, "/api/v1/orders", Some(payload)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    let data = &body["data"];
    assert_eq!(data["company_name"], "Restaurante La Huerta");
    assert_eq!(data["email"], company.email);
    assert_eq!(data["firstname"], serde_json::Value::Null);
}

#[tokio::test]
async fn company_and_person_identity_are_mutually_exclusive() {
    let app = TestApp::new().await;
    let product = app.seed_product("Limón tahití", dec!(6000)).await;
    let company = app.seed_company("Mercado Verde", "901234567-1").await;

    let mut payload = person_order_payload(product.id, 1, "BOGOTA");
    payload["company_id"] = json!(company.id);

    let response = app.request(Method::POST, "/api/v1/orders", Some(payload)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn person_order_requires_document_fields() {
    let app = TestApp::new().await;
    let product = app.seed_product("Banano criollo", dec!(2500)).await;

    let mut payload = person_order_payload(product.id, 1, "BOGOTA");
    payload.as_object_mut().unwrap().remove("document_number");

    let response = app.request(Method::POST, "/api/v1/orders", Some(payload)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn exact_address_match_is_reused() {
    let app = TestApp::new().await;
    let product = app.seed_product("Zanahoria", dec!(3500)).await;

    let first = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(person_order_payload(product.id, 1, "CAJICA")),
        )
        .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(person_order_payload(product.id, 2, "CAJICA")),
        )
        .await;
    assert_eq!(second.status(), StatusCode::CREATED);

    let addresses = address::Entity::find().count(&*app.state.db).await.unwrap();
    assert_eq!(addresses, 1);
}

#[tokio::test]
async fn unknown_product_aborts_the_whole_transaction() {
    let app = TestApp::new().await;
    let product = app.seed_product("Fresa", dec!(9000)).await;
    let seeded = app
        .seed_discount(
            "WELCOME",
            discount::DiscountType::Absolute,
            dec!(5000),
            Some(10),
            None,
            false,
        )
        .await;

    let mut payload = person_order_payload(product.id, 1, "BOGOTA");
    payload["discount_code"] = json!("WELCOME");
    payload["items"]
        .as_array_mut()
        .unwrap()
        .push(json!({"product_id": Uuid::new_v4(), "quantity": 1}));

    let response = app.request(Method::POST, "/api/v1/orders", Some(payload)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The discount redemption rolled back with everything else.
    let disc = discount::Entity::find_by_id(seeded.id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(disc.times_used, 0);

    let counters = user_discount::Entity::find()
        .filter(user_discount::Column::DiscountId.eq(seeded.id))
        .count(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(counters, 0);

    let orders = order::Entity::find().count(&*app.state.db).await.unwrap();
    assert_eq!(orders, 0);
}

#[tokio::test]
async fn variation_price_wins_over_product_price() {
    let app = TestApp::new().await;
    let product = app.seed_product("Mango", dec!(10000)).await;
    let variation = app.seed_variation(product.id, "MANGO-MADURO", dec!(12500)).await;

    let mut payload = person_order_payload(product.id, 2, "SOPO");
    payload["items"] = json!([
        {"product_id": product.id, "variation_id": variation.id, "quantity": 2}
    ]);

    let response = app.request(Method::POST, "/api/v1/orders", Some(payload)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    let data = &body["data"];
    assert_eq!(money(&data["items"][0]["unit_price"]), dec!(12500));
    assert_eq!(money(&data["subtotal"]), dec!(25000));
}

#[tokio::test]
async fn custom_order_id_is_generated_when_absent() {
    let app = TestApp::new().await;
    let product = app.seed_product("Papaya", dec!(7000)).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(person_order_payload(product.id, 1, "BOGOTA")),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    let custom_id = body["data"]["custom_order_id"].as_str().unwrap();
    assert!(custom_id.starts_with("ORD-"));
}

#[tokio::test]
async fn duplicate_custom_order_id_conflicts() {
    let app = TestApp::new().await;
    let product = app.seed_product("Lulo", dec!(8000)).await;

    let mut payload = person_order_payload(product.id, 1, "BOGOTA");
    payload["custom_order_id"] = json!("WEB-0001");

    let first = app
        .request(Method::POST, "/api/v1/orders", Some(payload.clone()))
        .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app.request(Method::POST, "/api/v1/orders", Some(payload)).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn order_is_queryable_by_custom_id() {
    let app = TestApp::new().await;
    let product = app.seed_product("Uchuva", dec!(5500)).await;

    let mut payload = person_order_payload(product.id, 1, "BOGOTA");
    payload["custom_order_id"] = json!("WEB-0042");

    let created = app.request(Method::POST, "/api/v1/orders", Some(payload)).await;
    assert_eq!(created.status(), StatusCode::CREATED);

    let response = app
        .request(Method::GET, "/api/v1/orders/customid/WEB-0042", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["custom_order_id"], "WEB-0042");
}
