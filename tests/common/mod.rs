use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request},
    response::Response,
    Router,
};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tower::ServiceExt;
use uuid::Uuid;

use tienda_api::{
    config::{AppConfig, TransportConfig},
    db,
    entities::{company, discount, product, product_variation},
    events, AppState,
};

/// Test harness: application state and router backed by a throwaway
/// SQLite database with migrations applied.
pub struct TestApp {
    pub state: AppState,
    router: Router,
    db_path: PathBuf,
    _event_task: JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_path = std::env::temp_dir().join(format!("tienda_test_{}.db", Uuid::new_v4().simple()));
        let database_url = format!("sqlite://{}?mode=rwc", db_path.display());

        let cfg = AppConfig {
            database_url,
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            log_level: "warn".to_string(),
            log_json: false,
            auto_migrate: true,
            db_max_connections: 5,
            db_min_connections: 1,
            transport: TransportConfig::default(),
        };

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool).await.expect("migrations failed");

        let (event_sender, event_rx) = events::channel(64);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(Arc::new(pool), cfg, event_sender);
        let router = tienda_api::app(state.clone());

        Self {
            state,
            router,
            db_path,
            _event_task: event_task,
        }
    }

    /// Sends a request through the full router stack.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(payload) => builder
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request build");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router response")
    }

    pub async fn seed_product(&self, name: &str, price: Decimal) -> product::Model {
        product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(None),
            unit: Set(Some("kg".to_string())),
            price: Set(price),
            is_variable: Set(false),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed product")
    }

    pub async fn seed_variation(
        &self,
        product_id: Uuid,
        sku: &str,
        price: Decimal,
    ) -> product_variation::Model {
        product_variation::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            sku: Set(sku.to_string()),
            price: Set(price),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed variation")
    }

    pub async fn seed_company(&self, name: &str, nit: &str) -> company::Model {
        company::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            nit: Set(nit.to_string()),
            email: Set(format!("{nit}@empresa.co")),
            phone: Set(Some("3000000000".to_string())),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed company")
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn seed_discount(
        &self,
        code: &str,
        discount_type: discount::DiscountType,
        value: Decimal,
        max_uses_total: Option<i32>,
        max_uses_per_user: Option<i32>,
        applicable_to_transport: bool,
    ) -> discount::Model {
        let today = Utc::now().date_naive();
        discount::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code.to_string()),
            discount_type: Set(discount_type),
            value: Set(value),
            start_date: Set(today - Duration::days(1)),
            end_date: Set(today + Duration::days(30)),
            max_uses_total: Set(max_uses_total),
            max_uses_per_user: Set(max_uses_per_user),
            times_used: Set(0),
            applicable_to_transport: Set(applicable_to_transport),
            status: Set(discount::DiscountStatus::Active),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed discount")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_path);
    }
}

/// Checkout payload for a person order delivered to a serviceable city.
pub fn person_order_payload(product_id: Uuid, quantity: i32, city: &str) -> Value {
    json!({
        "firstname": "Camila",
        "lastname": "Rojas",
        "document_type": "CC",
        "document_number": "1032456789",
        "email": "camila@example.com",
        "phone": "3001234567",
        "address": {
            "street": "Cra 7 # 12-34",
            "city": city,
            "state": "Cundinamarca",
            "postal_code": "250001",
            "country": "Colombia"
        },
        "delivery_date": "2025-06-15",
        "delivery_slot": "10:30",
        "items": [
            {"product_id": product_id, "quantity": quantity}
        ]
    })
}

pub async fn response_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}
