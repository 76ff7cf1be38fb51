pub mod discounts;
pub mod health;
pub mod orders;
pub mod payments;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    checkout::CheckoutService, discounts::DiscountService, order_status::OrderStatusService,
    orders::OrderService, transport::TransportResolver,
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub transport: Arc<TransportResolver>,
    pub discounts: Arc<DiscountService>,
    pub order_status: Arc<OrderStatusService>,
    pub orders: Arc<OrderService>,
    pub checkout: Arc<CheckoutService>,
}

impl AppServices {
    /// Wires the service graph: pure resolvers first, then the stateful
    /// services that compose them.
    pub fn new(db: Arc<DbPool>, config: &AppConfig, event_sender: EventSender) -> Self {
        let transport = Arc::new(TransportResolver::new(&config.transport));
        let discounts = Arc::new(DiscountService::new(db.clone()));
        let order_status = Arc::new(OrderStatusService::new(db.clone(), event_sender.clone()));
        let orders = Arc::new(OrderService::new(db.clone(), order_status.clone()));
        let checkout = Arc::new(CheckoutService::new(
            db,
            transport.clone(),
            discounts.clone(),
            event_sender,
        ));

        Self {
            transport,
            discounts,
            order_status,
            orders,
            checkout,
        }
    }
}
