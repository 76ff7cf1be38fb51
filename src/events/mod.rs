//! Post-commit domain events.
//!
//! Services emit events after their transaction commits; delivery is
//! best-effort and a failed send never affects persisted state. The
//! processor task is the seam where notification collaborators (email,
//! reporting) attach.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

use crate::entities::order_status_log::StatusField;

/// Events emitted by the order core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    OrderCreated(Uuid),
    OrderStatusChanged {
        order_id: Uuid,
        field: StatusField,
        previous_value: String,
        new_value: String,
    },
    DiscountRedeemed {
        order_id: Uuid,
        code: String,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {e}"))
    }
}

/// Creates a connected sender/receiver pair with a bounded buffer.
pub fn channel(buffer: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(buffer);
    (EventSender::new(tx), rx)
}

/// Consumes events until all senders are dropped. Downstream side effects
/// (email, reporting exports) hang off this loop, outside any database
/// transaction.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    while let Some(event) = rx.recv().await {
        match &event {
            Event::OrderCreated(order_id) => {
                info!(order_id = %order_id, "event: order created");
            }
            Event::OrderStatusChanged {
                order_id,
                field,
                previous_value,
                new_value,
            } => {
                info!(
                    order_id = %order_id,
                    field = %field,
                    previous = %previous_value,
                    new = %new_value,
                    "event: order status changed"
                );
            }
            Event::DiscountRedeemed { order_id, code } => {
                info!(order_id = %order_id, code = %code, "event: discount redeemed");
            }
        }
    }
}
