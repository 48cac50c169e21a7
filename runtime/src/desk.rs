use mesa_core::order::{Order, OrderId};
use mesa_core::status::{OrderStatus, StatusError, check_transition};
use mesa_store::{OrderStore, StoreError};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatusUpdateError {
    #[error(transparent)]
    Rejected(#[from] StatusError),
    #[error("status write failed: {0}")]
    Store(#[from] StoreError),
}

/// Admin-side status changes.
///
/// The desk checks the state machine against the order as the backend has it
/// right now, then writes. A failed write is reported and nothing local
/// changes: no optimistic update, no retry, no rollback. Two desks racing on
/// the same order both pass the check and the backend keeps the later write.
#[derive(Clone)]
pub struct StatusDesk {
    orders: Arc<dyn OrderStore>,
}

impl StatusDesk {
    pub fn new(orders: Arc<dyn OrderStore>) -> Self {
        Self { orders }
    }

    #[tracing::instrument(skip(self, id), fields(order_id = %id))]
    pub async fn advance(&self, id: &OrderId, next: OrderStatus) -> Result<Order, StatusUpdateError> {
        let current = self.orders.get_order(id).await?;
        if let Err(e) = check_transition(current.status, next) {
            tracing::warn!(from = %current.status, to = %next, "transition rejected");
            return Err(e.into());
        }
        let updated = self.orders.update_order_status(id, next).await?;
        tracing::info!(from = %current.status, to = %updated.status, "status advanced");
        Ok(updated)
    }

    /// Buttons to offer for an order.
    pub fn actions(order: &Order) -> &'static [OrderStatus] {
        order.status.next_steps()
    }
}
