//! Active-order registry.
//!
//! Provides in-memory order state tracking shared between the submission
//! path and exchange update handlers.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::types::{ClientOrderId, ExchangeUpdate, Order, OrderError, OrderParams, OrderStatus};

/// Thread-safe registry of active orders keyed by client order id.
///
/// # Thread Safety
///
/// Every mutation takes the write half of one `RwLock`, so create, update
/// and cancel never interleave. Reads return clones, never references into
/// the registry.
///
/// # Retention
///
/// Orders leave the registry as soon as they reach a terminal status or
/// are cancelled locally. Orders without a client order id are never
/// registered.
#[derive(Clone, Default)]
pub struct OrderTracker {
    orders: Arc<RwLock<HashMap<ClientOrderId, Order>>>,
}

impl OrderTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new order in `Pending` state.
    ///
    /// Registers it when the params carry a client order id, replacing any
    /// existing entry under the same id. The order is returned either way.
    pub async fn create_order(&self, params: OrderParams) -> Order {
        let order = Order::new(params);

        match order.client_order_id() {
            Some(id) => {
                let mut orders = self.orders.write().await;
                if orders.insert(id.clone(), order.clone()).is_some() {
                    warn!(client_order_id = %id, "Replaced existing order with same client id");
                }
                debug!(
                    client_order_id = %id,
                    symbol = %order.params.symbol,
                    side = %order.params.side,
                    order_type = %order.params.order_type,
                    quantity = %order.params.quantity,
                    "Order registered in tracker"
                );
            }
            None => {
                debug!(
                    symbol = %order.params.symbol,
                    "Order has no client id; not tracked"
                );
            }
        }

        order
    }

    /// Get current order state.
    pub async fn get_order(&self, client_order_id: &str) -> Option<Order> {
        let orders = self.orders.read().await;
        orders.get(client_order_id).cloned()
    }

    /// Check if order exists in tracker.
    pub async fn has_order(&self, client_order_id: &str) -> bool {
        let orders = self.orders.read().await;
        orders.contains_key(client_order_id)
    }

    /// Apply an exchange update to a tracked order.
    ///
    /// Returns `Ok(None)` when the id is not tracked, which is expected for
    /// orders already pruned. Otherwise returns the order as updated; if that
    /// status is terminal the order has already been removed.
    ///
    /// # Errors
    /// `OrderError::UnknownStatus` if the status string is not recognised.
    /// The tracked order is left unchanged in that case.
    pub async fn update_order(
        &self,
        client_order_id: &str,
        update: &ExchangeUpdate,
    ) -> Result<Option<Order>, OrderError> {
        let mut orders = self.orders.write().await;

        let Some(order) = orders.get_mut(client_order_id) else {
            warn!(client_order_id, "Attempted to update unknown order");
            return Ok(None);
        };

        let old_status = order.status;
        if let Err(e) = order.apply_update(update) {
            warn!(client_order_id, error = %e, "Rejected exchange update");
            return Err(e);
        }

        info!(
            client_order_id,
            symbol = %order.params.symbol,
            old_status = %old_status,
            new_status = %order.status,
            filled = %order.filled_quantity,
            requested = %order.params.quantity,
            "Order state updated"
        );

        if let Some(reason) = order.error_message.as_deref() {
            warn!(client_order_id, status = %order.status, reason, "Exchange reported error");
        }

        let updated = order.clone();
        if updated.is_terminal() {
            orders.remove(client_order_id);
            debug!(client_order_id, status = %updated.status, "Terminal order pruned");
        }

        Ok(Some(updated))
    }

    /// Mark an order cancelled locally and drop it from the registry.
    ///
    /// Does not contact the exchange. Returns the removed order, or `None`
    /// if the id was not tracked.
    pub async fn cancel_order(&self, client_order_id: &str) -> Option<Order> {
        let mut orders = self.orders.write().await;

        match orders.remove(client_order_id) {
            Some(mut order) => {
                order.status = OrderStatus::Cancelled;
                info!(client_order_id, symbol = %order.params.symbol, "Order cancelled locally");
                Some(order)
            }
            None => {
                debug!(client_order_id, "Cancel requested for unknown order");
                None
            }
        }
    }

    /// Snapshot of all active orders.
    pub async fn get_active_orders(&self) -> HashMap<ClientOrderId, Order> {
        let orders = self.orders.read().await;
        orders.clone()
    }

    /// Get count of active orders.
    pub async fn active_order_count(&self) -> usize {
        let orders = self.orders.read().await;
        orders.len()
    }

    /// Clear all orders (for testing or reset).
    pub async fn clear(&self) {
        let mut orders = self.orders.write().await;
        orders.clear();
    }
}
