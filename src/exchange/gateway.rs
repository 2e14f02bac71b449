//! Submit flow: validate, register, sign, send, apply the response.

use std::sync::Arc;

use tracing::{info, warn};

use super::{ExchangeError, GatewayError, Method, SignedAction, Signer, Transport, EXCHANGE_ENDPOINT};
use crate::logging::{ORDER_TARGET, TRADE_TARGET};
use crate::orders::{ExchangeUpdate, Order, OrderParams, OrderStatus, OrderTracker};
use crate::types::OrderType;
use crate::validation::{validate_order_params, RawOrderParams};

/// Places orders through a signer and transport, keeping the tracker in sync.
///
/// # Architecture
///
/// - The request body is built and signed before the order is registered,
///   so local failures never leave a phantom `Pending` order behind
/// - Transport failures leave the order registered as `Pending`; the
///   exchange may still have received it
/// - The response is applied through `OrderTracker::update_order`, which
///   prunes terminal orders
pub struct OrderGateway<S: Signer, T: Transport> {
    tracker: OrderTracker,
    signer: Arc<S>,
    transport: Arc<T>,
    vault_address: Option<String>,
}

impl<S: Signer, T: Transport> OrderGateway<S, T> {
    pub fn new(tracker: OrderTracker, signer: Arc<S>, transport: Arc<T>) -> Self {
        Self {
            tracker,
            signer,
            transport,
            vault_address: None,
        }
    }

    /// Trade on behalf of a vault / sub-account.
    #[must_use]
    pub fn with_vault_address(mut self, vault_address: impl Into<String>) -> Self {
        self.vault_address = Some(vault_address.into());
        self
    }

    pub fn tracker(&self) -> &OrderTracker {
        &self.tracker
    }

    /// Validate raw input, then submit it as an order of `order_type`.
    pub async fn validate_and_submit(
        &self,
        raw: &RawOrderParams,
        order_type: OrderType,
    ) -> Result<Order, GatewayError> {
        let params = validate_order_params(raw)?.into_params(order_type);
        self.submit(params).await
    }

    /// Submit an order and return its state after the exchange response.
    ///
    /// # Errors
    /// - `Order(MissingField)` before anything is registered or sent
    /// - `Exchange(Signing | MissingCredentials)` before anything is registered
    /// - `Exchange(Transport)` after registration
    /// - `Exchange(InvalidResponse)` / `Order(UnknownStatus)` if the reply
    ///   cannot be applied
    pub async fn submit(&self, params: OrderParams) -> Result<Order, GatewayError> {
        let request = Order::new(params.clone()).to_request_body()?;
        let signed = SignedAction::now(
            self.signer.as_ref(),
            request.to_value()?,
            self.vault_address.clone(),
        )?;

        let order = self.tracker.create_order(params).await;
        info!(
            target: ORDER_TARGET,
            client_order_id = ?order.client_order_id().map(|id| id.as_str()),
            symbol = %request.symbol,
            side = %request.side,
            order_type = %request.order_type,
            quantity = %request.quantity,
            price = ?request.price,
            "Order placed"
        );

        let response = match self
            .transport
            .submit(Method::Post, EXCHANGE_ENDPOINT, &signed)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(symbol = %request.symbol, error = %e, "Order submission failed");
                return Err(e.into());
            }
        };

        let update = ExchangeUpdate::from_value(response)
            .map_err(|e| ExchangeError::InvalidResponse(e.to_string()))?;

        let tracked = match order.client_order_id() {
            Some(id) => self.tracker.update_order(id.as_str(), &update).await?,
            None => None,
        };

        // Untracked (or concurrently cancelled) orders are updated locally only.
        let updated = match tracked {
            Some(updated) => updated,
            None => {
                let mut order = order;
                order.apply_update(&update)?;
                order
            }
        };

        match updated.status {
            OrderStatus::Filled => info!(
                target: TRADE_TARGET,
                symbol = %updated.params.symbol,
                side = %updated.params.side,
                filled = %updated.filled_quantity,
                avg_price = ?updated.average_fill_price,
                exchange_order_id = ?updated.exchange_order_id,
                "Trade executed"
            ),
            OrderStatus::Rejected => warn!(
                symbol = %updated.params.symbol,
                reason = ?updated.error_message,
                "Order rejected"
            ),
            _ => {}
        }

        Ok(updated)
    }

    /// Cancel an order locally. Does not send a cancel request.
    pub async fn cancel(&self, client_order_id: &str) -> Option<Order> {
        self.tracker.cancel_order(client_order_id).await
    }
}
