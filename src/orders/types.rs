//! Core types for order management.
//!
//! Provides validated identifiers, order parameters, the order record owned
//! by the tracker, and the two exchange wire shapes: the outbound request
//! body and the inbound status update.

use std::borrow::Borrow;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{OrderSide, OrderType};
use crate::validation::{self, ValidationError};

/// Time in force applied when the caller does not choose one.
pub const DEFAULT_TIME_IN_FORCE: &str = "GTC";

/// Errors raised while serializing an order or applying exchange feedback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// A price-like field required by the order type is absent
    #[error("{field} is required for {order_type} orders")]
    MissingField {
        field: &'static str,
        order_type: OrderType,
    },

    /// Exchange reported a status string we do not know
    #[error("Unknown order status from exchange: '{0}'")]
    UnknownStatus(String),
}

/// Trading pair symbol in `BASE-QUOTE` form (e.g. "BTC-USDT").
///
/// Only obtainable through validation, so holding a `Symbol` means the
/// format check already passed.
///
/// ```
/// use orderdesk::orders::Symbol;
///
/// let symbol: Symbol = "BTC-USDT".parse().unwrap();
/// assert_eq!(symbol.as_str(), "BTC-USDT");
/// assert!("btc-usdt".parse::<Symbol>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub(crate) fn new_unchecked(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Symbol {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validation::validate_symbol(s)
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Caller-assigned order identifier, used as the tracker's registry key.
///
/// Distinct from the exchange-assigned order id, which only exists after
/// the exchange acknowledges the order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ClientOrderId(String);

impl ClientOrderId {
    pub(crate) fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identifier (hyphenated UUID v4, 36 characters).
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl FromStr for ClientOrderId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validation::validate_client_order_id(s)
    }
}

impl std::fmt::Display for ClientOrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ClientOrderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Lets the registry be queried with a plain `&str`.
impl Borrow<str> for ClientOrderId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Order lifecycle states.
///
/// `Pending` is the initial state; the four terminal states drop the order
/// from the active registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Created locally, not yet acknowledged by the exchange
    Pending,
    /// Accepted by the exchange, resting or awaiting fills
    Open,
    /// Fully executed
    Filled,
    /// Cancelled by the user, the exchange, or locally
    Cancelled,
    /// Refused by the exchange
    Rejected,
    /// Time-in-force exceeded
    Expired,
}

impl OrderStatus {
    /// Returns true if no further updates are expected.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Filled | Self::Cancelled | Self::Rejected | Self::Expired
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Open => "OPEN",
            Self::Filled => "FILLED",
            Self::Cancelled => "CANCELLED",
            Self::Rejected => "REJECTED",
            Self::Expired => "EXPIRED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "OPEN" => Ok(Self::Open),
            "FILLED" => Ok(Self::Filled),
            "CANCELLED" => Ok(Self::Cancelled),
            "REJECTED" => Ok(Self::Rejected),
            "EXPIRED" => Ok(Self::Expired),
            other => Err(OrderError::UnknownStatus(other.to_string())),
        }
    }
}

/// Immutable description of an order to place.
///
/// The constructors set only the price field the order type requires.
/// Setting another price field with a `with_*` method is allowed; it is
/// simply not sent for that order type.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderParams {
    pub symbol: Symbol,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: Decimal,
    /// Required for LIMIT orders
    pub price: Option<Decimal>,
    /// Required for STOP_LOSS orders
    pub stop_price: Option<Decimal>,
    /// Required for TAKE_PROFIT orders
    pub take_profit_price: Option<Decimal>,
    pub leverage: u32,
    pub time_in_force: String,
    pub reduce_only: bool,
    pub client_order_id: Option<ClientOrderId>,
}

impl OrderParams {
    /// Parameters with defaults: leverage 1, GTC, not reduce-only, no client id.
    #[must_use]
    pub fn new(symbol: Symbol, side: OrderSide, order_type: OrderType, quantity: Decimal) -> Self {
        Self {
            symbol,
            side,
            order_type,
            quantity,
            price: None,
            stop_price: None,
            take_profit_price: None,
            leverage: 1,
            time_in_force: DEFAULT_TIME_IN_FORCE.to_string(),
            reduce_only: false,
            client_order_id: None,
        }
    }

    #[must_use]
    pub fn market(symbol: Symbol, side: OrderSide, quantity: Decimal) -> Self {
        Self::new(symbol, side, OrderType::Market, quantity)
    }

    #[must_use]
    pub fn limit(symbol: Symbol, side: OrderSide, quantity: Decimal, price: Decimal) -> Self {
        Self::new(symbol, side, OrderType::Limit, quantity).with_price(price)
    }

    #[must_use]
    pub fn stop_loss(symbol: Symbol, side: OrderSide, quantity: Decimal, stop_price: Decimal) -> Self {
        Self::new(symbol, side, OrderType::StopLoss, quantity).with_stop_price(stop_price)
    }

    #[must_use]
    pub fn take_profit(
        symbol: Symbol,
        side: OrderSide,
        quantity: Decimal,
        take_profit_price: Decimal,
    ) -> Self {
        Self::new(symbol, side, OrderType::TakeProfit, quantity)
            .with_take_profit_price(take_profit_price)
    }

    #[must_use]
    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    #[must_use]
    pub fn with_stop_price(mut self, stop_price: Decimal) -> Self {
        self.stop_price = Some(stop_price);
        self
    }

    #[must_use]
    pub fn with_take_profit_price(mut self, take_profit_price: Decimal) -> Self {
        self.take_profit_price = Some(take_profit_price);
        self
    }

    #[must_use]
    pub fn with_leverage(mut self, leverage: u32) -> Self {
        self.leverage = leverage;
        self
    }

    #[must_use]
    pub fn with_time_in_force(mut self, time_in_force: impl Into<String>) -> Self {
        self.time_in_force = time_in_force.into();
        self
    }

    #[must_use]
    pub fn with_reduce_only(mut self, reduce_only: bool) -> Self {
        self.reduce_only = reduce_only;
        self
    }

    #[must_use]
    pub fn with_client_order_id(mut self, client_order_id: ClientOrderId) -> Self {
        self.client_order_id = Some(client_order_id);
        self
    }
}

/// Outbound request body for order placement.
///
/// Decimal fields are carried as strings produced by `Decimal`'s exact
/// formatting, never through a binary float.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: String,
    pub leverage: u32,
    pub time_in_force: String,
    pub reduce_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit_price: Option<String>,
}

impl OrderRequest {
    /// Convert into a JSON action ready for signing.
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Order status payload reported by the exchange.
///
/// Every key is optional on the wire. `fill_quantity` and `average_price`
/// only overwrite local state when present; the other fields always do.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_quantity: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExchangeUpdate {
    /// Update carrying only a status string.
    #[must_use]
    pub fn with_status(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            ..Self::default()
        }
    }

    /// Parse a raw exchange response body.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

/// An order and its latest exchange-reported state.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub params: OrderParams,
    pub status: OrderStatus,
    /// Exchange-assigned id, set once the exchange acknowledges
    pub exchange_order_id: Option<String>,
    pub filled_quantity: Decimal,
    pub average_fill_price: Option<Decimal>,
    /// Epoch milliseconds, as supplied by the exchange
    pub last_update_timestamp: Option<i64>,
    pub error_message: Option<String>,
}

impl Order {
    /// Create a new order in `Pending` state with nothing filled.
    #[must_use]
    pub fn new(params: OrderParams) -> Self {
        Self {
            params,
            status: OrderStatus::Pending,
            exchange_order_id: None,
            filled_quantity: Decimal::ZERO,
            average_fill_price: None,
            last_update_timestamp: None,
            error_message: None,
        }
    }

    pub fn client_order_id(&self) -> Option<&ClientOrderId> {
        self.params.client_order_id.as_ref()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Build the wire request body.
    ///
    /// # Errors
    /// `OrderError::MissingField` when the price field required by the
    /// order type is absent or zero.
    pub fn to_request_body(&self) -> Result<OrderRequest, OrderError> {
        let p = &self.params;
        let mut body = OrderRequest {
            symbol: p.symbol.as_str().to_string(),
            side: p.side,
            order_type: p.order_type,
            quantity: p.quantity.to_string(),
            leverage: p.leverage,
            time_in_force: p.time_in_force.clone(),
            reduce_only: p.reduce_only,
            client_order_id: p.client_order_id.as_ref().map(|id| id.as_str().to_string()),
            price: None,
            stop_price: None,
            take_profit_price: None,
        };

        match p.order_type {
            OrderType::Market => {}
            OrderType::Limit => {
                body.price = Some(required(p.price, "price", p.order_type)?.to_string());
            }
            OrderType::StopLoss => {
                body.stop_price =
                    Some(required(p.stop_price, "stopPrice", p.order_type)?.to_string());
            }
            OrderType::TakeProfit => {
                body.take_profit_price = Some(
                    required(p.take_profit_price, "takeProfitPrice", p.order_type)?.to_string(),
                );
            }
        }

        Ok(body)
    }

    /// Apply an exchange update to this order.
    ///
    /// The status is resolved first; an unknown status leaves the order
    /// untouched.
    pub fn apply_update(&mut self, update: &ExchangeUpdate) -> Result<(), OrderError> {
        let status: OrderStatus = update
            .status
            .as_deref()
            .unwrap_or(OrderStatus::Pending.as_str())
            .parse()?;

        self.exchange_order_id = update.order_id.clone();
        self.status = status;

        if let Some(filled) = update.fill_quantity {
            self.filled_quantity = filled;
        }
        if let Some(avg) = update.average_price {
            self.average_fill_price = Some(avg);
        }

        self.last_update_timestamp = update.timestamp;
        self.error_message = update.error.clone();
        Ok(())
    }
}

// A zero price counts as unset.
fn required(
    value: Option<Decimal>,
    field: &'static str,
    order_type: OrderType,
) -> Result<Decimal, OrderError> {
    value
        .filter(|v| !v.is_zero())
        .ok_or(OrderError::MissingField { field, order_type })
}
