//! Order Management Module
//!
//! Provides order representation, wire serialization, and the active-order
//! registry.
//!
//! # Architecture
//!
//! - `OrderTracker` - Thread-safe registry keyed by client order id
//! - `Order` / `OrderParams` - What was asked for and what the exchange reported
//! - `OrderRequest` / `ExchangeUpdate` - Outbound and inbound wire shapes
//!
//! # Example
//!
//! ```ignore
//! use orderdesk::orders::{ExchangeUpdate, OrderParams, OrderTracker};
//!
//! let tracker = OrderTracker::new();
//! let params = OrderParams::limit("BTC-USDT".parse()?, OrderSide::Buy, dec!(0.5), dec!(49500))
//!     .with_client_order_id("abc123".parse()?);
//! tracker.create_order(params).await;
//! tracker.update_order("abc123", &ExchangeUpdate::with_status("OPEN")).await?;
//! ```

mod tracker;
mod types;

pub use tracker::OrderTracker;
pub use types::{
    ClientOrderId, ExchangeUpdate, Order, OrderError, OrderParams, OrderRequest, OrderStatus,
    Symbol, DEFAULT_TIME_IN_FORCE,
};
