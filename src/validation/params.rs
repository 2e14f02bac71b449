//! Whole-order validation.
//!
//! Turns an untrusted parameter map into a `ValidatedOrder`, checking every
//! field the map carries.

use rust_decimal::Decimal;
use serde::Deserialize;

use super::error::ValidationError;
use super::fields::{
    validate_client_order_id, validate_leverage, validate_price, validate_quantity,
    validate_symbol, DEFAULT_MAX_LEVERAGE,
};
use super::input::NumericInput;
use crate::orders::{ClientOrderId, OrderParams, Symbol, DEFAULT_TIME_IN_FORCE};
use crate::types::{OrderSide, OrderType};

/// Raw order parameters as received from a caller (JSON body, CLI, etc).
///
/// Every key is optional here; `validate_order_params` decides which ones
/// are required. Bounds (`min_*`, `max_*`) are applied only when present.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawOrderParams {
    pub symbol: Option<String>,
    pub quantity: Option<NumericInput>,
    pub side: Option<String>,
    pub price: Option<NumericInput>,
    pub leverage: Option<NumericInput>,
    pub min_quantity: Option<Decimal>,
    pub max_quantity: Option<Decimal>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub max_leverage: Option<u32>,
    pub client_order_id: Option<String>,
    pub time_in_force: Option<String>,
    pub reduce_only: Option<bool>,
}

/// Order parameters that passed validation.
///
/// Optional fields stay `None` when the raw input did not carry them;
/// defaults are applied only by [`ValidatedOrder::into_params`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedOrder {
    pub symbol: Symbol,
    pub side: OrderSide,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub leverage: Option<u32>,
    pub client_order_id: Option<ClientOrderId>,
    pub time_in_force: Option<String>,
    pub reduce_only: Option<bool>,
}

impl ValidatedOrder {
    /// Build order parameters for the given order type.
    ///
    /// The validated price lands in the field that order type requires:
    /// `price` for LIMIT (and MARKET, where it is not sent), `stop_price`
    /// for STOP_LOSS, `take_profit_price` for TAKE_PROFIT.
    #[must_use]
    pub fn into_params(self, order_type: OrderType) -> OrderParams {
        let mut params = OrderParams::new(self.symbol, self.side, order_type, self.quantity)
            .with_leverage(self.leverage.unwrap_or(1))
            .with_time_in_force(
                self.time_in_force
                    .unwrap_or_else(|| DEFAULT_TIME_IN_FORCE.to_string()),
            )
            .with_reduce_only(self.reduce_only.unwrap_or(false));

        if let Some(price) = self.price {
            params = match order_type {
                OrderType::Market | OrderType::Limit => params.with_price(price),
                OrderType::StopLoss => params.with_stop_price(price),
                OrderType::TakeProfit => params.with_take_profit_price(price),
            };
        }

        if let Some(id) = self.client_order_id {
            params = params.with_client_order_id(id);
        }

        params
    }
}

/// Validate a complete set of order parameters.
///
/// `symbol`, `quantity` and `side` are required. `price` and `leverage` are
/// validated only when present; `client_order_id` is checked against the
/// id format; `time_in_force` and `reduce_only` pass through unchanged.
///
/// # Errors
/// The first failing check, in the order: missing keys, symbol, quantity,
/// side, price, leverage, client order id.
pub fn validate_order_params(raw: &RawOrderParams) -> Result<ValidatedOrder, ValidationError> {
    let symbol = raw
        .symbol
        .as_deref()
        .ok_or(ValidationError::MissingParameter("symbol"))?;
    let quantity = raw
        .quantity
        .clone()
        .ok_or(ValidationError::MissingParameter("quantity"))?;
    let side = raw
        .side
        .as_deref()
        .ok_or(ValidationError::MissingParameter("side"))?;

    let symbol = validate_symbol(symbol)?;
    let quantity = validate_quantity(quantity, raw.min_quantity, raw.max_quantity)?;
    let side = side
        .parse::<OrderSide>()
        .map_err(|reason| ValidationError::invalid_format("side", reason))?;

    let price = raw
        .price
        .clone()
        .map(|p| validate_price(p, raw.min_price, raw.max_price))
        .transpose()?;

    let leverage = raw
        .leverage
        .clone()
        .map(|l| validate_leverage(l, raw.max_leverage.unwrap_or(DEFAULT_MAX_LEVERAGE)))
        .transpose()?;

    let client_order_id = raw
        .client_order_id
        .as_deref()
        .map(validate_client_order_id)
        .transpose()?;

    Ok(ValidatedOrder {
        symbol,
        side,
        quantity,
        price,
        leverage,
        client_order_id,
        time_in_force: raw.time_in_force.clone(),
        reduce_only: raw.reduce_only,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn minimal() -> RawOrderParams {
        RawOrderParams {
            symbol: Some("BTC-USDT".to_string()),
            quantity: Some("0.5".into()),
            side: Some("BUY".to_string()),
            ..RawOrderParams::default()
        }
    }

    #[test]
    fn test_minimal_params() {
        let validated = validate_order_params(&minimal()).unwrap();
        assert_eq!(validated.symbol.as_str(), "BTC-USDT");
        assert_eq!(validated.side, OrderSide::Buy);
        assert_eq!(validated.quantity, dec!(0.5));
        assert!(validated.price.is_none());
        assert!(validated.leverage.is_none());
    }

    #[test]
    fn test_missing_required_keys() {
        for (key, raw) in [
            ("symbol", RawOrderParams { symbol: None, ..minimal() }),
            ("quantity", RawOrderParams { quantity: None, ..minimal() }),
            ("side", RawOrderParams { side: None, ..minimal() }),
        ] {
            assert_eq!(
                validate_order_params(&raw),
                Err(ValidationError::MissingParameter(key))
            );
        }
    }

    #[test]
    fn test_invalid_side() {
        let raw = RawOrderParams {
            side: Some("buy".to_string()),
            ..minimal()
        };
        assert!(matches!(
            validate_order_params(&raw),
            Err(ValidationError::InvalidFormat { field: "side", .. })
        ));
    }

    #[test]
    fn test_quantity_bounds_from_map() {
        let raw = RawOrderParams {
            max_quantity: Some(dec!(0.1)),
            ..minimal()
        };
        assert!(matches!(
            validate_order_params(&raw),
            Err(ValidationError::OutOfRange { field: "quantity", .. })
        ));
    }

    #[test]
    fn test_optional_price_and_leverage() {
        let raw = RawOrderParams {
            price: Some("49500".into()),
            leverage: Some("25".into()),
            max_leverage: Some(50),
            ..minimal()
        };
        let validated = validate_order_params(&raw).unwrap();
        assert_eq!(validated.price, Some(dec!(49500)));
        assert_eq!(validated.leverage, Some(25));

        let raw = RawOrderParams {
            leverage: Some("25".into()),
            max_leverage: Some(20),
            ..minimal()
        };
        assert!(matches!(
            validate_order_params(&raw),
            Err(ValidationError::OutOfRange { field: "leverage", .. })
        ));

        let raw = RawOrderParams {
            price: Some("-5".into()),
            ..minimal()
        };
        assert!(matches!(
            validate_order_params(&raw),
            Err(ValidationError::OutOfRange { field: "price", .. })
        ));
    }

    #[test]
    fn test_client_order_id_is_checked() {
        let raw = RawOrderParams {
            client_order_id: Some("not valid!".to_string()),
            ..minimal()
        };
        assert!(matches!(
            validate_order_params(&raw),
            Err(ValidationError::InvalidFormat { field: "client_order_id", .. })
        ));
    }

    #[test]
    fn test_passthrough_fields() {
        let raw = RawOrderParams {
            client_order_id: Some("abc123".to_string()),
            time_in_force: Some("IOC".to_string()),
            reduce_only: Some(true),
            ..minimal()
        };
        let validated = validate_order_params(&raw).unwrap();
        assert_eq!(validated.client_order_id.unwrap().as_str(), "abc123");
        assert_eq!(validated.time_in_force.as_deref(), Some("IOC"));
        assert_eq!(validated.reduce_only, Some(true));
    }

    #[test]
    fn test_from_json_map() {
        let raw: RawOrderParams = serde_json::from_value(serde_json::json!({
            "symbol": "ETH-USDT",
            "quantity": 1.25,
            "side": "SELL",
            "price": "3200.5",
            "leverage": 5,
            "max_leverage": 10,
            "min_price": "3000"
        }))
        .unwrap();

        let validated = validate_order_params(&raw).unwrap();
        assert_eq!(validated.quantity, dec!(1.25));
        assert_eq!(validated.price, Some(dec!(3200.5)));
        assert_eq!(validated.leverage, Some(5));
    }

    #[test]
    fn test_into_params_defaults_and_price_placement() {
        let validated = validate_order_params(&RawOrderParams {
            price: Some("48000".into()),
            ..minimal()
        })
        .unwrap();

        let limit = validated.clone().into_params(OrderType::Limit);
        assert_eq!(limit.price, Some(dec!(48000)));
        assert_eq!(limit.leverage, 1);
        assert_eq!(limit.time_in_force, "GTC");
        assert!(!limit.reduce_only);
        assert!(limit.client_order_id.is_none());

        let stop = validated.into_params(OrderType::StopLoss);
        assert_eq!(stop.stop_price, Some(dec!(48000)));
        assert!(stop.price.is_none());
    }
}
