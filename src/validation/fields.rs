//! Single-field validators.
//!
//! Each function is pure: it either returns the normalized value or a
//! typed `ValidationError`.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;

use super::error::ValidationError;
use super::input::NumericInput;
use crate::orders::{ClientOrderId, Symbol};

/// Leverage ceiling used when the caller supplies none.
pub const DEFAULT_MAX_LEVERAGE: u32 = 100;

lazy_static! {
    static ref SYMBOL_PATTERN: Regex =
        Regex::new(r"^[A-Z0-9]+-[A-Z0-9]+$").expect("Invalid symbol regex pattern");
    static ref CLIENT_ORDER_ID_PATTERN: Regex =
        Regex::new(r"^[a-zA-Z0-9_-]{1,36}$").expect("Invalid client order id regex pattern");
}

/// Validate a trading pair symbol such as `BTC-USDT`.
///
/// Uppercase alphanumerics on both sides of a single hyphen. Case matters:
/// `btc-usdt` is rejected rather than normalized.
pub fn validate_symbol(symbol: &str) -> Result<Symbol, ValidationError> {
    if !SYMBOL_PATTERN.is_match(symbol) {
        return Err(ValidationError::invalid_format(
            "symbol",
            format!("'{symbol}'. Expected format: XXX-XXX (e.g., BTC-USDT)"),
        ));
    }
    Ok(Symbol::new_unchecked(symbol))
}

/// Validate an order quantity.
///
/// # Errors
/// - `InvalidFormat` if the input is not a decimal number, or needs rounding to fit
/// - `OutOfRange` if it is not positive, or falls outside a supplied bound
pub fn validate_quantity(
    quantity: impl Into<NumericInput>,
    min_quantity: Option<Decimal>,
    max_quantity: Option<Decimal>,
) -> Result<Decimal, ValidationError> {
    validate_positive_decimal("quantity", quantity.into(), min_quantity, max_quantity)
}

/// Validate an order price. Same rules as [`validate_quantity`].
pub fn validate_price(
    price: impl Into<NumericInput>,
    min_price: Option<Decimal>,
    max_price: Option<Decimal>,
) -> Result<Decimal, ValidationError> {
    validate_positive_decimal("price", price.into(), min_price, max_price)
}

// A supplied bound is always enforced, including a bound of zero.
fn validate_positive_decimal(
    field: &'static str,
    input: NumericInput,
    min: Option<Decimal>,
    max: Option<Decimal>,
) -> Result<Decimal, ValidationError> {
    let value = input
        .to_decimal()
        .ok_or_else(|| ValidationError::invalid_format(field, format!("'{input}' is not an exactly representable decimal")))?;

    if value <= Decimal::ZERO {
        return Err(ValidationError::out_of_range(field, "must be greater than 0"));
    }

    if let Some(min) = min {
        if value < min {
            return Err(ValidationError::out_of_range(field, format!("must be at least {min}")));
        }
    }

    if let Some(max) = max {
        if value > max {
            return Err(ValidationError::out_of_range(field, format!("must not exceed {max}")));
        }
    }

    Ok(value)
}

/// Validate leverage against `[1, max_leverage]`.
pub fn validate_leverage(
    leverage: impl Into<NumericInput>,
    max_leverage: u32,
) -> Result<u32, ValidationError> {
    let input = leverage.into();
    let value = input.to_integer().ok_or_else(|| {
        ValidationError::invalid_format("leverage", format!("'{input}' is not an integer"))
    })?;

    if value < 1 {
        return Err(ValidationError::out_of_range("leverage", "must be at least 1"));
    }

    if value > i64::from(max_leverage) {
        return Err(ValidationError::out_of_range(
            "leverage",
            format!("must not exceed {max_leverage}"),
        ));
    }

    // 1 <= value <= u32::MAX here
    Ok(value as u32)
}

/// Validate a client order id: 1-36 chars of letters, digits, `_` or `-`.
pub fn validate_client_order_id(client_order_id: &str) -> Result<ClientOrderId, ValidationError> {
    if !CLIENT_ORDER_ID_PATTERN.is_match(client_order_id) {
        return Err(ValidationError::invalid_format(
            "client_order_id",
            "must be 1-36 characters long and contain only letters, numbers, underscore, and hyphen",
        ));
    }
    Ok(ClientOrderId::new_unchecked(client_order_id))
}
