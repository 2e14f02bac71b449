//! Property-based tests for validation and decimal wire encoding
//!
//! These tests use proptest to verify invariants across many random inputs,
//! catching edge cases that unit tests might miss.

use orderdesk::orders::{Order, OrderParams};
use orderdesk::types::OrderSide;
use orderdesk::validation::{
    validate_client_order_id, validate_leverage, validate_price, validate_quantity,
    validate_symbol, ValidationError,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

proptest! {
    /// Well-formed symbols come back unchanged
    #[test]
    fn valid_symbols_pass_unchanged(symbol in "[A-Z0-9]{1,10}-[A-Z0-9]{1,10}") {
        let validated = validate_symbol(&symbol).unwrap();
        prop_assert_eq!(validated.as_str(), symbol.as_str());
    }

    /// Lowercase or hyphen-less symbols are rejected
    #[test]
    fn malformed_symbols_fail(
        lower in "[a-z]{1,6}-[a-z]{1,6}",
        joined in "[A-Z0-9]{2,12}"
    ) {
        let lower_is_invalid = matches!(
            validate_symbol(&lower),
            Err(ValidationError::InvalidFormat { .. })
        );
        prop_assert!(lower_is_invalid);

        let joined_is_invalid = matches!(
            validate_symbol(&joined),
            Err(ValidationError::InvalidFormat { .. })
        );
        prop_assert!(joined_is_invalid);
    }

    /// Positive decimals survive validation with no precision loss
    #[test]
    fn quantity_is_exact(mantissa in 1i64..i64::MAX, scale in 0u32..=18) {
        let q = Decimal::new(mantissa, scale);
        let validated = validate_quantity(q.to_string().as_str(), None, None).unwrap();
        prop_assert_eq!(validated, q);
        prop_assert_eq!(validated.to_string(), q.to_string());
    }

    /// Zero and negative quantities are out of range
    #[test]
    fn non_positive_quantity_is_out_of_range(mantissa in -1_000_000i64..=0, scale in 0u32..=8) {
        let q = Decimal::new(mantissa, scale);
        let out_of_range = matches!(
            validate_quantity(q.to_string().as_str(), None, None),
            Err(ValidationError::OutOfRange { .. })
        );
        prop_assert!(out_of_range);
    }

    /// Price bounds are inclusive
    #[test]
    fn price_within_bounds_passes(lo in 1i64..1_000_000, width in 0i64..1_000_000, offset in 0i64..1_000_000) {
        let min = Decimal::new(lo, 2);
        let max = Decimal::new(lo + width, 2);
        let price = Decimal::new(lo + offset.min(width), 2);
        prop_assert_eq!(validate_price(price, Some(min), Some(max)).unwrap(), price);
    }

    /// Leverage accepted exactly on [1, max]
    #[test]
    fn leverage_range(value in -10i64..200, max in 1u32..150) {
        let result = validate_leverage(value, max);
        if value >= 1 && value <= i64::from(max) {
            prop_assert_eq!(result.unwrap(), value as u32);
        } else {
            let out_of_range = matches!(result, Err(ValidationError::OutOfRange { .. }));
            prop_assert!(out_of_range);
        }
    }

    /// Client ids: 1-36 chars from the allowed alphabet
    #[test]
    fn client_order_id_alphabet(
        good in "[a-zA-Z0-9_-]{1,36}",
        long in "[a-zA-Z0-9_-]{37,64}"
    ) {
        prop_assert!(validate_client_order_id(&good).is_ok());
        prop_assert!(validate_client_order_id(&long).is_err());
    }

    /// Request body decimal strings parse back to the original values
    #[test]
    fn request_body_round_trips_decimals(
        qty_mantissa in 1i64..1_000_000_000_000,
        qty_scale in 9u32..=20,
        px_mantissa in 1i64..1_000_000_000_000,
        px_scale in 0u32..=12
    ) {
        let quantity = Decimal::new(qty_mantissa, qty_scale);
        let price = Decimal::new(px_mantissa, px_scale);
        let params = OrderParams::limit("BTC-USDT".parse().unwrap(), OrderSide::Buy, quantity, price);

        let body = Order::new(params).to_request_body().unwrap();
        let json = body.to_value().unwrap();

        let q: Decimal = json["quantity"].as_str().unwrap().parse().unwrap();
        let p: Decimal = json["price"].as_str().unwrap().parse().unwrap();
        prop_assert_eq!(q, quantity);
        prop_assert_eq!(p, price);
    }
}

#[test]
fn quantity_with_more_than_eight_decimals_round_trips() {
    let quantity: Decimal = "0.000000012345678901".parse().unwrap();
    let validated = validate_quantity("0.000000012345678901", None, None).unwrap();
    assert_eq!(validated, quantity);

    let params = OrderParams::market("ETH-USDT".parse().unwrap(), OrderSide::Sell, validated);
    let body = Order::new(params).to_request_body().unwrap();
    assert_eq!(body.quantity, "0.000000012345678901");
}
