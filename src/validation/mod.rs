//! Order Parameter Validation
//!
//! Pure checks that gate what may become an order. Nothing here holds state
//! or performs I/O.
//!
//! - Field validators: `validate_symbol`, `validate_quantity`,
//!   `validate_price`, `validate_leverage`, `validate_client_order_id`
//! - `validate_order_params` - Validates a whole `RawOrderParams` map

mod error;
mod fields;
mod input;
mod params;

pub use error::ValidationError;
pub use fields::{
    validate_client_order_id, validate_leverage, validate_price, validate_quantity,
    validate_symbol, DEFAULT_MAX_LEVERAGE,
};
pub use input::NumericInput;
pub use params::{validate_order_params, RawOrderParams, ValidatedOrder};
