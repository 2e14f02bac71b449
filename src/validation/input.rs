//! Loosely typed numeric input.
//!
//! Callers hand us quantities, prices and leverage as text, floats, integers
//! or decimals. `NumericInput` carries whichever arrived until a validator
//! decides how to interpret it.

use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

/// A raw numeric value of unknown shape.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericInput {
    Text(String),
    Float(f64),
    Integer(i64),
    Decimal(Decimal),
}

impl NumericInput {
    /// Interpret as an exact decimal.
    ///
    /// Floats go through their shortest round-trip text form, so `0.1_f64`
    /// becomes `0.1`, not the nearest binary fraction.
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Decimal(d) => Some(*d),
            Self::Integer(i) => Some(Decimal::from(*i)),
            Self::Float(f) if f.is_finite() => parse_decimal(&f.to_string()),
            Self::Float(_) => None,
            Self::Text(s) => parse_decimal(s),
        }
    }

    /// Interpret as an integer. Fractional floats and decimals truncate
    /// toward zero; fractional text is rejected.
    pub fn to_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Decimal(d) => d.trunc().to_i64(),
            Self::Float(f) if f.is_finite() => f.trunc().to_i64(),
            Self::Float(_) => None,
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// A normalized non-zero mantissa is at least 1e-28, so any larger
/// exponent overflows.
const MAX_EXPONENT: u32 = 56;

/// Parse text into a `Decimal` only if no digit is lost.
///
/// `Decimal::from_str` rounds past 28 significant digits; this rejects
/// those inputs instead.
fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if s.contains(['e', 'E']) {
        return parse_scientific_exact(s);
    }

    Decimal::from_str_exact(s).ok().or_else(|| {
        // Trailing fractional zeros beyond the representable scale carry
        // no value.
        let (int, frac) = s.split_once('.')?;
        let frac = frac.trim_end_matches('0');
        if frac.is_empty() {
            Decimal::from_str_exact(int).ok()
        } else {
            Decimal::from_str_exact(&format!("{int}.{frac}")).ok()
        }
    })
}

fn parse_scientific_exact(s: &str) -> Option<Decimal> {
    let (mantissa, exponent) = s.split_once(['e', 'E'])?;
    let mantissa = parse_decimal(mantissa)?.normalize();
    let exponent: i64 = exponent.parse().ok()?;

    if exponent < 0 {
        let scale = i64::from(mantissa.scale()).checked_sub(exponent)?;
        let mut value = mantissa;
        value.set_scale(u32::try_from(scale).ok()?).ok()?;
        Some(value)
    } else {
        let exponent = u32::try_from(exponent).ok().filter(|e| *e <= MAX_EXPONENT)?;
        (0..exponent).try_fold(mantissa, |acc, _| acc.checked_mul(Decimal::TEN))
    }
}

impl fmt::Display for NumericInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for NumericInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for NumericInput {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for NumericInput {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for NumericInput {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for NumericInput {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<u32> for NumericInput {
    fn from(v: u32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<Decimal> for NumericInput {
    fn from(v: Decimal) -> Self {
        Self::Decimal(v)
    }
}

impl<'de> Deserialize<'de> for NumericInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NumericVisitor;

        impl<'de> Visitor<'de> for NumericVisitor {
            type Value = NumericInput;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a number or numeric string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(NumericInput::Integer(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                i64::try_from(v)
                    .map(NumericInput::Integer)
                    .or_else(|_| Ok(NumericInput::Decimal(Decimal::from(v))))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(NumericInput::Float(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(NumericInput::Text(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(NumericInput::Text(v))
            }
        }

        deserializer.deserialize_any(NumericVisitor)
    }
}
