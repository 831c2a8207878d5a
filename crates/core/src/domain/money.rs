//! Exact fixed-point money amounts.
//!
//! Feed prices arrive as decimal strings. They are normalized into whole
//! `units` plus a `nanos` remainder scaled to billionths, going through
//! `rust_decimal` so the same input string always produces the same pair on
//! every platform.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const NANOS_PER_UNIT: i64 = 1_000_000_000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub units: i64,
    pub nanos: i32,
    pub currency_code: String,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MoneyParseError {
    #[error("`{0}` is not a valid decimal amount")]
    InvalidDecimal(String),
    #[error("amount `{0}` does not fit the fixed-point range")]
    OutOfRange(String),
}

impl Money {
    /// Normalizes a decimal string into `units` + `nanos`.
    ///
    /// Both parts truncate toward zero: `units` is the integer part of the
    /// amount, `nanos` is the remainder scaled by 1e9 with any digits past
    /// the ninth fractional place discarded.
    pub fn parse(value: &str, currency_code: &str) -> Result<Self, MoneyParseError> {
        let amount = Decimal::from_str(value.trim())
            .map_err(|_| MoneyParseError::InvalidDecimal(value.to_string()))?;

        let whole = amount.trunc();
        let units =
            whole.to_i64().ok_or_else(|| MoneyParseError::OutOfRange(value.to_string()))?;
        let nanos = ((amount - whole) * Decimal::from(NANOS_PER_UNIT))
            .trunc()
            .to_i32()
            .ok_or_else(|| MoneyParseError::OutOfRange(value.to_string()))?;

        Ok(Self { units, nanos, currency_code: currency_code.to_string() })
    }
}
