//! Parsing of user-entered amounts.

use crate::ActionError;
use alloy_primitives::{
    utils::{ParseUnits, Unit},
    U256,
};

/// Parse a decimal amount with 18 decimals ("0.5" -> 5e17).
///
/// The input is used as entered apart from surrounding whitespace. Negative
/// amounts are rejected.
pub fn parse_amount(input: &str) -> Result<U256, ActionError> {
    let invalid = |reason: String| ActionError::InvalidAmount {
        input: input.to_string(),
        reason,
    };

    match ParseUnits::parse_units(input.trim(), Unit::ETHER).map_err(|e| invalid(e.to_string()))? {
        ParseUnits::U256(amount) => Ok(amount),
        ParseUnits::I256(_) => Err(invalid("amount must not be negative".to_string())),
    }
}
