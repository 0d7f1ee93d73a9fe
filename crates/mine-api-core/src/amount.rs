//! BTC-denominated amount parsing shared by the RPC adapter and the HTTP
//! request validation.

use bitcoin::{Amount, Denomination};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid BTC amount `{input}`: {reason}")]
pub struct ParseBtcAmountError {
    pub input: String,
    pub reason: String,
}

impl ParseBtcAmountError {
    fn new(input: impl ToString, reason: impl ToString) -> Self {
        Self {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Parse a BTC amount from a JSON value.
///
/// Number values are parsed via `Amount::from_float_in` to support scientific
/// notation, while string values are parsed via `Amount::from_str_in`.
/// Negative values, values above the money supply, and sub-satoshi precision
/// are rejected.
pub fn parse_btc_amount(value: &serde_json::Value) -> Result<Amount, ParseBtcAmountError> {
    let amount = match value {
        serde_json::Value::Number(n) => {
            let parsed = n
                .as_f64()
                .ok_or_else(|| ParseBtcAmountError::new(value, "not representable as f64"))?;
            Amount::from_float_in(parsed, Denomination::Bitcoin)
                .map_err(|e| ParseBtcAmountError::new(value, e))
        }
        serde_json::Value::String(s) => Amount::from_str_in(s.trim(), Denomination::Bitcoin)
            .map_err(|e| ParseBtcAmountError::new(s, e)),
        _ => Err(ParseBtcAmountError::new(value, "expected a number or string")),
    }?;
    if amount > Amount::MAX_MONEY {
        return Err(ParseBtcAmountError::new(value, "exceeds the money supply"));
    }
    Ok(amount)
}
