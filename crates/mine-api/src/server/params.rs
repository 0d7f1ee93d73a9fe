use axum::extract::rejection::JsonRejection;
use axum::Json;
use bitcoin::address::NetworkUnchecked;
use bitcoin::{Address, Amount, Network};

use mine_api_core::amount::parse_btc_amount;

use super::error::AppError;

/// Upper bound on blocks mined by one request.
pub(crate) const MAX_BLOCKS_PER_REQUEST: u64 = 10_000;

/// Unwrap a JSON body, turning extractor rejections into a 400.
pub(super) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| {
            AppError::bad_request("Invalid JSON body").with_details(rejection.body_text())
        })
}

/// `Some` non-blank string, trimmed.
pub(super) fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// `Some` value that is neither JSON `null` nor a blank string.
pub(super) fn present_value(value: Option<&serde_json::Value>) -> Option<&serde_json::Value> {
    value.filter(|v| match v {
        serde_json::Value::Null => false,
        serde_json::Value::String(s) => !s.trim().is_empty(),
        _ => true,
    })
}

/// A positive block count, given as a JSON integer or a decimal string.
pub(super) fn parse_block_count(value: &serde_json::Value) -> Result<u64, AppError> {
    let invalid = || AppError::bad_request("Blocks must be a positive number");

    let count = match value {
        serde_json::Value::Number(n) => n.as_u64().ok_or_else(invalid)?,
        serde_json::Value::String(s) => s.trim().parse::<u64>().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };
    if count == 0 {
        return Err(invalid());
    }
    if count > MAX_BLOCKS_PER_REQUEST {
        return Err(AppError::bad_request(format!(
            "Blocks must be at most {MAX_BLOCKS_PER_REQUEST}"
        )));
    }
    Ok(count)
}

/// A positive BTC amount, given as a JSON number or a decimal string.
pub(super) fn parse_positive_amount(value: &serde_json::Value) -> Result<Amount, AppError> {
    let invalid = || AppError::bad_request("Amount must be a positive number");

    let amount = parse_btc_amount(value).map_err(|e| invalid().with_details(e.to_string()))?;
    if amount == Amount::ZERO {
        return Err(invalid());
    }
    Ok(amount)
}

/// Check that `address` parses and belongs to `network`.
pub(super) fn validate_address(
    field: &str,
    address: &str,
    network: Network,
) -> Result<(), AppError> {
    let invalid = || AppError::bad_request(format!("Invalid {field} address"));

    let unchecked = address
        .parse::<Address<NetworkUnchecked>>()
        .map_err(|e| invalid().with_details(e.to_string()))?;
    unchecked
        .require_network(network)
        .map_err(|e| invalid().with_details(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_bad_request(result: Result<impl std::fmt::Debug, AppError>, message: &str) {
        match result {
            Err(AppError::BadRequest { error, .. }) => assert_eq!(error, message),
            other => panic!("expected BadRequest({message}), got {other:?}"),
        }
    }

    #[test]
    fn block_count_accepts_integers_and_integer_strings() {
        assert_eq!(parse_block_count(&serde_json::json!(101)).ok(), Some(101));
        assert_eq!(parse_block_count(&serde_json::json!(" 6 ")).ok(), Some(6));
    }

    #[test]
    fn block_count_rejects_zero_negative_and_fractional() {
        for value in [
            serde_json::json!(0),
            serde_json::json!(-3),
            serde_json::json!(1.5),
            serde_json::json!("0"),
            serde_json::json!("-1"),
            serde_json::json!("ten"),
            serde_json::json!(true),
        ] {
            assert_bad_request(parse_block_count(&value), "Blocks must be a positive number");
        }
    }

    #[test]
    fn block_count_is_capped() {
        assert_bad_request(
            parse_block_count(&serde_json::json!(MAX_BLOCKS_PER_REQUEST + 1)),
            "Blocks must be at most 10000",
        );
    }

    #[test]
    fn amount_must_be_positive() {
        assert_eq!(
            parse_positive_amount(&serde_json::json!("0.25")).ok(),
            Some(Amount::from_sat(25_000_000))
        );
        for value in [
            serde_json::json!(0),
            serde_json::json!(-1),
            serde_json::json!("abc"),
            serde_json::json!(null),
        ] {
            assert_bad_request(parse_positive_amount(&value), "Amount must be a positive number");
        }
    }

    #[test]
    fn address_must_match_network() {
        let script = bitcoin::ScriptBuf::new();
        let regtest = Address::p2wsh(&script, Network::Regtest).to_string();
        let mainnet = Address::p2wsh(&script, Network::Bitcoin).to_string();

        assert!(validate_address("destination", &regtest, Network::Regtest).is_ok());
        assert_bad_request(
            validate_address("destination", &mainnet, Network::Regtest),
            "Invalid destination address",
        );
        assert_bad_request(
            validate_address("destination", "not-an-address", Network::Regtest),
            "Invalid destination address",
        );
    }

    #[test]
    fn blank_strings_are_not_present() {
        assert_eq!(present(Some("  ")), None);
        assert_eq!(present(Some(" w1 ")), Some("w1"));
        assert!(present_value(Some(&serde_json::json!(""))).is_none());
        assert!(present_value(Some(&serde_json::Value::Null)).is_none());
        assert!(present_value(Some(&serde_json::json!(0))).is_some());
    }
}
