use bitcoin::Amount;
use serde::de::DeserializeOwned;

use crate::amount::parse_btc_amount;
use crate::error::CoreError;

/// Decode an RPC `result` into `T`, naming the method on failure.
pub(super) fn parse_result<T: DeserializeOwned>(
    method: &str,
    raw: serde_json::Value,
) -> Result<T, CoreError> {
    serde_json::from_value(raw)
        .map_err(|e| CoreError::InvalidResponse(format!("invalid {method} result: {e}")))
}

pub(super) fn parse_balance(raw: &serde_json::Value) -> Result<Amount, CoreError> {
    parse_btc_amount(raw)
        .map_err(|e| CoreError::InvalidResponse(format!("invalid getbalance result: {e}")))
}

/// `getaddressesbylabel` answers with an object keyed by address; only the
/// keys matter to the gateway.
pub(super) fn parse_address_keys(raw: serde_json::Value) -> Result<Vec<String>, CoreError> {
    match raw {
        serde_json::Value::Object(map) => Ok(map.into_iter().map(|(address, _)| address).collect()),
        serde_json::Value::Null => Ok(Vec::new()),
        other => Err(CoreError::InvalidResponse(format!(
            "invalid getaddressesbylabel result: expected object, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_address_keys_collects_object_keys() {
        let raw = serde_json::json!({
            "bcrt1qaaa": { "purpose": "receive" },
            "bcrt1qbbb": { "purpose": "receive" }
        });
        let mut addresses = parse_address_keys(raw).expect("should parse");
        addresses.sort();
        assert_eq!(addresses, vec!["bcrt1qaaa", "bcrt1qbbb"]);
    }

    #[test]
    fn parse_address_keys_rejects_arrays() {
        let err = parse_address_keys(serde_json::json!(["bcrt1qaaa"])).expect_err("must reject");
        assert!(err.to_string().contains("expected object"));
    }

    #[test]
    fn parse_balance_reads_btc_float() {
        let amount = parse_balance(&serde_json::json!(49.99998590)).expect("should parse");
        assert_eq!(amount, Amount::from_sat(4_999_998_590));
    }

    #[test]
    fn parse_result_names_method_on_failure() {
        let err = parse_result::<Vec<String>>("listwallets", serde_json::json!(42))
            .expect_err("must fail");
        assert!(err.to_string().contains("invalid listwallets result"));
    }
}
