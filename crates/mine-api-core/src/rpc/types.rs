//! Typed results of the Bitcoin Core RPC methods the gateway calls.
//!
//! Wallet info and transactions are relayed to API callers as the node
//! produced them, so only the fields the gateway itself reads are modelled
//! and everything else rides along in a flattened map.

use bitcoin::{BlockHash, SignedAmount, Txid};
use serde::{Deserialize, Serialize};

// ==============================================================================
// Chain Info
// ==============================================================================

/// Basic chain information from `getblockchaininfo`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainInfo {
    pub chain: String,
    pub blocks: u64,
    #[serde(rename = "bestblockhash")]
    pub best_block_hash: BlockHash,
}

// ==============================================================================
// Wallets
// ==============================================================================

/// Result of `createwallet`.
///
/// Nodes before v25 report a single `warning` string; newer ones report a
/// `warnings` list. Both are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedWallet {
    pub name: String,
    #[serde(default)]
    warning: Option<String>,
    #[serde(default)]
    warnings: Vec<String>,
}

impl CreatedWallet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            warning: None,
            warnings: Vec::new(),
        }
    }

    /// All non-empty warnings the node attached to the creation.
    pub fn warnings(&self) -> Vec<&str> {
        self.warning
            .iter()
            .chain(self.warnings.iter())
            .map(String::as_str)
            .filter(|w| !w.is_empty())
            .collect()
    }
}

/// Result of `getwalletinfo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletInfo {
    pub walletname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txcount: Option<u64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl WalletInfo {
    pub fn named(walletname: impl Into<String>) -> Self {
        Self {
            walletname: walletname.into(),
            txcount: None,
            extra: serde_json::Map::new(),
        }
    }
}

/// One entry of `listtransactions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub txid: Txid,
    pub category: String,
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub amount: SignedAmount,
    #[serde(default)]
    pub confirmations: i64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_wallet_accepts_legacy_and_current_warning_shapes() {
        let legacy: CreatedWallet =
            serde_json::from_value(serde_json::json!({ "name": "w1", "warning": "" }))
                .expect("legacy shape must parse");
        assert_eq!(legacy.name, "w1");
        assert!(legacy.warnings().is_empty());

        let current: CreatedWallet = serde_json::from_value(serde_json::json!({
            "name": "w2",
            "warnings": ["Wallet created with experimental features"]
        }))
        .expect("current shape must parse");
        assert_eq!(
            current.warnings(),
            vec!["Wallet created with experimental features"]
        );
    }

    #[test]
    fn wallet_info_preserves_unmodelled_fields() {
        let raw = serde_json::json!({
            "walletname": "wallet_1",
            "walletversion": 169900,
            "format": "sqlite",
            "txcount": 3,
            "descriptors": true
        });
        let info: WalletInfo = serde_json::from_value(raw.clone()).expect("must parse");
        assert_eq!(info.walletname, "wallet_1");
        assert_eq!(info.txcount, Some(3));
        assert_eq!(info.extra.get("format"), Some(&serde_json::json!("sqlite")));

        let round = serde_json::to_value(&info).expect("must serialize");
        assert_eq!(round, raw);
    }

    #[test]
    fn wallet_transaction_parses_btc_amounts() {
        let raw = serde_json::json!({
            "address": "bcrt1qexample",
            "category": "send",
            "amount": -1.0,
            "fee": -0.0000141,
            "confirmations": 0,
            "txid": "1111111111111111111111111111111111111111111111111111111111111111"
        });
        let tx: WalletTransaction = serde_json::from_value(raw).expect("must parse");
        assert_eq!(tx.category, "send");
        assert_eq!(tx.amount, SignedAmount::from_sat(-100_000_000));
        assert_eq!(tx.confirmations, 0);
        assert!(tx.extra.contains_key("fee"));
    }
}
