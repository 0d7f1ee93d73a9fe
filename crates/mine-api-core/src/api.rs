//! Request and response bodies of the gateway's HTTP API.
//!
//! Shared by the server handlers and [`MineApiClient`](crate::client::MineApiClient)
//! so both ends agree on field names. Request fields are optional because
//! the server reports missing fields itself, with a 400 and a specific
//! message, rather than failing JSON extraction.

use bitcoin::{Amount, BlockHash, Txid};
use serde::{Deserialize, Serialize};

use crate::rpc::{WalletInfo, WalletTransaction};

// ==============================================================================
// Requests
// ==============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetWalletRequest {
    /// Wallet name or an address owned by the wallet.
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MineRequest {
    /// Block count; a JSON integer or a decimal-integer string.
    #[serde(default)]
    pub blocks: Option<serde_json::Value>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendRequest {
    /// Source wallet name or an address owned by it.
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    /// BTC amount; a JSON number or a decimal string.
    #[serde(default)]
    pub amount: Option<serde_json::Value>,
}

// ==============================================================================
// Responses
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWalletResponse {
    pub success: bool,
    pub wallet: NewWallet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWallet {
    pub id: String,
    pub address: String,
    pub wallet_info: WalletInfo,
    pub network: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetWalletResponse {
    pub success: bool,
    pub wallet: WalletDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletDetails {
    pub id: String,
    pub info: WalletInfo,
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub balance: Amount,
    pub addresses: Vec<String>,
    pub recent_transactions: Vec<WalletTransaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MineResponse {
    pub success: bool,
    pub message: String,
    pub blocks: Vec<BlockHash>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendResponse {
    pub success: bool,
    pub message: String,
    pub transaction: SentTransaction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentTransaction {
    pub txid: Txid,
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub amount: Amount,
    pub to: String,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
