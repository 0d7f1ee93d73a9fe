//! Bitcoin Core RPC abstraction layer.
//!
//! Defines the [`BitcoinRpc`] trait and provides an HTTP JSON-RPC
//! implementation ([`HttpRpcClient`]) plus an in-memory node
//! (`mock::MockRpc`, behind the `mock` feature).

mod http_adapter;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod types;

pub use http_adapter::HttpRpcClient;
pub use types::{ChainInfo, CreatedWallet, WalletInfo, WalletTransaction};

use async_trait::async_trait;
use bitcoin::{Amount, BlockHash, Txid};

use crate::error::CoreError;

/// The Bitcoin Core RPC methods the gateway needs.
///
/// Methods taking a `wallet` argument are scoped to that named wallet;
/// the rest address the node itself. Implementations handle
/// authentication, connection management, and response decoding.
#[async_trait]
pub trait BitcoinRpc: Send + Sync {
    /// Fetch basic chain info (network, block count).
    async fn get_blockchain_info(&self) -> Result<ChainInfo, CoreError>;

    /// Names of all wallets currently loaded by the node, in node order.
    async fn list_wallets(&self) -> Result<Vec<String>, CoreError>;

    /// Create and load a descriptor wallet.
    async fn create_wallet(&self, name: &str) -> Result<CreatedWallet, CoreError>;

    /// Mine `blocks` blocks paying the coinbase to `address`.
    async fn generate_to_address(
        &self,
        blocks: u64,
        address: &str,
    ) -> Result<Vec<BlockHash>, CoreError>;

    async fn get_new_address(&self, wallet: &str) -> Result<String, CoreError>;

    async fn get_wallet_info(&self, wallet: &str) -> Result<WalletInfo, CoreError>;

    /// Trusted spendable balance of the wallet.
    async fn get_balance(&self, wallet: &str) -> Result<Amount, CoreError>;

    /// Addresses of `wallet` carrying `label`. A label with no addresses
    /// yields an empty list rather than an error.
    async fn get_addresses_by_label(
        &self,
        wallet: &str,
        label: &str,
    ) -> Result<Vec<String>, CoreError>;

    /// Most recent `count` transactions across all labels, oldest first.
    async fn list_transactions(
        &self,
        wallet: &str,
        count: usize,
    ) -> Result<Vec<WalletTransaction>, CoreError>;

    async fn send_to_address(
        &self,
        wallet: &str,
        address: &str,
        amount: Amount,
    ) -> Result<Txid, CoreError>;
}
