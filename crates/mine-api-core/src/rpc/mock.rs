//! In-memory regtest node for tests.
//!
//! Models just enough wallet behavior for the gateway: named wallets owning
//! addresses, 50 BTC coinbase rewards that mature after 100 blocks, sends
//! that debit the sender at once and credit the receiver when the next block
//! is mined. Every call is counted so tests can assert which RPCs ran.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use bitcoin::address::NetworkUnchecked;
use bitcoin::hashes::Hash;
use bitcoin::{Address, Amount, BlockHash, Network, ScriptBuf, SignedAmount, Txid};

use crate::error::{CoreError, RpcError};

use super::types::{ChainInfo, CreatedWallet, WalletInfo, WalletTransaction};
use super::BitcoinRpc;

const COINBASE_REWARD: Amount = Amount::from_sat(50 * 100_000_000);
const COINBASE_MATURITY: u64 = 100;

const RPC_WALLET_ERROR: i64 = -4;
const RPC_WALLET_INSUFFICIENT_FUNDS: i64 = -6;
const RPC_WALLET_NOT_FOUND: i64 = -18;
const RPC_MISC_ERROR: i64 = -1;

/// A mock Bitcoin Core node. Build one with [`MockRpc::builder`].
pub struct MockRpc {
    network: Network,
    state: Mutex<NodeState>,
    failing: HashSet<String>,
}

#[derive(Default)]
struct NodeState {
    wallets: Vec<MockWallet>,
    tip: u64,
    next_nonce: u64,
    calls: HashMap<&'static str, usize>,
}

struct MockWallet {
    name: String,
    addresses: Vec<String>,
    coinbase_heights: Vec<u64>,
    entries: Vec<Entry>,
}

struct Entry {
    txid: Txid,
    category: &'static str,
    amount: SignedAmount,
    address: String,
    /// `None` while in the mempool.
    height: Option<u64>,
}

impl MockWallet {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            addresses: Vec::new(),
            coinbase_heights: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Mature coinbase plus confirmed receipts, minus everything sent.
    fn balance(&self, tip: u64) -> Amount {
        let mature = self
            .coinbase_heights
            .iter()
            .filter(|&&height| height + COINBASE_MATURITY <= tip)
            .count() as u64;
        let mut sats = (COINBASE_REWARD.to_sat() * mature) as i64;
        for entry in &self.entries {
            match entry.category {
                "send" => sats += entry.amount.to_sat(),
                _ if entry.height.is_some() => sats += entry.amount.to_sat(),
                _ => {}
            }
        }
        Amount::from_sat(sats.max(0) as u64)
    }
}

impl NodeState {
    fn wallet(&self, name: &str) -> Result<&MockWallet, CoreError> {
        self.wallets
            .iter()
            .find(|w| w.name == name)
            .ok_or_else(wallet_not_found)
    }

    fn wallet_mut(&mut self, name: &str) -> Result<&mut MockWallet, CoreError> {
        self.wallets
            .iter_mut()
            .find(|w| w.name == name)
            .ok_or_else(wallet_not_found)
    }

    fn owner_of_mut(&mut self, address: &str) -> Option<&mut MockWallet> {
        self.wallets
            .iter_mut()
            .find(|w| w.addresses.iter().any(|a| a == address))
    }

    fn nonce(&mut self) -> u64 {
        self.next_nonce += 1;
        self.next_nonce
    }

    fn fresh_address(&mut self, network: Network) -> String {
        let nonce = self.nonce();
        let script = ScriptBuf::from_bytes(nonce.to_le_bytes().to_vec());
        Address::p2wsh(&script, network).to_string()
    }

    fn fresh_txid(&mut self) -> Txid {
        Txid::from_byte_array(hash_bytes(self.nonce()))
    }
}

fn hash_bytes(n: u64) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes[..8].copy_from_slice(&n.to_le_bytes());
    bytes[31] = 0xab;
    bytes
}

fn wallet_not_found() -> CoreError {
    RpcError::ServerError {
        code: RPC_WALLET_NOT_FOUND,
        message: "Requested wallet does not exist or is not loaded".to_owned(),
    }
    .into()
}

impl MockRpc {
    pub fn builder() -> MockRpcBuilder {
        MockRpcBuilder {
            network: Network::Regtest,
            wallets: Vec::new(),
            failing: HashSet::new(),
        }
    }

    /// Number of times `method` (the Bitcoin Core RPC name) was called.
    pub fn calls(&self, method: &str) -> usize {
        self.lock().calls.get(method).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.lock().calls.values().sum()
    }

    /// A fresh address on the mock's network owned by no wallet.
    pub fn foreign_address(&self) -> String {
        let network = self.network;
        self.lock().fresh_address(network)
    }

    fn lock(&self) -> MutexGuard<'_, NodeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record the call and fail it if the builder marked `method` as failing.
    fn enter(&self, method: &'static str) -> Result<MutexGuard<'_, NodeState>, CoreError> {
        let mut state = self.lock();
        *state.calls.entry(method).or_default() += 1;
        if self.failing.contains(method) {
            return Err(RpcError::ServerError {
                code: RPC_MISC_ERROR,
                message: format!("mock failure in {method}"),
            }
            .into());
        }
        Ok(state)
    }
}

pub struct MockRpcBuilder {
    network: Network,
    wallets: Vec<(String, Vec<String>)>,
    failing: HashSet<String>,
}

impl MockRpcBuilder {
    /// Preload a wallet owning `addresses`. Wallets are listed in the order
    /// they are added.
    pub fn with_wallet(mut self, name: &str, addresses: &[&str]) -> Self {
        self.wallets.push((
            name.to_owned(),
            addresses.iter().map(|a| (*a).to_owned()).collect(),
        ));
        self
    }

    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    /// Make every call to `method` fail with a server error.
    pub fn failing(mut self, method: &str) -> Self {
        self.failing.insert(method.to_owned());
        self
    }

    pub fn build(self) -> MockRpc {
        let wallets = self
            .wallets
            .into_iter()
            .map(|(name, addresses)| MockWallet {
                addresses,
                ..MockWallet::new(&name)
            })
            .collect();
        MockRpc {
            network: self.network,
            state: Mutex::new(NodeState {
                wallets,
                ..NodeState::default()
            }),
            failing: self.failing,
        }
    }
}

#[async_trait]
impl BitcoinRpc for MockRpc {
    async fn get_blockchain_info(&self) -> Result<ChainInfo, CoreError> {
        let state = self.enter("getblockchaininfo")?;
        Ok(ChainInfo {
            chain: match self.network {
                Network::Bitcoin => "main",
                Network::Testnet => "test",
                Network::Signet => "signet",
                _ => "regtest",
            }
            .to_owned(),
            blocks: state.tip,
            best_block_hash: BlockHash::from_byte_array(hash_bytes(state.tip)),
        })
    }

    async fn list_wallets(&self) -> Result<Vec<String>, CoreError> {
        let state = self.enter("listwallets")?;
        Ok(state.wallets.iter().map(|w| w.name.clone()).collect())
    }

    async fn create_wallet(&self, name: &str) -> Result<CreatedWallet, CoreError> {
        let mut state = self.enter("createwallet")?;
        if state.wallets.iter().any(|w| w.name == name) {
            return Err(RpcError::ServerError {
                code: RPC_WALLET_ERROR,
                message: format!(
                    "Wallet file verification failed. Database already exists: {name}"
                ),
            }
            .into());
        }
        state.wallets.push(MockWallet::new(name));
        Ok(CreatedWallet::new(name))
    }

    async fn generate_to_address(
        &self,
        blocks: u64,
        address: &str,
    ) -> Result<Vec<BlockHash>, CoreError> {
        let mut state = self.enter("generatetoaddress")?;
        let parsed = address
            .parse::<Address<NetworkUnchecked>>()
            .ok()
            .filter(|a| a.is_valid_for_network(self.network));
        if parsed.is_none() {
            return Err(RpcError::ServerError {
                code: -5,
                message: "Error: Invalid address".to_owned(),
            }
            .into());
        }

        let mut hashes = Vec::with_capacity(blocks as usize);
        for _ in 0..blocks {
            state.tip += 1;
            let height = state.tip;
            hashes.push(BlockHash::from_byte_array(hash_bytes(height)));
            if let Some(owner) = state.owner_of_mut(address) {
                owner.coinbase_heights.push(height);
            }
        }
        if blocks > 0 {
            let height = state.tip;
            for wallet in &mut state.wallets {
                for entry in wallet.entries.iter_mut().filter(|e| e.height.is_none()) {
                    entry.height = Some(height);
                }
            }
        }
        Ok(hashes)
    }

    async fn get_new_address(&self, wallet: &str) -> Result<String, CoreError> {
        let mut state = self.enter("getnewaddress")?;
        state.wallet(wallet)?;
        let address = state.fresh_address(self.network);
        state.wallet_mut(wallet)?.addresses.push(address.clone());
        Ok(address)
    }

    async fn get_wallet_info(&self, wallet: &str) -> Result<WalletInfo, CoreError> {
        let state = self.enter("getwalletinfo")?;
        let found = state.wallet(wallet)?;
        let mut info = WalletInfo::named(&found.name);
        info.txcount = Some(found.entries.len() as u64);
        info.extra
            .insert("format".to_owned(), serde_json::json!("sqlite"));
        info.extra
            .insert("descriptors".to_owned(), serde_json::json!(true));
        Ok(info)
    }

    async fn get_balance(&self, wallet: &str) -> Result<Amount, CoreError> {
        let state = self.enter("getbalance")?;
        Ok(state.wallet(wallet)?.balance(state.tip))
    }

    async fn get_addresses_by_label(
        &self,
        wallet: &str,
        _label: &str,
    ) -> Result<Vec<String>, CoreError> {
        let state = self.enter("getaddressesbylabel")?;
        Ok(state.wallet(wallet)?.addresses.clone())
    }

    async fn list_transactions(
        &self,
        wallet: &str,
        count: usize,
    ) -> Result<Vec<WalletTransaction>, CoreError> {
        let state = self.enter("listtransactions")?;
        let found = state.wallet(wallet)?;
        let skip = found.entries.len().saturating_sub(count);
        Ok(found
            .entries
            .iter()
            .skip(skip)
            .map(|entry| {
                let mut extra = serde_json::Map::new();
                extra.insert("address".to_owned(), serde_json::json!(entry.address));
                WalletTransaction {
                    txid: entry.txid,
                    category: entry.category.to_owned(),
                    amount: entry.amount,
                    confirmations: entry
                        .height
                        .map_or(0, |height| (state.tip - height + 1) as i64),
                    extra,
                }
            })
            .collect())
    }

    async fn send_to_address(
        &self,
        wallet: &str,
        address: &str,
        amount: Amount,
    ) -> Result<Txid, CoreError> {
        let mut state = self.enter("sendtoaddress")?;
        let tip = state.tip;
        if state.wallet(wallet)?.balance(tip) < amount {
            return Err(RpcError::ServerError {
                code: RPC_WALLET_INSUFFICIENT_FUNDS,
                message: "Insufficient funds".to_owned(),
            }
            .into());
        }

        let txid = state.fresh_txid();
        let signed = amount
            .to_signed()
            .map_err(|e| CoreError::InvalidResponse(e.to_string()))?;
        state.wallet_mut(wallet)?.entries.push(Entry {
            txid,
            category: "send",
            amount: -signed,
            address: address.to_owned(),
            height: None,
        });
        if let Some(receiver) = state.owner_of_mut(address) {
            receiver.entries.push(Entry {
                txid,
                category: "receive",
                amount: signed,
                address: address.to_owned(),
                height: None,
            });
        }
        Ok(txid)
    }
}
