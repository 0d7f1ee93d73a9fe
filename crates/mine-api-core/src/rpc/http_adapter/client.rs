use std::num::NonZeroU32;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use bitcoin::{Amount, BlockHash, Txid};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{header, Url};
use tracing::{debug, trace};

use crate::error::{CoreError, RpcError};

use super::super::types::{ChainInfo, CreatedWallet, WalletInfo, WalletTransaction};
use super::super::BitcoinRpc;
use super::connection::{parse_connection, resolve_auth, wallet_url};
use super::parsing::{parse_address_keys, parse_balance, parse_result};
use super::protocol::{decode_response, JsonRpcRequest};

/// `RPC_WALLET_INVALID_LABEL_NAME`: returned by `getaddressesbylabel` when
/// the wallet holds no address under the requested label.
const RPC_WALLET_INVALID_LABEL_NAME: i64 = -11;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Bitcoin Core JSON-RPC client over HTTP(S).
///
/// Node-level calls go to the base URL; wallet-scoped calls go to
/// `<base>/wallet/<name>`. The underlying connection pool is shared by all
/// calls and all wallets.
pub struct HttpRpcClient {
    client: reqwest::Client,
    url: Url,
    auth: Option<(String, String)>,
    limiter: Option<DirectRateLimiter>,
    next_id: AtomicU64,
}

impl HttpRpcClient {
    /// Create a new client for an HTTP URL.
    ///
    /// Authentication precedence:
    /// 1. explicit `user` + `pass`
    /// 2. cookie file (`username:password`) from `cookie_file`
    /// 3. no auth
    ///
    /// If `requests_per_second` is set, outbound calls wait for the limiter
    /// before being sent. Nothing is dropped or retried.
    pub fn new(
        connection: &str,
        user: Option<&str>,
        pass: Option<&str>,
        cookie_file: Option<&Path>,
        requests_per_second: Option<u32>,
    ) -> Result<Self, CoreError> {
        let auth = resolve_auth(user, pass, cookie_file)?;
        let url = parse_connection(connection)?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(32)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| CoreError::Config(format!("build HTTP client: {e}")))?;

        let limiter = match requests_per_second {
            None => None,
            Some(limit) => {
                let limit = NonZeroU32::new(limit).ok_or_else(|| {
                    CoreError::Config("requests_per_second must be at least 1".to_owned())
                })?;
                Some(RateLimiter::direct(Quota::per_second(limit)))
            }
        };

        Ok(Self {
            client,
            url,
            auth,
            limiter,
            next_id: AtomicU64::new(initial_request_id()),
        })
    }

    fn next_request_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    async fn wait_for_rate_limit(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    async fn rpc_call(
        &self,
        wallet: Option<&str>,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, CoreError> {
        let url = match wallet {
            Some(name) => wallet_url(&self.url, name)?,
            None => self.url.clone(),
        };

        self.wait_for_rate_limit().await;
        let id = self.next_request_id();
        debug!(
            rpc.id = id,
            rpc.method = method,
            rpc.wallet = wallet.unwrap_or_default(),
            rpc.params = params.len(),
            "rpc call"
        );
        let req = JsonRpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        let mut builder = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&req);
        if let Some((ref user, ref pass)) = self.auth {
            builder = builder.basic_auth(user, Some(pass));
        }

        let response = builder.send().await.map_err(RpcError::Transport)?;
        let status = response.status();

        let body = response.text().await.map_err(RpcError::Transport)?;
        debug!(rpc.id = id, rpc.method = method, %status, body_len = body.len(), "rpc response");
        trace!(rpc.id = id, rpc.method = method, body = %body, "rpc response body");

        decode_response(status.as_u16(), &body)
    }
}

#[async_trait]
impl BitcoinRpc for HttpRpcClient {
    async fn get_blockchain_info(&self) -> Result<ChainInfo, CoreError> {
        let raw = self.rpc_call(None, "getblockchaininfo", Vec::new()).await?;
        parse_result("getblockchaininfo", raw)
    }

    async fn list_wallets(&self) -> Result<Vec<String>, CoreError> {
        let raw = self.rpc_call(None, "listwallets", Vec::new()).await?;
        parse_result("listwallets", raw)
    }

    async fn create_wallet(&self, name: &str) -> Result<CreatedWallet, CoreError> {
        // wallet_name, disable_private_keys, blank, passphrase, avoid_reuse, descriptors
        let params = vec![
            serde_json::json!(name),
            serde_json::json!(false),
            serde_json::json!(false),
            serde_json::json!(""),
            serde_json::json!(false),
            serde_json::json!(true),
        ];
        let raw = self.rpc_call(None, "createwallet", params).await?;
        parse_result("createwallet", raw)
    }

    async fn generate_to_address(
        &self,
        blocks: u64,
        address: &str,
    ) -> Result<Vec<BlockHash>, CoreError> {
        let raw = self
            .rpc_call(
                None,
                "generatetoaddress",
                vec![serde_json::json!(blocks), serde_json::json!(address)],
            )
            .await?;
        parse_result("generatetoaddress", raw)
    }

    async fn get_new_address(&self, wallet: &str) -> Result<String, CoreError> {
        let raw = self
            .rpc_call(Some(wallet), "getnewaddress", Vec::new())
            .await?;
        parse_result("getnewaddress", raw)
    }

    async fn get_wallet_info(&self, wallet: &str) -> Result<WalletInfo, CoreError> {
        let raw = self
            .rpc_call(Some(wallet), "getwalletinfo", Vec::new())
            .await?;
        parse_result("getwalletinfo", raw)
    }

    async fn get_balance(&self, wallet: &str) -> Result<Amount, CoreError> {
        let raw = self.rpc_call(Some(wallet), "getbalance", Vec::new()).await?;
        parse_balance(&raw)
    }

    async fn get_addresses_by_label(
        &self,
        wallet: &str,
        label: &str,
    ) -> Result<Vec<String>, CoreError> {
        let result = self
            .rpc_call(
                Some(wallet),
                "getaddressesbylabel",
                vec![serde_json::json!(label)],
            )
            .await;
        match normalize_empty_label(result)? {
            Some(raw) => parse_address_keys(raw),
            None => Ok(Vec::new()),
        }
    }

    async fn list_transactions(
        &self,
        wallet: &str,
        count: usize,
    ) -> Result<Vec<WalletTransaction>, CoreError> {
        let raw = self
            .rpc_call(
                Some(wallet),
                "listtransactions",
                vec![serde_json::json!("*"), serde_json::json!(count)],
            )
            .await?;
        parse_result("listtransactions", raw)
    }

    async fn send_to_address(
        &self,
        wallet: &str,
        address: &str,
        amount: Amount,
    ) -> Result<Txid, CoreError> {
        let raw = self
            .rpc_call(
                Some(wallet),
                "sendtoaddress",
                vec![serde_json::json!(address), serde_json::json!(amount.to_btc())],
            )
            .await?;
        parse_result("sendtoaddress", raw)
    }
}

fn initial_request_id() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1)
}

// ==============================================================================
// RPC Error Normalization
// ==============================================================================

/// Map the "no addresses with this label" server error to `None`.
///
/// A freshly created wallet, or one whose addresses were all labelled,
/// answers `getaddressesbylabel("")` with an error instead of an empty
/// object. Other failures are preserved as-is.
fn normalize_empty_label(
    result: Result<serde_json::Value, CoreError>,
) -> Result<Option<serde_json::Value>, CoreError> {
    match result {
        Ok(raw) => Ok(Some(raw)),
        Err(err) if err.rpc_code() == Some(RPC_WALLET_INVALID_LABEL_NAME) => Ok(None),
        Err(err) => Err(err),
    }
}
