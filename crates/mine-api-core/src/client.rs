//! Typed async client for the gateway's HTTP API.

use std::time::Duration;

use bitcoin::Amount;
use reqwest::header;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::api::{
    CreateWalletResponse, ErrorResponse, GetWalletRequest, GetWalletResponse, MineRequest,
    MineResponse, SendRequest, SendResponse,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:4000";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid client configuration: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error (HTTP {status}): {error}")]
    Api {
        status: u16,
        error: String,
        details: Option<String>,
    },

    #[error("invalid API response: {0}")]
    Decode(String),
}

/// Client for a running gateway. Every call is a `POST` with a JSON body and
/// the bearer token attached.
pub struct MineApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl MineApiClient {
    /// `base_url` defaults to [`DEFAULT_BASE_URL`]; `token` must be non-empty.
    pub fn new(base_url: Option<&str>, token: &str) -> Result<Self, ClientError> {
        if token.is_empty() {
            return Err(ClientError::Config("API token is required".to_owned()));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(ClientError::Transport)?;

        Ok(Self {
            http,
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_owned(),
            token: token.to_owned(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn create_wallet(&self) -> Result<CreateWalletResponse, ClientError> {
        self.request("/api/wallet/create", &serde_json::json!({}))
            .await
    }

    /// `id` is a wallet name or an address owned by the wallet.
    pub async fn get_wallet(&self, id: &str) -> Result<GetWalletResponse, ClientError> {
        let body = GetWalletRequest {
            id: Some(id.to_owned()),
        };
        self.request("/api/wallet", &body).await
    }

    pub async fn mine_blocks(
        &self,
        blocks: u64,
        address: &str,
    ) -> Result<MineResponse, ClientError> {
        let body = MineRequest {
            blocks: Some(serde_json::json!(blocks)),
            address: Some(address.to_owned()),
        };
        self.request("/api/mine", &body).await
    }

    /// `from` is a wallet name or an address owned by the source wallet.
    pub async fn send_bitcoin(
        &self,
        from: &str,
        to: &str,
        amount: Amount,
    ) -> Result<SendResponse, ClientError> {
        let body = SendRequest {
            from: Some(from.to_owned()),
            to: Some(to.to_owned()),
            amount: Some(serde_json::json!(amount.to_btc())),
        };
        self.request("/api/send", &body).await
    }

    async fn request<B, T>(&self, endpoint: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{endpoint}", self.base_url);
        debug!(%url, "mine-api request");

        let response = self
            .http
            .post(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &bytes));
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::Decode(format!("{endpoint}: {e}")))
    }
}

fn api_error(status: u16, body: &[u8]) -> ClientError {
    match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(ErrorResponse { error, details }) => ClientError::Api {
            status,
            error,
            details,
        },
        Err(_) => ClientError::Api {
            status,
            error: "API request failed".to_owned(),
            details: None,
        },
    }
}
