#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("RPC communication failure: {0}")]
    Rpc(#[from] RpcError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid node response: {0}")]
    InvalidResponse(String),
}

/// Failures talking to the node, split by where in the exchange they happened.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("server error {code}: {message}")]
    ServerError { code: i64, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl CoreError {
    /// The JSON-RPC error code, when the node answered with a structured error.
    pub fn rpc_code(&self) -> Option<i64> {
        match self {
            Self::Rpc(RpcError::ServerError { code, .. }) => Some(*code),
            _ => None,
        }
    }
}
