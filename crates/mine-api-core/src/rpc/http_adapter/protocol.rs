use crate::error::{CoreError, RpcError};

#[derive(serde::Serialize)]
pub(super) struct JsonRpcRequest<'a> {
    pub(super) jsonrpc: &'static str,
    pub(super) id: u64,
    pub(super) method: &'a str,
    pub(super) params: Vec<serde_json::Value>,
}

#[derive(serde::Deserialize)]
pub(super) struct JsonRpcResponse {
    pub(super) result: Option<serde_json::Value>,
    pub(super) error: Option<serde_json::Value>,
}

/// Parse a JSON-RPC error value into a structured `CoreError`.
///
/// JSON-RPC errors are shaped as `{"code": <int>, "message": <string>}`.
/// If the error value matches that shape, we produce a `ServerError`;
/// otherwise we fall back to `InvalidResponse` with the raw JSON.
pub(super) fn parse_jsonrpc_error(err: serde_json::Value) -> CoreError {
    #[derive(serde::Deserialize)]
    struct JsonRpcError {
        code: i64,
        message: String,
    }

    if let Ok(parsed) = serde_json::from_value::<JsonRpcError>(err.clone()) {
        CoreError::Rpc(RpcError::ServerError {
            code: parsed.code,
            message: parsed.message,
        })
    } else {
        CoreError::Rpc(RpcError::InvalidResponse(format!(
            "non-standard JSON-RPC error: {err}"
        )))
    }
}

/// Decode a raw HTTP response into the JSON-RPC `result`.
///
/// Bitcoin Core answers RPC errors with a non-2xx status *and* a JSON-RPC
/// error body, so the body is decoded first. The status only decides the
/// error when the body is not JSON-RPC at all (auth failures, proxies).
pub(super) fn decode_response(status: u16, body: &str) -> Result<serde_json::Value, CoreError> {
    let decoded: JsonRpcResponse = match serde_json::from_str(body) {
        Ok(decoded) => decoded,
        Err(e) if (200..300).contains(&status) => {
            return Err(RpcError::InvalidResponse(format!(
                "decode JSON-RPC response: {e}; body={body}"
            ))
            .into());
        }
        Err(_) => {
            return Err(RpcError::Http {
                status,
                body: body.to_owned(),
            }
            .into());
        }
    };

    if let Some(err) = decoded.error.filter(|err| !err.is_null()) {
        return Err(parse_jsonrpc_error(err));
    }

    Ok(decoded.result.unwrap_or(serde_json::Value::Null))
}
