use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::{debug, info, warn};

use mine_api_core::api::{SendRequest, SendResponse, SentTransaction};
use mine_api_core::{resolve_wallet, WalletResolution};

use super::error::AppError;
use super::params::{json_body, parse_positive_amount, present, present_value, validate_address};
use super::SharedState;

pub(super) async fn send_bitcoin(
    State(state): State<SharedState>,
    payload: Result<Json<SendRequest>, JsonRejection>,
) -> Result<Json<SendResponse>, AppError> {
    let request = json_body(payload)?;

    let (Some(from), Some(to), Some(amount)) = (
        present(request.from.as_deref()),
        present(request.to.as_deref()),
        present_value(request.amount.as_ref()),
    ) else {
        return Err(AppError::bad_request("Missing required parameters")
            .with_details("Required: from (wallet name or address), to (address), amount (BTC)"));
    };
    let amount = parse_positive_amount(amount)?;
    validate_address("destination", to, state.network)?;

    let resolution = resolve_wallet(state.rpc.as_ref(), from)
        .await
        .map_err(|e| {
            warn!(from, error = %e, "source wallet resolution failed");
            AppError::internal("Failed to find source wallet", e)
        })?;
    let wallet = match resolution {
        WalletResolution::ByName { wallet, .. } => wallet,
        WalletResolution::ByAddress { wallet, address } => {
            debug!(wallet = %wallet, %address, "found source wallet for address");
            wallet
        }
        WalletResolution::NotFound => {
            return Err(AppError::not_found(
                "Source not found",
                format!("Could not find a wallet with name or address: {from}"),
            ));
        }
    };

    let txid = state
        .rpc
        .send_to_address(&wallet, to, amount)
        .await
        .map_err(|e| {
            warn!(wallet = %wallet, %to, error = %e, "send failed");
            AppError::internal("Failed to send transaction", e)
        })?;

    info!(wallet = %wallet, %to, %txid, btc = amount.to_btc(), "sent transaction");
    Ok(Json(SendResponse {
        success: true,
        message: format!("Successfully sent {} BTC to {to}", amount.to_btc()),
        transaction: SentTransaction {
            txid,
            amount,
            to: to.to_owned(),
        },
    }))
}
