use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::{info, warn};

use mine_api_core::api::{
    CreateWalletResponse, GetWalletRequest, GetWalletResponse, NewWallet, WalletDetails,
};
use mine_api_core::resolve::DEFAULT_LABEL;
use mine_api_core::{resolve_wallet, WalletResolution};

use super::error::AppError;
use super::params::{json_body, present};
use super::SharedState;

/// How many of the most recent wallet transactions GetWallet returns.
const RECENT_TRANSACTIONS: usize = 10;

// ==============================================================================
// Create
// ==============================================================================

pub(super) async fn create_wallet(
    State(state): State<SharedState>,
) -> Result<Json<CreateWalletResponse>, AppError> {
    let id = state.wallet_ids.next_id();
    let fail = |e: mine_api_core::CoreError| {
        warn!(wallet = %id, error = %e, "wallet creation failed");
        AppError::internal("Failed to create wallet", e)
    };

    let created = state.rpc.create_wallet(&id).await.map_err(fail)?;
    for warning in created.warnings() {
        warn!(wallet = %id, %warning, "node warning on wallet creation");
    }
    let address = state.rpc.get_new_address(&id).await.map_err(fail)?;
    let wallet_info = state.rpc.get_wallet_info(&id).await.map_err(fail)?;

    info!(wallet = %id, %address, "created wallet");
    Ok(Json(CreateWalletResponse {
        success: true,
        wallet: NewWallet {
            id,
            address,
            wallet_info,
            network: state.network.to_string(),
        },
    }))
}

// ==============================================================================
// Get
// ==============================================================================

pub(super) async fn get_wallet(
    State(state): State<SharedState>,
    payload: Result<Json<GetWalletRequest>, JsonRejection>,
) -> Result<Json<GetWalletResponse>, AppError> {
    let request = json_body(payload)?;
    let identifier = present(request.id.as_deref())
        .ok_or_else(|| AppError::bad_request("Missing wallet ID parameter"))?;

    let resolution = resolve_wallet(state.rpc.as_ref(), identifier)
        .await
        .map_err(|e| {
            warn!(identifier, error = %e, "wallet resolution failed");
            AppError::internal("Failed to find wallet", e)
        })?;

    let (wallet, known_info) = match resolution {
        WalletResolution::ByName { wallet, info } => (wallet, Some(info)),
        WalletResolution::ByAddress { wallet, address } => {
            info!(wallet = %wallet, %address, "found wallet for address");
            (wallet, None)
        }
        WalletResolution::NotFound => {
            return Err(AppError::not_found(
                "Wallet not found",
                format!("Could not find a wallet with name or address: {identifier}"),
            ));
        }
    };

    let rpc = state.rpc.as_ref();
    let info = async {
        match known_info {
            Some(info) => Ok(info),
            None => rpc.get_wallet_info(&wallet).await,
        }
    };
    let (info, balance, addresses, recent_transactions) = tokio::try_join!(
        info,
        rpc.get_balance(&wallet),
        rpc.get_addresses_by_label(&wallet, DEFAULT_LABEL),
        rpc.list_transactions(&wallet, RECENT_TRANSACTIONS),
    )
    .map_err(|e| {
        warn!(wallet = %wallet, error = %e, "wallet queries failed");
        AppError::internal("Failed to get wallet information", e)
    })?;

    Ok(Json(GetWalletResponse {
        success: true,
        wallet: WalletDetails {
            id: wallet,
            info,
            balance,
            addresses,
            recent_transactions,
        },
    }))
}
