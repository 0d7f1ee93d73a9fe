use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::{info, warn};

use mine_api_core::api::{MineRequest, MineResponse};

use super::error::AppError;
use super::params::{json_body, parse_block_count, present, present_value, validate_address};
use super::SharedState;

pub(super) async fn mine_blocks(
    State(state): State<SharedState>,
    payload: Result<Json<MineRequest>, JsonRejection>,
) -> Result<Json<MineResponse>, AppError> {
    let request = json_body(payload)?;

    let (Some(blocks), Some(address)) = (
        present_value(request.blocks.as_ref()),
        present(request.address.as_deref()),
    ) else {
        return Err(AppError::bad_request(
            "Missing required parameters: blocks and address",
        ));
    };
    let blocks = parse_block_count(blocks)?;
    validate_address("mining", address, state.network)?;

    let hashes = state
        .rpc
        .generate_to_address(blocks, address)
        .await
        .map_err(|e| {
            warn!(blocks, %address, error = %e, "block generation failed");
            AppError::internal("Failed to mine blocks", e)
        })?;

    info!(blocks, %address, "mined blocks");
    Ok(Json(MineResponse {
        success: true,
        message: format!("Successfully mined {blocks} blocks to {address}"),
        blocks: hashes,
    }))
}
