mod auth;
mod error;
mod mine;
mod params;
mod send;
mod wallet;

use std::sync::Arc;

use axum::routing::{any, get, post};
use axum::{middleware, Json, Router};
use tower_http::trace::TraceLayer;

use mine_api_core::rpc::BitcoinRpc;
use mine_api_core::WalletIdGenerator;

// ==============================================================================
// Application State
// ==============================================================================

pub struct AppState {
    pub rpc: Arc<dyn BitcoinRpc>,
    pub api_token: String,
    pub network: bitcoin::Network,
    pub wallet_ids: WalletIdGenerator,
}

type SharedState = Arc<AppState>;

// ==============================================================================
// Router
// ==============================================================================

pub fn build_router(state: AppState) -> Router {
    let shared = Arc::new(state);

    let public_api = Router::new().route("/api/health", get(health));

    // Unknown /api paths also require the token.
    let protected_api = Router::new()
        .route("/api/wallet/create", post(wallet::create_wallet))
        .route("/api/wallet", post(wallet::get_wallet))
        .route("/api/mine", post(mine::mine_blocks))
        .route("/api/send", post(send::send_bitcoin))
        .route("/api", any(api_not_found))
        .route("/api/{*path}", any(api_not_found))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&shared),
            auth::require_bearer,
        ));

    Router::new()
        .merge(public_api)
        .merge(protected_api)
        .fallback(api_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn api_not_found() -> error::AppError {
    error::AppError::not_found("Not found", "API route not found")
}
