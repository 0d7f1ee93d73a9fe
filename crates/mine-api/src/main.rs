mod cli;
mod server;

use std::sync::Arc;

use bitcoin::Network;
use clap::Parser;
use eyre::{eyre, WrapErr};

use mine_api_core::rpc::{BitcoinRpc, HttpRpcClient};
use mine_api_core::WalletIdGenerator;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    let (api_token, generated) = match args.api_token.as_deref() {
        Some("") => return Err(eyre!("--api-token must not be empty")),
        Some(token) => (token.to_owned(), false),
        None => {
            use rand::Rng;
            let bytes: [u8; 16] = rand::thread_rng().r#gen();
            (hex_encode(bytes), true)
        }
    };

    let rpc_url = args.rpc_url();
    let rpc: Arc<dyn BitcoinRpc> = Arc::new(
        HttpRpcClient::new(
            &rpc_url,
            args.rpc_user.as_deref(),
            args.rpc_pass.as_deref(),
            args.rpc_cookie_file.as_deref(),
            args.rpc_requests_per_second,
        )
        .context("configure Bitcoin Core RPC client")?,
    );

    // An unreachable node is reported but does not stop the server.
    match rpc.get_blockchain_info().await {
        Ok(chain_info) => {
            tracing::info!(
                chain = %chain_info.chain,
                blocks = chain_info.blocks,
                best_block = %chain_info.best_block_hash,
                "connected to Bitcoin Core"
            );
            match map_chain_to_network(&chain_info.chain) {
                Some(network) if network != args.network => tracing::warn!(
                    node = %network,
                    configured = %args.network,
                    "node network differs from --network; address validation uses --network"
                ),
                Some(_) => {}
                None => tracing::warn!(chain = %chain_info.chain, "unrecognized chain name"),
            }
        }
        Err(err) => {
            let message = format_rpc_connect_error(&rpc_url, &err.to_string());
            tracing::error!("{message}");
        }
    }

    let state = server::AppState {
        rpc,
        api_token: api_token.clone(),
        network: args.network,
        wallet_ids: WalletIdGenerator::new(),
    };
    let router = server::build_router(state);

    let bind_addr = format!("{}:{}", args.bind, args.port);
    if args.bind == "0.0.0.0" {
        tracing::warn!("server is bound to 0.0.0.0 and is accessible from the network");
    }

    println!();
    println!("  mine-api is running:");
    println!("    URL:       http://{bind_addr}/api");
    println!("    Network:   {}", args.network);
    if generated {
        println!("    API token: {api_token}");
    }
    println!();

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .context("bind TCP listener")?;

    tracing::info!("listening on {bind_addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("run HTTP server")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

/// Tiny hex-encoding helper to avoid adding a `hex` crate dependency.
fn hex_encode(bytes: impl AsRef<[u8]>) -> String {
    bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
}

fn format_rpc_connect_error(rpc_url: &str, source_error: &str) -> String {
    let mut lines = vec![
        format!("could not reach Bitcoin Core RPC at `{rpc_url}`"),
        format!("RPC error: {source_error}"),
    ];

    if source_error.contains("Could not resolve host") || source_error.contains("dns error") {
        lines.push(
            "hint: hostname resolution failed; verify BITCOIND_HOST and your DNS/network".into(),
        );
    } else if source_error.contains("Connection refused") || source_error.contains("connect") {
        lines.push(
            "hint: nothing is listening; verify bitcoind is running with -regtest and -server"
                .into(),
        );
    } else if source_error.contains("401") || source_error.contains("403") {
        lines.push(
            "hint: authentication failed; verify --rpc-user/--rpc-pass or --rpc-cookie-file"
                .into(),
        );
    } else if source_error.contains("404") {
        lines.push("hint: endpoint path is invalid; verify the RPC host and port".into());
    }

    lines.join("\n")
}

fn map_chain_to_network(chain: &str) -> Option<Network> {
    match chain {
        "main" => Some(Network::Bitcoin),
        "test" => Some(Network::Testnet),
        "signet" => Some(Network::Signet),
        "regtest" => Some(Network::Regtest),
        _ => None,
    }
}
