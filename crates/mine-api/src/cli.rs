use std::path::PathBuf;

use bitcoin::Network;
use clap::Parser;

/// Bearer-token HTTP gateway for wallet and mining operations on
/// a Bitcoin regtest node.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Bitcoin Core RPC host. A full `http(s)://` URL is also accepted, in
    /// which case `--rpc-port` is ignored.
    #[arg(long, default_value = "127.0.0.1", env = "BITCOIND_HOST")]
    pub rpc_host: String,

    /// Bitcoin Core RPC port.
    #[arg(long, default_value = "18443", env = "BITCOIND_PORT")]
    pub rpc_port: u16,

    /// RPC username.
    #[arg(long, env = "BITCOIND_RPCUSER")]
    pub rpc_user: Option<String>,

    /// RPC password.
    #[arg(long, env = "BITCOIND_RPCPASSWORD", hide_env_values = true)]
    pub rpc_pass: Option<String>,

    /// Bitcoin Core cookie file, used when user/password are not given.
    #[arg(long, env = "BITCOIND_RPCCOOKIEFILE")]
    pub rpc_cookie_file: Option<PathBuf>,

    /// Cap on outbound RPC requests per second (unlimited if omitted).
    #[arg(long, env = "MINE_API_RPC_RPS")]
    pub rpc_requests_per_second: Option<u32>,

    /// Bearer token required on every API request. A random token is
    /// generated and printed when omitted.
    #[arg(long, env = "MINE_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Address to bind the web server to.
    #[arg(long, default_value = "0.0.0.0", env = "MINE_API_BIND")]
    pub bind: String,

    /// Port to listen on.
    #[arg(long, default_value = "4000", env = "MINE_API_PORT")]
    pub port: u16,

    /// Network the node is expected to run, reported to API callers and
    /// used to validate destination addresses.
    #[arg(long, default_value = "regtest", env = "MINE_API_NETWORK")]
    pub network: Network,
}

impl Cli {
    pub fn rpc_url(&self) -> String {
        if self.rpc_host.contains("://") {
            self.rpc_host.clone()
        } else {
            format!("http://{}:{}", self.rpc_host, self.rpc_port)
        }
    }
}
