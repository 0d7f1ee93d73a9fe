//! Resolution of caller-supplied identifiers to node wallets.
//!
//! An identifier is either a wallet name or an address owned by some wallet.
//! Names are tried first; only when the node rejects the name do we fall
//! back to scanning every loaded wallet's addresses. Nothing is cached: each
//! resolution reflects the node's wallet list at the time of the call.

use tracing::debug;

use crate::error::CoreError;
use crate::rpc::{BitcoinRpc, WalletInfo};

/// Label under which `getnewaddress` files addresses by default.
pub const DEFAULT_LABEL: &str = "";

/// How an identifier was matched to a wallet.
#[derive(Debug, Clone, PartialEq)]
pub enum WalletResolution {
    /// The identifier is the name of a loaded wallet. The wallet info fetched
    /// while probing the name is kept so callers need not ask again.
    ByName { wallet: String, info: WalletInfo },
    /// The identifier is an address owned by `wallet`.
    ByAddress { wallet: String, address: String },
    NotFound,
}

impl WalletResolution {
    /// Name of the resolved wallet, if any.
    pub fn wallet(&self) -> Option<&str> {
        match self {
            Self::ByName { wallet, .. } | Self::ByAddress { wallet, .. } => Some(wallet),
            Self::NotFound => None,
        }
    }
}

/// Resolve `identifier` as a wallet name, then as an owned address.
///
/// A failed name probe is not an error: it just moves resolution on to the
/// address scan. Failures while listing wallets or their addresses are
/// returned to the caller. If an address somehow appears in several wallets,
/// the first wallet in node listing order wins.
pub async fn resolve_wallet(
    rpc: &dyn BitcoinRpc,
    identifier: &str,
) -> Result<WalletResolution, CoreError> {
    match rpc.get_wallet_info(identifier).await {
        Ok(info) => {
            debug!(wallet = identifier, "resolved wallet by name");
            return Ok(WalletResolution::ByName {
                wallet: identifier.to_owned(),
                info,
            });
        }
        Err(err) => {
            debug!(identifier, error = %err, "not a loaded wallet name; scanning addresses");
        }
    }

    let wallets = rpc.list_wallets().await?;
    for wallet in wallets {
        let addresses = rpc.get_addresses_by_label(&wallet, DEFAULT_LABEL).await?;
        if addresses.iter().any(|address| address == identifier) {
            debug!(wallet = %wallet, address = identifier, "resolved wallet by address");
            return Ok(WalletResolution::ByAddress {
                wallet,
                address: identifier.to_owned(),
            });
        }
    }

    debug!(identifier, "identifier matches no wallet name or address");
    Ok(WalletResolution::NotFound)
}
