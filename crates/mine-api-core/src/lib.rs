pub mod amount;
pub mod api;
pub mod client;
pub mod error;
pub mod resolve;
pub mod rpc;
pub mod wallet;

pub use error::{CoreError, RpcError};
pub use resolve::{resolve_wallet, WalletResolution};
pub use wallet::WalletIdGenerator;
