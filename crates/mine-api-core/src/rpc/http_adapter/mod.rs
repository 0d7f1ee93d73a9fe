//! Native JSON-RPC client for Bitcoin Core compatible endpoints.
//!
//! Implements [`BitcoinRpc`](super::BitcoinRpc) over JSON-RPC using
//! `reqwest`, with basic/cookie auth, wallet-scoped endpoints, and optional
//! request rate limiting.

mod client;
mod connection;
mod parsing;
mod protocol;

pub use client::HttpRpcClient;
