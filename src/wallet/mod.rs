//! Wallet connection against an external wallet provider.
//!
//! This module handles:
//! - The wallet provider interface (scriptable mock and JSON-RPC bridge)
//! - The durable wallet-record store (in-memory and hosted REST)
//! - The connection adapter that owns the wallet state

pub mod connection;
pub mod provider;
pub mod store;

pub use connection::{parse_address, WalletConnection, WalletState, WalletStatus};
pub use provider::{ChainParams, MockWalletProvider, RpcWalletProvider, WalletProvider};
pub use store::{InMemoryWalletStore, RestWalletStore, WalletRecord, WalletStore};
