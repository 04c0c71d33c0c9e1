//! Wallet/chain provider interface (EIP-1193 style) and implementations.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashSet;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::error::ProviderError;

/// Network the wallet is asked to switch to, with the metadata needed to add it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainParams {
    /// Hex chain id, lowercase (e.g. "0xaa36a7").
    pub chain_id: String,
    /// Display name.
    pub chain_name: String,
    /// Native currency name.
    pub currency_name: String,
    /// Native currency symbol.
    pub currency_symbol: String,
    /// Native currency decimals.
    pub currency_decimals: u8,
    /// RPC endpoints.
    pub rpc_urls: Vec<String>,
    /// Block explorers.
    pub block_explorer_urls: Vec<String>,
}

impl ChainParams {
    /// `wallet_addEthereumChain` parameter object.
    pub fn add_chain_request(&self) -> Value {
        json!({
            "chainId": self.chain_id,
            "chainName": self.chain_name,
            "nativeCurrency": {
                "name": self.currency_name,
                "symbol": self.currency_symbol,
                "decimals": self.currency_decimals,
            },
            "rpcUrls": self.rpc_urls,
            "blockExplorerUrls": self.block_explorer_urls,
        })
    }
}

/// Browser-wallet style provider.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Switch the active network. Fails with `UnknownChain` if the wallet lacks it.
    async fn switch_chain(&self, chain_id: &str) -> Result<(), ProviderError>;

    /// Register a network with the wallet.
    async fn add_chain(&self, params: &ChainParams) -> Result<(), ProviderError>;

    /// Ask the user for account access.
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError>;
}

/// Scriptable provider for tests and local runs.
#[derive(Debug, Default)]
pub struct MockWalletProvider {
    known_chains: DashSet<String>,
    accounts: Vec<String>,
    reject_switch: Option<ProviderError>,
    reject_add: Option<ProviderError>,
    reject_accounts: Option<ProviderError>,
    /// Latency before every switch request is answered.
    switch_delay: Duration,
    switch_calls: AtomicUsize,
    add_calls: AtomicUsize,
    account_calls: AtomicUsize,
}

impl MockWalletProvider {
    /// Provider exposing `accounts`, knowing no chains yet.
    pub fn new(accounts: Vec<String>) -> Self {
        Self {
            accounts,
            ..Self::default()
        }
    }

    /// Mark a chain as already known to the wallet.
    pub fn with_known_chain(self, chain_id: &str) -> Self {
        self.known_chains.insert(chain_id.to_lowercase());
        self
    }

    /// Fail every switch request with `err`.
    pub fn rejecting_switch(mut self, err: ProviderError) -> Self {
        self.reject_switch = Some(err);
        self
    }

    /// Fail every add-chain request with `err`.
    pub fn rejecting_add(mut self, err: ProviderError) -> Self {
        self.reject_add = Some(err);
        self
    }

    /// Fail every account request with `err`.
    pub fn rejecting_accounts(mut self, err: ProviderError) -> Self {
        self.reject_accounts = Some(err);
        self
    }

    /// Answer switch requests only after `delay`, like a wallet waiting on its user.
    pub fn with_switch_delay(mut self, delay: Duration) -> Self {
        self.switch_delay = delay;
        self
    }

    /// Total requests received, of any kind.
    pub fn total_calls(&self) -> usize {
        self.switch_calls() + self.add_calls() + self.account_calls.load(Ordering::SeqCst)
    }

    /// Switch requests received.
    pub fn switch_calls(&self) -> usize {
        self.switch_calls.load(Ordering::SeqCst)
    }

    /// Add-chain requests received.
    pub fn add_calls(&self) -> usize {
        self.add_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletProvider for MockWalletProvider {
    async fn switch_chain(&self, chain_id: &str) -> Result<(), ProviderError> {
        self.switch_calls.fetch_add(1, Ordering::SeqCst);
        if !self.switch_delay.is_zero() {
            tokio::time::sleep(self.switch_delay).await;
        }
        if let Some(err) = &self.reject_switch {
            return Err(err.clone());
        }
        if !self.known_chains.contains(&chain_id.to_lowercase()) {
            return Err(ProviderError::UnknownChain {
                chain_id: chain_id.to_string(),
            });
        }
        Ok(())
    }

    async fn add_chain(&self, params: &ChainParams) -> Result<(), ProviderError> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.reject_add {
            return Err(err.clone());
        }
        self.known_chains.insert(params.chain_id.to_lowercase());
        Ok(())
    }

    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        self.account_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.reject_accounts {
            return Err(err.clone());
        }
        Ok(self.accounts.clone())
    }
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorObject>,
}

/// Provider reached over a JSON-RPC 2.0 wallet bridge.
#[derive(Debug)]
pub struct RpcWalletProvider {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl RpcWalletProvider {
    /// Create a provider posting requests to `url`.
    pub fn new(url: impl Into<String>, timeout: std::time::Duration) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    #[instrument(skip(self, params))]
    async fn call(&self, method: &str, params: Value, chain_id: &str) -> Result<Value, ProviderError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let body = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let rpc: RpcResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if let Some(err) = rpc.error {
            debug!(code = err.code, "Wallet RPC error: {}", err.message);
            return Err(ProviderError::from_code(err.code, err.message, chain_id));
        }
        Ok(rpc.result.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl WalletProvider for RpcWalletProvider {
    async fn switch_chain(&self, chain_id: &str) -> Result<(), ProviderError> {
        self.call(
            "wallet_switchEthereumChain",
            json!([{ "chainId": chain_id }]),
            chain_id,
        )
        .await
        .map(|_| ())
    }

    async fn add_chain(&self, params: &ChainParams) -> Result<(), ProviderError> {
        self.call(
            "wallet_addEthereumChain",
            json!([params.add_chain_request()]),
            &params.chain_id,
        )
        .await
        .map(|_| ())
    }

    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        let result = self.call("eth_requestAccounts", json!([]), "").await?;
        serde_json::from_value(result).map_err(|e| ProviderError::Transport(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};
    use tokio::net::TcpListener;

    fn sepolia() -> ChainParams {
        crate::config::Config::default().chain_params()
    }

    #[test]
    fn add_chain_request_uses_eip3085_names() {
        let req = sepolia().add_chain_request();
        assert_eq!(req["chainId"], "0xaa36a7");
        assert_eq!(req["nativeCurrency"]["symbol"], "SEP");
        assert_eq!(req["rpcUrls"][0], "https://sepolia.infura.io/v3/");
    }

    #[tokio::test]
    async fn mock_reports_unknown_chain_until_added() {
        let provider = MockWalletProvider::new(vec![]);
        assert!(matches!(
            provider.switch_chain("0xaa36a7").await,
            Err(ProviderError::UnknownChain { .. })
        ));
        provider.add_chain(&sepolia()).await.unwrap();
        assert!(provider.switch_chain("0xAA36A7").await.is_ok());
        assert_eq!(provider.switch_calls(), 2);
        assert_eq!(provider.add_calls(), 1);
    }

    async fn rpc(Json(req): Json<Value>) -> Json<Value> {
        let id = req["id"].clone();
        let reply = match req["method"].as_str() {
            Some("wallet_switchEthereumChain") => json!({
                "jsonrpc": "2.0", "id": id,
                "error": { "code": 4902, "message": "Unrecognized chain ID" }
            }),
            Some("wallet_addEthereumChain") => json!({ "jsonrpc": "2.0", "id": id, "result": null }),
            Some("eth_requestAccounts") => json!({
                "jsonrpc": "2.0", "id": id,
                "result": ["0x52908400098527886E0F7030069857D2E4169EE7"]
            }),
            _ => json!({
                "jsonrpc": "2.0", "id": id,
                "error": { "code": 4200, "message": "Unsupported method" }
            }),
        };
        Json(reply)
    }

    #[tokio::test]
    async fn rpc_provider_maps_error_codes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, Router::new().route("/", post(rpc))).await.unwrap();
        });

        let provider = RpcWalletProvider::new(format!("http://{addr}/"), Duration::from_secs(5)).unwrap();
        assert_eq!(
            provider.switch_chain("0xaa36a7").await,
            Err(ProviderError::UnknownChain {
                chain_id: "0xaa36a7".to_string()
            })
        );
        assert!(provider.add_chain(&sepolia()).await.is_ok());
        assert_eq!(
            provider.request_accounts().await.unwrap(),
            vec!["0x52908400098527886E0F7030069857D2E4169EE7".to_string()]
        );
    }
}
