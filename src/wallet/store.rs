//! Durable wallet-record store keyed by user id.

use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::Method;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::auth::Session;
use crate::backend::BackendClient;
use crate::error::WalletError;

/// A user's connected wallet as persisted by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletRecord {
    /// Owner.
    pub user_id: String,
    /// Chain address.
    pub wallet_address: String,
    /// Balance in WVTK.
    pub balance: Decimal,
}

/// Storage for wallet records. The session authorizes the call.
#[async_trait]
pub trait WalletStore: Send + Sync {
    /// Insert or replace the record for `record.user_id`.
    async fn upsert(&self, session: &Session, record: &WalletRecord) -> Result<(), WalletError>;

    /// Record for the session's user, if any.
    async fn fetch(&self, session: &Session) -> Result<Option<WalletRecord>, WalletError>;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct InMemoryWalletStore {
    records: DashMap<String, WalletRecord>,
}

impl InMemoryWalletStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl WalletStore for InMemoryWalletStore {
    async fn upsert(&self, _session: &Session, record: &WalletRecord) -> Result<(), WalletError> {
        self.records.insert(record.user_id.clone(), record.clone());
        Ok(())
    }

    async fn fetch(&self, session: &Session) -> Result<Option<WalletRecord>, WalletError> {
        Ok(self.records.get(&session.user_id).map(|r| r.value().clone()))
    }
}

/// Row shape selected from the `user_wallets` table.
#[derive(Debug, Deserialize)]
struct WalletRow {
    wallet_address: String,
    balance: Decimal,
}

/// Store backed by the hosted REST table `user_wallets`.
#[derive(Debug, Clone)]
pub struct RestWalletStore {
    client: BackendClient,
}

impl RestWalletStore {
    /// Table path relative to the backend base URL.
    pub const TABLE_PATH: &'static str = "rest/v1/user_wallets";

    /// Create a store over a backend client.
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WalletStore for RestWalletStore {
    #[instrument(skip(self, session, record), fields(user = %record.user_id))]
    async fn upsert(&self, session: &Session, record: &WalletRecord) -> Result<(), WalletError> {
        let url = self.client.url(Self::TABLE_PATH).map_err(WalletError::Store)?;
        let response = self
            .client
            .request(Method::POST, url, session.access_token.as_deref())
            .header("Prefer", "resolution=merge-duplicates")
            .json(record)
            .send()
            .await
            .map_err(|e| WalletError::Store(e.to_string()))?;

        if !response.status().is_success() {
            return Err(WalletError::Store(BackendClient::error_message(response).await));
        }
        Ok(())
    }

    #[instrument(skip(self, session), fields(user = %session.user_id))]
    async fn fetch(&self, session: &Session) -> Result<Option<WalletRecord>, WalletError> {
        let mut url = self.client.url(Self::TABLE_PATH).map_err(WalletError::Store)?;
        url.query_pairs_mut()
            .append_pair("user_id", &format!("eq.{}", session.user_id))
            .append_pair("select", "wallet_address,balance");

        let response = self
            .client
            .request(Method::GET, url, session.access_token.as_deref())
            .send()
            .await
            .map_err(|e| WalletError::Store(e.to_string()))?;

        if !response.status().is_success() {
            return Err(WalletError::Store(BackendClient::error_message(response).await));
        }

        let rows: Vec<WalletRow> = response
            .json()
            .await
            .map_err(|e| WalletError::Store(e.to_string()))?;

        Ok(rows.into_iter().next().map(|row| WalletRecord {
            user_id: session.user_id.clone(),
            wallet_address: row.wallet_address,
            balance: row.balance,
        }))
    }
}
