//! Wallet connection adapter.
//!
//! Owns the [`WalletState`] for the app. Connecting requires a session, a wallet
//! provider, the target chain (added to the wallet if it is unknown) and at least one
//! account. The resulting `{address, balance}` is persisted per user so the wallet
//! can be restored on the next load without another provider round trip.

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use alloy::primitives::Address;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::auth::Session;
use crate::error::{ProviderError, WalletError};
use crate::metrics;
use crate::observe::Observable;

use super::provider::{ChainParams, WalletProvider};
use super::store::{WalletRecord, WalletStore};

/// Connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// What views know about the wallet.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WalletState {
    /// Lifecycle status.
    pub status: WalletStatus,
    /// Connected address.
    pub address: Option<String>,
    /// Balance in WVTK.
    pub balance: Decimal,
}

impl WalletState {
    /// The initial, disconnected state.
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// A connected wallet.
    pub fn connected(address: impl Into<String>, balance: Decimal) -> Self {
        Self {
            status: WalletStatus::Connected,
            address: Some(address.into()),
            balance,
        }
    }

    /// Whether the wallet is connected.
    pub fn is_connected(&self) -> bool {
        self.status == WalletStatus::Connected
    }
}

/// Check that a provider account is a 20-byte hex address.
pub fn parse_address(account: &str) -> Result<String, WalletError> {
    let trimmed = account.trim();
    Address::from_str(trimmed).map_err(|_| WalletError::InvalidAddress(account.to_string()))?;
    Ok(trimmed.to_string())
}

/// Wallet connection adapter.
pub struct WalletConnection {
    provider: Option<Arc<dyn WalletProvider>>,
    store: Arc<dyn WalletStore>,
    chain: ChainParams,
    initial_balance: Decimal,
    state: Observable<WalletState>,
    /// Bumped by every connect, restore and disconnect. A pending result only
    /// lands if no other transition started after it.
    generation: AtomicU64,
}

impl std::fmt::Debug for WalletConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletConnection")
            .field("has_provider", &self.provider.is_some())
            .field("chain", &self.chain.chain_id)
            .field("state", &self.state.get())
            .finish_non_exhaustive()
    }
}

impl WalletConnection {
    /// Create a disconnected adapter. `provider` is `None` when no wallet is installed.
    pub fn new(
        provider: Option<Arc<dyn WalletProvider>>,
        store: Arc<dyn WalletStore>,
        chain: ChainParams,
        initial_balance: Decimal,
    ) -> Self {
        Self {
            provider,
            store,
            chain,
            initial_balance,
            state: Observable::new(WalletState::disconnected()),
            generation: AtomicU64::new(0),
        }
    }

    /// Snapshot of the wallet state.
    pub fn current(&self) -> WalletState {
        self.state.get()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<WalletState> {
        self.state.subscribe()
    }

    /// Target network.
    pub fn chain(&self) -> &ChainParams {
        &self.chain
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Publish `state` unless a newer transition has started since `generation`.
    fn commit(&self, generation: u64, state: WalletState) -> bool {
        self.state.update_if(|s| {
            if !self.is_current(generation) {
                return false;
            }
            *s = state;
            true
        })
    }

    /// Connect the wallet for the signed-in user.
    ///
    /// On failure the previous state is restored and the cause returned. If the
    /// wallet is disconnected or restored for another session while the provider
    /// is still answering, the result is dropped with [`WalletError::Superseded`].
    #[instrument(skip(self, session), fields(chain_id = %self.chain.chain_id))]
    pub async fn connect(&self, session: Option<&Session>) -> Result<WalletState, WalletError> {
        let Some(session) = session else {
            warn!("Wallet connect attempted without a session");
            metrics::inc_wallet_connect_failures("no_session");
            return Err(WalletError::NotAuthenticated);
        };
        let Some(provider) = self.provider.clone() else {
            warn!("Wallet connect attempted without a provider");
            metrics::inc_wallet_connect_failures("no_provider");
            return Err(WalletError::ProviderUnavailable);
        };

        let mut previous = WalletState::disconnected();
        let mut generation = 0;
        let started = self.state.update_if(|s| {
            if s.status == WalletStatus::Connecting {
                return false;
            }
            previous = s.clone();
            generation = self.next_generation();
            s.status = WalletStatus::Connecting;
            true
        });
        if !started {
            return Err(WalletError::AlreadyConnecting);
        }

        let result = match self.establish(provider.as_ref(), session, generation).await {
            Ok(state) if self.commit(generation, state.clone()) => Ok(state),
            Ok(_) => Err(WalletError::Superseded),
            Err(e) => {
                self.commit(generation, previous);
                Err(e)
            }
        };

        match &result {
            Ok(state) => {
                info!(user = %session.user_id, address = ?state.address, "Wallet connected");
                metrics::inc_wallet_connects();
            }
            Err(WalletError::Superseded) => {
                info!(user = %session.user_id, "Wallet connect superseded, result dropped");
                metrics::inc_wallet_connect_failures("superseded");
            }
            Err(e) => {
                warn!(user = %session.user_id, "Wallet connect failed: {}", e);
                metrics::inc_wallet_connect_failures("provider");
            }
        }
        result
    }

    async fn establish(
        &self,
        provider: &dyn WalletProvider,
        session: &Session,
        generation: u64,
    ) -> Result<WalletState, WalletError> {
        match provider.switch_chain(&self.chain.chain_id).await {
            Ok(()) => {}
            Err(ProviderError::UnknownChain { .. }) => {
                info!(chain = %self.chain.chain_name, "Chain unknown to wallet, adding it");
                provider.add_chain(&self.chain).await?;
            }
            Err(e) => return Err(e.into()),
        }

        let accounts = provider.request_accounts().await?;
        let account = accounts.first().ok_or(WalletError::NoAccounts)?;
        let address = parse_address(account)?;

        // The session may be gone by now; never persist for it.
        if !self.is_current(generation) {
            return Err(WalletError::Superseded);
        }

        let record = WalletRecord {
            user_id: session.user_id.clone(),
            wallet_address: address.clone(),
            balance: self.initial_balance,
        };
        self.store.upsert(session, &record).await?;

        Ok(WalletState::connected(address, self.initial_balance))
    }

    /// Reset to disconnected. The stored record is kept for the next restore.
    pub fn disconnect(&self) {
        self.next_generation();
        if self.state.set(WalletState::disconnected()).is_connected() {
            info!("Wallet disconnected");
        }
    }

    /// Replace the wallet state with `session`'s stored record, without touching the provider.
    ///
    /// Whatever was connected before is dropped first, so one user never sees
    /// another user's wallet. A missing or invalid record leaves the wallet
    /// disconnected. Returns whether a record was restored.
    #[instrument(skip(self, session), fields(user = %session.user_id))]
    pub async fn restore(&self, session: &Session) -> Result<bool, WalletError> {
        let generation = self.next_generation();
        self.state.set(WalletState::disconnected());

        let Some(record) = self.store.fetch(session).await? else {
            return Ok(false);
        };
        if record.user_id != session.user_id {
            warn!(owner = %record.user_id, "Ignoring wallet record owned by another user");
            return Ok(false);
        }
        let address = match parse_address(&record.wallet_address) {
            Ok(address) => address,
            Err(e) => {
                warn!("Ignoring stored wallet record: {}", e);
                return Ok(false);
            }
        };

        if !self.commit(generation, WalletState::connected(address, record.balance)) {
            return Err(WalletError::Superseded);
        }
        info!(address = %record.wallet_address, "Wallet restored from store");
        Ok(true)
    }
}
