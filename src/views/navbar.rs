//! Top navigation bar.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::auth::Session;
use crate::utils::{format_amount, short_address};
use crate::wallet::{WalletState, WalletStatus};

use super::Route;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub label: &'static str,
    pub href: String,
}

/// Wallet affordance in the navbar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WalletBadge {
    /// "Connect Wallet" button.
    Connect { label: &'static str },
    /// Connect in progress.
    Connecting,
    /// Shortened address and balance.
    Connected {
        address: String,
        short_address: String,
        balance: Decimal,
        balance_display: String,
    },
}

impl From<&WalletState> for WalletBadge {
    fn from(state: &WalletState) -> Self {
        match (state.status, state.address.as_deref()) {
            (WalletStatus::Connected, Some(address)) => WalletBadge::Connected {
                address: address.to_string(),
                short_address: short_address(address),
                balance: state.balance,
                balance_display: format!("{} WVTK", format_amount(state.balance)),
            },
            (WalletStatus::Connecting, _) => WalletBadge::Connecting,
            _ => WalletBadge::Connect {
                label: "Connect Wallet",
            },
        }
    }
}

/// Session affordance in the navbar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccountBadge {
    SignIn { href: String },
    SignedIn { email: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavbarView {
    pub links: Vec<NavLink>,
    pub wallet: WalletBadge,
    pub account: AccountBadge,
}

impl NavbarView {
    pub fn render(session: Option<&Session>, wallet: &WalletState) -> Self {
        let links = [("Markets", Route::Home), ("Create", Route::Create), ("Profile", Route::Profile)]
            .into_iter()
            .map(|(label, route)| NavLink {
                label,
                href: route.path(),
            })
            .collect();

        let account = match session {
            Some(s) => AccountBadge::SignedIn {
                email: s.email.clone(),
            },
            None => AccountBadge::SignIn {
                href: Route::Auth.path(),
            },
        };

        Self {
            links,
            wallet: wallet.into(),
            account,
        }
    }
}
