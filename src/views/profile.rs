//! Profile view: account, wallet and holdings of the signed-in user.

use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::warn;

use crate::auth::Session;
use crate::market::{Market, Side};
use crate::trading::{PortfolioSummary, Position};
use crate::utils::{format_amount, short_address};
use crate::wallet::WalletState;

use super::MarketCard;

/// Shown when the user holds no positions at all.
pub const NO_POSITIONS_MESSAGE: &str = "You don't have any active bets yet.";

/// Shown on the past-bets tab.
pub const NO_PAST_BETS_MESSAGE: &str = "You don't have any past bets yet.";

/// Shown on the created-markets tab.
pub const NO_CREATED_MARKETS_MESSAGE: &str = "You haven't created any markets yet.";

/// One holding, joined with its market.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionRow {
    pub market: MarketCard,
    pub side: Side,
    pub amount: Decimal,
    /// Current percentage of the held side.
    pub percentage: Decimal,
    /// "150 WVTK at 68%".
    pub label: String,
    /// Payout if the held side wins; absent for a 0% side.
    pub potential_payout: Option<Decimal>,
    pub link: String,
}

impl PositionRow {
    /// Join `position` with its `market`.
    pub fn new(position: &Position, market: &Market, now: OffsetDateTime) -> Self {
        let percentage = position.entry_percentage(market);
        let card = MarketCard::new(market, now);
        Self {
            link: card.link.clone(),
            market: card,
            side: position.side,
            amount: position.amount,
            percentage,
            label: format!(
                "{} WVTK at {}%",
                format_amount(position.amount),
                percentage.normalize()
            ),
            potential_payout: position.potential_payout(market),
        }
    }
}

/// Join positions with markets in position order, skipping positions on unknown markets.
pub fn position_rows(positions: &[Position], markets: &[Market], now: OffsetDateTime) -> Vec<PositionRow> {
    positions
        .iter()
        .filter_map(|position| {
            let market = markets.iter().find(|m| m.id == position.market_id);
            if market.is_none() {
                warn!(market = %position.market_id, "Skipping position on unknown market");
            }
            market.map(|m| PositionRow::new(position, m, now))
        })
        .collect()
}

/// Wallet panel on the profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletPanel {
    #[serde(flatten)]
    pub state: WalletState,
    pub short_address: Option<String>,
    /// "1,000 WVTK".
    pub balance_display: String,
}

impl From<WalletState> for WalletPanel {
    fn from(state: WalletState) -> Self {
        Self {
            short_address: state.address.as_deref().map(short_address),
            balance_display: format!("{} WVTK", format_amount(state.balance)),
            state,
        }
    }
}

/// A profile tab with no rows.
///
/// Markets never resolve and created markets are not persisted, so these tabs
/// only ever show their empty state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryPanel {
    pub title: &'static str,
    pub empty_message: &'static str,
}

impl HistoryPanel {
    pub fn past_bets() -> Self {
        Self {
            title: "Past Bets",
            empty_message: NO_PAST_BETS_MESSAGE,
        }
    }

    pub fn created_markets() -> Self {
        Self {
            title: "Created Markets",
            empty_message: NO_CREATED_MARKETS_MESSAGE,
        }
    }
}

/// Rendered profile view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileView {
    pub email: String,
    pub wallet: WalletPanel,
    pub summary: PortfolioSummary,
    /// Winnings from resolved markets. Zero until markets can resolve.
    pub total_won: Decimal,
    /// Active bets.
    pub positions: Vec<PositionRow>,
    pub empty_message: Option<String>,
    pub past_bets: HistoryPanel,
    pub created_markets: HistoryPanel,
}

impl ProfileView {
    /// Render the profile for `session`.
    pub fn render(
        session: &Session,
        wallet: WalletState,
        positions: &[Position],
        markets: &[Market],
        now: OffsetDateTime,
    ) -> Self {
        let rows = position_rows(positions, markets, now);
        Self {
            email: session.email.clone(),
            wallet: wallet.into(),
            summary: PortfolioSummary::from_positions(positions),
            total_won: Decimal::ZERO,
            empty_message: rows.is_empty().then(|| NO_POSITIONS_MESSAGE.to_string()),
            positions: rows,
            past_bets: HistoryPanel::past_bets(),
            created_markets: HistoryPanel::created_markets(),
        }
    }
}
