//! User positions and portfolio totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::market::{Market, Side};

use super::bet::potential_return;

/// A user's stake on one side of a market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Market the stake is on.
    pub market_id: String,
    /// Side held.
    pub side: Side,
    /// Stake in WVTK.
    pub amount: Decimal,
}

impl Position {
    /// Create a position.
    pub fn new(market_id: impl Into<String>, side: Side, amount: Decimal) -> Self {
        Self {
            market_id: market_id.into(),
            side,
            amount,
        }
    }

    /// Percentage of the held side in `market`.
    pub fn entry_percentage(&self, market: &Market) -> Decimal {
        market.percentage(self.side)
    }

    /// Payout if the held side wins at the market's current percentage.
    pub fn potential_payout(&self, market: &Market) -> Option<Decimal> {
        potential_return(self.amount, self.entry_percentage(market), self.side).ok()
    }
}

/// Aggregate numbers shown on the profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortfolioSummary {
    /// Number of positions.
    pub total_bets: usize,
    /// Sum of stakes.
    pub total_staked: Decimal,
    /// Positions on YES.
    pub yes_positions: usize,
    /// Positions on NO.
    pub no_positions: usize,
}

impl PortfolioSummary {
    /// Summarize a list of positions.
    pub fn from_positions(positions: &[Position]) -> Self {
        positions.iter().fold(Self::default(), |mut acc, p| {
            acc.total_bets += 1;
            acc.total_staked += p.amount;
            match p.side {
                Side::Yes => acc.yes_positions += 1,
                Side::No => acc.no_positions += 1,
            }
            acc
        })
    }
}
