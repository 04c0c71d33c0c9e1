//! Trading module for bet quotes and user positions.
//!
//! This module handles:
//! - Stake parsing and potential-return quotes
//! - Position tracking and portfolio totals

pub mod bet;
pub mod position;

pub use bet::{parse_stake, potential_return, BetQuote, BetTicket};
pub use position::{PortfolioSummary, Position};
