//! Market module for binary prediction markets.
//!
//! This module handles:
//! - Market types and display helpers
//! - Search and category filtering
//! - The market/position repository and its seed data

pub mod catalog;
pub mod filter;
pub mod repository;
pub mod types;

pub use filter::{filter_markets, parse_categories, MarketFilter};
pub use repository::{InMemoryMarketRepository, MarketRepository};
pub use types::{Category, CategoryTone, Market, Side, TimeLeft};
