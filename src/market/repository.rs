//! Market and position repository.

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use crate::error::MarketError;
use crate::trading::Position;

use super::catalog::{seed_markets, seed_positions};
use super::types::Market;

/// Read access to markets and user holdings.
#[async_trait]
pub trait MarketRepository: Send + Sync {
    /// All listed markets in display order.
    async fn list_markets(&self) -> Result<Vec<Market>, MarketError>;

    /// A single market, or `None` if the id is unknown.
    async fn get_market(&self, id: &str) -> Result<Option<Market>, MarketError>;

    /// Positions held by a user.
    async fn list_positions(&self, user_id: &str) -> Result<Vec<Position>, MarketError>;
}

/// Repository backed by process memory.
///
/// Users without explicitly assigned holdings see the default holdings.
#[derive(Debug)]
pub struct InMemoryMarketRepository {
    markets: Vec<Market>,
    positions: DashMap<String, Vec<Position>>,
    default_positions: Vec<Position>,
}

impl InMemoryMarketRepository {
    /// Create a repository over the given markets with no holdings.
    pub fn new(markets: Vec<Market>) -> Self {
        Self {
            markets,
            positions: DashMap::new(),
            default_positions: Vec::new(),
        }
    }

    /// Repository with the featured markets and demo holdings.
    pub fn seeded() -> Self {
        Self {
            markets: seed_markets(),
            positions: DashMap::new(),
            default_positions: seed_positions(),
        }
    }

    /// Assign holdings to a specific user.
    pub fn set_positions(&self, user_id: impl Into<String>, positions: Vec<Position>) {
        self.positions.insert(user_id.into(), positions);
    }
}

impl Default for InMemoryMarketRepository {
    fn default() -> Self {
        Self::seeded()
    }
}

#[async_trait]
impl MarketRepository for InMemoryMarketRepository {
    async fn list_markets(&self) -> Result<Vec<Market>, MarketError> {
        Ok(self.markets.clone())
    }

    async fn get_market(&self, id: &str) -> Result<Option<Market>, MarketError> {
        let market = self.markets.iter().find(|m| m.id == id).cloned();
        if market.is_none() {
            debug!(market = %id, "Market not in repository");
        }
        Ok(market)
    }

    async fn list_positions(&self, user_id: &str) -> Result<Vec<Position>, MarketError> {
        Ok(self
            .positions
            .get(user_id)
            .map(|p| p.value().clone())
            .unwrap_or_else(|| self.default_positions.clone()))
    }
}
