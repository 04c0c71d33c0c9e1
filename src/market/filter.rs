//! Free-text and category filtering of market listings.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

use super::types::{Category, Market};

/// Search query plus selected categories.
///
/// An empty query and an empty category set both mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketFilter {
    /// Case-insensitive substring matched against title and description.
    pub query: String,
    /// Selected categories.
    pub categories: BTreeSet<Category>,
}

impl MarketFilter {
    /// Create a filter from a query and a set of categories.
    pub fn new(query: impl Into<String>, categories: impl IntoIterator<Item = Category>) -> Self {
        Self {
            query: query.into(),
            categories: categories.into_iter().collect(),
        }
    }

    /// Replace the search query.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Add the category if absent, remove it if present.
    pub fn toggle_category(&mut self, category: Category) {
        if !self.categories.remove(&category) {
            self.categories.insert(category);
        }
    }

    /// Whether the category is currently selected.
    pub fn is_selected(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }

    /// Drop both constraints.
    pub fn clear(&mut self) {
        self.query.clear();
        self.categories.clear();
    }

    /// True when the filter passes every market through.
    pub fn is_unconstrained(&self) -> bool {
        self.query.is_empty() && self.categories.is_empty()
    }

    /// Check a single market against the filter.
    pub fn matches(&self, market: &Market) -> bool {
        self.matches_query(market) && self.matches_category(market)
    }

    fn matches_query(&self, market: &Market) -> bool {
        if self.query.is_empty() {
            return true;
        }
        let needle = self.query.to_lowercase();
        market.title.to_lowercase().contains(&needle)
            || market.description.to_lowercase().contains(&needle)
    }

    fn matches_category(&self, market: &Market) -> bool {
        self.categories.is_empty() || self.categories.contains(&market.category)
    }

    /// Keep the matching markets, preserving their order.
    pub fn apply<'a, I>(&self, markets: I) -> Vec<Market>
    where
        I: IntoIterator<Item = &'a Market>,
    {
        markets
            .into_iter()
            .filter(|m| self.matches(m))
            .cloned()
            .collect()
    }
}

/// Filter `markets` by `query` and `categories`.
pub fn filter_markets(markets: &[Market], query: &str, categories: &BTreeSet<Category>) -> Vec<Market> {
    MarketFilter {
        query: query.to_string(),
        categories: categories.clone(),
    }
    .apply(markets)
}

/// Parse a comma-separated category list ("crypto,Sports"). Blank entries are ignored.
pub fn parse_categories(input: &str) -> Result<BTreeSet<Category>, ValidationError> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Category::from_str(s).map_err(|_| ValidationError::UnknownCategory(s.to_string())))
        .collect()
}
