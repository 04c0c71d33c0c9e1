//! Home view: searchable, category-filtered market listing.

use serde::Serialize;
use time::OffsetDateTime;

use crate::market::{Category, CategoryTone, Market, MarketFilter};

use super::MarketCard;

/// Shown when the filter leaves nothing.
pub const EMPTY_MESSAGE: &str = "No markets found matching your criteria.";

/// Local state of the listing: the search box and the category chips.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketListState {
    filter: MarketFilter,
}

impl MarketListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State with a pre-filled query and category selection.
    pub fn with_filter(filter: MarketFilter) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> &MarketFilter {
        &self.filter
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.filter.set_query(query);
    }

    pub fn toggle_category(&mut self, category: Category) {
        self.filter.toggle_category(category);
    }

    pub fn clear_filters(&mut self) {
        self.filter.clear();
    }

    /// Render the listing for `markets` as of `now`.
    pub fn render(&self, markets: &[Market], now: OffsetDateTime) -> MarketListView {
        let cards: Vec<MarketCard> = self
            .filter
            .apply(markets)
            .iter()
            .map(|m| MarketCard::new(m, now))
            .collect();

        MarketListView {
            query: self.filter.query.clone(),
            categories: Category::all()
                .into_iter()
                .map(|category| CategoryChip {
                    category,
                    tone: category.tone(),
                    selected: self.filter.is_selected(category),
                })
                .collect(),
            total: markets.len(),
            empty_message: cards.is_empty().then(|| EMPTY_MESSAGE.to_string()),
            markets: cards,
        }
    }
}

/// A category toggle in the filter bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryChip {
    pub category: Category,
    pub tone: CategoryTone,
    pub selected: bool,
}

/// Rendered home view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketListView {
    /// Current search text.
    pub query: String,
    /// Every category, with its selection flag.
    pub categories: Vec<CategoryChip>,
    /// Matching markets in listing order.
    pub markets: Vec<MarketCard>,
    /// Number of markets before filtering.
    pub total: usize,
    /// Set when no market matches.
    pub empty_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::catalog::seed_markets;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2024-06-01 00:00:00 UTC);

    #[test]
    fn unfiltered_lists_everything() {
        let view = MarketListState::new().render(&seed_markets(), NOW);
        assert_eq!(view.markets.len(), 6);
        assert_eq!(view.total, 6);
        assert!(view.empty_message.is_none());
        assert!(view.categories.iter().all(|c| !c.selected));
        assert_eq!(view.categories.len(), 6);
    }

    #[test]
    fn category_and_query_narrow_results() {
        let mut state = MarketListState::new();
        state.toggle_category(Category::Crypto);
        let view = state.render(&seed_markets(), NOW);
        let ids: Vec<_> = view.markets.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["1", "6"]);
        assert!(view
            .categories
            .iter()
            .any(|c| c.category == Category::Crypto && c.selected));

        state.set_query("ETHEREUM");
        let view = state.render(&seed_markets(), NOW);
        assert_eq!(view.markets.len(), 1);
        assert_eq!(view.markets[0].id, "6");
    }

    #[test]
    fn no_match_sets_empty_message() {
        let mut state = MarketListState::new();
        state.set_query("zzz-nothing");
        let view = state.render(&seed_markets(), NOW);
        assert!(view.markets.is_empty());
        assert_eq!(view.empty_message.as_deref(), Some(EMPTY_MESSAGE));

        state.clear_filters();
        assert!(state.filter().is_unconstrained());
    }
}
