//! View models and their controllers.
//!
//! Each view owns its local form state and renders a serializable view model.
//! Views read the auth and wallet adapters but never mutate them directly.

pub mod auth_page;
pub mod create_market;
pub mod market_detail;
pub mod market_list;
pub mod navbar;
pub mod profile;
pub mod router;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

use crate::error::ValidationError;
use crate::market::{Category, CategoryTone, Market};
use crate::notification::Notification;
use crate::utils::format_amount;

pub use auth_page::{AuthForm, AuthMode, AuthView};
pub use create_market::{CreateMarketForm, CreateMarketView, MarketDraft};
pub use market_detail::{BetForm, MarketDetailView};
pub use market_list::{MarketListState, MarketListView};
pub use navbar::{NavbarView, WalletBadge};
pub use profile::{PositionRow, ProfileView};
pub use router::Route;

/// Result of a user action: a toast plus an optional navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    /// Toast to show.
    pub notification: Notification,
    /// Path to navigate to, if any.
    pub redirect: Option<String>,
}

impl ActionOutcome {
    /// Toast only.
    pub fn notify(notification: Notification) -> Self {
        Self {
            notification,
            redirect: None,
        }
    }

    /// Toast and navigate.
    pub fn redirect(notification: Notification, route: &Route) -> Self {
        Self {
            notification,
            redirect: Some(route.path()),
        }
    }
}

/// Flag raised while a form's submission is in flight.
#[derive(Debug, Clone, Default)]
pub struct InFlight(Arc<AtomicBool>);

impl InFlight {
    /// Whether a submission is running.
    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Raise the flag; it drops back when the guard is dropped.
    pub fn begin(&self) -> Result<InFlightGuard, ValidationError> {
        self.0
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| ValidationError::AlreadySubmitting)?;
        Ok(InFlightGuard(self.0.clone()))
    }
}

/// Clears the in-flight flag on drop.
#[derive(Debug)]
pub struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Card shown in listings and on the profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketCard {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub tone: CategoryTone,
    pub participants: u64,
    pub liquidity: Decimal,
    /// Liquidity with separators and unit ("24,500 WVTK").
    pub liquidity_display: String,
    pub yes_percentage: Decimal,
    pub no_percentage: Decimal,
    /// "N days left" or "Ending soon".
    pub days_left: String,
    /// Detail route for this market.
    pub link: String,
}

impl MarketCard {
    /// Build the card for `market` as of `now`.
    pub fn new(market: &Market, now: OffsetDateTime) -> Self {
        Self {
            id: market.id.clone(),
            title: market.title.clone(),
            description: market.description.clone(),
            category: market.category,
            tone: market.category.tone(),
            participants: market.participants,
            liquidity: market.liquidity,
            liquidity_display: format!("{} WVTK", format_amount(market.liquidity)),
            yes_percentage: market.yes_percentage,
            no_percentage: market.no_percentage,
            days_left: market.days_left_label(now),
            link: Route::Market(market.id.clone()).path(),
        }
    }
}

/// Shown for unknown routes and unknown market ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotFoundView {
    pub title: String,
    pub message: String,
}

impl NotFoundView {
    /// Not-found view for an unknown market.
    pub fn market() -> Self {
        Self {
            title: "Market Not Found".to_string(),
            message: "The betting market you're looking for doesn't exist.".to_string(),
        }
    }

    /// Not-found view for an unknown path.
    pub fn page(path: &str) -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: format!("Nothing lives at {path}."),
        }
    }
}

/// A rendered route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum Page {
    MarketList(MarketListView),
    MarketDetail(MarketDetailView),
    CreateMarket(CreateMarketView),
    Profile(ProfileView),
    Auth(AuthView),
    NotFound(NotFoundView),
    Redirect { to: String },
}

impl Page {
    /// Redirect to `route`.
    pub fn redirect(route: &Route) -> Self {
        Page::Redirect { to: route.path() }
    }

    /// Whether this is a not-found page.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Page::NotFound(_))
    }
}
