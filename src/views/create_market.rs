//! Market creation form.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use time::macros::format_description;
use time::Date;
use tracing::{info, instrument, warn};

use crate::error::{AppError, ValidationError};
use crate::market::Category;
use crate::metrics;
use crate::notification::Notification;
use crate::submission::Submitter;

use super::{ActionOutcome, InFlight, Route};

/// Parse a `YYYY-MM-DD` resolution date.
pub fn parse_date(input: &str) -> Result<Date, ValidationError> {
    Date::parse(input.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| ValidationError::InvalidDate(input.to_string()))
}

/// Format a date as `YYYY-MM-DD`.
pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

/// Whether the date picker offers `date`. Past dates are not selectable.
pub fn is_date_selectable(date: Date, today: Date) -> bool {
    date >= today
}

/// A validated market proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketDraft {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub end_date: Date,
    pub initial_funding: Decimal,
}

/// Local creation form state.
#[derive(Debug, Clone, Default)]
pub struct CreateMarketForm {
    pub title: String,
    pub description: String,
    pub category: Option<Category>,
    pub end_date: Option<Date>,
    /// Funding as typed.
    pub initial_funding: String,
    submitting: InFlight,
}

impl CreateMarketForm {
    /// Empty form with `default_funding` prefilled.
    pub fn new(default_funding: Decimal) -> Self {
        Self {
            initial_funding: default_funding.normalize().to_string(),
            ..Self::default()
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.is_active()
    }

    /// Check the form and build a draft.
    ///
    /// Missing fields are reported together, before the date and funding checks.
    pub fn validate(&self, today: Date) -> Result<MarketDraft, ValidationError> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.description.trim().is_empty() {
            missing.push("description");
        }
        if self.category.is_none() {
            missing.push("category");
        }
        if self.end_date.is_none() {
            missing.push("end_date");
        }
        let (Some(category), Some(end_date)) = (self.category, self.end_date) else {
            return Err(ValidationError::MissingFields(missing));
        };
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        if !is_date_selectable(end_date, today) {
            return Err(ValidationError::DateInPast { date: end_date });
        }

        let initial_funding = Decimal::from_str(self.initial_funding.trim())
            .map_err(|_| ValidationError::InvalidFunding(self.initial_funding.clone()))?;

        Ok(MarketDraft {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            category,
            end_date,
            initial_funding,
        })
    }

    /// Submit the proposal. The market repository is left untouched.
    #[instrument(skip_all, fields(title = %self.title))]
    pub async fn submit(&self, today: Date, submitter: &dyn Submitter) -> Result<ActionOutcome, AppError> {
        let draft = self.validate(today).inspect_err(|e| warn!("Market draft rejected: {}", e))?;
        let _guard = self.submitting.begin()?;

        let receipt = submitter.create_market(&draft).await?;
        info!(reference = %receipt.reference, category = %draft.category, "Market created");
        metrics::inc_markets_created();

        Ok(ActionOutcome::redirect(
            Notification::info(
                "Market Created",
                "Your betting market has been created successfully!",
            ),
            &Route::Home,
        ))
    }
}

/// Rendered creation view: the choices and defaults the form offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateMarketView {
    pub categories: Vec<Category>,
    /// Earliest selectable resolution date (`YYYY-MM-DD`).
    pub earliest_end_date: String,
    pub default_initial_funding: Decimal,
    pub min_initial_funding: Decimal,
}

impl CreateMarketView {
    pub fn render(today: Date, default_initial_funding: Decimal, min_initial_funding: Decimal) -> Self {
        Self {
            categories: Category::all(),
            earliest_end_date: format_date(today),
            default_initial_funding,
            min_initial_funding,
        }
    }
}
