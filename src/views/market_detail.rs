//! Market detail view and the bet form.

use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::error::{AppError, ValidationError};
use crate::market::{Market, Side};
use crate::metrics;
use crate::notification::Notification;
use crate::submission::Submitter;
use crate::trading::{parse_stake, BetQuote, BetTicket, Position};
use crate::utils::format_amount;

use super::profile::PositionRow;
use super::{ActionOutcome, InFlight, MarketCard};

/// Shown in "My Positions" when the user holds nothing in this market.
pub const NO_POSITIONS_MESSAGE: &str = "You don't have any positions in this market yet.";

/// Local bet form: stake text, chosen side and the submitting flag.
#[derive(Debug, Clone)]
pub struct BetForm {
    /// Stake as typed.
    pub amount: String,
    /// Chosen side.
    pub side: Side,
    submitting: InFlight,
}

impl Default for BetForm {
    fn default() -> Self {
        Self::new(Decimal::ONE_HUNDRED)
    }
}

impl BetForm {
    /// Form prefilled with `default_stake` on YES.
    pub fn new(default_stake: Decimal) -> Self {
        Self {
            amount: default_stake.normalize().to_string(),
            side: Side::Yes,
            submitting: InFlight::default(),
        }
    }

    /// Form with an explicit amount and side.
    pub fn with(amount: impl Into<String>, side: Side) -> Self {
        Self {
            amount: amount.into(),
            side,
            submitting: InFlight::default(),
        }
    }

    pub fn set_amount(&mut self, amount: impl Into<String>) {
        self.amount = amount.into();
    }

    pub fn set_side(&mut self, side: Side) {
        self.side = side;
    }

    /// Whether a placement is in flight.
    pub fn is_submitting(&self) -> bool {
        self.submitting.is_active()
    }

    /// Validate the form against `market` and quote it.
    pub fn validate(&self, market: &Market) -> Result<BetQuote, ValidationError> {
        let stake = parse_stake(&self.amount)?;
        BetQuote::new(market, self.side, stake)
    }

    /// Quote for display; absent while the input is invalid or the side is unavailable.
    pub fn quote(&self, market: &Market) -> Option<BetQuote> {
        self.validate(market).ok()
    }

    /// Place the bet through `submitter`.
    ///
    /// Nothing is debited and no market or position changes.
    #[instrument(skip(self, market, submitter), fields(market = %market.id, side = %self.side))]
    pub async fn place(
        &self,
        market: &Market,
        submitter: &dyn Submitter,
    ) -> Result<ActionOutcome, AppError> {
        let quote = match self.validate(market) {
            Ok(quote) => quote,
            Err(e) => {
                warn!("Bet rejected: {}", e);
                metrics::inc_bets_rejected();
                return Err(e.into());
            }
        };
        let _guard = self.submitting.begin()?;

        let ticket = BetTicket::from(&quote);
        let receipt = submitter.submit_bet(&ticket).await.inspect_err(|e| {
            warn!("Bet submission failed: {}", e);
            metrics::inc_bets_rejected();
        })?;

        info!(stake = %ticket.stake, reference = %receipt.reference, "Bet placed");
        metrics::inc_bets_placed();
        Ok(ActionOutcome::notify(Notification::info(
            "Bet Placed",
            format!(
                "You bet {} WVTK on {}",
                ticket.stake.normalize(),
                ticket.side.label()
            ),
        )))
    }

    /// Render the form against `market`.
    pub fn render(&self, market: &Market) -> BetFormView {
        BetFormView {
            amount: self.amount.clone(),
            side: self.side,
            submitting: self.is_submitting(),
            yes_available: market.yes_percentage > Decimal::ZERO,
            no_available: market.no_percentage > Decimal::ZERO,
            quote: self.quote(market),
        }
    }
}

/// Rendered bet form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BetFormView {
    pub amount: String,
    pub side: Side,
    pub submitting: bool,
    /// YES can be bet on (percentage above zero).
    pub yes_available: bool,
    /// NO can be bet on (percentage above zero).
    pub no_available: bool,
    pub quote: Option<BetQuote>,
}

/// The user's holdings in the displayed market.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionsPanel {
    pub rows: Vec<PositionRow>,
    pub empty_message: Option<String>,
}

/// Rendered detail view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketDetailView {
    pub market: MarketCard,
    /// "Xd Yh left".
    pub time_left: String,
    /// Resolution has passed.
    pub closed: bool,
    /// "24,500 WVTK in pool".
    pub pool: String,
    pub bet_form: BetFormView,
    /// Present when a user is signed in.
    pub my_positions: Option<PositionsPanel>,
}

impl MarketDetailView {
    /// Render `market` with `form`. `positions` are the signed-in user's holdings, if any.
    pub fn render(
        market: &Market,
        form: &BetForm,
        positions: Option<&[Position]>,
        now: OffsetDateTime,
    ) -> Self {
        let my_positions = positions.map(|positions| {
            let rows: Vec<PositionRow> = positions
                .iter()
                .filter(|p| p.market_id == market.id)
                .map(|p| PositionRow::new(p, market, now))
                .collect();
            PositionsPanel {
                empty_message: rows.is_empty().then(|| NO_POSITIONS_MESSAGE.to_string()),
                rows,
            }
        });

        Self {
            market: MarketCard::new(market, now),
            time_left: market.time_left_label(now),
            closed: market.is_closed(now),
            pool: format!("{} WVTK in pool", format_amount(market.liquidity)),
            bet_form: form.render(market),
            my_positions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SubmissionError;
    use crate::market::catalog::{seed_markets, seed_positions};
    use crate::submission::SimulatedSubmitter;
    use rust_decimal_macros::dec;
    use std::time::Duration;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2025-12-01 00:00:00 UTC);

    fn market() -> Market {
        seed_markets().remove(0)
    }

    #[test]
    fn default_form_quotes_yes() {
        let form = BetForm::default();
        assert_eq!(form.amount, "100");
        assert_eq!(form.side, Side::Yes);
        let quote = form.quote(&market()).unwrap();
        assert_eq!(quote.potential_return, dec!(147.06));
        assert_eq!(quote.display, "147.06 WVTK");
    }

    #[test]
    fn invalid_amount_has_no_quote() {
        let form = BetForm::with("abc", Side::No);
        assert!(form.quote(&market()).is_none());
        assert!(matches!(
            form.validate(&market()),
            Err(ValidationError::InvalidAmount(_))
        ));
    }

    #[test]
    fn zero_percent_side_is_unavailable() {
        let mut m = market();
        m.no_percentage = Decimal::ZERO;
        let view = BetForm::with("10", Side::No).render(&m);
        assert!(!view.no_available);
        assert!(view.yes_available);
        assert!(view.quote.is_none());
    }

    #[tokio::test]
    async fn placing_a_bet_notifies() {
        let submitter = SimulatedSubmitter::new(Duration::ZERO);
        let form = BetForm::with("150", Side::No);
        let outcome = form.place(&market(), &submitter).await.unwrap();
        assert_eq!(outcome.notification.title, "Bet Placed");
        assert_eq!(outcome.notification.description, "You bet 150 WVTK on NO");
        assert!(outcome.redirect.is_none());
        assert!(!form.is_submitting());
        assert_eq!(submitter.accepted(), 1);
    }

    #[tokio::test]
    async fn invalid_bet_never_reaches_submitter() {
        let submitter = SimulatedSubmitter::new(Duration::ZERO);
        let err = BetForm::with("-5", Side::Yes)
            .place(&market(), &submitter)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::InvalidAmount(_))));
        assert_eq!(submitter.accepted(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn second_placement_while_submitting_is_rejected() {
        let submitter = SimulatedSubmitter::new(Duration::from_millis(1500));
        let form = BetForm::default();
        let m = market();

        let (first, second) = tokio::join!(form.place(&m, &submitter), form.place(&m, &submitter));
        assert!(first.is_ok());
        assert!(matches!(
            second,
            Err(AppError::Validation(ValidationError::AlreadySubmitting))
        ));
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn submission_failure_clears_flag() {
        let submitter = SimulatedSubmitter::rejecting(Duration::ZERO, "closed");
        let form = BetForm::default();
        let err = form.place(&market(), &submitter).await.unwrap_err();
        assert!(matches!(err, AppError::Submission(SubmissionError::Rejected(_))));
        assert!(!form.is_submitting());
    }

    #[test]
    fn detail_view_shows_pool_and_positions() {
        let m = market();
        let positions = seed_positions();
        let view = MarketDetailView::render(&m, &BetForm::default(), Some(&positions), NOW);
        assert_eq!(view.pool, "24,500 WVTK in pool");
        assert_eq!(view.time_left, "30d 23h left");
        let panel = view.my_positions.unwrap();
        assert_eq!(panel.rows.len(), 1);
        assert!(panel.empty_message.is_none());

        let other = &seed_markets()[1];
        let view = MarketDetailView::render(other, &BetForm::default(), Some(&positions), NOW);
        assert_eq!(
            view.my_positions.unwrap().empty_message.as_deref(),
            Some(NO_POSITIONS_MESSAGE)
        );

        let view = MarketDetailView::render(&m, &BetForm::default(), None, NOW);
        assert!(view.my_positions.is_none());
    }
}
