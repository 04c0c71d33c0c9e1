//! Bet and market submission backend.
//!
//! Placing a bet or creating a market only reaches this interface; nothing here
//! debits balances or mutates the market repository.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, instrument};

use crate::error::SubmissionError;
use crate::metrics::LatencyTimer;
use crate::trading::BetTicket;
use crate::views::create_market::MarketDraft;

/// Acknowledgement for an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    /// Backend reference for the submission.
    pub reference: String,
}

/// Backend that accepts bets and new markets.
#[async_trait]
pub trait Submitter: Send + Sync {
    /// Submit a validated bet.
    async fn submit_bet(&self, ticket: &BetTicket) -> Result<Receipt, SubmissionError>;

    /// Submit a validated market draft.
    async fn create_market(&self, draft: &MarketDraft) -> Result<Receipt, SubmissionError>;
}

/// Backend that accepts everything after a fixed delay.
#[derive(Debug)]
pub struct SimulatedSubmitter {
    delay: Duration,
    counter: AtomicU64,
    reject_with: Option<String>,
}

impl SimulatedSubmitter {
    /// Accept submissions after `delay`.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            counter: AtomicU64::new(0),
            reject_with: None,
        }
    }

    /// Reject every submission with `reason`.
    pub fn rejecting(delay: Duration, reason: impl Into<String>) -> Self {
        Self {
            reject_with: Some(reason.into()),
            ..Self::new(delay)
        }
    }

    /// Submissions accepted so far.
    pub fn accepted(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    async fn settle(&self, prefix: &str) -> Result<Receipt, SubmissionError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(reason) = &self.reject_with {
            return Err(SubmissionError::Rejected(reason.clone()));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Receipt {
            reference: format!("{prefix}-{n}"),
        })
    }
}

#[async_trait]
impl Submitter for SimulatedSubmitter {
    #[instrument(skip(self, ticket), fields(market = %ticket.market_id, side = %ticket.side))]
    async fn submit_bet(&self, ticket: &BetTicket) -> Result<Receipt, SubmissionError> {
        let _timer = LatencyTimer::new("bet");
        let receipt = self.settle("bet").await?;
        info!(stake = %ticket.stake, reference = %receipt.reference, "Bet accepted");
        Ok(receipt)
    }

    #[instrument(skip(self, draft), fields(title = %draft.title))]
    async fn create_market(&self, draft: &MarketDraft) -> Result<Receipt, SubmissionError> {
        let _timer = LatencyTimer::new("market");
        let receipt = self.settle("market").await?;
        info!(category = %draft.category, reference = %receipt.reference, "Market accepted");
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{Category, Side};
    use rust_decimal_macros::dec;
    use time::macros::date;

    fn ticket() -> BetTicket {
        BetTicket {
            market_id: "1".to_string(),
            side: Side::Yes,
            stake: dec!(100),
        }
    }

    #[tokio::test]
    async fn simulated_submitter_numbers_receipts() {
        let submitter = SimulatedSubmitter::new(Duration::ZERO);
        assert_eq!(submitter.submit_bet(&ticket()).await.unwrap().reference, "bet-1");
        assert_eq!(submitter.submit_bet(&ticket()).await.unwrap().reference, "bet-2");
        assert_eq!(submitter.accepted(), 2);

        let draft = MarketDraft {
            title: "t".into(),
            description: "d".into(),
            category: Category::Other,
            end_date: date!(2030 - 01 - 01),
            initial_funding: dec!(100),
        };
        assert_eq!(submitter.create_market(&draft).await.unwrap().reference, "market-3");
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_submitter_waits_for_delay() {
        let submitter = SimulatedSubmitter::new(Duration::from_millis(1500));
        let start = tokio::time::Instant::now();
        submitter.submit_bet(&ticket()).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn rejecting_submitter_returns_reason() {
        let submitter = SimulatedSubmitter::rejecting(Duration::ZERO, "market closed");
        assert_eq!(
            submitter.submit_bet(&ticket()).await,
            Err(SubmissionError::Rejected("market closed".to_string()))
        );
        assert_eq!(submitter.accepted(), 0);
    }
}
