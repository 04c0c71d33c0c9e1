//! Stake parsing and potential-return quotes.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::error::ValidationError;
use crate::market::{Market, Side};

/// Decimal places shown for returns.
pub const RETURN_DECIMALS: u32 = 2;

/// Parse a stake typed into the bet form.
///
/// Blank, non-numeric, zero and negative values are rejected.
pub fn parse_stake(input: &str) -> Result<Decimal, ValidationError> {
    let trimmed = input.trim();
    let amount = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| ValidationError::InvalidAmount(input.to_string()))?;

    if amount <= Decimal::ZERO {
        return Err(ValidationError::InvalidAmount(input.to_string()));
    }
    Ok(amount)
}

/// Payout if the chosen side wins: `stake * 100 / percentage`, rounded to 2 dp.
///
/// A 0% side cannot be bet on; percentages above 100 are invalid.
pub fn potential_return(
    stake: Decimal,
    percentage: Decimal,
    side: Side,
) -> Result<Decimal, ValidationError> {
    if stake <= Decimal::ZERO {
        return Err(ValidationError::InvalidAmount(stake.to_string()));
    }
    if percentage.is_zero() {
        return Err(ValidationError::SideUnavailable { side });
    }
    if percentage < Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
        return Err(ValidationError::InvalidPercentage(percentage));
    }

    stake
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(percentage))
        .map(|r| r.round_dp_with_strategy(RETURN_DECIMALS, RoundingStrategy::MidpointAwayFromZero))
        .ok_or_else(|| ValidationError::InvalidAmount(stake.to_string()))
}

/// Format an amount the way returns are displayed ("220.59").
pub fn format_return(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

/// Potential return for a stake on one side of a market.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BetQuote {
    /// Market being quoted.
    pub market_id: String,
    /// Chosen side.
    pub side: Side,
    /// Stake in WVTK.
    pub stake: Decimal,
    /// Percentage of the chosen side.
    pub percentage: Decimal,
    /// Payout if the side wins, 2 dp.
    pub potential_return: Decimal,
    /// Payout formatted for display.
    pub display: String,
}

impl BetQuote {
    /// Quote `stake` on `side` of `market`.
    pub fn new(market: &Market, side: Side, stake: Decimal) -> Result<Self, ValidationError> {
        let percentage = market.percentage(side);
        let potential_return = potential_return(stake, percentage, side)?;
        Ok(Self {
            market_id: market.id.clone(),
            side,
            stake,
            percentage,
            potential_return,
            display: format!("{} WVTK", format_return(potential_return)),
        })
    }

    /// Payout minus stake.
    pub fn profit(&self) -> Decimal {
        self.potential_return - self.stake
    }
}

/// A validated bet ready for submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BetTicket {
    /// Target market.
    pub market_id: String,
    /// Chosen side.
    pub side: Side,
    /// Stake in WVTK.
    pub stake: Decimal,
}

impl From<&BetQuote> for BetTicket {
    fn from(quote: &BetQuote) -> Self {
        Self {
            market_id: quote.market_id.clone(),
            side: quote.side,
            stake: quote.stake,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::catalog::seed_markets;
    use rust_decimal_macros::dec;

    #[test]
    fn parse_stake_accepts_positive_numbers() {
        assert_eq!(parse_stake("100").unwrap(), dec!(100));
        assert_eq!(parse_stake(" 12.5 ").unwrap(), dec!(12.5));
        assert_eq!(parse_stake("1e3").unwrap(), dec!(1000));
    }

    #[test]
    fn parse_stake_rejects_invalid_input() {
        for input in ["", "   ", "abc", "0", "-5", "0.00"] {
            assert_eq!(
                parse_stake(input),
                Err(ValidationError::InvalidAmount(input.to_string())),
                "input {input:?}"
            );
        }
    }

    #[test]
    fn potential_return_examples() {
        assert_eq!(potential_return(dec!(100), dec!(50), Side::Yes).unwrap(), dec!(200.00));
        assert_eq!(potential_return(dec!(150), dec!(68), Side::Yes).unwrap(), dec!(220.59));
        assert_eq!(potential_return(dec!(100), dec!(100), Side::No).unwrap(), dec!(100));
        assert_eq!(format_return(dec!(200)), "200.00");
    }

    #[test]
    fn zero_percentage_side_is_unavailable() {
        assert_eq!(
            potential_return(dec!(10), Decimal::ZERO, Side::No),
            Err(ValidationError::SideUnavailable { side: Side::No })
        );
    }

    #[test]
    fn out_of_range_percentage_is_rejected() {
        assert!(matches!(
            potential_return(dec!(10), dec!(101), Side::Yes),
            Err(ValidationError::InvalidPercentage(_))
        ));
        assert!(matches!(
            potential_return(dec!(10), dec!(-1), Side::Yes),
            Err(ValidationError::InvalidPercentage(_))
        ));
    }

    #[test]
    fn quote_uses_side_percentage() {
        let market = seed_markets().remove(0);
        let yes = BetQuote::new(&market, Side::Yes, dec!(150)).unwrap();
        assert_eq!(yes.potential_return, dec!(220.59));
        assert_eq!(yes.display, "220.59 WVTK");
        assert_eq!(yes.profit(), dec!(70.59));

        let no = BetQuote::new(&market, Side::No, dec!(100)).unwrap();
        assert_eq!(no.potential_return, dec!(312.50));

        let ticket = BetTicket::from(&no);
        assert_eq!(ticket.market_id, "1");
        assert_eq!(ticket.side, Side::No);
    }
}
