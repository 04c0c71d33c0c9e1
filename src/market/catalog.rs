//! Seed markets and holdings served by the in-memory repository.

use rust_decimal::Decimal;
use time::macros::datetime;

use crate::trading::Position;

use super::types::{Category, Market, Side};

struct Seed {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    end_date: time::OffsetDateTime,
    participants: u64,
    liquidity: i64,
    yes: i64,
    no: i64,
    category: Category,
}

impl From<Seed> for Market {
    fn from(seed: Seed) -> Self {
        Market {
            id: seed.id.to_string(),
            title: seed.title.to_string(),
            description: seed.description.to_string(),
            end_date: seed.end_date,
            participants: seed.participants,
            liquidity: Decimal::from(seed.liquidity),
            yes_percentage: Decimal::from(seed.yes),
            no_percentage: Decimal::from(seed.no),
            category: seed.category,
        }
    }
}

/// The six featured markets shown on the home view.
pub fn seed_markets() -> Vec<Market> {
    vec![
        Seed {
            id: "1",
            title: "Will Bitcoin reach $100,000 by the end of 2025?",
            description: "The market will resolve to YES if the price of Bitcoin reaches or exceeds $100,000 at any point before December 31, 2025.",
            end_date: datetime!(2025-12-31 23:59:59 UTC),
            participants: 156,
            liquidity: 24_500,
            yes: 68,
            no: 32,
            category: Category::Crypto,
        },
        Seed {
            id: "2",
            title: "Will SpaceX successfully land humans on Mars before 2030?",
            description: "This market resolves to YES if SpaceX completes a crewed mission that lands humans on the surface of Mars before January 1, 2030.",
            end_date: datetime!(2029-12-31 23:59:59 UTC),
            participants: 89,
            liquidity: 12_800,
            yes: 42,
            no: 58,
            category: Category::Science,
        },
        Seed {
            id: "3",
            title: "Will the FIFA World Cup 2026 final have more than 3 goals scored?",
            description: "This market will resolve to YES if 4 or more goals are scored during the FIFA World Cup 2026 final match.",
            end_date: datetime!(2026-07-15 23:59:59 UTC),
            participants: 237,
            liquidity: 18_700,
            yes: 45,
            no: 55,
            category: Category::Sports,
        },
        Seed {
            id: "4",
            title: "Will [Popular Movie Franchise] release a new film in 2025?",
            description: "Market resolves to YES if a new movie in the franchise is released in theaters worldwide during the calendar year 2025.",
            end_date: datetime!(2025-12-31 23:59:59 UTC),
            participants: 64,
            liquidity: 5_400,
            yes: 78,
            no: 22,
            category: Category::Entertainment,
        },
        Seed {
            id: "5",
            title: "Will the current US President win re-election in 2024?",
            description: "This market resolves to YES if the incumbent US President wins the 2024 presidential election.",
            end_date: datetime!(2024-11-05 23:59:59 UTC),
            participants: 412,
            liquidity: 45_600,
            yes: 51,
            no: 49,
            category: Category::Politics,
        },
        Seed {
            id: "6",
            title: "Will Ethereum 2.0 be fully implemented by the end of 2024?",
            description: "Market resolves to YES if all phases of Ethereum 2.0 are fully implemented on mainnet by December 31, 2024.",
            end_date: datetime!(2024-12-31 23:59:59 UTC),
            participants: 178,
            liquidity: 28_900,
            yes: 62,
            no: 38,
            category: Category::Crypto,
        },
    ]
    .into_iter()
    .map(Market::from)
    .collect()
}

/// Demo holdings shown on every profile.
pub fn seed_positions() -> Vec<Position> {
    vec![
        Position::new("1", Side::Yes, Decimal::from(150)),
        Position::new("3", Side::No, Decimal::from(100)),
    ]
}
