//! Market-related types for binary yes/no prediction markets.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use time::OffsetDateTime;

const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_HOUR: i64 = 3_600;

/// Side of a binary market.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The question resolves YES.
    #[strum(to_string = "yes", serialize = "YES", serialize = "Yes")]
    #[default]
    Yes,
    /// The question resolves NO.
    #[strum(to_string = "no", serialize = "NO", serialize = "No")]
    No,
}

impl Side {
    /// Get the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Yes => Side::No,
            Side::No => Side::Yes,
        }
    }

    /// Uppercase label used in notifications ("YES" / "NO").
    pub fn label(&self) -> &'static str {
        match self {
            Side::Yes => "YES",
            Side::No => "NO",
        }
    }
}

/// Fixed set of market categories.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Category {
    Sports,
    Politics,
    Crypto,
    Entertainment,
    Science,
    Other,
}

impl Category {
    /// All categories in display order.
    pub fn all() -> Vec<Category> {
        Category::iter().collect()
    }

    /// Badge tone for this category.
    pub fn tone(&self) -> CategoryTone {
        match self {
            Category::Sports => CategoryTone::Green,
            Category::Politics => CategoryTone::Purple,
            Category::Crypto => CategoryTone::Brand,
            Category::Entertainment => CategoryTone::Coral,
            Category::Science | Category::Other => CategoryTone::Secondary,
        }
    }
}

/// Badge color family a front end should use for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryTone {
    Green,
    Purple,
    Brand,
    Coral,
    Secondary,
}

/// A binary prediction market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    /// Opaque market identifier.
    pub id: String,
    /// Market question.
    pub title: String,
    /// Resolution criteria.
    pub description: String,
    /// When the market resolves.
    #[serde(with = "time::serde::rfc3339")]
    pub end_date: OffsetDateTime,
    /// Number of distinct bettors.
    pub participants: u64,
    /// Pool size in WVTK.
    pub liquidity: Decimal,
    /// Share of the pool on YES, in percent.
    pub yes_percentage: Decimal,
    /// Share of the pool on NO, in percent.
    pub no_percentage: Decimal,
    /// Market category.
    pub category: Category,
}

impl Market {
    /// Percentage backing the given side.
    pub fn percentage(&self, side: Side) -> Decimal {
        match side {
            Side::Yes => self.yes_percentage,
            Side::No => self.no_percentage,
        }
    }

    /// Whether the two percentages add up to exactly 100.
    ///
    /// Percentages are observed independently; nothing enforces this.
    pub fn is_normalized(&self) -> bool {
        self.yes_percentage + self.no_percentage == Decimal::ONE_HUNDRED
    }

    /// Check if the resolution date has passed.
    pub fn is_closed(&self, now: OffsetDateTime) -> bool {
        now >= self.end_date
    }

    /// Whole days and hours until resolution. Negative once the market has ended.
    pub fn time_left(&self, now: OffsetDateTime) -> TimeLeft {
        let secs = (self.end_date - now).whole_seconds();
        TimeLeft {
            days: secs.div_euclid(SECONDS_PER_DAY),
            hours: secs.rem_euclid(SECONDS_PER_DAY) / SECONDS_PER_HOUR,
        }
    }

    /// Short label for market cards: "N days left" or "Ending soon".
    pub fn days_left_label(&self, now: OffsetDateTime) -> String {
        let left = self.time_left(now);
        if left.days > 0 {
            format!("{} days left", left.days)
        } else {
            "Ending soon".to_string()
        }
    }

    /// Detail label "Xd Yh left", clamped at zero.
    pub fn time_left_label(&self, now: OffsetDateTime) -> String {
        if self.is_closed(now) {
            return "0d 0h left".to_string();
        }
        let left = self.time_left(now);
        format!("{}d {}h left", left.days, left.hours)
    }
}

/// Remaining time until a market resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeLeft {
    /// Whole days remaining.
    pub days: i64,
    /// Hours remaining within the last partial day.
    pub hours: i64,
}
