//! Client-side search over a loaded collection

use chrono::{DateTime, Duration, Months, Utc};
use std::fmt;
use std::str::FromStr;

use super::Resource;

/// How far back a dated resource may be to match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateRange {
    #[default]
    All,
    /// Within the last day
    Today,
    /// Within the last seven days
    Week,
    /// Within the last calendar month
    Month,
}

impl DateRange {
    /// Earliest matching timestamp, or `None` when unbounded
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            DateRange::All => None,
            DateRange::Today => Some(now - Duration::days(1)),
            DateRange::Week => Some(now - Duration::days(7)),
            DateRange::Month => Some(
                now.checked_sub_months(Months::new(1))
                    .unwrap_or(now - Duration::days(30)),
            ),
        }
    }
}

impl FromStr for DateRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(DateRange::All),
            "today" => Ok(DateRange::Today),
            "week" => Ok(DateRange::Week),
            "month" => Ok(DateRange::Month),
            other => Err(format!(
                "unknown date range '{}' (expected all, today, week or month)",
                other
            )),
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DateRange::All => "all",
            DateRange::Today => "today",
            DateRange::Week => "week",
            DateRange::Month => "month",
        })
    }
}

/// Search criteria
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Case-insensitive substring; empty matches everything
    pub text: String,
    /// Only honoured by dated resources
    pub range: DateRange,
}

impl Query {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            range: DateRange::All,
        }
    }

    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }

    pub fn matches<R: Resource>(&self, item: &R, now: DateTime<Utc>) -> bool {
        if R::DATED {
            if let Some(cutoff) = self.range.cutoff(now) {
                match item.timestamp() {
                    Some(at) if at >= cutoff => {}
                    _ => return false,
                }
            }
        }

        let needle = self.text.trim().to_lowercase();
        needle.is_empty()
            || item
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Items of `items` matching `query`, newest first for dated kinds
pub fn apply<R: Resource>(items: &[R], query: &Query, now: DateTime<Utc>) -> Vec<R> {
    let mut matched: Vec<R> = items
        .iter()
        .filter(|item| query.matches(*item, now))
        .cloned()
        .collect();

    if R::DATED {
        // Stable sort keeps server order among equal or missing timestamps.
        matched.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
    }

    matched
}
