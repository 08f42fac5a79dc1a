//! History grouping types.
//!
//! Groups are a derived view over `FittingResult`s and are never persisted.
//! Group keys are structured values so that ordering never depends on the
//! textual form of the key.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::fitting::FittingResult;

/// Date granularity used to bucket history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Ungrouped, newest first.
    #[default]
    None,
    Day,
    Month,
    Year,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::None => write!(f, "none"),
            Granularity::Day => write!(f, "day"),
            Granularity::Month => write!(f, "month"),
            Granularity::Year => write!(f, "year"),
        }
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "latest" => Ok(Granularity::None),
            "day" | "daily" => Ok(Granularity::Day),
            "month" | "monthly" => Ok(Granularity::Month),
            "year" | "yearly" => Ok(Granularity::Year),
            other => Err(format!("invalid granularity: '{other}'")),
        }
    }
}

/// Which slice of the history to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryView {
    #[default]
    All,
    Liked,
}

impl FromStr for HistoryView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(HistoryView::All),
            "liked" => Ok(HistoryView::Liked),
            other => Err(format!("invalid history view: '{other}'")),
        }
    }
}

/// Structured group key. Ordering compares dates, not strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GroupKey {
    All,
    Year { year: i32 },
    Month { year: i32, month: u32 },
    Day { date: NaiveDate },
}

impl GroupKey {
    /// Truncate a local calendar date to the given granularity.
    pub fn for_date(date: NaiveDate, granularity: Granularity) -> Self {
        match granularity {
            Granularity::None => GroupKey::All,
            Granularity::Day => GroupKey::Day { date },
            Granularity::Month => GroupKey::Month {
                year: date.year(),
                month: date.month(),
            },
            Granularity::Year => GroupKey::Year { year: date.year() },
        }
    }

    /// First calendar day covered by this key. `None` for `All`.
    pub fn start_date(&self) -> Option<NaiveDate> {
        match *self {
            GroupKey::All => None,
            GroupKey::Year { year } => NaiveDate::from_ymd_opt(year, 1, 1),
            GroupKey::Month { year, month } => NaiveDate::from_ymd_opt(year, month, 1),
            GroupKey::Day { date } => Some(date),
        }
    }

    /// Human-readable group heading.
    pub fn label(&self) -> String {
        match self {
            GroupKey::All => "All".to_string(),
            GroupKey::Year { year } => year.to_string(),
            GroupKey::Month { .. } => self
                .start_date()
                .map(|d| d.format("%B %Y").to_string())
                .unwrap_or_else(|| self.to_string()),
            GroupKey::Day { date } => date.format("%b %-d, %Y").to_string(),
        }
    }
}

/// Canonical zero-padded text form: `2024-09-05`, `2024-09`, `2024`, `all`.
impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::All => write!(f, "all"),
            GroupKey::Year { year } => write!(f, "{year:04}"),
            GroupKey::Month { year, month } => write!(f, "{year:04}-{month:02}"),
            GroupKey::Day { date } => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

/// Parses both padded (`2024-09`) and unpadded (`2024-9`) forms.
impl FromStr for GroupKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(GroupKey::All);
        }

        let invalid = || format!("invalid group key: '{s}'");
        let parts: Vec<&str> = s.split('-').collect();
        let num = |p: &str| p.trim().parse::<u32>().map_err(|_| invalid());

        match parts.as_slice() {
            [y] => {
                let year = y.trim().parse::<i32>().map_err(|_| invalid())?;
                Ok(GroupKey::Year { year })
            }
            [y, m] => {
                let year = y.trim().parse::<i32>().map_err(|_| invalid())?;
                let month = num(m)?;
                NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
                Ok(GroupKey::Month { year, month })
            }
            [y, m, d] => {
                let year = y.trim().parse::<i32>().map_err(|_| invalid())?;
                let date =
                    NaiveDate::from_ymd_opt(year, num(m)?, num(d)?).ok_or_else(invalid)?;
                Ok(GroupKey::Day { date })
            }
            _ => Err(invalid()),
        }
    }
}

/// A display bucket of fitting results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryGroup {
    pub group_key: GroupKey,
    /// Canonical text form of `group_key`, used as the expansion-state key.
    pub key: String,
    pub label: String,
    /// Newest first.
    pub items: Vec<FittingResult>,
    /// Ephemeral UI state merged in from the caller.
    pub expanded: bool,
}
