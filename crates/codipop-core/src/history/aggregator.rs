//! History group aggregator.
//!
//! Pure functions that bucket fitting results by local calendar date. Groups
//! are ordered by their structured [`GroupKey`], newest first, and items inside
//! a group are ordered newest first with the id as a tie-breaker, so the
//! output is identical for identical input regardless of input order.

use std::collections::{BTreeMap, HashSet};

use chrono::{Local, TimeZone};
use codipop_types::fitting::FittingResult;
use codipop_types::history::{Granularity, GroupKey, HistoryGroup, HistoryView};

/// Which groups the user has expanded, keyed by canonical group key text.
///
/// Owned by the presentation layer; the aggregator only reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: HashSet<String>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a group open or closed. Returns the new state.
    pub fn toggle(&mut self, key: &str) -> bool {
        if self.expanded.remove(key) {
            false
        } else {
            self.expanded.insert(key.to_string());
            true
        }
    }

    pub fn is_expanded(&self, key: &str) -> bool {
        self.expanded.contains(key)
    }
}

impl FromIterator<String> for ExpansionState {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            expanded: iter.into_iter().collect(),
        }
    }
}

/// Group results in the device-local time zone.
pub fn group(
    results: &[FittingResult],
    granularity: Granularity,
    expansion: &ExpansionState,
) -> Vec<HistoryGroup> {
    group_in(&Local, results, granularity, expansion)
}

/// Group results using the calendar of `tz`.
pub fn group_in<Tz: TimeZone>(
    tz: &Tz,
    results: &[FittingResult],
    granularity: Granularity,
    expansion: &ExpansionState,
) -> Vec<HistoryGroup> {
    let mut buckets: BTreeMap<GroupKey, Vec<FittingResult>> = BTreeMap::new();
    for result in sorted_newest_first(results) {
        let local_date = result.created_at.with_timezone(tz).date_naive();
        buckets
            .entry(GroupKey::for_date(local_date, granularity))
            .or_default()
            .push(result);
    }

    buckets
        .into_iter()
        .rev()
        .map(|(group_key, items)| {
            let key = group_key.to_string();
            HistoryGroup {
                label: group_key.label(),
                expanded: expansion.is_expanded(&key),
                group_key,
                key,
                items,
            }
        })
        .collect()
}

/// Restrict results to a view, newest first.
pub fn filter_view(results: &[FittingResult], view: HistoryView) -> Vec<FittingResult> {
    sorted_newest_first(results)
        .into_iter()
        .filter(|r| match view {
            HistoryView::All => true,
            HistoryView::Liked => r.is_liked,
        })
        .collect()
}

fn sorted_newest_first(results: &[FittingResult]) -> Vec<FittingResult> {
    let mut sorted = results.to_vec();
    sorted.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    sorted
}
