//! Daily composition quota types.
//!
//! The quota is tracked per device-local calendar date. Only the date and
//! the count are persisted; the limit comes from configuration.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Key under which the quota record is persisted in the key-value store.
pub const QUOTA_KEY: &str = "dailyTryOnQuota";

/// Persisted form of the quota: `{"date": "YYYY-MM-DD", "count": n}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredQuota {
    pub date: NaiveDate,
    pub count: u32,
}

/// Composition-call consumption for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyQuota {
    pub window_date: NaiveDate,
    pub used: u32,
    pub limit: u32,
}

impl DailyQuota {
    /// A freshly reset window for `date`.
    pub fn fresh(date: NaiveDate, limit: u32) -> Self {
        Self {
            window_date: date,
            used: 0,
            limit,
        }
    }

    /// Build from a persisted record, applying the configured limit.
    pub fn from_stored(stored: StoredQuota, limit: u32) -> Self {
        Self {
            window_date: stored.date,
            used: stored.count,
            limit,
        }
    }

    /// Persisted form of this quota.
    pub fn to_stored(&self) -> StoredQuota {
        StoredQuota {
            date: self.window_date,
            count: self.used,
        }
    }

    /// Calls left in this window, clamped at zero.
    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.used)
    }

    /// Whether this record belongs to a different day than `today`.
    pub fn is_stale(&self, today: NaiveDate) -> bool {
        self.window_date != today
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_stored_quota_wire_format() {
        let stored = StoredQuota {
            date: date(2024, 9, 5),
            count: 2,
        };
        let json = serde_json::to_string(&stored).unwrap();
        assert_eq!(json, r#"{"date":"2024-09-05","count":2}"#);
    }

    #[test]
    fn test_stored_quota_rejects_negative_count() {
        let parsed = serde_json::from_str::<StoredQuota>(r#"{"date":"2024-09-05","count":-1}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_remaining_clamps_at_zero() {
        let quota = DailyQuota {
            window_date: date(2024, 9, 5),
            used: 12,
            limit: 10,
        };
        assert_eq!(quota.remaining(), 0);
    }

    #[test]
    fn test_is_stale() {
        let quota = DailyQuota::fresh(date(2024, 9, 5), 3);
        assert!(!quota.is_stale(date(2024, 9, 5)));
        assert!(quota.is_stale(date(2024, 9, 6)));
    }

    #[test]
    fn test_stored_roundtrip_keeps_limit_external() {
        let quota = DailyQuota {
            window_date: date(2024, 10, 1),
            used: 1,
            limit: 5,
        };
        let back = DailyQuota::from_stored(quota.to_stored(), 7);
        assert_eq!(back.used, 1);
        assert_eq!(back.limit, 7);
        assert_eq!(back.remaining(), 6);
    }
}
