//! Time source abstraction.
//!
//! The quota window is keyed by the device-local calendar date, so the
//! coordinator reads "today" through this trait rather than calling
//! `chrono::Local` directly.

use chrono::{DateTime, Local, NaiveDate, Utc};

/// Source of the current instant and the device-local date.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar date in the device's local time zone.
    fn today(&self) -> NaiveDate;
}

/// Wall clock using the system time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
