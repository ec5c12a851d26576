//! Time source for issue, due and return dates.

use std::sync::{Mutex, PoisonError};

use chrono::{Days, Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Supplies "today" to the engine. Loan dates are calendar dates in the
/// library's local time zone.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// The host's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    /// Start at midnight of `date`.
    pub fn new(date: NaiveDate) -> Self {
        Self::at(date.and_time(NaiveTime::MIN))
    }

    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Jump to midnight of `date`.
    pub fn set(&self, date: NaiveDate) {
        *self.lock() = date.and_time(NaiveTime::MIN);
    }

    /// Move forward by whole days.
    pub fn advance(&self, days: u64) {
        let mut now = self.lock();
        *now = now
            .checked_add_days(Days::new(days))
            .unwrap_or(NaiveDateTime::MAX);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NaiveDateTime> {
        self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.lock()
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}
