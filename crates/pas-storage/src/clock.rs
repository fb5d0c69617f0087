//! Wall-clock access.
//!
//! Partition dates come from the local calendar date at write time, so the
//! clock is injectable to let tests file records under chosen dates.

use std::sync::Mutex;

use chrono::{Local, NaiveDate, TimeZone};

/// Source of the current local date and time.
pub trait Clock: Send + Sync {
    /// Current local calendar date.
    fn today(&self) -> NaiveDate;

    /// Current time in milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// The process's local wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now_millis(&self) -> i64 {
        Local::now().timestamp_millis()
    }
}

/// A clock pinned to a settable date; time of day is local noon.
#[derive(Debug)]
pub struct FixedClock {
    date: Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: Mutex::new(date),
        }
    }

    /// Clock pinned to the given calendar date; `None` if it does not exist.
    pub fn ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self::new)
    }

    pub fn set(&self, date: NaiveDate) {
        *self.date.lock().unwrap_or_else(|e| e.into_inner()) = date;
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.date.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn now_millis(&self) -> i64 {
        let noon = self.today().and_hms_opt(12, 0, 0).unwrap_or_default();
        Local
            .from_local_datetime(&noon)
            .earliest()
            .map(|dt| dt.timestamp_millis())
            .unwrap_or_else(|| noon.and_utc().timestamp_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_agrees_with_itself() {
        let clock = SystemClock;
        let millis = clock.now_millis();
        let date = Local.timestamp_millis_opt(millis).unwrap().date_naive();
        // The date can roll over between the two calls only at midnight.
        assert!((clock.today() - date).num_days().abs() <= 1);
    }

    #[test]
    fn test_fixed_clock_date_and_time_agree() {
        let clock = FixedClock::ymd(2023, 11, 14).unwrap();
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2023, 11, 14).unwrap());
        let at = Local.timestamp_millis_opt(clock.now_millis()).unwrap();
        assert_eq!(at.date_naive(), clock.today());
    }

    #[test]
    fn test_fixed_clock_rejects_invalid_date() {
        assert!(FixedClock::ymd(2023, 2, 29).is_none());
        assert!(FixedClock::ymd(2024, 2, 29).is_some());
    }

    #[test]
    fn test_fixed_clock_set() {
        let clock = FixedClock::ymd(2023, 11, 14).unwrap();
        clock.set(NaiveDate::from_ymd_opt(2023, 11, 15).unwrap());
        assert_eq!(clock.today().to_string(), "2023-11-15");
    }
}
