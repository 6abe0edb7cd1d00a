use chrono::{Datelike, Local, NaiveDate};

/// Whole years elapsed from `dob` to `today`. Negative when `dob` lies in the future.
pub fn years_between(dob: NaiveDate, today: NaiveDate) -> i64 {
    let years = i64::from(today.year()) - i64::from(dob.year());
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        years - 1
    } else {
        years
    }
}

/// Source of "today" for age derivation.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
