use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A recurring calendar day, independent of the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

impl MonthDay {
    pub const fn new(month: u32, day: u32) -> Self {
        Self { month, day }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }
}

/// Fixed-date closure days every ledger starts from: the New Year break and
/// the company-wide national holidays that fall on the same date each year.
const STANDARD_CLOSURES: [MonthDay; 11] = [
    MonthDay::new(1, 1),
    MonthDay::new(1, 2),
    MonthDay::new(1, 3),
    MonthDay::new(2, 11),
    MonthDay::new(2, 23),
    MonthDay::new(4, 29),
    MonthDay::new(5, 3),
    MonthDay::new(5, 4),
    MonthDay::new(5, 5),
    MonthDay::new(11, 3),
    MonthDay::new(12, 31),
];

/// Immutable closure-day calendar for one batch run, built once at driver
/// start by merging the standard set with company-specific rows from
/// storage, then passed by reference into the ledger builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayCalendar {
    closures: HashSet<MonthDay>,
}

impl HolidayCalendar {
    pub fn standard() -> Self {
        Self {
            closures: STANDARD_CLOSURES.into_iter().collect(),
        }
    }

    pub fn merged_with<I>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = MonthDay>,
    {
        self.closures.extend(extra);
        self
    }

    pub fn is_closure(&self, date: NaiveDate) -> bool {
        self.closures.contains(&MonthDay::of(date))
    }

    pub fn is_weekend(date: NaiveDate) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    pub fn num_closures(&self) -> usize {
        self.closures.len()
    }
}
