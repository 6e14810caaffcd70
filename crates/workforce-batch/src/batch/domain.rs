use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Numeric account identifier, shared by the employee table and the
/// attendance ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmployeeId(pub u64);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Employee account row. The grant engine and the reconciler mutate the
/// three leave fields; nothing in the batch suite creates or deletes
/// employees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub department: String,
    pub employment_type: String,
    pub hire_date: NaiveDate,
    pub paid_leave_remaining: f32,
    pub paid_leave_granted: u32,
    pub next_grant_date: NaiveDate,
}

/// Department reference row. Accounts in admin departments are excluded
/// from every batch roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentRecord {
    pub code: String,
    pub name: String,
    pub is_admin: bool,
}

/// Vacation category reference row. `paid_day_value` is the number of days
/// one ledger entry of this category consumes (1.0 full day, 0.5 half day).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacationCategoryRecord {
    pub code: String,
    pub name: String,
    pub paid: bool,
    pub paid_day_value: f32,
}

/// Classification of one ledger day at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayClass {
    Workday,
    Weekend,
    Closure,
}

/// One day of an employee's monthly ledger. `vacation_category` is set when
/// leave has been booked against the day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub date: NaiveDate,
    pub day_class: DayClass,
    pub vacation_category: Option<String>,
}

/// Per-employee, per-month attendance ledger container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyLedger {
    pub employee_id: EmployeeId,
    pub month: YearMonth,
    pub entries: Vec<LedgerEntry>,
}

/// One row of the tenure-to-grant-days schedule: employees of
/// `employment_type` with at least `min_tenure_months` whole months of
/// tenure receive `granted_days`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantBracket {
    pub employment_type: String,
    pub min_tenure_months: u32,
    pub granted_days: u32,
}

/// A calendar month, validated on construction, formatted as ISO `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum YearMonthError {
    #[error("'{0}' is not a YYYY-MM month")]
    Malformed(String),
    #[error("month {month} of year {year} is out of range")]
    OutOfRange { year: i32, month: u32 },
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, YearMonthError> {
        if !(1..=12).contains(&month) || !(1000..=9999).contains(&year) {
            return Err(YearMonthError::OutOfRange { year, month });
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub const fn year(self) -> i32 {
        self.year
    }

    pub const fn month(self) -> u32 {
        self.month
    }

    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("month validated on construction")
    }

    pub fn num_days(self) -> u32 {
        let next = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        };
        next.expect("month validated on construction")
            .pred_opt()
            .expect("month has a last day")
            .day()
    }

    pub fn days(self) -> impl Iterator<Item = NaiveDate> {
        let len = self.num_days() as usize;
        self.first_day().iter_days().take(len)
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = YearMonthError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let (year, month) = trimmed
            .split_once('-')
            .ok_or_else(|| YearMonthError::Malformed(trimmed.to_string()))?;
        let year: i32 = year
            .parse()
            .map_err(|_| YearMonthError::Malformed(trimmed.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| YearMonthError::Malformed(trimmed.to_string()))?;
        Self::new(year, month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Adds `months` to `date`, clamping the day to the target month's length
/// (Jan 31 + 1 month = Feb 28/29). Matches how the grant schedule measures
/// tenure and advances grant dates.
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    let total = date.year() * 12 + date.month0() as i32 + months as i32;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    let month_len = YearMonth { year, month }.num_days();
    let day = date.day().min(month_len);
    NaiveDate::from_ymd_opt(year, month, day).expect("clamped day is valid")
}

/// Whole months elapsed from `from` to `to`, zero when `to` precedes `from`.
/// A month counts once the (day-clamped) anniversary has been reached.
pub fn whole_months_between(from: NaiveDate, to: NaiveDate) -> u32 {
    if to < from {
        return 0;
    }
    let mut months =
        (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32);
    if months > 0 && add_months(from, months as u32) > to {
        months -= 1;
    }
    months.max(0) as u32
}
