use chrono::NaiveDate;
use tracing::debug;

use super::calendar::HolidayCalendar;
use super::domain::{DayClass, EmployeeId, LedgerEntry, MonthlyLedger, YearMonth};
use super::repository::AttendanceLedgerStore;
use super::BatchError;

/// Creates missing monthly attendance ledgers. Existence is checked before
/// every insert, so a rerun within the same month is a no-op.
pub struct MonthlyLedgerBuilder<'a, L> {
    ledgers: &'a L,
    calendar: &'a HolidayCalendar,
}

impl<'a, L: AttendanceLedgerStore> MonthlyLedgerBuilder<'a, L> {
    pub fn new(ledgers: &'a L, calendar: &'a HolidayCalendar) -> Self {
        Self { ledgers, calendar }
    }

    /// Ensures ledgers exist for the previous and current month, returning
    /// the months actually created.
    pub fn ensure_current_and_previous(
        &self,
        id: EmployeeId,
        today: NaiveDate,
    ) -> Result<Vec<YearMonth>, BatchError> {
        let current = YearMonth::of(today);
        let mut created = Vec::new();
        for month in [current.previous(), current] {
            if self.ensure_month(id, month)? {
                created.push(month);
            }
        }
        Ok(created)
    }

    /// Inserts a ledger for `month` unless one already exists. Returns true
    /// when a ledger was created.
    pub fn ensure_month(&self, id: EmployeeId, month: YearMonth) -> Result<bool, BatchError> {
        if self.ledgers.ledger_exists(id, month)? {
            return Ok(false);
        }
        let ledger = self.build(id, month);
        debug!(employee = %id, month = %month, days = ledger.entries.len(), "seeding ledger");
        self.ledgers.insert_ledger(ledger)?;
        Ok(true)
    }

    fn build(&self, id: EmployeeId, month: YearMonth) -> MonthlyLedger {
        let entries = month
            .days()
            .map(|date| LedgerEntry {
                date,
                day_class: self.classify(date),
                vacation_category: None,
            })
            .collect();

        MonthlyLedger {
            employee_id: id,
            month,
            entries,
        }
    }

    fn classify(&self, date: NaiveDate) -> DayClass {
        if self.calendar.is_closure(date) {
            DayClass::Closure
        } else if HolidayCalendar::is_weekend(date) {
            DayClass::Weekend
        } else {
            DayClass::Workday
        }
    }
}
