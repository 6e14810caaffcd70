use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::batch::calendar::MonthDay;
use crate::batch::domain::{
    DayClass, DepartmentRecord, Employee, EmployeeId, GrantBracket, LedgerEntry, MonthlyLedger,
    VacationCategoryRecord, YearMonth,
};
use crate::batch::report::BatchKind;
use crate::batch::repository::{
    AttendanceLedgerStore, BatchHistoryEntry, BatchHistoryStore, EmployeeDirectory, GrantUpdate,
    ReferenceDataSource, RepositoryError,
};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn month(year: i32, month: u32) -> YearMonth {
    YearMonth::new(year, month).expect("valid month")
}

pub(super) fn employee(id: u64) -> Employee {
    Employee {
        id: EmployeeId(id),
        name: format!("Employee {id}"),
        department: "sales".to_string(),
        employment_type: "regular".to_string(),
        hire_date: date(2022, 4, 1),
        paid_leave_remaining: 10.0,
        paid_leave_granted: 12,
        next_grant_date: date(2026, 4, 1),
    }
}

pub(super) fn departments() -> Vec<DepartmentRecord> {
    vec![
        DepartmentRecord {
            code: "sales".to_string(),
            name: "Sales".to_string(),
            is_admin: false,
        },
        DepartmentRecord {
            code: "engineering".to_string(),
            name: "Engineering".to_string(),
            is_admin: false,
        },
        DepartmentRecord {
            code: "system-admin".to_string(),
            name: "System Administration".to_string(),
            is_admin: true,
        },
    ]
}

pub(super) fn vacation_categories() -> Vec<VacationCategoryRecord> {
    vec![
        VacationCategoryRecord {
            code: "paid-full".to_string(),
            name: "Paid leave (full day)".to_string(),
            paid: true,
            paid_day_value: 1.0,
        },
        VacationCategoryRecord {
            code: "paid-half".to_string(),
            name: "Paid leave (half day)".to_string(),
            paid: true,
            paid_day_value: 0.5,
        },
        VacationCategoryRecord {
            code: "unpaid-personal".to_string(),
            name: "Unpaid personal leave".to_string(),
            paid: false,
            paid_day_value: 0.0,
        },
    ]
}

pub(super) fn grant_brackets() -> Vec<GrantBracket> {
    [
        (6, 10),
        (18, 11),
        (30, 12),
        (42, 14),
        (54, 16),
        (66, 18),
        (78, 20),
    ]
    .into_iter()
    .map(|(min_tenure_months, granted_days)| GrantBracket {
        employment_type: "regular".to_string(),
        min_tenure_months,
        granted_days,
    })
    .collect()
}

/// A ledger containing only booked-leave entries, enough for reconciliation
/// tests that never read the full month.
pub(super) fn leave_ledger(
    id: EmployeeId,
    month: YearMonth,
    bookings: &[(u32, &str)],
) -> MonthlyLedger {
    let entries = bookings
        .iter()
        .map(|(day, code)| LedgerEntry {
            date: NaiveDate::from_ymd_opt(month.year(), month.month(), *day)
                .expect("valid booking day"),
            day_class: DayClass::Workday,
            vacation_category: Some((*code).to_string()),
        })
        .collect();
    MonthlyLedger {
        employee_id: id,
        month,
        entries,
    }
}

#[derive(Default)]
pub(super) struct MemoryStore {
    pub(super) employees: Mutex<Vec<Employee>>,
    pub(super) departments: Vec<DepartmentRecord>,
    pub(super) vacation_categories: Vec<VacationCategoryRecord>,
    pub(super) closures: Vec<MonthDay>,
    pub(super) grant_brackets: Vec<GrantBracket>,
    pub(super) ledgers: Mutex<HashMap<(EmployeeId, YearMonth), MonthlyLedger>>,
    pub(super) history: Mutex<Vec<BatchHistoryEntry>>,
}

impl MemoryStore {
    pub(super) fn with_reference_data() -> Self {
        Self {
            departments: departments(),
            vacation_categories: vacation_categories(),
            grant_brackets: grant_brackets(),
            ..Self::default()
        }
    }

    pub(super) fn seeded(employees: Vec<Employee>) -> Arc<Self> {
        let store = Self::with_reference_data();
        *store.employees.lock().expect("employee mutex poisoned") = employees;
        Arc::new(store)
    }

    pub(super) fn employee_snapshot(&self, id: EmployeeId) -> Employee {
        self.employees
            .lock()
            .expect("employee mutex poisoned")
            .iter()
            .find(|employee| employee.id == id)
            .cloned()
            .expect("employee present")
    }

    pub(super) fn ledger_snapshot(&self, id: EmployeeId, month: YearMonth) -> Option<MonthlyLedger> {
        self.ledgers
            .lock()
            .expect("ledger mutex poisoned")
            .get(&(id, month))
            .cloned()
    }

    pub(super) fn history_snapshot(&self) -> Vec<BatchHistoryEntry> {
        self.history.lock().expect("history mutex poisoned").clone()
    }
}

impl EmployeeDirectory for MemoryStore {
    fn roster(&self) -> Result<Vec<Employee>, RepositoryError> {
        Ok(self.employees.lock().expect("employee mutex poisoned").clone())
    }

    fn update_leave_balance(&self, id: EmployeeId, remaining: f32) -> Result<(), RepositoryError> {
        let mut employees = self.employees.lock().expect("employee mutex poisoned");
        let employee = employees
            .iter_mut()
            .find(|employee| employee.id == id)
            .ok_or(RepositoryError::NotFound)?;
        employee.paid_leave_remaining = remaining;
        Ok(())
    }

    fn apply_grant(&self, id: EmployeeId, update: &GrantUpdate) -> Result<(), RepositoryError> {
        let mut employees = self.employees.lock().expect("employee mutex poisoned");
        let employee = employees
            .iter_mut()
            .find(|employee| employee.id == id)
            .ok_or(RepositoryError::NotFound)?;
        employee.next_grant_date = update.next_grant_date;
        employee.paid_leave_granted = update.granted_days;
        employee.paid_leave_remaining = update.remaining;
        Ok(())
    }
}

impl AttendanceLedgerStore for MemoryStore {
    fn ledger_exists(&self, id: EmployeeId, month: YearMonth) -> Result<bool, RepositoryError> {
        Ok(self
            .ledgers
            .lock()
            .expect("ledger mutex poisoned")
            .contains_key(&(id, month)))
    }

    fn insert_ledger(&self, ledger: MonthlyLedger) -> Result<(), RepositoryError> {
        let mut ledgers = self.ledgers.lock().expect("ledger mutex poisoned");
        let key = (ledger.employee_id, ledger.month);
        if ledgers.contains_key(&key) {
            return Err(RepositoryError::Conflict);
        }
        ledgers.insert(key, ledger);
        Ok(())
    }

    fn leave_entries(
        &self,
        id: EmployeeId,
        month: YearMonth,
    ) -> Result<Vec<LedgerEntry>, RepositoryError> {
        let ledgers = self.ledgers.lock().expect("ledger mutex poisoned");
        Ok(ledgers
            .get(&(id, month))
            .map(|ledger| {
                ledger
                    .entries
                    .iter()
                    .filter(|entry| entry.vacation_category.is_some())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

impl ReferenceDataSource for MemoryStore {
    fn departments(&self) -> Result<Vec<DepartmentRecord>, RepositoryError> {
        Ok(self.departments.clone())
    }

    fn vacation_categories(&self) -> Result<Vec<VacationCategoryRecord>, RepositoryError> {
        Ok(self.vacation_categories.clone())
    }

    fn company_closures(&self) -> Result<Vec<MonthDay>, RepositoryError> {
        Ok(self.closures.clone())
    }

    fn grant_brackets(&self) -> Result<Vec<GrantBracket>, RepositoryError> {
        Ok(self.grant_brackets.clone())
    }
}

impl BatchHistoryStore for MemoryStore {
    fn record(&self, entry: BatchHistoryEntry) -> Result<(), RepositoryError> {
        self.history
            .lock()
            .expect("history mutex poisoned")
            .push(entry);
        Ok(())
    }

    fn already_completed(
        &self,
        kind: BatchKind,
        target_month: YearMonth,
    ) -> Result<bool, RepositoryError> {
        Ok(self
            .history
            .lock()
            .expect("history mutex poisoned")
            .iter()
            .any(|entry| entry.kind == kind && entry.target_month == target_month && entry.succeeded))
    }
}
