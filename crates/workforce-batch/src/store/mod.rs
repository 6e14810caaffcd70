//! CSV-backed persistence for the batch runner. Tables are hydrated into
//! memory when the store opens; mutated tables are written back on
//! [`CsvStore::flush`].

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

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
use chrono::NaiveDate;

const EMPLOYEES_FILE: &str = "employees.csv";
const DEPARTMENTS_FILE: &str = "departments.csv";
const VACATION_CATEGORIES_FILE: &str = "vacation_categories.csv";
const COMPANY_CLOSURES_FILE: &str = "company_closures.csv";
const GRANT_BRACKETS_FILE: &str = "grant_brackets.csv";
const ATTENDANCE_FILE: &str = "attendance.csv";
const BATCH_HISTORY_FILE: &str = "batch_history.csv";

/// Error enumeration for store failures, always carrying the file involved.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("required table missing: {path}")]
    MissingTable { path: PathBuf },
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: csv::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: csv::Error,
    },
}

/// One row of the flat attendance table; a monthly ledger is the set of rows
/// sharing an employee and month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct AttendanceRow {
    employee_id: EmployeeId,
    date: NaiveDate,
    day_class: DayClass,
    vacation_category: Option<String>,
}

impl AttendanceRow {
    fn to_entry(&self) -> LedgerEntry {
        LedgerEntry {
            date: self.date,
            day_class: self.day_class,
            vacation_category: self.vacation_category.clone(),
        }
    }
}

/// CSV-file-backed implementation of every repository trait. Reference
/// tables (departments, vacation categories, closures, grant brackets) are
/// read-only; employees, attendance, and batch history are written back by
/// [`CsvStore::flush`].
pub struct CsvStore {
    data_dir: PathBuf,
    employees: Mutex<Vec<Employee>>,
    departments: Vec<DepartmentRecord>,
    vacation_categories: Vec<VacationCategoryRecord>,
    closures: Vec<MonthDay>,
    grant_brackets: Vec<GrantBracket>,
    attendance: Mutex<Vec<AttendanceRow>>,
    history: Mutex<Vec<BatchHistoryEntry>>,
}

impl CsvStore {
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();

        let employees = read_table(&data_dir.join(EMPLOYEES_FILE))?;
        let departments = read_table(&data_dir.join(DEPARTMENTS_FILE))?;
        let vacation_categories = read_table(&data_dir.join(VACATION_CATEGORIES_FILE))?;
        let grant_brackets = read_table(&data_dir.join(GRANT_BRACKETS_FILE))?;
        let closures = read_table_or_empty(&data_dir.join(COMPANY_CLOSURES_FILE))?;
        let attendance = read_table_or_empty(&data_dir.join(ATTENDANCE_FILE))?;
        let history = read_table_or_empty(&data_dir.join(BATCH_HISTORY_FILE))?;

        Ok(Self {
            data_dir,
            employees: Mutex::new(employees),
            departments,
            vacation_categories,
            closures,
            grant_brackets,
            attendance: Mutex::new(attendance),
            history: Mutex::new(history),
        })
    }

    /// Writes the mutated tables back to the data directory.
    pub fn flush(&self) -> Result<(), StoreError> {
        let employees = self.employees.lock().expect("employee table mutex poisoned");
        write_table(&self.data_dir.join(EMPLOYEES_FILE), employees.iter())?;

        let attendance = self
            .attendance
            .lock()
            .expect("attendance table mutex poisoned");
        write_table(&self.data_dir.join(ATTENDANCE_FILE), attendance.iter())?;

        let history = self.history.lock().expect("history table mutex poisoned");
        write_table(&self.data_dir.join(BATCH_HISTORY_FILE), history.iter())?;

        Ok(())
    }
}

fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    if !path.is_file() {
        return Err(StoreError::MissingTable {
            path: path.to_path_buf(),
        });
    }
    read_rows(path)
}

fn read_table_or_empty<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    if !path.is_file() {
        return Ok(Vec::new());
    }
    read_rows(path)
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row.map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?);
    }
    Ok(rows)
}

fn write_table<'a, T, I>(path: &Path, rows: I) -> Result<(), StoreError>
where
    T: Serialize + 'a,
    I: Iterator<Item = &'a T>,
{
    let mut writer = csv::Writer::from_path(path).map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    for row in rows {
        writer.serialize(row).map_err(|source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    writer.flush().map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source: csv::Error::from(source),
    })?;
    Ok(())
}

impl EmployeeDirectory for CsvStore {
    fn roster(&self) -> Result<Vec<Employee>, RepositoryError> {
        let employees = self.employees.lock().expect("employee table mutex poisoned");
        Ok(employees.clone())
    }

    fn update_leave_balance(&self, id: EmployeeId, remaining: f32) -> Result<(), RepositoryError> {
        let mut employees = self.employees.lock().expect("employee table mutex poisoned");
        let employee = employees
            .iter_mut()
            .find(|employee| employee.id == id)
            .ok_or(RepositoryError::NotFound)?;
        employee.paid_leave_remaining = remaining;
        Ok(())
    }

    fn apply_grant(&self, id: EmployeeId, update: &GrantUpdate) -> Result<(), RepositoryError> {
        let mut employees = self.employees.lock().expect("employee table mutex poisoned");
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

impl AttendanceLedgerStore for CsvStore {
    fn ledger_exists(&self, id: EmployeeId, month: YearMonth) -> Result<bool, RepositoryError> {
        let attendance = self
            .attendance
            .lock()
            .expect("attendance table mutex poisoned");
        Ok(attendance
            .iter()
            .any(|row| row.employee_id == id && month.contains(row.date)))
    }

    fn insert_ledger(&self, ledger: MonthlyLedger) -> Result<(), RepositoryError> {
        let mut attendance = self
            .attendance
            .lock()
            .expect("attendance table mutex poisoned");
        if attendance
            .iter()
            .any(|row| row.employee_id == ledger.employee_id && ledger.month.contains(row.date))
        {
            return Err(RepositoryError::Conflict);
        }
        attendance.extend(ledger.entries.into_iter().map(|entry| AttendanceRow {
            employee_id: ledger.employee_id,
            date: entry.date,
            day_class: entry.day_class,
            vacation_category: entry.vacation_category,
        }));
        Ok(())
    }

    fn leave_entries(
        &self,
        id: EmployeeId,
        month: YearMonth,
    ) -> Result<Vec<LedgerEntry>, RepositoryError> {
        let attendance = self
            .attendance
            .lock()
            .expect("attendance table mutex poisoned");
        Ok(attendance
            .iter()
            .filter(|row| {
                row.employee_id == id && month.contains(row.date) && row.vacation_category.is_some()
            })
            .map(AttendanceRow::to_entry)
            .collect())
    }
}

impl ReferenceDataSource for CsvStore {
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

impl BatchHistoryStore for CsvStore {
    fn record(&self, entry: BatchHistoryEntry) -> Result<(), RepositoryError> {
        let mut history = self.history.lock().expect("history table mutex poisoned");
        history.push(entry);
        Ok(())
    }

    fn already_completed(
        &self,
        kind: BatchKind,
        target_month: YearMonth,
    ) -> Result<bool, RepositoryError> {
        let history = self.history.lock().expect("history table mutex poisoned");
        Ok(history
            .iter()
            .any(|entry| entry.kind == kind && entry.target_month == target_month && entry.succeeded))
    }
}
