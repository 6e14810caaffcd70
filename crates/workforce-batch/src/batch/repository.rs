use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::calendar::MonthDay;
use super::domain::{
    DepartmentRecord, Employee, EmployeeId, GrantBracket, LedgerEntry, MonthlyLedger,
    VacationCategoryRecord, YearMonth,
};
use super::report::BatchKind;

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Fields the grant engine persists together after an award.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrantUpdate {
    pub next_grant_date: NaiveDate,
    pub granted_days: u32,
    pub remaining: f32,
}

/// One line of the batch execution history table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchHistoryEntry {
    pub kind: BatchKind,
    pub run_on: NaiveDate,
    pub target_month: YearMonth,
    pub succeeded: bool,
}

/// Employee-table access so the engines can be exercised in isolation.
pub trait EmployeeDirectory: Send + Sync {
    fn roster(&self) -> Result<Vec<Employee>, RepositoryError>;
    fn update_leave_balance(
        &self,
        id: EmployeeId,
        remaining: f32,
    ) -> Result<(), RepositoryError>;
    fn apply_grant(&self, id: EmployeeId, update: &GrantUpdate) -> Result<(), RepositoryError>;
}

/// Attendance-ledger table access.
pub trait AttendanceLedgerStore: Send + Sync {
    fn ledger_exists(&self, id: EmployeeId, month: YearMonth) -> Result<bool, RepositoryError>;
    fn insert_ledger(&self, ledger: MonthlyLedger) -> Result<(), RepositoryError>;
    /// Entries for the month that carry a vacation category.
    fn leave_entries(
        &self,
        id: EmployeeId,
        month: YearMonth,
    ) -> Result<Vec<LedgerEntry>, RepositoryError>;
}

/// Read-only reference tables loaded once per batch run.
pub trait ReferenceDataSource: Send + Sync {
    fn departments(&self) -> Result<Vec<DepartmentRecord>, RepositoryError>;
    fn vacation_categories(&self) -> Result<Vec<VacationCategoryRecord>, RepositoryError>;
    fn company_closures(&self) -> Result<Vec<MonthDay>, RepositoryError>;
    fn grant_brackets(&self) -> Result<Vec<GrantBracket>, RepositoryError>;
}

/// Batch execution history, recorded at the end of every run and consulted
/// by the acquisition driver as its exactly-once guard.
pub trait BatchHistoryStore: Send + Sync {
    fn record(&self, entry: BatchHistoryEntry) -> Result<(), RepositoryError>;
    fn already_completed(
        &self,
        kind: BatchKind,
        target_month: YearMonth,
    ) -> Result<bool, RepositoryError>;
}
