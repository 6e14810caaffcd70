//! The three scheduled batch jobs and the pieces they share: domain model,
//! lookup registries, holiday calendar, repository traits, engines, drivers,
//! and the structured run report.

pub mod acquisition;
pub mod calendar;
pub mod domain;
pub mod drivers;
pub mod grant;
pub mod ledger;
pub mod registry;
pub mod report;
pub mod repository;

#[cfg(test)]
mod tests;

pub use acquisition::{LeaveReconciliation, PaidLeaveReconciler};
pub use calendar::{HolidayCalendar, MonthDay};
pub use domain::{
    DayClass, DepartmentRecord, Employee, EmployeeId, GrantBracket, LedgerEntry, MonthlyLedger,
    VacationCategoryRecord, YearMonth,
};
pub use drivers::{AttendanceCreateBatch, PaidAcquisitionBatch, PaidGrantBatch};
pub use grant::{GrantAward, GrantDecision, PaidLeaveGrantEngine};
pub use ledger::MonthlyLedgerBuilder;
pub use registry::{DepartmentRegistry, GrantSchedule, RegistryError, VacationCategoryRegistry};
pub use report::{
    BatchKind, BatchRunReport, EmployeeAction, EmployeeOutcome, OutcomeStatus, RunSummary,
};
pub use repository::{
    AttendanceLedgerStore, BatchHistoryEntry, BatchHistoryStore, EmployeeDirectory, GrantUpdate,
    ReferenceDataSource, RepositoryError,
};

/// Error raised while running a batch. Per-employee occurrences are folded
/// into the run report; anything raised outside the employee loop aborts
/// the run.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("no grant bracket for employment type '{employment_type}' at {tenure_months} months")]
    GrantBracketMissing {
        employment_type: String,
        tenure_months: u32,
    },
    #[error("paid leave acquisition for {month} was already completed")]
    MonthAlreadyReconciled { month: domain::YearMonth },
}
