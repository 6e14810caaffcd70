use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::acquisition::PaidLeaveReconciler;
use super::calendar::HolidayCalendar;
use super::domain::{Employee, YearMonth};
use super::grant::{GrantDecision, PaidLeaveGrantEngine};
use super::ledger::MonthlyLedgerBuilder;
use super::registry::{DepartmentRegistry, GrantSchedule, VacationCategoryRegistry};
use super::report::{BatchKind, BatchRunReport, EmployeeAction};
use super::repository::{
    AttendanceLedgerStore, BatchHistoryEntry, BatchHistoryStore, EmployeeDirectory,
    ReferenceDataSource,
};
use super::BatchError;

/// Splits the roster into admin accounts (skipped, counted) and everyone
/// else. An unresolvable department code becomes a per-employee failure
/// rather than aborting the run.
fn non_admin_roster(
    roster: Vec<Employee>,
    departments: &DepartmentRegistry,
    report: &mut BatchRunReport,
) -> Vec<Employee> {
    let mut kept = Vec::with_capacity(roster.len());
    for employee in roster {
        match departments.is_admin(&employee.department) {
            Ok(true) => report.admins_skipped += 1,
            Ok(false) => kept.push(employee),
            Err(err) => {
                warn!(employee = %employee.id, error = %err, "department lookup failed");
                report.push_failed(employee.id, err.to_string());
            }
        }
    }
    kept
}

/// History writes are best-effort; a failed write must not fail an
/// otherwise successful run.
fn record_history<H: BatchHistoryStore>(history: &H, entry: BatchHistoryEntry) {
    if let Err(err) = history.record(entry) {
        warn!(error = %err, "failed to record batch history");
    }
}

/// Creates missing monthly attendance ledgers for every non-admin employee.
pub struct AttendanceCreateBatch<E, L, R, H> {
    employees: Arc<E>,
    ledgers: Arc<L>,
    reference: Arc<R>,
    history: Arc<H>,
}

impl<E, L, R, H> AttendanceCreateBatch<E, L, R, H>
where
    E: EmployeeDirectory,
    L: AttendanceLedgerStore,
    R: ReferenceDataSource,
    H: BatchHistoryStore,
{
    pub fn new(employees: Arc<E>, ledgers: Arc<L>, reference: Arc<R>, history: Arc<H>) -> Self {
        Self {
            employees,
            ledgers,
            reference,
            history,
        }
    }

    pub fn run(&self, today: NaiveDate) -> Result<BatchRunReport, BatchError> {
        info!(batch = BatchKind::AttendanceCreate.label(), "batch starting");

        let departments = DepartmentRegistry::from_records(self.reference.departments()?);
        let calendar =
            HolidayCalendar::standard().merged_with(self.reference.company_closures()?);
        debug!(closures = calendar.num_closures(), "closure calendar merged");
        let builder = MonthlyLedgerBuilder::new(self.ledgers.as_ref(), &calendar);

        let mut report = BatchRunReport::new(BatchKind::AttendanceCreate, today, None);
        let roster = non_admin_roster(self.employees.roster()?, &departments, &mut report);

        for employee in &roster {
            match builder.ensure_current_and_previous(employee.id, today) {
                Ok(created) if created.is_empty() => {
                    report.push_applied(employee.id, EmployeeAction::LedgersCurrent);
                }
                Ok(created) => {
                    report.push_applied(employee.id, EmployeeAction::LedgersCreated {
                        months: created,
                    });
                }
                Err(err) => {
                    warn!(employee = %employee.id, error = %err, "ledger creation failed");
                    report.push_failed(employee.id, err.to_string());
                }
            }
        }

        record_history(
            self.history.as_ref(),
            BatchHistoryEntry {
                kind: BatchKind::AttendanceCreate,
                run_on: today,
                target_month: YearMonth::of(today),
                succeeded: report.succeeded(),
            },
        );

        let summary = report.summary();
        info!(
            batch = BatchKind::AttendanceCreate.label(),
            processed = summary.processed,
            changed = summary.changed,
            failed = summary.failed,
            "batch finished"
        );
        Ok(report)
    }
}

/// Deducts paid leave taken in the target month from each non-admin
/// employee's remaining balance. Guarded to run at most once per target
/// month via the batch history table.
pub struct PaidAcquisitionBatch<E, L, R, H> {
    employees: Arc<E>,
    ledgers: Arc<L>,
    reference: Arc<R>,
    history: Arc<H>,
}

impl<E, L, R, H> PaidAcquisitionBatch<E, L, R, H>
where
    E: EmployeeDirectory,
    L: AttendanceLedgerStore,
    R: ReferenceDataSource,
    H: BatchHistoryStore,
{
    pub fn new(employees: Arc<E>, ledgers: Arc<L>, reference: Arc<R>, history: Arc<H>) -> Self {
        Self {
            employees,
            ledgers,
            reference,
            history,
        }
    }

    pub fn run(
        &self,
        today: NaiveDate,
        target_month: YearMonth,
    ) -> Result<BatchRunReport, BatchError> {
        info!(
            batch = BatchKind::PaidAcquisition.label(),
            month = %target_month,
            "batch starting"
        );

        // Re-running the deduction for a month would double-subtract, so a
        // month with a recorded successful run is refused outright.
        if self
            .history
            .already_completed(BatchKind::PaidAcquisition, target_month)?
        {
            return Err(BatchError::MonthAlreadyReconciled {
                month: target_month,
            });
        }

        let departments = DepartmentRegistry::from_records(self.reference.departments()?);
        let categories =
            VacationCategoryRegistry::from_records(self.reference.vacation_categories()?);
        let reconciler =
            PaidLeaveReconciler::new(self.ledgers.as_ref(), self.employees.as_ref(), &categories);

        let mut report =
            BatchRunReport::new(BatchKind::PaidAcquisition, today, Some(target_month));
        let roster = non_admin_roster(self.employees.roster()?, &departments, &mut report);

        for employee in &roster {
            match reconciler.reconcile(employee, target_month) {
                Ok(Some(reconciliation)) => {
                    report.push_applied(employee.id, EmployeeAction::LeaveReconciled {
                        consumed: reconciliation.consumed,
                        remaining: reconciliation.remaining,
                    });
                }
                Ok(None) => {
                    report.push_applied(employee.id, EmployeeAction::NoPaidLeaveTaken);
                }
                Err(err) => {
                    warn!(employee = %employee.id, error = %err, "reconciliation failed");
                    report.push_failed(employee.id, err.to_string());
                }
            }
        }

        record_history(
            self.history.as_ref(),
            BatchHistoryEntry {
                kind: BatchKind::PaidAcquisition,
                run_on: today,
                target_month,
                succeeded: report.succeeded(),
            },
        );

        let summary = report.summary();
        info!(
            batch = BatchKind::PaidAcquisition.label(),
            processed = summary.processed,
            changed = summary.changed,
            failed = summary.failed,
            "batch finished"
        );
        Ok(report)
    }
}

/// Awards tenure-based paid leave days to every non-admin employee whose
/// grant date has arrived.
pub struct PaidGrantBatch<E, R, H> {
    employees: Arc<E>,
    reference: Arc<R>,
    history: Arc<H>,
}

impl<E, R, H> PaidGrantBatch<E, R, H>
where
    E: EmployeeDirectory,
    R: ReferenceDataSource,
    H: BatchHistoryStore,
{
    pub fn new(employees: Arc<E>, reference: Arc<R>, history: Arc<H>) -> Self {
        Self {
            employees,
            reference,
            history,
        }
    }

    pub fn run(&self, today: NaiveDate) -> Result<BatchRunReport, BatchError> {
        info!(batch = BatchKind::PaidGrant.label(), "batch starting");

        let departments = DepartmentRegistry::from_records(self.reference.departments()?);
        let schedule = GrantSchedule::from_brackets(self.reference.grant_brackets()?);
        let engine = PaidLeaveGrantEngine::new(self.employees.as_ref(), &schedule);

        let mut report = BatchRunReport::new(BatchKind::PaidGrant, today, None);
        let roster = non_admin_roster(self.employees.roster()?, &departments, &mut report);

        for employee in &roster {
            match engine.process(employee, today) {
                Ok(GrantDecision::Granted(award)) => {
                    report.push_applied(employee.id, EmployeeAction::LeaveGranted {
                        granted_days: award.granted_days,
                        remaining: award.remaining,
                        next_grant_date: award.next_grant_date,
                    });
                }
                Ok(GrantDecision::NotDue { next_grant_date }) => {
                    report.push_applied(employee.id, EmployeeAction::GrantNotDue {
                        next_grant_date,
                    });
                }
                Err(err) => {
                    warn!(employee = %employee.id, error = %err, "grant processing failed");
                    report.push_failed(employee.id, err.to_string());
                }
            }
        }

        record_history(
            self.history.as_ref(),
            BatchHistoryEntry {
                kind: BatchKind::PaidGrant,
                run_on: today,
                target_month: YearMonth::of(today),
                succeeded: report.succeeded(),
            },
        );

        let summary = report.summary();
        info!(
            batch = BatchKind::PaidGrant.label(),
            processed = summary.processed,
            changed = summary.changed,
            failed = summary.failed,
            "batch finished"
        );
        Ok(report)
    }
}
