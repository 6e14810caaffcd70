use serde::Serialize;
use tracing::debug;

use super::domain::{Employee, YearMonth};
use super::registry::VacationCategoryRegistry;
use super::repository::{AttendanceLedgerStore, EmployeeDirectory};
use super::BatchError;

/// Result of reconciling one employee's balance for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaveReconciliation {
    pub consumed: f32,
    pub previous_remaining: f32,
    pub remaining: f32,
}

/// Deducts the paid leave an employee actually took in the target month
/// from their remaining balance, floored at zero.
pub struct PaidLeaveReconciler<'a, L, E> {
    ledgers: &'a L,
    employees: &'a E,
    categories: &'a VacationCategoryRegistry,
}

impl<'a, L, E> PaidLeaveReconciler<'a, L, E>
where
    L: AttendanceLedgerStore,
    E: EmployeeDirectory,
{
    pub fn new(ledgers: &'a L, employees: &'a E, categories: &'a VacationCategoryRegistry) -> Self {
        Self {
            ledgers,
            employees,
            categories,
        }
    }

    /// Returns `None` when the employee took no paid leave in the month, in
    /// which case nothing is written.
    pub fn reconcile(
        &self,
        employee: &Employee,
        month: YearMonth,
    ) -> Result<Option<LeaveReconciliation>, BatchError> {
        let entries = self.ledgers.leave_entries(employee.id, month)?;

        let mut consumed = 0.0_f32;
        for entry in &entries {
            let Some(code) = entry.vacation_category.as_deref() else {
                continue;
            };
            let category = self.categories.resolve(code)?;
            if category.paid {
                consumed += category.paid_day_value;
            }
        }

        if consumed <= 0.0 {
            return Ok(None);
        }

        let previous_remaining = employee.paid_leave_remaining;
        let remaining = (previous_remaining - consumed).max(0.0);
        self.employees.update_leave_balance(employee.id, remaining)?;
        debug!(
            employee = %employee.id,
            month = %month,
            consumed,
            remaining,
            "paid leave reconciled"
        );

        Ok(Some(LeaveReconciliation {
            consumed,
            previous_remaining,
            remaining,
        }))
    }
}
