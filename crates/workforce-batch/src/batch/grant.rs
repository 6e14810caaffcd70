use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use super::domain::{add_months, whole_months_between, Employee};
use super::registry::GrantSchedule;
use super::repository::{EmployeeDirectory, GrantUpdate};
use super::BatchError;

/// What the grant engine decided for one employee.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "decision")]
pub enum GrantDecision {
    NotDue { next_grant_date: NaiveDate },
    Granted(GrantAward),
}

/// Details of an applied grant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrantAward {
    pub tenure_months: u32,
    pub granted_days: u32,
    pub carried_over: f32,
    pub remaining: f32,
    pub next_grant_date: NaiveDate,
}

/// Awards new paid leave days to employees whose grant date has arrived.
/// Unused balance beyond the previous grant amount is discarded before the
/// new days are added.
pub struct PaidLeaveGrantEngine<'a, E> {
    employees: &'a E,
    schedule: &'a GrantSchedule,
}

impl<'a, E: EmployeeDirectory> PaidLeaveGrantEngine<'a, E> {
    pub fn new(employees: &'a E, schedule: &'a GrantSchedule) -> Self {
        Self {
            employees,
            schedule,
        }
    }

    pub fn process(
        &self,
        employee: &Employee,
        today: NaiveDate,
    ) -> Result<GrantDecision, BatchError> {
        // The grant day itself counts as arrived.
        if today < employee.next_grant_date {
            return Ok(GrantDecision::NotDue {
                next_grant_date: employee.next_grant_date,
            });
        }

        let carried_over = employee
            .paid_leave_remaining
            .min(employee.paid_leave_granted as f32);
        let tenure_months = whole_months_between(employee.hire_date, today);
        let granted_days = self
            .schedule
            .days_for(&employee.employment_type, tenure_months)
            .ok_or_else(|| BatchError::GrantBracketMissing {
                employment_type: employee.employment_type.clone(),
                tenure_months,
            })?;

        let remaining = carried_over + granted_days as f32;
        // Advanced from the stored grant date, not from today, so a late
        // batch run does not drift the schedule.
        let next_grant_date = add_months(employee.next_grant_date, 12);

        let update = GrantUpdate {
            next_grant_date,
            granted_days,
            remaining,
        };
        self.employees.apply_grant(employee.id, &update)?;
        debug!(
            employee = %employee.id,
            tenure_months,
            granted_days,
            remaining,
            "paid leave granted"
        );

        Ok(GrantDecision::Granted(GrantAward {
            tenure_months,
            granted_days,
            carried_over,
            remaining,
            next_grant_date,
        }))
    }
}
