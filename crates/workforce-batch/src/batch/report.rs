use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{EmployeeId, YearMonth};

/// The three scheduled jobs this crate ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchKind {
    AttendanceCreate,
    PaidAcquisition,
    PaidGrant,
}

impl BatchKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::AttendanceCreate => "Attendance Ledger Creation",
            Self::PaidAcquisition => "Paid Leave Acquisition",
            Self::PaidGrant => "Paid Leave Grant",
        }
    }
}

/// What a batch did for one employee.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum EmployeeAction {
    LedgersCreated {
        months: Vec<YearMonth>,
    },
    LedgersCurrent,
    LeaveReconciled {
        consumed: f32,
        remaining: f32,
    },
    NoPaidLeaveTaken,
    LeaveGranted {
        granted_days: u32,
        remaining: f32,
        next_grant_date: NaiveDate,
    },
    GrantNotDue {
        next_grant_date: NaiveDate,
    },
}

impl EmployeeAction {
    /// True when the action wrote something.
    pub fn changed_state(&self) -> bool {
        matches!(
            self,
            Self::LedgersCreated { .. } | Self::LeaveReconciled { .. } | Self::LeaveGranted { .. }
        )
    }
}

/// Per-employee result kept machine-readable instead of swallowed into the
/// log stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum OutcomeStatus {
    Applied { action: EmployeeAction },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeOutcome {
    pub employee_id: EmployeeId,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

/// Aggregated counts for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RunSummary {
    pub processed: usize,
    pub changed: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub admins_skipped: usize,
}

/// Structured report for one batch run. One outcome per non-admin employee
/// processed; individual failures never abort the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchRunReport {
    pub kind: BatchKind,
    pub run_on: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_month: Option<YearMonth>,
    pub admins_skipped: usize,
    pub outcomes: Vec<EmployeeOutcome>,
}

impl BatchRunReport {
    pub fn new(kind: BatchKind, run_on: NaiveDate, target_month: Option<YearMonth>) -> Self {
        Self {
            kind,
            run_on,
            target_month,
            admins_skipped: 0,
            outcomes: Vec::new(),
        }
    }

    pub fn push_applied(&mut self, employee_id: EmployeeId, action: EmployeeAction) {
        self.outcomes.push(EmployeeOutcome {
            employee_id,
            status: OutcomeStatus::Applied { action },
        });
    }

    pub fn push_failed(&mut self, employee_id: EmployeeId, reason: String) {
        self.outcomes.push(EmployeeOutcome {
            employee_id,
            status: OutcomeStatus::Failed { reason },
        });
    }

    pub fn succeeded(&self) -> bool {
        self.outcomes
            .iter()
            .all(|outcome| !matches!(outcome.status, OutcomeStatus::Failed { .. }))
    }

    pub fn failures(&self) -> impl Iterator<Item = &EmployeeOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.status, OutcomeStatus::Failed { .. }))
    }

    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary {
            processed: self.outcomes.len(),
            admins_skipped: self.admins_skipped,
            ..RunSummary::default()
        };
        for outcome in &self.outcomes {
            match &outcome.status {
                OutcomeStatus::Applied { action } if action.changed_state() => {
                    summary.changed += 1;
                }
                OutcomeStatus::Applied { .. } => summary.unchanged += 1,
                OutcomeStatus::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }
}
