use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::info;
use workforce_batch::batch::{
    AttendanceCreateBatch, BatchError, BatchRunReport, EmployeeAction, OutcomeStatus,
    PaidAcquisitionBatch, PaidGrantBatch, YearMonth,
};
use workforce_batch::config::AppConfig;
use workforce_batch::error::AppError;
use workforce_batch::store::CsvStore;
use workforce_batch::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "Workforce Batch Runner",
    about = "Run the groupware attendance ledger and paid leave batch jobs",
    version
)]
struct Cli {
    /// Directory holding the CSV tables (overrides APP_DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Evaluation date for the run (defaults to today)
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
    /// Emit the run report as JSON instead of text
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create missing monthly attendance ledgers for the previous and current month
    AttendanceCreate,
    /// Deduct paid leave taken in the target month from each employee's balance
    PaidAcquisition {
        /// Target month (YYYY-MM)
        #[arg(value_parser = parse_month)]
        target_month: YearMonth,
    },
    /// Grant new paid leave days to employees whose grant date has arrived
    PaidGrant,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn parse_month(raw: &str) -> Result<YearMonth, String> {
    raw.parse()
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM ({err})"))
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    let mut config = AppConfig::load()?;
    if let Some(data_dir) = cli.data_dir {
        config.storage.data_dir = data_dir;
    }
    telemetry::init(&config.telemetry)?;

    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    let store = Arc::new(CsvStore::open(&config.storage.data_dir)?);
    info!(?config.environment, data_dir = %config.storage.data_dir.display(), "batch runner ready");

    let outcome = match cli.command {
        Command::AttendanceCreate => {
            AttendanceCreateBatch::new(store.clone(), store.clone(), store.clone(), store.clone())
                .run(today)
        }
        Command::PaidAcquisition { target_month } => {
            PaidAcquisitionBatch::new(store.clone(), store.clone(), store.clone(), store.clone())
                .run(today, target_month)
        }
        Command::PaidGrant => {
            PaidGrantBatch::new(store.clone(), store.clone(), store.clone()).run(today)
        }
    };

    let report = match outcome {
        Ok(report) => report,
        Err(BatchError::MonthAlreadyReconciled { month }) => {
            println!(
                "Paid leave acquisition for {month} is already recorded as successful; nothing to do."
            );
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    store.flush()?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render_report(&report);
    }

    Ok(())
}

fn describe_action(action: &EmployeeAction) -> String {
    match action {
        EmployeeAction::LedgersCreated { months } => {
            let months: Vec<String> = months.iter().map(ToString::to_string).collect();
            format!("ledgers created for {}", months.join(", "))
        }
        EmployeeAction::LedgersCurrent => "ledgers already current".to_string(),
        EmployeeAction::LeaveReconciled {
            consumed,
            remaining,
        } => format!("{consumed} paid days deducted, {remaining} remaining"),
        EmployeeAction::NoPaidLeaveTaken => "no paid leave taken".to_string(),
        EmployeeAction::LeaveGranted {
            granted_days,
            remaining,
            next_grant_date,
        } => format!(
            "{granted_days} days granted, {remaining} remaining, next grant {next_grant_date}"
        ),
        EmployeeAction::GrantNotDue { next_grant_date } => {
            format!("not due until {next_grant_date}")
        }
    }
}

fn render_report(report: &BatchRunReport) {
    println!("{}", report.kind.label());
    match report.target_month {
        Some(month) => println!("Run on {} targeting {}", report.run_on, month),
        None => println!("Run on {}", report.run_on),
    }

    let summary = report.summary();
    println!(
        "\nRoster: {} processed, {} admin accounts skipped",
        summary.processed, summary.admins_skipped
    );
    println!(
        "Outcomes: {} changed, {} unchanged, {} failed",
        summary.changed, summary.unchanged, summary.failed
    );

    let changed: Vec<_> = report
        .outcomes
        .iter()
        .filter_map(|outcome| match &outcome.status {
            OutcomeStatus::Applied { action } if action.changed_state() => {
                Some((outcome.employee_id, action))
            }
            _ => None,
        })
        .collect();
    if !changed.is_empty() {
        println!("\nChanges");
        for (employee_id, action) in changed {
            println!("- employee {}: {}", employee_id, describe_action(action));
        }
    }

    let failures: Vec<_> = report.failures().collect();
    if failures.is_empty() {
        println!("\nFailures: none");
    } else {
        println!("\nFailures");
        for outcome in failures {
            if let OutcomeStatus::Failed { reason } = &outcome.status {
                println!("- employee {}: {}", outcome.employee_id, reason);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn acquisition_requires_a_target_month() {
        let err = Cli::try_parse_from(["workforce-batch", "paid-acquisition"])
            .expect_err("missing month must be a usage error");
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn acquisition_parses_iso_month() {
        let cli = Cli::try_parse_from(["workforce-batch", "paid-acquisition", "2026-07"])
            .expect("month parses");
        match cli.command {
            Command::PaidAcquisition { target_month } => {
                assert_eq!(target_month.to_string(), "2026-07");
            }
            other => panic!("expected paid-acquisition, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_month() {
        let err = Cli::try_parse_from(["workforce-batch", "paid-acquisition", "July-2026"])
            .expect_err("malformed month must be rejected");
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn today_override_parses() {
        let cli = Cli::try_parse_from([
            "workforce-batch",
            "--today",
            "2026-02-01",
            "attendance-create",
        ])
        .expect("date parses");
        assert_eq!(
            cli.today,
            Some(NaiveDate::from_ymd_opt(2026, 2, 1).expect("valid date"))
        );
    }
}
