//! Reconcile command implementation.
//!
//! Reads desired and existing reservations from files and prints how each
//! one is classified: reused, newly reserved or released.

use crate::error::CliError;
use crate::utils::{read_reservations, GlobalOptions};
use clap::{Args, ValueEnum};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use stratus::{NetworkPlan, PlanPartition, ReservationReconciler};

/// Column headers for table output.
const COLUMN_HEADERS: [&str; 4] = ["ACTION", "NETWORK", "TYPE", "IP"];

/// Classify desired and existing reservations into plans.
#[derive(Args)]
pub struct ReconcileCommand {
    /// File with the reservations the instance should hold (YAML or JSON)
    #[arg(long, value_name = "FILE")]
    pub desired: PathBuf,

    /// File with the reservations persisted by the previous pass
    #[arg(long, value_name = "FILE")]
    pub existing: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        value_enum,
        default_value = "table",
        env = "STRATUS_OUTPUT_FORMAT",
        ignore_case = true
    )]
    pub format: OutputFormat,

    /// Exit with status 1 unless every desired reservation is already held
    #[arg(long)]
    pub check: bool,
}

/// Output format for the reconcile command.
#[derive(Clone, Copy, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Tab-separated table format (human-readable)
    Table,
    /// JSON format
    Json,
}

/// One plan as printed by the command.
#[derive(Serialize)]
struct PlanRow {
    action: &'static str,
    network: String,
    #[serde(rename = "type")]
    reservation_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    ip: Option<String>,
}

impl From<&NetworkPlan> for PlanRow {
    fn from(plan: &NetworkPlan) -> Self {
        let action = if plan.is_existing() {
            "reuse"
        } else if plan.is_obsolete() {
            "release"
        } else {
            "reserve"
        };
        let reservation = plan.reservation();
        Self {
            action,
            network: reservation.network().to_string(),
            reservation_type: reservation.reservation_type().to_string(),
            ip: reservation.ip().map(|ip| ip.to_string()),
        }
    }
}

impl ReconcileCommand {
    /// Execute the reconcile command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        // 1. Read both sides
        let desired = read_reservations(&self.desired)?;
        let existing = match self.existing {
            Some(ref path) => read_reservations(path)?,
            None => Vec::new(),
        };

        // 2. Reconcile
        let reconciler = ReservationReconciler::new(&global.logger);
        let plans = reconciler.reconcile(&desired, &existing);
        let rows: Vec<PlanRow> = plans.iter().map(PlanRow::from).collect();

        // 3. Print
        match self.format {
            OutputFormat::Table => format_as_table(&rows)?,
            OutputFormat::Json => format_as_json(&rows)?,
        }

        let partition = PlanPartition::new(&plans);
        if !global.quiet {
            eprintln!(
                "{} reused, {} to reserve, {} to release",
                partition.reused.len(),
                partition.desired.len(),
                partition.obsolete.len()
            );
        }

        if self.check && !partition.is_noop() {
            return Err(CliError::SemanticFailure(
                "Reservations are not converged".to_string(),
            ));
        }

        Ok(())
    }
}

/// Format plans as a human-readable table.
fn format_as_table(rows: &[PlanRow]) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    writeln!(handle, "{}", COLUMN_HEADERS.join("\t"))?;
    for row in rows {
        writeln!(
            handle,
            "{}\t{}\t{}\t{}",
            row.action,
            row.network,
            row.reservation_type,
            row.ip.as_deref().unwrap_or("-")
        )?;
    }

    Ok(())
}

/// Format plans as a JSON array.
fn format_as_json(rows: &[PlanRow]) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(rows)
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    println!("{json}");
    Ok(())
}
