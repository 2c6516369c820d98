//! Status command implementation

use anyhow::{Context, Result};
use dbm_core::MigrationUnit;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::{GlobalArgs, StatusArgs};
use crate::commands::common::{plural, print_json, print_pending};
use crate::context::RuntimeContext;

/// Snapshot of the ledger against the migrations directory
#[derive(Debug, Serialize)]
pub(crate) struct StatusReport {
    pub migrations_dir: PathBuf,
    pub ledger_table: String,
    pub current_version: i64,
    pub applied_count: usize,
    pub discovered: usize,
    pub pending: Vec<MigrationUnit>,
}

/// Execute the status command
pub async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let report = collect(&ctx).await?;

    if args.json {
        return print_json(&report);
    }

    println!("Migrations: {}", report.migrations_dir.display());
    println!("Ledger:     {}", report.ledger_table);
    println!(
        "Version:    {} ({} recorded)",
        report.current_version,
        plural(report.applied_count, "migration")
    );
    println!(
        "Pending:    {} of {} discovered",
        report.pending.len(),
        report.discovered
    );
    print_pending(&report.pending);
    Ok(())
}

pub(crate) async fn collect(ctx: &RuntimeContext) -> Result<StatusReport> {
    let migrator = ctx.migrator();
    let plan = migrator
        .plan()
        .await
        .context("Failed to determine pending migrations")?;
    let history = migrator.history().await.context("Failed to read ledger")?;

    Ok(StatusReport {
        migrations_dir: migrator.migrations_dir().to_path_buf(),
        ledger_table: migrator.ledger().sql().table().to_string(),
        current_version: plan.current_version,
        applied_count: history.len(),
        discovered: plan.discovered,
        pending: plan.pending,
    })
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
