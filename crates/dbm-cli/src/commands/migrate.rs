//! Migrate command implementation

use anyhow::{Context, Result};
use dbm_migrate::{MigrationPlan, RunSummary};

use crate::cli::{GlobalArgs, MigrateArgs};
use crate::commands::common::{format_millis, plural, print_json, print_pending};
use crate::context::RuntimeContext;

/// Execute the migrate command
pub async fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let migrator = ctx.migrator();

    if args.dry_run {
        let plan = migrator.plan().await.context("Failed to plan migrations")?;
        if args.json {
            return print_json(&plan);
        }
        print_plan(&plan);
        return Ok(());
    }

    let summary = migrator.run().await.context("Migration failed")?;
    if args.json {
        return print_json(&summary);
    }
    print_summary(&summary);
    Ok(())
}

fn print_plan(plan: &MigrationPlan) {
    println!("Dry run - current version {}", plan.current_version);
    println!(
        "Would apply {} of {} discovered:",
        plural(plan.pending.len(), "migration"),
        plan.discovered
    );
    print_pending(&plan.pending);
}

fn print_summary(summary: &RunSummary) {
    if summary.applied.is_empty() {
        println!("Database is up to date at version {}", summary.final_version);
        return;
    }

    for applied in &summary.applied {
        println!(
            "  Applied {:>6}  {} ({}, {})",
            applied.version,
            applied.source_path.display(),
            plural(applied.statements, "statement"),
            format_millis(applied.applied_at_millis)
        );
    }
    println!();
    println!(
        "Migrated from version {} to {}: {}, {} skipped",
        summary.starting_version,
        summary.final_version,
        plural(summary.applied.len(), "migration"),
        summary.skipped
    );
}

#[cfg(test)]
#[path = "migrate_test.rs"]
mod tests;
