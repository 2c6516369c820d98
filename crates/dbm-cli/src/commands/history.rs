//! History command implementation

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, HistoryArgs};
use crate::commands::common::{format_millis, print_json};
use crate::context::RuntimeContext;

/// Execute the history command
pub async fn execute(args: &HistoryArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let records = ctx
        .migrator()
        .history()
        .await
        .context("Failed to read ledger")?;

    if args.json {
        return print_json(&records);
    }

    if records.is_empty() {
        println!("No migrations recorded");
        return Ok(());
    }

    println!("{:>6}  {:>7}  {:<27}  FILE", "ID", "VERSION", "APPLIED");
    for record in &records {
        println!(
            "{:>6}  {:>7}  {:<27}  {}",
            record.id,
            record.version,
            format_millis(record.applied_at_millis),
            record.source_path
        );
    }
    Ok(())
}
