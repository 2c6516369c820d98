//! Validate command implementation

use anyhow::{bail, Context, Result};
use dbm_migrate::validate_scripts;
use dbm_sql::StatementSplitter;

use crate::cli::{GlobalArgs, ValidateArgs};
use crate::commands::common::plural;
use crate::context::load_config;

/// Execute the validate command
pub async fn execute(args: &ValidateArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let migrations_dir = config.migrations_path_absolute(&global.project_dir);
    let splitter = StatementSplitter::new(config.statement_splitting);

    let results = validate_scripts(&migrations_dir, config.on_duplicate_version, &splitter)
        .context("Failed to validate migrations")?;

    println!(
        "Validating {} in {}",
        plural(results.len(), "script"),
        migrations_dir.display()
    );

    let mut failed = 0;
    for result in &results {
        if result.is_valid() {
            println!(
                "  ok    {:>6}  {} ({})",
                result.version,
                result.source_path.display(),
                plural(result.statement_count, "statement")
            );
            continue;
        }

        failed += 1;
        println!("  FAIL  {:>6}  {}", result.version, result.source_path.display());
        for issue in &result.issues {
            println!("          {issue}");
        }
        if args.fail_fast {
            break;
        }
    }

    if failed > 0 {
        bail!("{} failed validation", plural(failed, "script"));
    }
    println!("All scripts valid");
    Ok(())
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
