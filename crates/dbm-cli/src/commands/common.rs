//! Output helpers shared by commands

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use dbm_core::MigrationUnit;
use serde::Serialize;

/// Render a ledger timestamp for humans, falling back to the raw value
pub(crate) fn format_millis(millis: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(millis) {
        Some(ts) => ts.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string(),
        None => millis.to_string(),
    }
}

/// Pretty-print any serializable value to stdout
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

/// One line per pending unit, indented under a heading
pub(crate) fn print_pending(pending: &[MigrationUnit]) {
    if pending.is_empty() {
        println!("  (none)");
        return;
    }
    for unit in pending {
        println!("  {:>6}  {}", unit.version, unit.source_path.display());
    }
}

/// "1 migration" / "3 migrations"
pub(crate) fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
