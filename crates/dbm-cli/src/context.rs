//! Runtime context for CLI commands

use anyhow::{Context, Result};
use dbm_core::Config;
use dbm_db::DuckDbBackend;
use dbm_migrate::Migrator;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

const IN_MEMORY: &str = ":memory:";

/// Resolved configuration plus an open database connection
pub struct RuntimeContext {
    /// Effective configuration after command-line overrides
    pub config: Config,

    /// Project root used to resolve relative paths
    pub root: PathBuf,

    /// Database connection
    pub db: DuckDbBackend,
}

impl RuntimeContext {
    /// Load config and open the configured database
    pub fn new(args: &GlobalArgs) -> Result<Self> {
        let config = load_config(args)?;
        let root = args.project_dir.clone();

        let db_path = resolve_db_path(&config.database.path, &root);
        log::debug!("Opening {} database at {}", config.database.db_type, db_path);
        let db = DuckDbBackend::new(&db_path)
            .with_context(|| format!("Failed to connect to database: {db_path}"))?;

        Ok(Self { config, root, db })
    }

    /// Migrator over this context's database and migrations directory
    pub fn migrator(&self) -> Migrator<'_> {
        Migrator::from_config(&self.db, &self.config, &self.root)
    }
}

/// Read the config file (or defaults) and apply command-line overrides
pub(crate) fn load_config(args: &GlobalArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path).context("Failed to load configuration file")?,
        None => Config::load_or_default(&args.project_dir)
            .context("Failed to load project configuration")?,
    };

    if let Some(database) = &args.database {
        config.database.path = database.clone();
    }
    if let Some(migrations) = &args.migrations {
        config.migrations_path = migrations.display().to_string();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Relative database files live under the project root
fn resolve_db_path(path: &str, root: &Path) -> String {
    if path == IN_MEMORY || Path::new(path).is_absolute() {
        path.to_string()
    } else {
        root.join(path).display().to_string()
    }
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;
