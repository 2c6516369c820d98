//! Migration units and version decoding
//!
//! A migration unit is one versioned script. Its version is embedded in the
//! file name between the last `__` and the `.sql` suffix, so
//! `Somesqlfile__1.sql` is version 1 and `Anothersqlfile_2__2.sql` is
//! version 2.

use crate::error::{CoreError, CoreResult};
use serde::Serialize;
use std::collections::btree_map::{self, BTreeMap};
use std::path::{Path, PathBuf};

/// Marker preceding the version digits
pub const VERSION_DELIMITER: &str = "__";

/// Suffix terminating the version digits
pub const SCRIPT_SUFFIX: &str = ".sql";

/// One versioned migration script
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationUnit {
    /// 1-based schema version this script advances to
    pub version: i64,

    /// Location of the script content
    pub source_path: PathBuf,
}

impl MigrationUnit {
    /// Zero-based key used to order units inside a [`MigrationSet`]
    pub fn key(&self) -> i64 {
        self.version - 1
    }
}

/// Decode the 1-based version number from a script's file name.
///
/// Only the final path component is inspected, so directories containing
/// `__` do not confuse the decoder.
pub fn parse_version(path: &Path) -> CoreResult<i64> {
    let malformed = |reason: &str| CoreError::MalformedFilename {
        path: path.display().to_string(),
        reason: reason.to_string(),
    };

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| malformed("file name is not valid UTF-8"))?;

    let head = name
        .strip_suffix(SCRIPT_SUFFIX)
        .ok_or_else(|| malformed("name must end with '.sql'"))?;

    let delim_idx = head
        .rfind(VERSION_DELIMITER)
        .ok_or_else(|| malformed("missing '__' version delimiter"))?;
    let token = &head[delim_idx + VERSION_DELIMITER.len()..];

    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed(&format!("version '{token}' is not an integer")));
    }

    let version: i64 = token
        .parse()
        .map_err(|_| malformed(&format!("version '{token}' is out of range")))?;
    if version < 1 {
        return Err(malformed("version must be 1 or greater"));
    }
    Ok(version)
}

/// Discovered migration units keyed by `version - 1`.
///
/// Iteration is always in ascending version order, independent of the order
/// in which the files were discovered.
#[derive(Debug, Clone, Default)]
pub struct MigrationSet {
    units: BTreeMap<i64, PathBuf>,
}

impl MigrationSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a unit, returning the path it replaced if the key was taken
    pub fn insert(&mut self, unit: MigrationUnit) -> Option<PathBuf> {
        self.units.insert(unit.key(), unit.source_path)
    }

    /// Path of the script registered for `version`, if any
    pub fn get(&self, version: i64) -> Option<&Path> {
        self.units.get(&(version - 1)).map(PathBuf::as_path)
    }

    /// Whether `version` is already registered
    pub fn contains(&self, version: i64) -> bool {
        self.units.contains_key(&(version - 1))
    }

    /// Units in ascending version order
    pub fn units(&self) -> impl Iterator<Item = MigrationUnit> + '_ {
        self.units.iter().map(|(key, path)| MigrationUnit {
            version: key + 1,
            source_path: path.clone(),
        })
    }

    /// Units whose version is strictly greater than `current_version`
    pub fn pending(&self, current_version: i64) -> impl Iterator<Item = MigrationUnit> + '_ {
        self.units().filter(move |u| u.version > current_version)
    }

    /// Highest version present, or `None` for an empty set
    pub fn max_version(&self) -> Option<i64> {
        self.units.keys().next_back().map(|key| key + 1)
    }

    /// Number of units
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the set holds no units
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl FromIterator<MigrationUnit> for MigrationSet {
    fn from_iter<I: IntoIterator<Item = MigrationUnit>>(iter: I) -> Self {
        let mut set = Self::new();
        for unit in iter {
            set.insert(unit);
        }
        set
    }
}

impl<'a> IntoIterator for &'a MigrationSet {
    type Item = (&'a i64, &'a PathBuf);
    type IntoIter = btree_map::Iter<'a, i64, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
