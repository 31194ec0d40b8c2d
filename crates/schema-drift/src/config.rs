//! Configuration files.
//!
//! Two plain-text files drive a monitoring run:
//!
//! - the **object list**, one object name per line (blank lines and `#`
//!   comments are skipped, repeated names are kept once);
//! - the **access file**, whose first two non-blank lines are the source
//!   and target connections.
//!
//! A connection is either a `sqlite:` URL or a bare path to a database
//! file. Its schema label, recorded with every monitoring row, is the
//! database file stem (`memory` for in-memory databases).

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{debug, warn};

use crate::error::{DriftError, Result};

/// A database connection and the schema label it reports under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSpec {
    /// Connection URL handed to the driver.
    pub url: String,
    /// Label recorded with results.
    pub schema_name: String,
}

impl ConnectionSpec {
    /// Parses one connection line.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        if line.is_empty() {
            return Err(DriftError::InvalidConnection(
                "empty connection string".to_string(),
            ));
        }

        let (url, location) = match line.strip_prefix("sqlite:") {
            Some(rest) => (line.to_string(), rest),
            None if line.contains("://") => {
                return Err(DriftError::InvalidConnection(format!(
                    "unsupported connection scheme in '{line}'"
                )));
            }
            None => (format!("sqlite:{line}"), line),
        };

        let location = location.trim_start_matches("//");
        let (path, query) = location.split_once('?').unwrap_or((location, ""));

        let in_memory = path.is_empty() || path == ":memory:" || query.contains("mode=memory");
        let schema_name = if in_memory {
            "memory".to_string()
        } else {
            Path::new(path)
                .file_stem()
                .and_then(|stem| stem.to_str())
                .filter(|stem| !stem.is_empty())
                .ok_or_else(|| {
                    DriftError::InvalidConnection(format!("no database file in '{line}'"))
                })?
                .to_string()
        };

        Ok(Self { url, schema_name })
    }

    /// Opens a connection pool.
    pub async fn connect(&self) -> Result<SqlitePool> {
        debug!(url = %self.url, schema = %self.schema_name, "Connecting");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&self.url)
            .await?;
        Ok(pool)
    }
}

impl FromStr for ConnectionSpec {
    type Err = DriftError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Source and target connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessConfig {
    /// Connection to the authoritative, upstream side.
    pub source: ConnectionSpec,
    /// Connection to the monitored, downstream side.
    pub target: ConnectionSpec,
}

impl AccessConfig {
    /// Parses the contents of an access file.
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

        let mut next = |which: &str| {
            lines.next().ok_or_else(|| DriftError::InvalidConfig {
                path: path.to_path_buf(),
                message: format!("missing {which} connection line"),
            })
        };
        let source = next("source")?;
        let target = next("target")?;

        Ok(Self {
            source: ConnectionSpec::parse(source)?,
            target: ConnectionSpec::parse(target)?,
        })
    }

    /// Reads an access file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text, path)
    }

    /// Builds the configuration from optional overrides, reading the access
    /// file only for sides that were not given explicitly.
    pub fn resolve(
        path: &Path,
        source: Option<ConnectionSpec>,
        target: Option<ConnectionSpec>,
    ) -> Result<Self> {
        match (source, target) {
            (Some(source), Some(target)) => Ok(Self { source, target }),
            (source, target) => {
                let file = Self::load(path)?;
                Ok(Self {
                    source: source.unwrap_or(file.source),
                    target: target.unwrap_or(file.target),
                })
            }
        }
    }
}

/// Resolves only the target connection (for commands that never touch the
/// source).
pub fn resolve_target(path: &Path, target: Option<ConnectionSpec>) -> Result<ConnectionSpec> {
    match target {
        Some(target) => Ok(target),
        None => Ok(AccessConfig::load(path)?.target),
    }
}

/// Parses the contents of an object list.
#[must_use]
pub fn parse_object_list(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut objects = Vec::new();

    for line in text.lines() {
        let name = line.trim();
        if name.is_empty() || name.starts_with('#') {
            continue;
        }
        if seen.insert(name) {
            objects.push(name.to_string());
        } else {
            warn!(object = %name, "Duplicate object in list, ignoring");
        }
    }

    objects
}

/// Reads an object list file.
pub fn load_object_list(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)?;
    let objects = parse_object_list(&text);
    if objects.is_empty() {
        return Err(DriftError::InvalidConfig {
            path: path.to_path_buf(),
            message: "no objects to monitor".to_string(),
        });
    }
    Ok(objects)
}
