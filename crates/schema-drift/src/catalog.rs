//! Catalog readers.
//!
//! A [`CatalogReader`] lists the fields of one monitored object as raw
//! [`FieldDescriptor`]s, in catalog order, together with object-level
//! [`ObjectMetadata`]. Failures are returned, never swallowed; the caller
//! decides what to do with an object that could not be read.

use std::future::Future;

use chrono::{DateTime, Utc};
use schema_drift_core::FieldDescriptor;
use serde::Serialize;
use sqlx::sqlite::SqlitePool;
use tracing::debug;

use crate::error::{DriftError, Result};

/// Creation and last-DDL times of an object, when the catalog keeps them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObjectMetadata {
    /// When the object was created.
    pub created: Option<DateTime<Utc>>,
    /// When the object's definition was last changed.
    pub last_ddl_time: Option<DateTime<Utc>>,
}

/// Reads field listings from one side's catalog.
pub trait CatalogReader: Send + Sync {
    /// Label of the schema this reader looks at, used in reports.
    fn schema_name(&self) -> &str;

    /// Lists the fields of `object` in catalog order.
    fn describe_object(
        &self,
        object: &str,
    ) -> impl Future<Output = Result<Vec<FieldDescriptor>>> + Send;

    /// Returns object-level metadata for `object`.
    fn object_metadata(&self, object: &str) -> impl Future<Output = Result<ObjectMetadata>> + Send;
}

/// SQL to check that a table or view exists. Identifiers are
/// case-insensitive in SQLite, as they are for `pragma_table_info`.
const OBJECT_EXISTS_SQL: &str =
    "SELECT type FROM sqlite_master WHERE name = ? COLLATE NOCASE AND type IN ('table', 'view')";

/// SQL to list an object's columns in declaration order.
const TABLE_INFO_SQL: &str =
    r#"SELECT name, type, "notnull" FROM pragma_table_info(?) ORDER BY cid"#;

/// Catalog reader for SQLite databases.
///
/// Reads `pragma_table_info`. SQLite does not record creation or DDL
/// times, so [`ObjectMetadata`] is always empty.
#[derive(Debug, Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
    schema_name: String,
}

impl SqliteCatalog {
    /// Creates a catalog reader over an open pool.
    pub fn new(pool: SqlitePool, schema_name: impl Into<String>) -> Self {
        Self {
            pool,
            schema_name: schema_name.into(),
        }
    }

    /// Returns the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn ensure_exists(&self, object: &str) -> Result<()> {
        let kind: Option<(String,)> = sqlx::query_as(OBJECT_EXISTS_SQL)
            .bind(object)
            .fetch_optional(&self.pool)
            .await?;

        match kind {
            Some(_) => Ok(()),
            None => Err(DriftError::ObjectNotFound {
                schema: self.schema_name.clone(),
                object: object.to_string(),
            }),
        }
    }
}

impl CatalogReader for SqliteCatalog {
    fn schema_name(&self) -> &str {
        &self.schema_name
    }

    async fn describe_object(&self, object: &str) -> Result<Vec<FieldDescriptor>> {
        self.ensure_exists(object).await?;

        let rows: Vec<(String, String, i64)> = sqlx::query_as(TABLE_INFO_SQL)
            .bind(object)
            .fetch_all(&self.pool)
            .await?;

        debug!(
            schema = %self.schema_name,
            object = %object,
            columns = rows.len(),
            "Read table info"
        );

        Ok(rows
            .into_iter()
            .map(|(name, declared, not_null)| {
                let parsed = DeclaredType::parse(&declared);
                FieldDescriptor {
                    name,
                    data_type: parsed.name,
                    length: parsed.length,
                    precision: parsed.precision,
                    scale: parsed.scale,
                    nullable: Some(not_null == 0),
                }
            })
            .collect())
    }

    async fn object_metadata(&self, object: &str) -> Result<ObjectMetadata> {
        self.ensure_exists(object).await?;
        Ok(ObjectMetadata::default())
    }
}

/// Type names whose parameters are `(precision, scale)` rather than a
/// length.
const NUMERIC_TYPES: &[&str] = &["NUMBER", "NUMERIC", "DECIMAL", "DEC"];

/// A declared column type split into the attribute model.
///
/// `VARCHAR(50)` has length 50; `NUMERIC(10, 2)` has precision 10 and
/// scale 2. Types without parameters have length 0 and no precision or
/// scale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredType {
    /// Upper-cased base type name.
    pub name: String,
    /// Declared length, 0 when not declared.
    pub length: i64,
    /// Declared precision for numeric types.
    pub precision: Option<i64>,
    /// Declared scale for numeric types.
    pub scale: Option<i64>,
}

impl DeclaredType {
    /// Parses a declared type as SQLite stores it.
    #[must_use]
    pub fn parse(declared: &str) -> Self {
        let declared = declared.trim();
        let (base, args) = match declared.find('(') {
            Some(open) => {
                let inner = &declared[open + 1..];
                let inner = inner.rfind(')').map_or(inner, |close| &inner[..close]);
                let args: Vec<Option<i64>> = inner
                    .split(',')
                    .map(|arg| arg.trim().parse().ok())
                    .collect();
                (&declared[..open], args)
            }
            None => (declared, Vec::new()),
        };

        let name = base
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase();
        let first = args.first().copied().flatten();
        let second = args.get(1).copied().flatten();

        if NUMERIC_TYPES.contains(&name.as_str()) {
            Self {
                name,
                length: 0,
                precision: first,
                scale: second,
            }
        } else {
            Self {
                name,
                length: first.unwrap_or(0),
                precision: None,
                scale: None,
            }
        }
    }
}
