//! Monitoring result storage.
//!
//! This module manages the `views_monitoring` table in the target database.
//! Each monitoring run writes one row per object, keyed by the run
//! timestamp and the object name. The row starts with field counts,
//! object metadata and the raw catalog listings of both sides; the
//! new/deleted/changed columns are then filled only for categories that
//! actually drifted, so an untouched row means "no drift".

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnection, SqlitePool, SqliteRow};
use tracing::debug;

use crate::error::{DriftError, Result};
use crate::monitor::ObjectDrift;

/// SQL to create the monitoring table (SQLite).
pub const CREATE_MONITORING_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS views_monitoring (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    load_date TEXT NOT NULL,
    run_timestamp TEXT NOT NULL,
    target_name TEXT NOT NULL,
    source_name TEXT NOT NULL,
    db_object TEXT NOT NULL,
    source_fields_count INTEGER NOT NULL,
    target_fields_count INTEGER NOT NULL,
    target_created TEXT,
    target_last_ddl_time TEXT,
    source_created TEXT,
    source_last_ddl_time TEXT,
    target_desc_script TEXT,
    source_desc_script TEXT,
    new_fields_count INTEGER,
    new_fields_list TEXT,
    deleted_fields_count INTEGER,
    deleted_fields_list TEXT,
    changed_fields_count INTEGER,
    changed_fields_list TEXT,
    UNIQUE(run_timestamp, db_object)
)
"#;

const INSERT_OBJECT_SQL: &str = r#"
INSERT INTO views_monitoring (
    load_date, run_timestamp, target_name, source_name, db_object,
    source_fields_count, target_fields_count,
    target_created, target_last_ddl_time, source_created, source_last_ddl_time,
    target_desc_script, source_desc_script
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

const TABLE_EXISTS_SQL: &str =
    "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'views_monitoring'";

const SELECT_ROWS_SQL: &str = "SELECT id, load_date, run_timestamp, target_name, source_name, \
     db_object, source_fields_count, target_fields_count, new_fields_count, new_fields_list, \
     deleted_fields_count, deleted_fields_list, changed_fields_count, changed_fields_list \
     FROM views_monitoring";

/// One drift category, mapped to its pair of columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCategory {
    /// Fields only in the source.
    New,
    /// Fields only in the target.
    Deleted,
    /// Fields whose attributes differ.
    Changed,
}

impl FieldCategory {
    /// All categories, in the order they are written.
    pub const ALL: [Self; 3] = [Self::New, Self::Deleted, Self::Changed];

    /// Column holding the number of drifted fields.
    #[must_use]
    pub const fn count_column(self) -> &'static str {
        match self {
            Self::New => "new_fields_count",
            Self::Deleted => "deleted_fields_count",
            Self::Changed => "changed_fields_count",
        }
    }

    /// Column holding the JSON list of drifted fields.
    #[must_use]
    pub const fn list_column(self) -> &'static str {
        match self {
            Self::New => "new_fields_list",
            Self::Deleted => "deleted_fields_list",
            Self::Changed => "changed_fields_list",
        }
    }
}

/// A row read back from the monitoring table.
#[derive(Debug, Clone)]
pub struct MonitoringRow {
    /// Unique ID in the monitoring table.
    pub id: i64,
    /// Calendar date of the run (`YYYY-MM-DD`).
    pub load_date: String,
    /// Run timestamp shared by all rows of one run.
    pub run_timestamp: DateTime<Utc>,
    /// Target schema label.
    pub target_name: String,
    /// Source schema label.
    pub source_name: String,
    /// Monitored object name.
    pub db_object: String,
    /// Number of fields in the source snapshot.
    pub source_fields_count: i64,
    /// Number of fields in the target snapshot.
    pub target_fields_count: i64,
    /// Number of new fields, if any drifted.
    pub new_fields_count: Option<i64>,
    /// JSON list of new fields.
    pub new_fields_list: Option<String>,
    /// Number of deleted fields, if any drifted.
    pub deleted_fields_count: Option<i64>,
    /// JSON list of deleted fields.
    pub deleted_fields_list: Option<String>,
    /// Number of changed fields, if any drifted.
    pub changed_fields_count: Option<i64>,
    /// JSON list of changed fields.
    pub changed_fields_list: Option<String>,
}

impl MonitoringRow {
    /// Returns `true` if no category was filled in.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.new_fields_count.is_none()
            && self.deleted_fields_count.is_none()
            && self.changed_fields_count.is_none()
    }

    fn from_row(row: &SqliteRow) -> Result<Self> {
        let run_timestamp: String = row.try_get("run_timestamp")?;
        Ok(Self {
            id: row.try_get("id")?,
            load_date: row.try_get("load_date")?,
            run_timestamp: parse_timestamp(&run_timestamp)?,
            target_name: row.try_get("target_name")?,
            source_name: row.try_get("source_name")?,
            db_object: row.try_get("db_object")?,
            source_fields_count: row.try_get("source_fields_count")?,
            target_fields_count: row.try_get("target_fields_count")?,
            new_fields_count: row.try_get("new_fields_count")?,
            new_fields_list: row.try_get("new_fields_list")?,
            deleted_fields_count: row.try_get("deleted_fields_count")?,
            deleted_fields_list: row.try_get("deleted_fields_list")?,
            changed_fields_count: row.try_get("changed_fields_count")?,
            changed_fields_list: row.try_get("changed_fields_list")?,
        })
    }
}

/// Formats a run timestamp the way it is stored and matched.
#[must_use]
pub fn timestamp_key(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // SQLite datetime format fallback
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|dt| dt.and_utc())
        })
        .map_err(|_| DriftError::InvalidTimestamp(s.to_string()))
}

/// Writes and reads monitoring rows.
pub struct MonitoringSink {
    pool: SqlitePool,
}

impl MonitoringSink {
    /// Creates a sink over the target database.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Ensures the monitoring table exists.
    pub async fn ensure_table(&self) -> Result<()> {
        sqlx::query(CREATE_MONITORING_TABLE_SQL)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Returns `true` if the monitoring table has been created.
    pub async fn table_exists(&self) -> Result<bool> {
        let row: Option<(String,)> = sqlx::query_as(TABLE_EXISTS_SQL)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Inserts the base row for one inspected object.
    pub async fn insert_object(&self, run: &DateTime<Utc>, drift: &ObjectDrift) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        insert_row(&mut conn, run, drift).await
    }

    /// Fills in one drift category of an existing row.
    pub async fn update_category(
        &self,
        run: &DateTime<Utc>,
        object: &str,
        category: FieldCategory,
        fields_count: usize,
        fields_list: &str,
    ) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        update_row(&mut conn, run, object, category, fields_count, fields_list).await
    }

    /// Records one inspected object: the base row, then every non-empty
    /// drift category.
    ///
    /// Runs in a single transaction. If any statement fails nothing is
    /// kept, so a drifted object never reads back as clean.
    pub async fn record(&self, run: &DateTime<Utc>, drift: &ObjectDrift) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        match write_object(&mut tx, run, drift).await {
            Ok(()) => {
                tx.commit().await?;
                Ok(())
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e)
            }
        }
    }

    /// Gets all rows of one run, ordered by object name.
    pub async fn rows_for_run(&self, run: &DateTime<Utc>) -> Result<Vec<MonitoringRow>> {
        let sql = format!("{SELECT_ROWS_SQL} WHERE run_timestamp = ? ORDER BY db_object");
        let rows = sqlx::query(&sql)
            .bind(timestamp_key(run))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(MonitoringRow::from_row).collect()
    }

    /// Gets every recorded row of one object, oldest first.
    pub async fn rows_for_object(&self, object: &str) -> Result<Vec<MonitoringRow>> {
        let sql = format!("{SELECT_ROWS_SQL} WHERE db_object = ? ORDER BY id");
        let rows = sqlx::query(&sql)
            .bind(object)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(MonitoringRow::from_row).collect()
    }

    /// Gets the timestamp of the most recent run, if any.
    pub async fn latest_run(&self) -> Result<Option<DateTime<Utc>>> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT run_timestamp FROM views_monitoring ORDER BY id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(ts,)| parse_timestamp(&ts)).transpose()
    }
}

/// Counts are stored as SQLite integers.
fn count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

async fn insert_row(
    conn: &mut SqliteConnection,
    run: &DateTime<Utc>,
    drift: &ObjectDrift,
) -> Result<()> {
    let source = &drift.source;
    let target = &drift.target;

    sqlx::query(INSERT_OBJECT_SQL)
        .bind(run.format("%Y-%m-%d").to_string())
        .bind(timestamp_key(run))
        .bind(&target.schema)
        .bind(&source.schema)
        .bind(&drift.object)
        .bind(count(source.snapshot.len()))
        .bind(count(target.snapshot.len()))
        .bind(target.metadata.created.as_ref().map(timestamp_key))
        .bind(target.metadata.last_ddl_time.as_ref().map(timestamp_key))
        .bind(source.metadata.created.as_ref().map(timestamp_key))
        .bind(source.metadata.last_ddl_time.as_ref().map(timestamp_key))
        .bind(serde_json::to_string(&target.descriptors)?)
        .bind(serde_json::to_string(&source.descriptors)?)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn update_row(
    conn: &mut SqliteConnection,
    run: &DateTime<Utc>,
    object: &str,
    category: FieldCategory,
    fields_count: usize,
    fields_list: &str,
) -> Result<()> {
    let sql = format!(
        "UPDATE views_monitoring SET {} = ?, {} = ? WHERE run_timestamp = ? AND db_object = ?",
        category.count_column(),
        category.list_column()
    );
    let result = sqlx::query(&sql)
        .bind(count(fields_count))
        .bind(fields_list)
        .bind(timestamp_key(run))
        .bind(object)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DriftError::Database(sqlx::Error::RowNotFound));
    }
    Ok(())
}

async fn write_object(
    conn: &mut SqliteConnection,
    run: &DateTime<Utc>,
    drift: &ObjectDrift,
) -> Result<()> {
    insert_row(conn, run, drift).await?;

    let report = &drift.report;
    for category in FieldCategory::ALL {
        let (fields_count, fields_list) = match category {
            FieldCategory::New => (report.new_count(), serde_json::to_string(&report.new)?),
            FieldCategory::Deleted => (
                report.deleted_count(),
                serde_json::to_string(&report.deleted)?,
            ),
            FieldCategory::Changed => (
                report.changed_count(),
                serde_json::to_string(&report.changed)?,
            ),
        };
        if fields_count == 0 {
            continue;
        }
        debug!(
            object = %drift.object,
            category = category.count_column(),
            fields_count,
            "Recording drift"
        );
        update_row(conn, run, &drift.object, category, fields_count, &fields_list).await?;
    }
    Ok(())
}
