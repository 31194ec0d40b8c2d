//! Monitoring runs.
//!
//! A [`Monitor`] pairs a source and a target [`CatalogReader`]. For each
//! object it reads the source side, then the target side, builds both
//! snapshots and diffs them. Objects are independent: a failure on one is
//! recorded in the [`RunReport`] and the run moves on.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use schema_drift_core::{DriftReport, FieldDescriptor, ObjectSnapshot, SnapshotBuilder, detect_drift};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::{CatalogReader, ObjectMetadata};
use crate::error::{DriftError, Result};
use crate::sink::MonitoringSink;

/// What one side's catalog reported for an object.
#[derive(Debug, Clone, Serialize)]
pub struct Observation {
    /// Schema label of the side.
    pub schema: String,
    /// Raw listing, in catalog order.
    pub descriptors: Vec<FieldDescriptor>,
    /// Canonical snapshot built from the listing.
    #[serde(skip)]
    pub snapshot: ObjectSnapshot,
    /// Object-level metadata.
    pub metadata: ObjectMetadata,
}

/// Both observations of one object and the drift between them.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectDrift {
    /// Monitored object name.
    pub object: String,
    /// Source side.
    pub source: Observation,
    /// Target side.
    pub target: Observation,
    /// Drift from target to source.
    pub report: DriftReport,
}

/// Result of inspecting one object.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ObjectOutcome {
    /// Both sides were read and compared.
    Inspected(ObjectDrift),
    /// One of the sides could not be read.
    Failed {
        /// Why the object was skipped.
        reason: String,
    },
}

/// Counts over a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Objects in the run.
    pub objects: usize,
    /// Objects with at least one drifted field.
    pub drifted: usize,
    /// Objects compared without drift.
    pub clean: usize,
    /// Objects that could not be read.
    pub failed: usize,
}

/// Outcomes of one monitoring run, keyed by object name.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Correlation key shared by every row written for this run.
    pub run_timestamp: DateTime<Utc>,
    /// Per-object outcomes.
    pub outcomes: BTreeMap<String, ObjectOutcome>,
}

impl RunReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new(run_timestamp: DateTime<Utc>) -> Self {
        Self {
            run_timestamp,
            outcomes: BTreeMap::new(),
        }
    }

    /// Objects that were compared, drifted or not.
    pub fn inspected(&self) -> impl Iterator<Item = &ObjectDrift> {
        self.outcomes.values().filter_map(|outcome| match outcome {
            ObjectOutcome::Inspected(drift) => Some(drift),
            ObjectOutcome::Failed { .. } => None,
        })
    }

    /// Objects with at least one drifted field.
    pub fn drifted(&self) -> impl Iterator<Item = &ObjectDrift> {
        self.inspected().filter(|drift| !drift.report.is_empty())
    }

    /// Objects that could not be read, with the reason.
    pub fn failed(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes
            .iter()
            .filter_map(|(object, outcome)| match outcome {
                ObjectOutcome::Failed { reason } => Some((object.as_str(), reason.as_str())),
                ObjectOutcome::Inspected(_) => None,
            })
    }

    /// Counts per outcome.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        let drifted = self.drifted().count();
        let inspected = self.inspected().count();
        RunSummary {
            objects: self.outcomes.len(),
            drifted,
            clean: inspected - drifted,
            failed: self.outcomes.len() - inspected,
        }
    }

    /// Writes every inspected object to the sink.
    ///
    /// Keeps going past individual failures and returns them together.
    pub async fn record_with(&self, sink: &MonitoringSink) -> Result<usize> {
        let mut errors = Vec::new();
        let mut recorded = 0;

        for drift in self.inspected() {
            match sink.record(&self.run_timestamp, drift).await {
                Ok(()) => recorded += 1,
                Err(e) => {
                    warn!(object = %drift.object, error = %e, "Failed to record object");
                    errors.push(e);
                }
            }
        }

        match errors.len() {
            0 => Ok(recorded),
            1 => Err(errors.remove(0)),
            _ => Err(DriftError::Multiple(errors)),
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (object, outcome) in &self.outcomes {
            match outcome {
                ObjectOutcome::Failed { reason } => writeln!(f, "{object}: FAILED ({reason})")?,
                ObjectOutcome::Inspected(drift) if drift.report.is_empty() => {
                    writeln!(f, "{object}: no drift")?;
                }
                ObjectOutcome::Inspected(drift) => {
                    let report = &drift.report;
                    writeln!(
                        f,
                        "{object}: {} new, {} deleted, {} changed",
                        report.new_count(),
                        report.deleted_count(),
                        report.changed_count()
                    )?;
                    for field in &report.new {
                        writeln!(f, "  + {} {}({})", field.name, field.data_type, field.length)?;
                    }
                    for field in &report.deleted {
                        writeln!(f, "  - {} {}({})", field.name, field.data_type, field.length)?;
                    }
                    for changed in &report.changed {
                        writeln!(f, "  ~ {}", changed.field)?;
                        for diff in &changed.diffs {
                            writeln!(
                                f,
                                "      {}: {}={} {}={}",
                                diff.attribute,
                                drift.target.schema,
                                diff.target,
                                drift.source.schema,
                                diff.source
                            )?;
                        }
                    }
                }
            }
        }

        let summary = self.summary();
        write!(
            f,
            "{} objects: {} drifted, {} clean, {} failed",
            summary.objects, summary.drifted, summary.clean, summary.failed
        )
    }
}

/// Compares objects between a source and a target catalog.
pub struct Monitor<S, T> {
    source: S,
    target: T,
}

impl<S: CatalogReader, T: CatalogReader> Monitor<S, T> {
    /// Creates a monitor over two catalogs.
    pub fn new(source: S, target: T) -> Self {
        Self { source, target }
    }

    /// Returns the source catalog.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the target catalog.
    #[must_use]
    pub fn target(&self) -> &T {
        &self.target
    }

    /// Reads both sides of one object and diffs them.
    pub async fn inspect(&self, object: &str) -> Result<ObjectDrift> {
        let source = observe(&self.source, object).await?;
        let target = observe(&self.target, object).await?;
        let report = detect_drift(&source.snapshot, &target.snapshot);

        debug!(
            object = %object,
            new = report.new_count(),
            deleted = report.deleted_count(),
            changed = report.changed_count(),
            "Compared object"
        );

        Ok(ObjectDrift {
            object: object.to_string(),
            source,
            target,
            report,
        })
    }

    /// Inspects every object in order.
    pub async fn run(&self, objects: &[String], run_timestamp: DateTime<Utc>) -> RunReport {
        info!(
            source = %self.source.schema_name(),
            target = %self.target.schema_name(),
            objects = objects.len(),
            "Starting monitoring run"
        );

        let mut report = RunReport::new(run_timestamp);
        for object in objects {
            let outcome = match self.inspect(object).await {
                Ok(drift) => ObjectOutcome::Inspected(drift),
                Err(e) => {
                    warn!(object = %object, error = %e, "Skipping object");
                    ObjectOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            report.outcomes.insert(object.clone(), outcome);
        }

        let summary = report.summary();
        info!(
            drifted = summary.drifted,
            clean = summary.clean,
            failed = summary.failed,
            "Monitoring run finished"
        );
        report
    }
}

/// Reads one side of an object.
async fn observe<C: CatalogReader>(catalog: &C, object: &str) -> Result<Observation> {
    let descriptors = catalog.describe_object(object).await?;
    let metadata = catalog.object_metadata(object).await?;

    let mut builder = SnapshotBuilder::new();
    builder.extend(descriptors.iter().cloned());
    if builder.rejected() > 0 {
        warn!(
            schema = %catalog.schema_name(),
            object = %object,
            rejected = builder.rejected(),
            "Dropped fields with blank names"
        );
    }

    Ok(Observation {
        schema: catalog.schema_name().to_string(),
        descriptors,
        snapshot: builder.build(),
        metadata,
    })
}
