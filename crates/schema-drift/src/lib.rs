//! Schema drift monitoring for database views and tables.
//!
//! `schema-drift` compares the columns of a list of monitored objects
//! between a "source" schema (authoritative, upstream) and a "target"
//! schema (monitored, downstream), and records which fields were added,
//! removed or changed.
//!
//! # Architecture
//!
//! - **Catalog** - Reads field listings from a live database
//! - **Config** - Loads the object list and the source/target connections
//! - **Monitor** - Builds snapshots and diffs each object independently
//! - **Sink** - Persists one row per object and run in `views_monitoring`
//!
//! The diff itself lives in [`schema_drift_core`] and performs no I/O.
//!
//! # Example
//!
//! ```rust,ignore
//! use schema_drift::prelude::*;
//!
//! let access = AccessConfig::load("Access.txt".as_ref())?;
//! let objects = load_object_list("DB_objects.txt".as_ref())?;
//!
//! let source = SqliteCatalog::new(access.source.connect().await?, &access.source.schema_name);
//! let target_pool = access.target.connect().await?;
//! let target = SqliteCatalog::new(target_pool.clone(), &access.target.schema_name);
//!
//! let report = Monitor::new(source, target).run(&objects, chrono::Utc::now()).await;
//! println!("{report}");
//!
//! let sink = MonitoringSink::new(target_pool);
//! sink.ensure_table().await?;
//! report.record_with(&sink).await?;
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Create the monitoring table in the target database
//! schema-drift init
//!
//! # Compare without writing anything
//! schema-drift check --json
//!
//! # Compare and record the results
//! schema-drift monitor
//!
//! # Show recorded results
//! schema-drift show --object ORDERS_V
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod monitor;
pub mod sink;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::catalog::{CatalogReader, DeclaredType, ObjectMetadata, SqliteCatalog};
    pub use crate::config::{
        AccessConfig, ConnectionSpec, load_object_list, parse_object_list, resolve_target,
    };
    pub use crate::error::{DriftError, Result};
    pub use crate::monitor::{
        Monitor, ObjectDrift, ObjectOutcome, Observation, RunReport, RunSummary,
    };
    pub use crate::sink::{FieldCategory, MonitoringRow, MonitoringSink};
    pub use schema_drift_core::{
        Attribute, AttributeValue, DriftReport, FieldAttributes, FieldDescriptor, ObjectSnapshot,
        SnapshotBuilder, detect_drift,
    };
}
