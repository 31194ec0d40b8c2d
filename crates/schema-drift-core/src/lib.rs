//! # schema-drift-core
//!
//! Pure diff engine for detecting structural drift between the "source"
//! and "target" schema of a database object.
//!
//! This crate provides:
//! - A fixed six-attribute field model (`name`, `type`, `length`,
//!   `precision`, `scale`, `nullable`)
//! - [`SnapshotBuilder`], which folds a raw catalog listing into a
//!   name-keyed [`ObjectSnapshot`]
//! - [`detect_drift`], which classifies fields as new, deleted or changed
//!
//! Nothing here performs I/O. Reading catalogs and persisting reports is
//! left to the caller.
//!
//! ```rust
//! use schema_drift_core::{Attribute, FieldAttributes, ObjectSnapshot, detect_drift};
//!
//! let source = ObjectSnapshot::build(vec![
//!     FieldAttributes::new("ID", "NUMBER").length(22).precision(0).nullable(false),
//!     FieldAttributes::new("NAME", "VARCHAR2").length(50).nullable(true),
//! ]);
//! let target = ObjectSnapshot::build(vec![
//!     FieldAttributes::new("ID", "NUMBER").length(10).precision(0).nullable(false),
//! ]);
//!
//! let report = detect_drift(&source, &target);
//! assert_eq!(report.new[0].name, "NAME");
//! assert_eq!(report.changed[0].diffs[0].attribute, Attribute::Length);
//! ```

pub mod attribute;
pub mod drift;
pub mod field;
pub mod snapshot;

pub use attribute::{Attribute, AttributeValue};
pub use drift::{AttributeDiff, ChangedField, DriftReport, detect_drift};
pub use field::{FieldAttributes, FieldDescriptor};
pub use snapshot::{ObjectSnapshot, SnapshotBuilder};
