//! Drift detection between a source and a target snapshot.
//!
//! Fields are matched by name only. For one object, [`detect_drift`]
//! classifies every field name into exactly one of:
//!
//! - **new**: only in the source (reported with source attributes);
//! - **deleted**: only in the target (reported with target attributes);
//! - **changed**: in both, with at least one differing attribute;
//! - unchanged, which is not reported.
//!
//! A field renamed between the two sides is therefore one deleted entry
//! plus one new entry.

use serde::{Deserialize, Serialize};

use crate::attribute::{Attribute, AttributeValue};
use crate::field::FieldAttributes;
use crate::snapshot::ObjectSnapshot;

/// One attribute that differs between the two sides of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDiff {
    /// Which attribute differs.
    pub attribute: Attribute,
    /// Value on the target side.
    pub target: AttributeValue,
    /// Value on the source side.
    pub source: AttributeValue,
}

/// A field present on both sides with at least one differing attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedField {
    /// Field name.
    pub field: String,
    /// Differing attributes, in declared attribute order.
    pub diffs: Vec<AttributeDiff>,
}

impl ChangedField {
    /// Returns the diff for one attribute, if it differs.
    #[must_use]
    pub fn diff(&self, attribute: Attribute) -> Option<&AttributeDiff> {
        self.diffs.iter().find(|d| d.attribute == attribute)
    }
}

/// Result of comparing the source and target snapshots of one object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftReport {
    /// Fields only in the source.
    pub new: Vec<FieldAttributes>,
    /// Fields only in the target.
    pub deleted: Vec<FieldAttributes>,
    /// Fields on both sides whose attributes differ.
    pub changed: Vec<ChangedField>,
}

impl DriftReport {
    /// Returns `true` if the two snapshots are identical.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.new.is_empty() && self.deleted.is_empty() && self.changed.is_empty()
    }

    /// Number of new fields.
    #[must_use]
    pub fn new_count(&self) -> usize {
        self.new.len()
    }

    /// Number of deleted fields.
    #[must_use]
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }

    /// Number of changed fields.
    #[must_use]
    pub fn changed_count(&self) -> usize {
        self.changed.len()
    }

    /// Looks up the changed entry for a field.
    #[must_use]
    pub fn changed_field(&self, name: &str) -> Option<&ChangedField> {
        self.changed.iter().find(|c| c.field == name)
    }
}

/// Compares the source and target snapshots of one object.
///
/// Total over any pair of snapshots, including empty ones. Output lists
/// follow field-name order.
#[must_use]
pub fn detect_drift(source: &ObjectSnapshot, target: &ObjectSnapshot) -> DriftReport {
    let new = source
        .fields()
        .filter(|f| !target.contains(&f.name))
        .cloned()
        .collect();

    let deleted = target
        .fields()
        .filter(|f| !source.contains(&f.name))
        .cloned()
        .collect();

    let changed = source
        .fields()
        .filter_map(|s| target.get(&s.name).and_then(|t| diff_field(s, t)))
        .collect();

    DriftReport {
        new,
        deleted,
        changed,
    }
}

/// Compares one field present on both sides.
fn diff_field(source: &FieldAttributes, target: &FieldAttributes) -> Option<ChangedField> {
    let diffs: Vec<AttributeDiff> = source
        .differing_attributes(target)
        .into_iter()
        .map(|attribute| AttributeDiff {
            attribute,
            target: target.value(attribute),
            source: source.value(attribute),
        })
        .collect();

    if diffs.is_empty() {
        None
    } else {
        Some(ChangedField {
            field: source.name.clone(),
            diffs,
        })
    }
}
