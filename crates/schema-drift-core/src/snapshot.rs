//! Per-object schema snapshots.
//!
//! A catalog hands back an ordered list of [`FieldDescriptor`]s for one
//! object. [`SnapshotBuilder`] folds that list into an [`ObjectSnapshot`]
//! keyed by field name:
//!
//! - names are trimmed of surrounding whitespace (fixed-width catalog
//!   columns pad them);
//! - descriptors with an empty name are dropped and counted;
//! - when a name occurs more than once, the later descriptor wins.
//!
//! Building never fails. An empty listing yields an empty snapshot.

use std::collections::BTreeMap;

use crate::field::{FieldAttributes, FieldDescriptor};

/// The fields of one database object as seen on one side.
///
/// Fields are keyed by name and sorted for deterministic iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectSnapshot {
    fields: BTreeMap<String, FieldAttributes>,
}

impl ObjectSnapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from raw catalog descriptors.
    #[must_use]
    pub fn build<I>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = FieldDescriptor>,
    {
        let mut builder = SnapshotBuilder::new();
        builder.extend(descriptors);
        builder.build()
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldAttributes> {
        self.fields.get(name)
    }

    /// Returns `true` if the snapshot has a field with this name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the object has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldAttributes> {
        self.fields.values()
    }
}

/// Accumulates catalog descriptors into an [`ObjectSnapshot`].
#[derive(Debug, Clone, Default)]
pub struct SnapshotBuilder {
    fields: BTreeMap<String, FieldAttributes>,
    rejected: usize,
}

impl SnapshotBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one descriptor, overwriting any earlier field with the same
    /// name.
    pub fn push(&mut self, mut descriptor: FieldDescriptor) -> &mut Self {
        let trimmed = descriptor.name.trim();
        if trimmed.is_empty() {
            self.rejected += 1;
            return self;
        }
        if trimmed.len() != descriptor.name.len() {
            descriptor.name = trimmed.to_string();
        }
        self.fields.insert(descriptor.name.clone(), descriptor);
        self
    }

    /// Adds descriptors in order.
    pub fn extend<I>(&mut self, descriptors: I) -> &mut Self
    where
        I: IntoIterator<Item = FieldDescriptor>,
    {
        for descriptor in descriptors {
            self.push(descriptor);
        }
        self
    }

    /// Number of descriptors dropped because their name was empty.
    #[must_use]
    pub const fn rejected(&self) -> usize {
        self.rejected
    }

    /// Finalizes the snapshot.
    #[must_use]
    pub fn build(self) -> ObjectSnapshot {
        ObjectSnapshot {
            fields: self.fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_builds_empty_snapshot() {
        let snapshot = ObjectSnapshot::build(Vec::new());
        assert!(snapshot.is_empty());
        assert_eq!(snapshot, ObjectSnapshot::new());
    }

    #[test]
    fn later_duplicate_wins() {
        let snapshot = ObjectSnapshot::build(vec![
            FieldAttributes::new("F", "NUMBER").length(1),
            FieldAttributes::new("F", "NUMBER").length(2),
        ]);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("F").unwrap().length, 2);
    }

    #[test]
    fn names_are_trimmed() {
        let snapshot = ObjectSnapshot::build(vec![FieldAttributes::new("  CODE ", "CHAR")]);
        assert!(snapshot.contains("CODE"));
        assert_eq!(snapshot.get("CODE").unwrap().name, "CODE");
    }

    #[test]
    fn padded_duplicate_overwrites_trimmed() {
        let snapshot = ObjectSnapshot::build(vec![
            FieldAttributes::new("CODE", "CHAR").length(1),
            FieldAttributes::new("CODE  ", "CHAR").length(3),
        ]);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("CODE").unwrap().length, 3);
    }

    #[test]
    fn blank_names_are_rejected() {
        let mut builder = SnapshotBuilder::new();
        builder
            .push(FieldAttributes::new("", "NUMBER"))
            .push(FieldAttributes::new("   ", "NUMBER"))
            .push(FieldAttributes::new("ID", "NUMBER"));
        assert_eq!(builder.rejected(), 2);

        let snapshot = builder.build();
        assert_eq!(snapshot.names().collect::<Vec<_>>(), vec!["ID"]);
    }

    #[test]
    fn iteration_is_sorted_by_name() {
        let snapshot = ObjectSnapshot::build(vec![
            FieldAttributes::new("ZIP", "VARCHAR2"),
            FieldAttributes::new("AGE", "NUMBER"),
            FieldAttributes::new("MID", "DATE"),
        ]);
        assert_eq!(
            snapshot.names().collect::<Vec<_>>(),
            vec!["AGE", "MID", "ZIP"]
        );
        assert_eq!(
            snapshot.fields().map(|f| f.data_type.as_str()).collect::<Vec<_>>(),
            vec!["NUMBER", "DATE", "VARCHAR2"]
        );
    }
}
