//! Field descriptors as reported by a catalog.

use serde::{Deserialize, Serialize};

use crate::attribute::{Attribute, AttributeValue};

/// The six attributes describing one field of a database object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldAttributes {
    /// Field name.
    pub name: String,
    /// Declared data type name.
    #[serde(rename = "type")]
    pub data_type: String,
    /// Declared length.
    pub length: i64,
    /// Numeric precision, if the catalog reports one.
    pub precision: Option<i64>,
    /// Numeric scale, if the catalog reports one.
    pub scale: Option<i64>,
    /// Whether the field accepts NULL, if the catalog reports it.
    pub nullable: Option<bool>,
}

/// One raw entry of a catalog listing, in catalog order.
///
/// Same shape as [`FieldAttributes`]; the alias marks values that have not
/// been through a [`SnapshotBuilder`](crate::snapshot::SnapshotBuilder) yet.
pub type FieldDescriptor = FieldAttributes;

impl FieldAttributes {
    /// Creates a field with zero length and every optional attribute absent.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            length: 0,
            precision: None,
            scale: None,
            nullable: None,
        }
    }

    /// Sets the declared length.
    #[must_use]
    pub const fn length(mut self, length: i64) -> Self {
        self.length = length;
        self
    }

    /// Sets the numeric precision.
    #[must_use]
    pub const fn precision(mut self, precision: i64) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Sets the numeric scale.
    #[must_use]
    pub const fn scale(mut self, scale: i64) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Sets the nullable flag.
    #[must_use]
    pub const fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    /// Returns the value of one attribute.
    #[must_use]
    pub fn value(&self, attribute: Attribute) -> AttributeValue {
        match attribute {
            Attribute::Name => AttributeValue::Text(self.name.clone()),
            Attribute::Type => AttributeValue::Text(self.data_type.clone()),
            Attribute::Length => AttributeValue::Integer(self.length),
            Attribute::Precision => self.precision.into(),
            Attribute::Scale => self.scale.into(),
            Attribute::Nullable => self.nullable.into(),
        }
    }

    /// Returns the attributes whose values differ from `other`, in
    /// declared order.
    #[must_use]
    pub fn differing_attributes(&self, other: &Self) -> Vec<Attribute> {
        Attribute::ALL
            .into_iter()
            .filter(|&attribute| !self.attribute_eq(other, attribute))
            .collect()
    }

    fn attribute_eq(&self, other: &Self, attribute: Attribute) -> bool {
        match attribute {
            Attribute::Name => self.name == other.name,
            Attribute::Type => self.data_type == other.data_type,
            Attribute::Length => self.length == other.length,
            Attribute::Precision => self.precision == other.precision,
            Attribute::Scale => self.scale == other.scale,
            Attribute::Nullable => self.nullable == other.nullable,
        }
    }
}

/// Catalog rows usually arrive as plain tuples
/// `(name, type, length, precision, scale, nullable)`.
impl From<(String, String, i64, Option<i64>, Option<i64>, Option<bool>)> for FieldAttributes {
    fn from(
        (name, data_type, length, precision, scale, nullable): (
            String,
            String,
            i64,
            Option<i64>,
            Option<i64>,
            Option<bool>,
        ),
    ) -> Self {
        Self {
            name,
            data_type,
            length,
            precision,
            scale,
            nullable,
        }
    }
}
