//! The fixed attribute model shared by both sides of a comparison.
//!
//! Every field is described by the same six attributes, always compared
//! by position in [`Attribute::ALL`]. Values that a catalog reports as
//! "no value" are kept as [`AttributeValue::Absent`] rather than being
//! coerced to a default.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the six attributes describing a field.
///
/// The derived ordering follows the declared attribute order, so sorting
/// a list of attributes puts it back into schema order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    /// Field name.
    Name,
    /// Declared data type name.
    Type,
    /// Declared length.
    Length,
    /// Numeric precision.
    Precision,
    /// Numeric scale.
    Scale,
    /// Whether the field accepts NULL.
    Nullable,
}

impl Attribute {
    /// All attributes in declared order.
    pub const ALL: [Self; 6] = [
        Self::Name,
        Self::Type,
        Self::Length,
        Self::Precision,
        Self::Scale,
        Self::Nullable,
    ];

    /// Returns the symbolic name used in reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Type => "type",
            Self::Length => "length",
            Self::Precision => "precision",
            Self::Scale => "scale",
            Self::Nullable => "nullable",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The value of a single attribute of a single field.
///
/// Serializes untagged: text as a string, integers as numbers, flags as
/// booleans and absent values as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Text value (name, type).
    Text(String),
    /// Integer value (length, precision, scale).
    Integer(i64),
    /// Tri-state flag value when present (nullable).
    Flag(bool),
    /// The catalog returned no value.
    Absent,
}

impl AttributeValue {
    /// Returns `true` if the catalog reported no value.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl From<Option<i64>> for AttributeValue {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Self::Absent, Self::Integer)
    }
}

impl From<Option<bool>> for AttributeValue {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Self::Absent, Self::Flag)
    }
}

/// Renders values the way catalog listings usually show them: flags as
/// `Y`/`N` and absent values as `-`.
impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Flag(true) => f.write_str("Y"),
            Self::Flag(false) => f.write_str("N"),
            Self::Absent => f.write_str("-"),
        }
    }
}
