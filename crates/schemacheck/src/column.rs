//! Column metadata as seen from one side of a comparison.
//!
//! Descriptors serialize with the upper-case keys used by catalog views
//! (`COLUMN_NAME`, `DATA_TYPE`, ...), which is also the format of expected
//! schema documents.

use crate::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Which side of a comparison a collection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Expected,
    Actual,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Expected => write!(f, "expected"),
            Side::Actual => write!(f, "actual"),
        }
    }
}

/// Metadata for a single column.
///
/// `is_nullable` keeps the literal catalog string (`"YES"` / `"NO"`). Numeric
/// attributes keep their JSON representation, so `13.0` and `13` are
/// different values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    #[serde(rename = "COLUMN_NAME")]
    pub name: String,

    #[serde(rename = "DATA_TYPE")]
    pub data_type: Option<String>,

    #[serde(rename = "IS_NULLABLE")]
    pub is_nullable: Option<String>,

    #[serde(rename = "CHARACTER_MAXIMUM_LENGTH")]
    pub character_maximum_length: Option<Number>,

    #[serde(rename = "NUMERIC_PRECISION")]
    pub numeric_precision: Option<Number>,

    #[serde(rename = "NUMERIC_SCALE")]
    pub numeric_scale: Option<Number>,

    #[serde(rename = "DATETIME_PRECISION")]
    pub datetime_precision: Option<Number>,
}

impl ColumnDescriptor {
    /// A descriptor with only a name; every attribute is absent.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: None,
            is_nullable: None,
            character_maximum_length: None,
            numeric_precision: None,
            numeric_scale: None,
            datetime_precision: None,
        }
    }

    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    pub fn with_nullable(mut self, is_nullable: impl Into<String>) -> Self {
        self.is_nullable = Some(is_nullable.into());
        self
    }

    pub fn with_character_maximum_length(mut self, length: impl Into<Number>) -> Self {
        self.character_maximum_length = Some(length.into());
        self
    }

    pub fn with_numeric_precision(mut self, precision: impl Into<Number>) -> Self {
        self.numeric_precision = Some(precision.into());
        self
    }

    pub fn with_numeric_scale(mut self, scale: impl Into<Number>) -> Self {
        self.numeric_scale = Some(scale.into());
        self
    }

    pub fn with_datetime_precision(mut self, precision: impl Into<Number>) -> Self {
        self.datetime_precision = Some(precision.into());
        self
    }

    /// Lookup key: the upper-cased column name.
    pub fn key(&self) -> String {
        self.name.to_uppercase()
    }

    /// Raw value of one of the compared attributes.
    pub fn attribute(&self, attribute: Attribute) -> Option<AttributeValue> {
        match attribute {
            Attribute::DataType => self.data_type.clone().map(AttributeValue::Text),
            Attribute::IsNullable => self.is_nullable.clone().map(AttributeValue::Text),
            Attribute::CharacterMaximumLength => self
                .character_maximum_length
                .clone()
                .map(AttributeValue::Number),
            Attribute::NumericPrecision => {
                self.numeric_precision.clone().map(AttributeValue::Number)
            }
            Attribute::NumericScale => self.numeric_scale.clone().map(AttributeValue::Number),
            Attribute::DatetimePrecision => {
                self.datetime_precision.clone().map(AttributeValue::Number)
            }
        }
    }
}

/// The column attributes the comparator looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Attribute {
    DataType,
    IsNullable,
    CharacterMaximumLength,
    NumericPrecision,
    NumericScale,
    DatetimePrecision,
}

impl Attribute {
    /// All attributes, in comparison order.
    pub const ALL: [Attribute; 6] = [
        Attribute::DataType,
        Attribute::IsNullable,
        Attribute::CharacterMaximumLength,
        Attribute::NumericPrecision,
        Attribute::NumericScale,
        Attribute::DatetimePrecision,
    ];

    /// Catalog name of the attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::DataType => "DATA_TYPE",
            Attribute::IsNullable => "IS_NULLABLE",
            Attribute::CharacterMaximumLength => "CHARACTER_MAXIMUM_LENGTH",
            Attribute::NumericPrecision => "NUMERIC_PRECISION",
            Attribute::NumericScale => "NUMERIC_SCALE",
            Attribute::DatetimePrecision => "DATETIME_PRECISION",
        }
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw attribute value, compared without any coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    Number(Number),
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Text(s) => f.write_str(s),
            AttributeValue::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Renders an optional attribute value, with `null` for absent values.
pub(crate) fn display_value(value: &Option<AttributeValue>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "null".to_string(),
    }
}

/// All columns of one table, as reported by one source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaCollection {
    pub columns: Vec<ColumnDescriptor>,
}

impl SchemaCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter()
    }

    /// Index columns by upper-cased name.
    ///
    /// When two columns share a key, the later one wins but the entry keeps
    /// the position of the first.
    pub fn index(&self) -> IndexMap<String, &ColumnDescriptor> {
        let mut index = IndexMap::with_capacity(self.columns.len());
        for column in &self.columns {
            index.insert(column.key(), column);
        }
        index
    }

    /// Reject columns without a usable name.
    pub fn validate(&self, side: Side) -> Result<()> {
        match self.columns.iter().position(|c| c.name.trim().is_empty()) {
            Some(index) => Err(Error::InvalidDescriptor { side, index }),
            None => Ok(()),
        }
    }

    /// Serialize as an expected-schema document.
    pub fn to_json(&self) -> Result<String> {
        Ok(crate::report::to_pretty_json(self)?)
    }
}

impl From<Vec<ColumnDescriptor>> for SchemaCollection {
    fn from(columns: Vec<ColumnDescriptor>) -> Self {
        Self { columns }
    }
}

impl FromIterator<ColumnDescriptor> for SchemaCollection {
    fn from_iter<I: IntoIterator<Item = ColumnDescriptor>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SchemaCollection {
    type Item = &'a ColumnDescriptor;
    type IntoIter = std::slice::Iter<'a, ColumnDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
