//! The comparison report and its JSON form.

use crate::{Attribute, AttributeValue, Result};
use serde::{Deserialize, Serialize};

/// Overall outcome of a schema check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Pass,
    Fail,
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckStatus::Pass => write!(f, "PASS"),
            CheckStatus::Fail => write!(f, "FAIL"),
        }
    }
}

/// One attribute that differs between matched columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mismatch {
    #[serde(rename = "COLUMN_NAME")]
    pub column_name: String,

    #[serde(rename = "ATTRIBUTE")]
    pub attribute: Attribute,

    #[serde(rename = "EXPECTED")]
    pub expected: Option<AttributeValue>,

    #[serde(rename = "ACTUAL")]
    pub actual: Option<AttributeValue>,
}

/// Result of comparing one table's expected and actual columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    #[serde(rename = "schema_check_status")]
    pub status: CheckStatus,

    pub table: String,

    pub mismatches: Vec<Mismatch>,

    pub missing_columns: Vec<String>,

    /// Only present when extra-column detection was enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_columns: Option<Vec<String>>,
}

impl ComparisonReport {
    /// Build a report, deriving the status from mismatches and missing columns.
    ///
    /// Extra columns never affect the status.
    pub fn new(
        table: impl Into<String>,
        mismatches: Vec<Mismatch>,
        missing_columns: Vec<String>,
        extra_columns: Option<Vec<String>>,
    ) -> Self {
        let status = if mismatches.is_empty() && missing_columns.is_empty() {
            CheckStatus::Pass
        } else {
            CheckStatus::Fail
        };
        Self {
            status,
            table: table.into(),
            mismatches,
            missing_columns,
            extra_columns,
        }
    }

    pub fn is_pass(&self) -> bool {
        self.status == CheckStatus::Pass
    }

    /// Extra columns, or an empty slice when detection was disabled.
    pub fn extra_columns(&self) -> &[String] {
        self.extra_columns.as_deref().unwrap_or_default()
    }

    /// Serialize to the persisted JSON form, indented by four spaces.
    pub fn to_json(&self) -> Result<String> {
        Ok(to_pretty_json(self)?)
    }
}

impl std::fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Schema check {} for table {}", self.status, self.table)?;
        for mismatch in &self.mismatches {
            writeln!(
                f,
                "  ~ {}.{}: {} -> {}",
                mismatch.column_name,
                mismatch.attribute,
                crate::column::display_value(&mismatch.expected),
                crate::column::display_value(&mismatch.actual),
            )?;
        }
        for column in &self.missing_columns {
            writeln!(f, "  - {} (missing)", column)?;
        }
        for column in self.extra_columns() {
            writeln!(f, "  + {} (extra)", column)?;
        }
        Ok(())
    }
}

pub(crate) fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}
