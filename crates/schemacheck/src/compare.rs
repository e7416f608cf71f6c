//! Schema comparison - reconcile expected columns against actual columns.
//!
//! Both collections are indexed by upper-cased column name (see
//! [`SchemaCollection::index`]). Expected columns are then visited in index
//! order:
//!
//! - a column with no actual counterpart is reported as **missing** and its
//!   attributes are not compared
//! - otherwise each [`Attribute`] is compared with strict equality of the raw
//!   values, and every difference becomes a [`Mismatch`]
//!
//! Values are never normalized. An absent value differs from any present
//! value, and `13.0` differs from `13`.
//!
//! Columns that only exist on the actual side are **extra**. They are only
//! collected when [`CompareOptions::detect_extra_columns`] is set, and they
//! never fail the check.
//!
//! ```text
//! expected: A B C        actual: a C D
//!   A  matched (case-insensitive), attributes compared
//!   B  missing
//!   C  matched
//!   D  extra (if enabled)
//! ```

use crate::column::display_value;
use crate::{
    Attribute, ComparisonReport, Diagnostics, Event, Mismatch, Result, SchemaCollection, Side,
};

/// Knobs for [`compare`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompareOptions {
    /// Collect columns present in the actual schema but not in the expected one.
    pub detect_extra_columns: bool,
}

impl CompareOptions {
    pub fn with_extra_columns(mut self, enabled: bool) -> Self {
        self.detect_extra_columns = enabled;
        self
    }
}

/// Compare the expected columns of `table` against the actual ones.
///
/// Fails only when a descriptor has a blank name. Differences are data and
/// end up in the report.
pub fn compare(
    table: &str,
    expected: &SchemaCollection,
    actual: &SchemaCollection,
    options: &CompareOptions,
    diagnostics: &dyn Diagnostics,
) -> Result<ComparisonReport> {
    expected.validate(Side::Expected)?;
    actual.validate(Side::Actual)?;

    diagnostics.emit(
        Event::info("starting schema comparison")
            .with("table", table)
            .with("expected_columns", expected.len())
            .with("actual_columns", actual.len()),
    );

    let expected_index = expected.index();
    let actual_index = actual.index();

    let mut mismatches = Vec::new();
    let mut missing_columns = Vec::new();

    for (name, expected_col) in &expected_index {
        let Some(actual_col) = actual_index.get(name) else {
            diagnostics.emit(
                Event::warning("missing column in actual schema")
                    .with("table", table)
                    .with("column", name),
            );
            missing_columns.push(name.clone());
            continue;
        };

        for attribute in Attribute::ALL {
            let expected_value = expected_col.attribute(attribute);
            let actual_value = actual_col.attribute(attribute);
            if expected_value == actual_value {
                continue;
            }

            diagnostics.emit(
                Event::error("column attribute mismatch")
                    .with("table", table)
                    .with("column", name)
                    .with("attribute", attribute)
                    .with("expected", display_value(&expected_value))
                    .with("actual", display_value(&actual_value)),
            );
            mismatches.push(Mismatch {
                column_name: name.clone(),
                attribute,
                expected: expected_value,
                actual: actual_value,
            });
        }
    }

    let extra_columns = options.detect_extra_columns.then(|| {
        let mut extra = Vec::new();
        for name in actual_index.keys() {
            if !expected_index.contains_key(name) {
                diagnostics.emit(
                    Event::warning("extra column in actual schema")
                        .with("table", table)
                        .with("column", name),
                );
                extra.push(name.clone());
            }
        }
        extra
    });

    let report = ComparisonReport::new(table, mismatches, missing_columns, extra_columns);

    diagnostics.emit(
        Event::info("schema comparison completed")
            .with("table", table)
            .with("status", report.status)
            .with("mismatches", report.mismatches.len())
            .with("missing_columns", report.missing_columns.len()),
    );

    Ok(report)
}
