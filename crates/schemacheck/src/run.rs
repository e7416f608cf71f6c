//! End-to-end schema check: load, inspect, compare, store.

use crate::{
    BlobStore, CompareOptions, ComparisonReport, Diagnostics, Event, Inspector, Result,
    ResultDestination, SchemaSource, StoredResult, TableRef, compare, load_expected_schema,
    store_report,
};

/// Everything a check needs to know, resolved from configuration.
#[derive(Debug, Clone)]
pub struct CheckPlan {
    pub target: TableRef,
    pub source: SchemaSource,
    /// Reports are not persisted when this is `None`.
    pub destination: Option<ResultDestination>,
    pub options: CompareOptions,
}

impl CheckPlan {
    /// Whether any step needs a blob store.
    pub fn needs_blob_store(&self) -> bool {
        self.source.blob_location().is_some()
            || matches!(self.destination, Some(ResultDestination::BlobStore { .. }))
    }
}

#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub report: ComparisonReport,
    pub stored: Option<StoredResult>,
}

/// Run a schema check.
///
/// If the expected schema cannot be loaded or the table cannot be inspected,
/// the comparison does not run and no report is produced.
pub async fn run_check(
    plan: &CheckPlan,
    inspector: &dyn Inspector,
    blobs: Option<&dyn BlobStore>,
    diagnostics: &dyn Diagnostics,
) -> Result<CheckOutcome> {
    let expected = load_expected_schema(&plan.source, blobs, diagnostics).await?;
    let actual = inspector.inspect(&plan.target, diagnostics).await?;

    let report = compare(
        &plan.target.table,
        &expected,
        &actual,
        &plan.options,
        diagnostics,
    )?;

    if report.is_pass() {
        diagnostics.emit(Event::info(format!(
            "schema check passed for table {}",
            plan.target.table
        )));
    } else {
        diagnostics.emit(
            Event::error(format!("schema check failed for table {}", plan.target.table))
                .with("mismatches", report.mismatches.len())
                .with("missing_columns", report.missing_columns.len()),
        );
    }

    let stored = match &plan.destination {
        Some(destination) => Some(store_report(&report, destination, blobs, diagnostics).await?),
        None => None,
    };

    Ok(CheckOutcome { report, stored })
}
