//! Persisting comparison reports.

use crate::{BlobLocation, BlobStore, ComparisonReport, Diagnostics, Error, Event, Result};
use camino::Utf8PathBuf;
use jiff::Zoned;

/// Key prefix used for reports stored in a bucket when none is configured.
pub const DEFAULT_RESULT_PREFIX: &str = "schema_comparison_results";

/// Where reports are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultDestination {
    /// A local directory, created if needed.
    Directory(Utf8PathBuf),
    /// A bucket, with reports stored under `prefix/`.
    BlobStore { bucket: String, prefix: String },
}

impl ResultDestination {
    /// A bucket destination using [`DEFAULT_RESULT_PREFIX`].
    pub fn bucket(bucket: impl Into<String>) -> Self {
        ResultDestination::BlobStore {
            bucket: bucket.into(),
            prefix: DEFAULT_RESULT_PREFIX.to_string(),
        }
    }
}

/// `s3://bucket/prefix` is a bucket destination, anything else a directory.
impl std::str::FromStr for ResultDestination {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let Some(rest) = s.strip_prefix("s3://") else {
            return Ok(ResultDestination::Directory(Utf8PathBuf::from(s)));
        };
        let (bucket, prefix) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(Error::InvalidBlobLocation(s.to_string()));
        }
        Ok(ResultDestination::BlobStore {
            bucket: bucket.to_string(),
            prefix: prefix.trim_matches('/').to_string(),
        })
    }
}

/// Where a report ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredResult {
    File(Utf8PathBuf),
    Blob(BlobLocation),
}

impl std::fmt::Display for StoredResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoredResult::File(path) => write!(f, "{}", path),
            StoredResult::Blob(location) => write!(f, "{}", location),
        }
    }
}

/// File name for a report: `schema_comparison_{table}_{YYYYmmdd_HHMMSS}.json`.
pub fn result_file_name(table: &str, at: &Zoned) -> String {
    format!(
        "schema_comparison_{}_{}.json",
        table,
        at.strftime("%Y%m%d_%H%M%S")
    )
}

/// Write `report` to `destination`, as-is, in its JSON form.
pub async fn store_report(
    report: &ComparisonReport,
    destination: &ResultDestination,
    blobs: Option<&dyn BlobStore>,
    diagnostics: &dyn Diagnostics,
) -> Result<StoredResult> {
    store_report_at(report, destination, blobs, diagnostics, &Zoned::now()).await
}

pub(crate) async fn store_report_at(
    report: &ComparisonReport,
    destination: &ResultDestination,
    blobs: Option<&dyn BlobStore>,
    diagnostics: &dyn Diagnostics,
    at: &Zoned,
) -> Result<StoredResult> {
    let body = report.to_json()?;
    let file_name = result_file_name(&report.table, at);

    let stored = match destination {
        ResultDestination::Directory(dir) => {
            let path = dir.join(&file_name);
            write_file(dir, &path, body).await.map(|()| StoredResult::File(path))
        }
        ResultDestination::BlobStore { bucket, prefix } => {
            let location = BlobLocation::under_prefix(bucket.as_str(), prefix, &file_name);
            match blobs {
                Some(blobs) => blobs
                    .put(&location, body.into_bytes())
                    .await
                    .map(|()| StoredResult::Blob(location)),
                None => Err(Error::MissingBlobStore(location)),
            }
        }
    };

    match &stored {
        Ok(result) => diagnostics.emit(
            Event::info("saved schema comparison result")
                .with("table", &report.table)
                .with("location", result),
        ),
        Err(e) => diagnostics.emit(
            Event::error("failed to save schema comparison result")
                .with("table", &report.table)
                .with("error", e),
        ),
    }
    stored
}

async fn write_file(dir: &Utf8PathBuf, path: &Utf8PathBuf, body: String) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| Error::Io {
            path: dir.clone(),
            source,
        })?;
    tokio::fs::write(path, body)
        .await
        .map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })
}
