//! Loading the expected schema document.
//!
//! The document is a JSON array of column objects keyed like the catalog view:
//!
//! ```json
//! [
//!     {
//!         "COLUMN_NAME": "COUNTRY_CODE",
//!         "DATA_TYPE": "TEXT",
//!         "IS_NULLABLE": "NO",
//!         "CHARACTER_MAXIMUM_LENGTH": 3,
//!         "NUMERIC_PRECISION": null,
//!         "NUMERIC_SCALE": null,
//!         "DATETIME_PRECISION": null
//!     }
//! ]
//! ```

use crate::{BlobLocation, BlobStore, Diagnostics, Error, Event, Result, SchemaCollection};
use camino::Utf8PathBuf;
use std::str::FromStr;

/// Where the expected schema document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    File(Utf8PathBuf),
    BlobStore(BlobLocation),
}

impl SchemaSource {
    /// The blob location, if this source needs a blob store.
    pub fn blob_location(&self) -> Option<&BlobLocation> {
        match self {
            SchemaSource::File(_) => None,
            SchemaSource::BlobStore(location) => Some(location),
        }
    }
}

impl std::fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaSource::File(path) => write!(f, "{}", path),
            SchemaSource::BlobStore(location) => write!(f, "{}", location),
        }
    }
}

/// `s3://bucket/key` is a blob, anything else a file path.
impl FromStr for SchemaSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.starts_with("s3://") {
            Ok(SchemaSource::BlobStore(s.parse()?))
        } else {
            Ok(SchemaSource::File(Utf8PathBuf::from(s)))
        }
    }
}

/// Parse an expected schema document.
pub fn parse_expected_schema(bytes: &[u8]) -> Result<SchemaCollection> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Fetch and parse the expected schema.
///
/// Failures are reported through `diagnostics` and returned; they never turn
/// into an empty schema.
pub async fn load_expected_schema(
    source: &SchemaSource,
    blobs: Option<&dyn BlobStore>,
    diagnostics: &dyn Diagnostics,
) -> Result<SchemaCollection> {
    diagnostics.emit(Event::info("fetching expected schema").with("source", source));

    let result = match source {
        SchemaSource::File(path) => tokio::fs::read(path).await.map_err(|source| Error::Io {
            path: path.clone(),
            source,
        }),
        SchemaSource::BlobStore(location) => match blobs {
            Some(blobs) => blobs.get(location).await,
            None => Err(Error::MissingBlobStore(location.clone())),
        },
    }
    .and_then(|bytes| parse_expected_schema(&bytes));

    match result {
        Ok(schema) => {
            diagnostics.emit(
                Event::info("fetched and parsed expected schema")
                    .with("source", source)
                    .with("columns", schema.len()),
            );
            Ok(schema)
        }
        Err(e) => {
            diagnostics.emit(
                Event::error("failed to load expected schema")
                    .with("source", source)
                    .with("error", &e),
            );
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoxFuture, RecordingDiagnostics, Severity};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryBlobs {
        objects: Mutex<HashMap<BlobLocation, Vec<u8>>>,
    }

    impl BlobStore for MemoryBlobs {
        fn get<'a>(&'a self, location: &'a BlobLocation) -> BoxFuture<'a, Result<Vec<u8>>> {
            let found = self.objects.lock().unwrap().get(location).cloned();
            Box::pin(async move {
                found.ok_or_else(|| Error::BlobStore {
                    location: location.clone(),
                    message: "NoSuchKey".to_string(),
                })
            })
        }

        fn put<'a>(&'a self, location: &'a BlobLocation, body: Vec<u8>) -> BoxFuture<'a, Result<()>> {
            self.objects.lock().unwrap().insert(location.clone(), body);
            Box::pin(async { Ok(()) })
        }
    }

    const DOCUMENT: &str = r#"[
        {"COLUMN_NAME": "COUNTRY_CODE", "DATA_TYPE": "TEXT", "IS_NULLABLE": "NO",
         "CHARACTER_MAXIMUM_LENGTH": 3, "NUMERIC_PRECISION": null, "NUMERIC_SCALE": null,
         "DATETIME_PRECISION": null},
        {"COLUMN_NAME": "INGESTION_TIMESTAMP", "DATA_TYPE": "NUMBER", "IS_NULLABLE": "YES",
         "CHARACTER_MAXIMUM_LENGTH": null, "NUMERIC_PRECISION": 13.0, "NUMERIC_SCALE": 0,
         "DATETIME_PRECISION": null}
    ]"#;

    #[test]
    fn test_parse_document() {
        let schema = parse_expected_schema(DOCUMENT.as_bytes()).unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.columns[0].name, "COUNTRY_CODE");
        assert_eq!(schema.columns[0].is_nullable.as_deref(), Some("NO"));
        assert!(schema.columns[1].numeric_precision.as_ref().unwrap().is_f64());
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let err = parse_expected_schema(br#"{"COLUMN_NAME": "A"}"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_parse_rejects_column_without_name() {
        let err = parse_expected_schema(br#"[{"COLUMN_NAME": "A"}, {"DATA_TYPE": "TEXT"}]"#)
            .unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_source_from_str() {
        assert_eq!(
            "schemas/CT_COUNTRY.json".parse::<SchemaSource>().unwrap(),
            SchemaSource::File("schemas/CT_COUNTRY.json".into())
        );
        assert_eq!(
            "s3://bucket/schemas/CT_COUNTRY.json".parse::<SchemaSource>().unwrap(),
            SchemaSource::BlobStore(BlobLocation::new("bucket", "schemas/CT_COUNTRY.json"))
        );
        assert!("s3://bucket".parse::<SchemaSource>().is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expected.json");
        std::fs::write(&path, DOCUMENT).unwrap();
        let path = Utf8PathBuf::from_path_buf(path).unwrap();

        let diagnostics = RecordingDiagnostics::new();
        let schema = load_expected_schema(&SchemaSource::File(path), None, &diagnostics)
            .await
            .unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(diagnostics.count(Severity::Info), 2);
        assert_eq!(diagnostics.events()[1].field("columns"), Some("2"));
    }

    #[tokio::test]
    async fn test_load_missing_file_is_an_error() {
        let diagnostics = RecordingDiagnostics::new();
        let source = SchemaSource::File("/nonexistent/expected.json".into());
        let err = load_expected_schema(&source, None, &diagnostics)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(diagnostics.count(Severity::Error), 1);
    }

    #[tokio::test]
    async fn test_load_from_blob_store() {
        let blobs = MemoryBlobs::default();
        let location = BlobLocation::new("athena-dwh-queries", "schemas/CT_COUNTRY_schema.json");
        blobs
            .put(&location, DOCUMENT.as_bytes().to_vec())
            .await
            .unwrap();

        let source = SchemaSource::BlobStore(location);
        let schema = load_expected_schema(&source, Some(&blobs), &RecordingDiagnostics::new())
            .await
            .unwrap();
        assert_eq!(schema.columns[1].name, "INGESTION_TIMESTAMP");

        let missing = SchemaSource::BlobStore(BlobLocation::new("athena-dwh-queries", "nope.json"));
        let err = load_expected_schema(&missing, Some(&blobs), &RecordingDiagnostics::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BlobStore { .. }));
    }

    #[tokio::test]
    async fn test_blob_source_without_store() {
        let source = SchemaSource::BlobStore(BlobLocation::new("b", "k.json"));
        let err = load_expected_schema(&source, None, &RecordingDiagnostics::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingBlobStore(_)));
    }
}
