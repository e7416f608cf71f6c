//! Column schema drift detection for Postgres tables.
//!
//! This crate provides:
//! - Typed column descriptors and the comparator that reconciles an expected
//!   schema against the one found in the database
//! - Catalog introspection via `information_schema.columns`
//! - Loading reference schemas and storing reports, on disk or in S3
//!
//! # Comparing schemas
//!
//! The comparator is a pure function. Columns are matched by upper-cased
//! name, and six attributes are compared with strict equality of their raw
//! values:
//!
//! ```
//! use schemacheck::{ColumnDescriptor, CompareOptions, NullDiagnostics, SchemaCollection, compare};
//!
//! let expected = SchemaCollection::from(vec![
//!     ColumnDescriptor::new("id").with_data_type("NUMBER").with_nullable("NO"),
//! ]);
//! let actual = SchemaCollection::from(vec![
//!     ColumnDescriptor::new("ID").with_data_type("NUMBER").with_nullable("YES"),
//! ]);
//!
//! let report = compare("ACCOUNT", &expected, &actual, &CompareOptions::default(), &NullDiagnostics)?;
//! assert!(!report.is_pass());
//! assert_eq!(report.mismatches.len(), 1);
//! # Ok::<(), schemacheck::Error>(())
//! ```
//!
//! # Running a full check
//!
//! ```ignore
//! let (client, connection) = tokio_postgres::connect(&url, tokio_postgres::NoTls).await?;
//! tokio::spawn(connection);
//!
//! let inspector = CatalogInspector::new(&client);
//! let outcome = run_check(&plan, &inspector, None, &TracingDiagnostics).await?;
//! println!("{}", outcome.report);
//! ```

mod blob;
mod column;
mod compare;
mod diagnostics;
mod error;
mod expected;
mod inspect;
mod report;
mod run;
mod sink;
mod traced;

pub use blob::{BlobLocation, BlobStore, BoxFuture, S3BlobStore, S3Settings};
pub use column::{Attribute, AttributeValue, ColumnDescriptor, SchemaCollection, Side};
pub use compare::{CompareOptions, compare};
pub use diagnostics::{
    Diagnostics, Event, NullDiagnostics, RecordingDiagnostics, Severity, TracingDiagnostics,
};
pub use error::Error;
pub use expected::{SchemaSource, load_expected_schema, parse_expected_schema};
pub use inspect::{CatalogInspector, Inspector, TableRef, columns_query};
pub use report::{CheckStatus, ComparisonReport, Mismatch};
pub use run::{CheckOutcome, CheckPlan, run_check};
pub use sink::{
    DEFAULT_RESULT_PREFIX, ResultDestination, StoredResult, result_file_name, store_report,
};
pub use traced::{Connection, ConnectionExt, TracedConn};

/// Result type for schemacheck operations.
pub type Result<T> = std::result::Result<T, Error>;
