//! Types for `.config/schemacheck.toml`.
//!
//! Every section is optional so that command-line flags can fill in whatever
//! the file leaves out.

use camino::Utf8PathBuf;
use serde::Deserialize;

/// Key prefix used when a blob-store destination does not name one.
pub const DEFAULT_RESULT_PREFIX: &str = "schema_comparison_results";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Also report columns that exist in the table but not in the expected schema.
    #[serde(default)]
    pub detect_extra_columns: bool,

    /// The table to check.
    #[serde(default)]
    pub target: TargetConfig,

    /// Where the expected schema document lives.
    pub source: Option<SourceConfig>,

    /// Where reports are written. Reports are not persisted when absent.
    pub destination: Option<DestinationConfig>,

    #[serde(default)]
    pub database_connection: DatabaseConnectionConfig,

    #[serde(default)]
    pub blob_store: BlobStoreConfig,
}

/// Database, schema and table identifying the live table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    pub database: Option<String>,
    pub schema: Option<String>,
    pub table: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SourceConfig {
    /// A JSON document on the local filesystem.
    File { path: Utf8PathBuf },
    /// A JSON document stored at `bucket`/`key`.
    BlobStore { bucket: String, key: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DestinationConfig {
    /// A local directory, created on first write.
    File { dir: Utf8PathBuf },
    BlobStore {
        bucket: String,
        #[serde(default = "default_prefix")]
        prefix: String,
    },
}

fn default_prefix() -> String {
    DEFAULT_RESULT_PREFIX.to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConnectionConfig {
    /// Connection URL. `DATABASE_URL` is used when this is not set.
    pub url: Option<String>,
}

/// S3 connection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlobStoreConfig {
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible stores. Empty means none.
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}
