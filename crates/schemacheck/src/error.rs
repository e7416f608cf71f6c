use crate::{BlobLocation, Side};
use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("failed to access {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid schema document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("blob store error at {location}: {message}")]
    BlobStore {
        location: BlobLocation,
        message: String,
    },

    #[error("blob store setup failed: {0}")]
    BlobStoreSetup(String),

    #[error("no blob store configured, cannot reach {0}")]
    MissingBlobStore(BlobLocation),

    #[error("invalid blob location {0:?}, expected s3://bucket/key")]
    InvalidBlobLocation(String),

    #[error("{side} schema column #{index} has no name")]
    InvalidDescriptor { side: Side, index: usize },
}
