//! Object storage access for schema documents and reports.

use crate::{Error, Result};
use rusoto_core::{ByteStream, HttpClient, Region};
use rusoto_credential::{DefaultCredentialsProvider, StaticProvider};
use rusoto_s3::{GetObjectRequest, PutObjectRequest, S3, S3Client};
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use tokio::io::AsyncReadExt;

/// Boxed future returned by the collaborator traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Address of an object, written `s3://bucket/key`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobLocation {
    pub bucket: String,
    pub key: String,
}

impl BlobLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Location of `name` under `prefix` in `bucket`.
    pub fn under_prefix(bucket: impl Into<String>, prefix: &str, name: &str) -> Self {
        let prefix = prefix.trim_matches('/');
        let key = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", prefix, name)
        };
        Self::new(bucket, key)
    }
}

impl std::fmt::Display for BlobLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

impl FromStr for BlobLocation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidBlobLocation(s.to_string());
        let rest = s.strip_prefix("s3://").ok_or_else(invalid)?;
        let (bucket, key) = rest.split_once('/').ok_or_else(invalid)?;
        if bucket.is_empty() || key.is_empty() {
            return Err(invalid());
        }
        Ok(Self::new(bucket, key))
    }
}

/// Reads and writes whole objects.
pub trait BlobStore: Send + Sync {
    /// Fetch the full contents of an object.
    fn get<'a>(&'a self, location: &'a BlobLocation) -> BoxFuture<'a, Result<Vec<u8>>>;

    /// Create or replace an object.
    fn put<'a>(&'a self, location: &'a BlobLocation, body: Vec<u8>) -> BoxFuture<'a, Result<()>>;
}

/// Connection settings for [`S3BlobStore`].
///
/// Without explicit keys the default AWS credential chain is used
/// (environment, profile, instance metadata).
#[derive(Debug, Clone, Default)]
pub struct S3Settings {
    /// AWS region; falls back to `AWS_DEFAULT_REGION` / `AWS_REGION`.
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible stores.
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

impl S3Settings {
    fn region(&self) -> Result<Region> {
        let name = self.region.clone().unwrap_or_default();
        match self.endpoint.as_deref().filter(|e| !e.is_empty()) {
            Some(endpoint) => Ok(Region::Custom {
                name,
                endpoint: endpoint.to_string(),
            }),
            None if name.is_empty() => Ok(Region::default()),
            None => Region::from_str(&name).map_err(|e| Error::BlobStoreSetup(e.to_string())),
        }
    }
}

/// [`BlobStore`] backed by S3.
pub struct S3BlobStore {
    client: S3Client,
}

impl S3BlobStore {
    pub fn new(settings: &S3Settings) -> Result<Self> {
        let region = settings.region()?;
        let http = HttpClient::new().map_err(|e| Error::BlobStoreSetup(e.to_string()))?;

        let client = match (&settings.access_key, &settings.secret_key) {
            (Some(access_key), Some(secret_key)) => {
                let credentials =
                    StaticProvider::new_minimal(access_key.to_owned(), secret_key.to_owned());
                S3Client::new_with(http, credentials, region)
            }
            _ => {
                let credentials = DefaultCredentialsProvider::new()
                    .map_err(|e| Error::BlobStoreSetup(e.to_string()))?;
                S3Client::new_with(http, credentials, region)
            }
        };

        Ok(Self { client })
    }

    pub fn from_client(client: S3Client) -> Self {
        Self { client }
    }
}

impl BlobStore for S3BlobStore {
    fn get<'a>(&'a self, location: &'a BlobLocation) -> BoxFuture<'a, Result<Vec<u8>>> {
        Box::pin(async move {
            let request = GetObjectRequest {
                bucket: location.bucket.clone(),
                key: location.key.clone(),
                ..Default::default()
            };

            let output = self
                .client
                .get_object(request)
                .await
                .map_err(|e| Error::BlobStore {
                    location: location.clone(),
                    message: e.to_string(),
                })?;

            let mut content = Vec::new();
            if let Some(body) = output.body {
                body.into_async_read()
                    .read_to_end(&mut content)
                    .await
                    .map_err(|e| Error::BlobStore {
                        location: location.clone(),
                        message: e.to_string(),
                    })?;
            }
            Ok(content)
        })
    }

    fn put<'a>(&'a self, location: &'a BlobLocation, body: Vec<u8>) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let request = PutObjectRequest {
                bucket: location.bucket.clone(),
                key: location.key.clone(),
                body: Some(ByteStream::from(body)),
                content_type: Some("application/json".to_string()),
                ..Default::default()
            };

            self.client
                .put_object(request)
                .await
                .map_err(|e| Error::BlobStore {
                    location: location.clone(),
                    message: e.to_string(),
                })?;
            Ok(())
        })
    }
}
