//! Durable handoff to object storage
//!
//! Serializes the joined session trees as newline-delimited JSON and writes
//! the whole byte stream in a single put to a fixed, well-known object,
//! overwriting prior content. The single put is what makes the handoff
//! all-or-nothing: a failed write leaves no partial object behind for the
//! loader to pick up.

mod rows;

pub use rows::{EventRow, SceneRow, SessionRow};

use crate::config::HandoffSettings;
use crate::error::{Error, Result};
use crate::model::SessionRecord;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::{Attribute, AttributeValue, Attributes, ObjectStore, PutOptions};
use std::sync::Arc;
use tracing::info;

/// MIME type stamped on the handoff object
pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Opaque reference to the written handoff object, consumed by the loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    /// Full URI, e.g. `gs://telemetry-handoff/sessions.ndjson`
    pub uri: String,
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.uri)
    }
}

/// Serialize joined sessions to newline-delimited JSON, one row per session
pub fn to_ndjson(sessions: &[SessionRecord]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    for session in sessions {
        let row = SessionRow::from(session);
        serde_json::to_writer(&mut buffer, &row)?;
        buffer.push(b'\n');
    }
    Ok(buffer)
}

/// Object storage destination parsed from a URL
#[derive(Debug, Clone)]
pub struct ObjectDestination {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Base path prefix within the bucket/container
    prefix: String,
    /// Original URL scheme, kept for building object URIs
    scheme: String,
}

impl ObjectDestination {
    /// Parse a destination URL and create the matching object store
    ///
    /// Supported formats:
    /// - `s3://bucket/prefix/` - AWS S3
    /// - `gs://bucket/prefix/` - Google Cloud Storage
    /// - `az://container/prefix/` - Azure Blob Storage
    /// - `/local/path/` or `file://path` - Local filesystem
    pub fn parse(url: &str) -> Result<Self> {
        if let Some(rest) = url.strip_prefix("s3://") {
            let (bucket, prefix) = split_bucket(rest);
            let store = AmazonS3Builder::from_env()
                .with_bucket_name(bucket)
                .build()
                .map_err(|e| Error::config(format!("Failed to create s3 client: {e}")))?;
            Ok(Self {
                store: Arc::new(store),
                prefix,
                scheme: "s3".to_string(),
            })
        } else if let Some(rest) = url.strip_prefix("gs://") {
            let (bucket, prefix) = split_bucket(rest);
            let store = GoogleCloudStorageBuilder::from_env()
                .with_bucket_name(bucket)
                .build()
                .map_err(|e| Error::config(format!("Failed to create GCS client: {e}")))?;
            Ok(Self {
                store: Arc::new(store),
                prefix,
                scheme: "gs".to_string(),
            })
        } else if let Some(rest) = url.strip_prefix("az://") {
            let (container, prefix) = split_bucket(rest);
            let store = MicrosoftAzureBuilder::from_env()
                .with_container_name(container)
                .build()
                .map_err(|e| Error::config(format!("Failed to create Azure client: {e}")))?;
            Ok(Self {
                store: Arc::new(store),
                prefix,
                scheme: "az".to_string(),
            })
        } else {
            let path = url.strip_prefix("file://").unwrap_or(url);
            std::fs::create_dir_all(path)
                .map_err(|e| Error::config(format!("Failed to create directory {path}: {e}")))?;
            let store = LocalFileSystem::new_with_prefix(path)
                .map_err(|e| Error::config(format!("Failed to create local store: {e}")))?;
            Ok(Self {
                store: Arc::new(store),
                prefix: String::new(),
                scheme: "file".to_string(),
            })
        }
    }

    /// Whether this destination is a cloud store (not local)
    pub fn is_cloud(&self) -> bool {
        self.scheme != "file"
    }

    /// The destination scheme (s3, gs, az, file)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Write bytes to `name`, replacing any existing object
    ///
    /// Cloud backends get the NDJSON content type stamped on the object;
    /// the local filesystem doesn't support attributes, so they are skipped.
    pub async fn put(&self, name: &str, data: Bytes) -> Result<ObjectRef> {
        let path = if self.prefix.is_empty() {
            ObjectPath::from(name)
        } else {
            ObjectPath::from(format!("{}/{name}", self.prefix.trim_end_matches('/')))
        };

        let options = if self.is_cloud() {
            PutOptions {
                attributes: Attributes::from_iter([(
                    Attribute::ContentType,
                    AttributeValue::from(NDJSON_CONTENT_TYPE),
                )]),
                ..Default::default()
            }
        } else {
            PutOptions::default()
        };

        self.store
            .put_opts(&path, data.into(), options)
            .await
            .map_err(|e| Error::handoff(format!("Failed to write {path}: {e}")))?;

        Ok(ObjectRef {
            uri: format!("{}://{path}", self.scheme),
        })
    }
}

/// Split `bucket/prefix` into its two parts
fn split_bucket(rest: &str) -> (&str, String) {
    match rest.find('/') {
        Some(at) => (&rest[..at], rest[at + 1..].trim_end_matches('/').to_string()),
        None => (rest, String::new()),
    }
}

/// Writes the joined batch to its well-known handoff object
#[derive(Debug)]
pub struct HandoffWriter {
    destination: ObjectDestination,
    object_name: String,
}

impl HandoffWriter {
    /// Create a writer from settings
    pub fn new(settings: &HandoffSettings) -> Result<Self> {
        Ok(Self {
            destination: ObjectDestination::parse(&settings.destination)?,
            object_name: settings.object_name.clone(),
        })
    }

    /// Serialize and write the batch, returning the object reference
    pub async fn write(&self, sessions: &[SessionRecord]) -> Result<ObjectRef> {
        let buffer = to_ndjson(sessions)?;
        let bytes_written = buffer.len();

        let object_ref = self
            .destination
            .put(&self.object_name, Bytes::from(buffer))
            .await?;

        info!(
            "Handoff wrote {} sessions ({bytes_written} bytes) to {object_ref}",
            sessions.len()
        );
        Ok(object_ref)
    }
}
