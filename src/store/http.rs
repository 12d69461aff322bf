//! REST client for the online store's query API

use super::{ScanPage, Shard, TelemetryStore};
use crate::config::StoreSettings;
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::types::RecordKind;
use async_trait::async_trait;
use serde_json::json;

/// Online store client speaking the store's REST query API
///
/// Scan: `GET {base}/records/{kind}?exported=false&shard=i&shard_count=n`
/// with cursor pagination. Delete: `POST {base}/records/{kind}/delete`.
#[derive(Debug)]
pub struct HttpStore {
    client: HttpClient,
    page_size: usize,
}

impl HttpStore {
    /// Create a store client from settings
    pub fn new(settings: &StoreSettings) -> Self {
        let mut config = settings.http.client_config(&settings.base_url);
        config.rate_limit = settings.rate_limit.limiter_config();
        Self {
            client: HttpClient::with_config(config),
            page_size: settings.page_size,
        }
    }

    /// Create a store client around an existing HTTP client
    pub fn with_client(client: HttpClient, page_size: usize) -> Self {
        Self { client, page_size }
    }
}

#[async_trait]
impl TelemetryStore for HttpStore {
    async fn scan_page(
        &self,
        kind: RecordKind,
        shard: Shard,
        cursor: Option<String>,
    ) -> Result<ScanPage> {
        let mut request = RequestConfig::new()
            .query("exported", "false")
            .query("shard", shard.index.to_string())
            .query("shard_count", shard.count.to_string())
            .query("limit", self.page_size.to_string());

        if let Some(cursor) = cursor {
            request = request.query("cursor", cursor);
        }

        self.client
            .get_json(&format!("/records/{kind}"), request)
            .await
            .map_err(|e| Error::store_scan(kind.as_str(), e.to_string()))
    }

    async fn delete(&self, kind: RecordKind, keys: &[String]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }

        self.client
            .post(&format!("/records/{kind}/delete"), json!({ "keys": keys }))
            .await
            .map_err(|e| Error::store_delete(kind.as_str(), e.to_string()))?;

        Ok(())
    }
}
