//! REST client for the warehouse load API

use super::{LoadJob, LoadState, TableSchema, Warehouse};
use crate::config::WarehouseSettings;
use crate::error::{Error, Result};
use crate::handoff::ObjectRef;
use crate::http::{HttpClient, RequestConfig};
use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

/// Warehouse client speaking the warehouse's REST load API
///
/// Submit: `POST {base}/datasets/{dataset}/tables/{table}/loads` with the
/// source URI, format, and schema. Status: `GET .../loads/{id}`.
#[derive(Debug)]
pub struct HttpWarehouse {
    client: HttpClient,
    dataset: String,
    table: String,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    job_id: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    state: LoadState,
}

impl HttpWarehouse {
    /// Create a warehouse client from settings
    pub fn new(settings: &WarehouseSettings) -> Self {
        let config = settings.http.client_config(&settings.base_url);
        Self {
            client: HttpClient::with_config(config),
            dataset: settings.dataset.clone(),
            table: settings.table.clone(),
        }
    }

    fn loads_path(&self) -> String {
        format!("/datasets/{}/tables/{}/loads", self.dataset, self.table)
    }
}

#[async_trait]
impl Warehouse for HttpWarehouse {
    async fn submit_load(&self, source: &ObjectRef, schema: &TableSchema) -> Result<LoadJob> {
        let body = json!({
            "source_uri": source.uri,
            "format": "ndjson",
            "schema": schema,
        });

        let response: SubmitResponse = self
            .client
            .request_json(
                Method::POST,
                &self.loads_path(),
                RequestConfig::new().json(body),
            )
            .await
            .map_err(|e| Error::warehouse(e.to_string()))?;

        info!(
            "Warehouse accepted load job {} into {}.{}",
            response.job_id, self.dataset, self.table
        );

        Ok(LoadJob {
            id: response.job_id,
            dataset: self.dataset.clone(),
            table: self.table.clone(),
        })
    }

    async fn load_state(&self, job: &LoadJob) -> Result<LoadState> {
        let response: StatusResponse = self
            .client
            .get_json(
                &format!("{}/{}", self.loads_path(), job.id),
                RequestConfig::new(),
            )
            .await
            .map_err(|e| Error::warehouse(e.to_string()))?;

        Ok(response.state)
    }
}
