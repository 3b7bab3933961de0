//! Milvus REST client implementing the database seam

use crate::client::{CreateCollection, PrimaryKey, Row, VectorDatabase};
use async_trait::async_trait;
use milvus_manager_core::{
    CollectionSchema, Error, IndexDescription, IndexParams, ManagerConfig, Result,
};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::debug;

use super::wire::MilvusResponse;

/// Response codes the REST gateway uses for success
const SUCCESS_CODES: [i64; 2] = [0, 200];

/// Client for the Milvus v2 REST API
pub(crate) struct MilvusRestClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    timeout_ms: Option<u64>,
}

impl MilvusRestClient {
    /// Create a new client from the manager configuration
    pub fn new(config: &ManagerConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let client = builder
            .build()
            .map_err(|e| Error::transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.connection_address.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            timeout_ms: config.timeout_ms,
        })
    }

    /// POST a JSON body to `/v2/vectordb{path}` and unwrap the response envelope
    ///
    /// Returns `None` when the call succeeded without a `data` payload.
    pub(super) async fn post<B, T>(&self, path: &str, body: &B) -> Result<Option<T>>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}/v2/vectordb{path}", self.base_url);
        debug!("POST {url}");

        let mut request = self.client.post(&url).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| match self.timeout_ms {
            Some(ms) if e.is_timeout() => Error::Timeout(ms),
            _ => Error::transport(format!("Request to {path} failed: {e}")),
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::transport(format!(
                "Milvus request {path} failed: {status} - {body}"
            )));
        }

        let envelope: MilvusResponse<T> = response
            .json()
            .await
            .map_err(|e| Error::transport(format!("Invalid response from {path}: {e}")))?;

        if !SUCCESS_CODES.contains(&envelope.code) {
            return Err(Error::database(
                envelope.code,
                envelope
                    .message
                    .unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }

        Ok(envelope.data)
    }

    /// Like [`post`](Self::post) but a missing payload is an error
    pub(super) async fn post_required<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.post(path, body)
            .await?
            .ok_or_else(|| Error::transport(format!("No data returned from {path}")))
    }

    /// POST where only success matters
    pub(super) async fn post_unit<B>(&self, path: &str, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.post::<B, serde_json::Value>(path, body).await?;
        Ok(())
    }
}

#[async_trait]
impl VectorDatabase for MilvusRestClient {
    // Collection, index and partition calls live in collections.rs,
    // entity writes in operations.rs
    async fn has_collection(&self, collection: &str) -> Result<bool> {
        super::collections::has_collection(self, collection).await
    }

    async fn create_collection(&self, request: &CreateCollection) -> Result<()> {
        super::collections::create_collection(self, request).await
    }

    async fn describe_collection(&self, collection: &str) -> Result<CollectionSchema> {
        super::collections::describe_collection(self, collection).await
    }

    async fn drop_collection(&self, collection: &str) -> Result<()> {
        super::collections::drop_collection(self, collection).await
    }

    async fn describe_indexes(&self, collection: &str) -> Result<Vec<IndexDescription>> {
        super::collections::describe_indexes(self, collection).await
    }

    async fn create_index(
        &self,
        collection: &str,
        field: &str,
        params: &IndexParams,
    ) -> Result<()> {
        super::collections::create_index(self, collection, field, params).await
    }

    async fn has_partition(&self, collection: &str, partition: &str) -> Result<bool> {
        super::collections::has_partition(self, collection, partition).await
    }

    async fn create_partition(&self, collection: &str, partition: &str) -> Result<()> {
        super::collections::create_partition(self, collection, partition).await
    }

    async fn load_collection(&self, collection: &str, replicas: u32) -> Result<()> {
        super::collections::load_collection(self, collection, replicas).await
    }

    async fn insert(
        &self,
        collection: &str,
        partition: Option<&str>,
        rows: Vec<Row>,
    ) -> Result<Vec<PrimaryKey>> {
        super::operations::insert(self, collection, partition, rows).await
    }

    async fn upsert(
        &self,
        collection: &str,
        partition: Option<&str>,
        rows: Vec<Row>,
    ) -> Result<Vec<PrimaryKey>> {
        super::operations::upsert(self, collection, partition, rows).await
    }

    async fn delete(
        &self,
        collection: &str,
        partition: Option<&str>,
        filter: &str,
    ) -> Result<u64> {
        super::operations::delete(self, collection, partition, filter).await
    }
}
