use crate::client::{PrimaryKey, Row};
use milvus_manager_core::Result;
use tracing::debug;

use super::client::MilvusRestClient;
use super::wire::{DeleteData, DeleteRequest, InsertData, UpsertData, WriteRequest};

pub(super) async fn insert(
    client: &MilvusRestClient,
    collection: &str,
    partition: Option<&str>,
    rows: Vec<Row>,
) -> Result<Vec<PrimaryKey>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let count = rows.len();
    let data: InsertData = client
        .post(
            "/entities/insert",
            &WriteRequest {
                collection_name: collection,
                partition_name: partition,
                data: rows,
            },
        )
        .await?
        .unwrap_or_default();

    debug!("Inserted {count} rows into {collection}");
    Ok(data.insert_ids)
}

pub(super) async fn upsert(
    client: &MilvusRestClient,
    collection: &str,
    partition: Option<&str>,
    rows: Vec<Row>,
) -> Result<Vec<PrimaryKey>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let count = rows.len();
    let data: UpsertData = client
        .post(
            "/entities/upsert",
            &WriteRequest {
                collection_name: collection,
                partition_name: partition,
                data: rows,
            },
        )
        .await?
        .unwrap_or_default();

    debug!("Upserted {count} rows into {collection}");
    Ok(data.upsert_ids)
}

pub(super) async fn delete(
    client: &MilvusRestClient,
    collection: &str,
    partition: Option<&str>,
    filter: &str,
) -> Result<u64> {
    let data: DeleteData = client
        .post(
            "/entities/delete",
            &DeleteRequest {
                collection_name: collection,
                partition_name: partition,
                filter,
            },
        )
        .await?
        .unwrap_or_default();

    debug!("Deleted {} rows from {collection} matching '{filter}'", data.delete_count);
    Ok(data.delete_count)
}
