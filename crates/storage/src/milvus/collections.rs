use crate::client::CreateCollection;
use milvus_manager_core::{CollectionSchema, IndexDescription, IndexParams, Result};
use tracing::debug;

use super::client::MilvusRestClient;
use super::wire::{
    CollectionRequest, CreateCollectionParams, CreateCollectionRequest, CreateIndexRequest,
    DescribeCollectionData, DescribeIndexRequest, DescribedIndex, HasData, LoadRequest,
    PartitionRequest, WireIndexParams, WireSchema,
};

pub(super) async fn has_collection(client: &MilvusRestClient, collection: &str) -> Result<bool> {
    let data: HasData = client
        .post_required(
            "/collections/has",
            &CollectionRequest {
                collection_name: collection,
            },
        )
        .await?;
    Ok(data.has)
}

pub(super) async fn create_collection(
    client: &MilvusRestClient,
    request: &CreateCollection,
) -> Result<()> {
    let body = CreateCollectionRequest {
        collection_name: &request.collection_name,
        schema: WireSchema::from(&request.schema),
        params: CreateCollectionParams {
            shards_num: request.shards,
            consistency_level: request.consistency_level,
        },
    };
    client.post_unit("/collections/create", &body).await
}

pub(super) async fn describe_collection(
    client: &MilvusRestClient,
    collection: &str,
) -> Result<CollectionSchema> {
    let data: DescribeCollectionData = client
        .post_required(
            "/collections/describe",
            &CollectionRequest {
                collection_name: collection,
            },
        )
        .await?;
    data.into_schema()
}

pub(super) async fn drop_collection(client: &MilvusRestClient, collection: &str) -> Result<()> {
    client
        .post_unit(
            "/collections/drop",
            &CollectionRequest {
                collection_name: collection,
            },
        )
        .await
}

pub(super) async fn describe_indexes(
    client: &MilvusRestClient,
    collection: &str,
) -> Result<Vec<IndexDescription>> {
    let names: Vec<String> = client
        .post(
            "/indexes/list",
            &CollectionRequest {
                collection_name: collection,
            },
        )
        .await?
        .unwrap_or_default();

    let mut indexes = Vec::with_capacity(names.len());
    for name in &names {
        let described: Vec<DescribedIndex> = client
            .post(
                "/indexes/describe",
                &DescribeIndexRequest {
                    collection_name: collection,
                    index_name: name,
                },
            )
            .await?
            .unwrap_or_default();
        indexes.extend(described.into_iter().map(IndexDescription::from));
    }

    debug!("Collection {collection} has {} indexes", indexes.len());
    Ok(indexes)
}

pub(super) async fn create_index(
    client: &MilvusRestClient,
    collection: &str,
    field: &str,
    params: &IndexParams,
) -> Result<()> {
    let body = CreateIndexRequest {
        collection_name: collection,
        index_params: vec![WireIndexParams::new(field, params)],
    };
    client.post_unit("/indexes/create", &body).await
}

pub(super) async fn has_partition(
    client: &MilvusRestClient,
    collection: &str,
    partition: &str,
) -> Result<bool> {
    let data: HasData = client
        .post_required(
            "/partitions/has",
            &PartitionRequest {
                collection_name: collection,
                partition_name: partition,
            },
        )
        .await?;
    Ok(data.has)
}

pub(super) async fn create_partition(
    client: &MilvusRestClient,
    collection: &str,
    partition: &str,
) -> Result<()> {
    client
        .post_unit(
            "/partitions/create",
            &PartitionRequest {
                collection_name: collection,
                partition_name: partition,
            },
        )
        .await
}

pub(super) async fn load_collection(
    client: &MilvusRestClient,
    collection: &str,
    replicas: u32,
) -> Result<()> {
    client
        .post_unit(
            "/collections/load",
            &LoadRequest {
                collection_name: collection,
                replica_number: replicas,
            },
        )
        .await
}
