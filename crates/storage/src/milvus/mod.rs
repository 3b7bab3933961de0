// Private module - not exposed in public API
mod client;
mod collections;
mod operations;
mod wire;

pub(crate) use client::MilvusRestClient;
