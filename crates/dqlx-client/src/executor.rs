//! The transport seam.
//!
//! No transport ships with this crate: plug in a gRPC or HTTP client by
//! implementing [`Executor`].
use async_trait::async_trait;
use dqlx::mutation::CompiledMutation;
use dqlx::CompiledQuery;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a request is run against the database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteOptions {
    pub read_only: bool,
    /// Allow a read-only query to be answered without waiting for the latest
    /// timestamp.
    pub best_effort: bool,
    /// Commit as part of the request instead of in a separate call.
    pub commit_now: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRequest {
    pub query: String,
    pub variables: BTreeMap<String, String>,
    pub options: ExecuteOptions,
}

impl QueryRequest {
    pub fn new(compiled: CompiledQuery, options: ExecuteOptions) -> Self {
        let (query, variables) = compiled.into_parts();
        Self {
            query,
            variables,
            options,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MutationRequest {
    /// Upsert query; empty for plain mutations.
    pub query: String,
    pub variables: BTreeMap<String, String>,
    /// `@if(..)` guard; empty when unconditional.
    pub condition: String,
    pub set_json: Option<String>,
    pub delete_json: Option<String>,
    pub options: ExecuteOptions,
}

impl MutationRequest {
    pub fn new(compiled: CompiledMutation, options: ExecuteOptions) -> Self {
        let (query, variables) = compiled
            .query()
            .clone()
            .map(CompiledQuery::into_parts)
            .unwrap_or_default();
        Self {
            query,
            variables,
            condition: compiled.condition().clone().unwrap_or_default(),
            set_json: compiled.set_json().clone(),
            delete_json: compiled.delete_json().clone(),
            options,
        }
    }

    pub fn is_upsert(&self) -> bool {
        !self.query.is_empty()
    }
}

/// What the database answered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawResponse {
    /// The JSON document, keyed by block name.
    pub json: Vec<u8>,
    /// Blank node name → assigned uid, for mutations.
    #[serde(default)]
    pub uids: BTreeMap<String, String>,
}

impl RawResponse {
    pub fn from_json(json: impl Into<Vec<u8>>) -> Self {
        Self {
            json: json.into(),
            uids: BTreeMap::new(),
        }
    }
}

/// Runs compiled requests.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn query(&self, request: QueryRequest) -> anyhow::Result<RawResponse>;

    async fn mutate(&self, request: MutationRequest) -> anyhow::Result<RawResponse>;
}
