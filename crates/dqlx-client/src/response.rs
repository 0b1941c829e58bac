//! Typed access to raw responses.
//!
//! Timestamps decode from RFC3339 strings into `chrono::DateTime` fields
//! through chrono's own serde support.
use crate::err::{ClientError, ClientResult};
use crate::executor::RawResponse;
use derive_getters::Getters;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

/// The answer to one or more query blocks.
#[derive(Getters, Debug, Clone, PartialEq)]
pub struct QueryResponse {
    /// Block decoded by [`QueryResponse::decode`]; `None` when several blocks
    /// were requested.
    operation_name: Option<String>,
    raw: RawResponse,
}

impl QueryResponse {
    pub fn new(operation_name: Option<String>, raw: RawResponse) -> Self {
        Self {
            operation_name,
            raw,
        }
    }

    pub fn json(&self) -> ClientResult<serde_json::Value> {
        Ok(serde_json::from_slice(&self.raw.json)?)
    }

    /// Decodes the single requested block, or the whole document keyed by
    /// block name when several blocks were requested.
    pub fn decode<T: DeserializeOwned>(&self) -> ClientResult<T> {
        match &self.operation_name {
            Some(name) => self.block(name),
            None => Ok(serde_json::from_slice(&self.raw.json)?),
        }
    }

    pub fn block<T: DeserializeOwned>(&self, name: &str) -> ClientResult<T> {
        let mut document = match self.json()? {
            serde_json::Value::Object(map) => map,
            _ => return Err(ClientError::MissingBlock(name.to_string())),
        };
        let block = document
            .remove(name)
            .ok_or_else(|| ClientError::MissingBlock(name.to_string()))?;
        Ok(serde_json::from_value(block)?)
    }
}

#[derive(Getters, Debug, Clone, PartialEq)]
pub struct MutationResponse {
    raw: RawResponse,
}

impl MutationResponse {
    pub fn new(raw: RawResponse) -> Self {
        Self { raw }
    }

    /// Blank node name → assigned uid.
    pub fn uids(&self) -> &BTreeMap<String, String> {
        &self.raw.uids
    }

    /// The uid assigned to blank node `name` (`_:name` in the payload).
    pub fn uid(&self, name: &str) -> Option<&str> {
        let name = name.strip_prefix("_:").unwrap_or(name);
        self.raw.uids.get(name).map(String::as_str)
    }

    /// Decodes the upsert query block `name`, if the database returned it.
    pub fn block<T: DeserializeOwned>(&self, name: &str) -> ClientResult<T> {
        QueryResponse::new(None, self.raw.clone()).block(name)
    }
}
