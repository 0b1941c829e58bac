//! Client configuration.
//!
//! ```bash
//! export DGRAPH_ADDRESS=dgraph.internal:9080
//! export DQLX_READ_ONLY=true      # queries run in read-only transactions
//! export DQLX_BEST_EFFORT=true    # read-only queries may be served from stale data
//! ```
use crate::executor::ExecuteOptions;
use derive_getters::Getters;
use tracing::debug;

pub const DEFAULT_ADDRESS: &str = "localhost:9080";

const ENV_ADDRESS: &str = "DGRAPH_ADDRESS";
const ENV_READ_ONLY: &str = "DQLX_READ_ONLY";
const ENV_BEST_EFFORT: &str = "DQLX_BEST_EFFORT";

#[derive(Getters, Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// `host:port` of the Dgraph alpha, for executors that need it
    address: String,
    read_only: bool,
    best_effort: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ADDRESS)
    }
}

impl ClientConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            read_only: false,
            best_effort: false,
        }
    }

    /// Reads `DGRAPH_ADDRESS`, `DQLX_READ_ONLY` and `DQLX_BEST_EFFORT`, falling
    /// back to the defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let address = lookup(ENV_ADDRESS)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_ADDRESS.to_string());
        let read_only = lookup(ENV_READ_ONLY).and_then(|s| parse_flag(&s)).unwrap_or(false);
        let best_effort = lookup(ENV_BEST_EFFORT)
            .and_then(|s| parse_flag(&s))
            .unwrap_or(false);

        debug!(
            "client configured from environment: address={}, read_only={}, best_effort={}",
            address, read_only, best_effort
        );

        Self {
            address,
            read_only,
            best_effort,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Best effort only applies to read-only queries, so it implies `read_only`.
    pub fn with_best_effort(mut self, best_effort: bool) -> Self {
        self.best_effort = best_effort;
        if best_effort {
            self.read_only = true;
        }
        self
    }

    /// Options for running queries.
    pub fn query_options(&self) -> ExecuteOptions {
        ExecuteOptions {
            read_only: self.read_only || self.best_effort,
            best_effort: self.best_effort,
            commit_now: false,
        }
    }

    /// Options for running mutations. Mutations always commit immediately.
    pub fn mutation_options(&self) -> ExecuteOptions {
        ExecuteOptions {
            read_only: false,
            best_effort: false,
            commit_now: true,
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
