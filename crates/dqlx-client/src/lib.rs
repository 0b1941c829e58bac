//! Runs dqlx queries and mutations through a pluggable [`Executor`] and decodes
//! the answers into your own types.

mod client;
mod config;
mod err;
mod executor;
mod response;

pub use {client::*, config::*, err::*, executor::*, response::*};

pub mod prelude {
    pub use crate::{
        ClientConfig, ClientError, ClientResult, Dqlx, ExecuteOptions, Executor,
        MutationRequest, MutationResponse, QueryRequest, QueryResponse, RawResponse,
    };
    pub use dqlx::prelude::*;
}
