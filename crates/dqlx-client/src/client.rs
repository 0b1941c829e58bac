use crate::config::ClientConfig;
use crate::err::ClientResult;
use crate::executor::{ExecuteOptions, Executor, MutationRequest, QueryRequest};
use crate::response::{MutationResponse, QueryResponse};
use dqlx::builder::QueryBuilder;
use dqlx::mutation::Mutation;
use tap::TapFallible;
use tracing::{error, instrument, trace};

/// Compiles builders and mutations and hands them to an [`Executor`].
#[derive(Debug, Clone)]
pub struct Dqlx<E> {
    executor: E,
    config: ClientConfig,
}

impl<E: Executor> Dqlx<E> {
    pub fn new(executor: E, config: ClientConfig) -> Self {
        Self { executor, config }
    }

    /// Uses [`ClientConfig::from_env`].
    pub fn from_env(executor: E) -> Self {
        Self::new(executor, ClientConfig::from_env())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub async fn execute(&self, builder: QueryBuilder) -> ClientResult<QueryResponse> {
        self.execute_queries(&[builder]).await
    }

    /// Runs every builder as one request, with the configured query options.
    pub async fn execute_queries(&self, builders: &[QueryBuilder]) -> ClientResult<QueryResponse> {
        self.execute_queries_with(builders, self.config.query_options())
            .await
    }

    #[instrument(
        name = "dqlx.execute",
        skip(self, builders),
        fields(blocks = builders.len(), read_only = options.read_only),
        err
    )]
    pub async fn execute_queries_with(
        &self,
        builders: &[QueryBuilder],
        options: ExecuteOptions,
    ) -> ClientResult<QueryResponse> {
        let compiled = dqlx::compile(builders)?;
        let request = QueryRequest::new(compiled, options);
        trace!(query = %request.query, "sending query");

        let raw = self
            .executor
            .query(request)
            .await
            .tap_err(|e| error!("query failed: {:#}", e))?;

        // `var` blocks return no data of their own
        let operation_name = match builders {
            [single] if !single.is_variable() => Some(single.block_name().to_string()),
            _ => None,
        };
        Ok(QueryResponse::new(operation_name, raw))
    }

    #[instrument(name = "dqlx.mutate", skip_all, err)]
    pub async fn mutate(&self, mutation: Mutation) -> ClientResult<MutationResponse> {
        let compiled = mutation.compile()?;
        let request = MutationRequest::new(compiled, self.config.mutation_options());
        trace!(upsert = request.is_upsert(), condition = %request.condition, "sending mutation");

        let raw = self
            .executor
            .mutate(request)
            .await
            .tap_err(|e| error!("mutation failed: {:#}", e))?;

        Ok(MutationResponse::new(raw))
    }
}
