//! The executor trait graph backends implement.

use async_trait::async_trait;

use crate::error::RepositoryError;
use crate::graph::row::{Params, RowStream};

/// Executes Cypher queries against a graph database.
///
/// This is the only trait a backend must implement. [`GraphSession`]
/// builds every session operation on top of it.
///
/// [`GraphSession`]: crate::session::GraphSession
#[async_trait]
pub trait CypherExecutor: Send + Sync {
    /// Executes a Cypher query and returns a stream of result rows.
    ///
    /// Use this for queries that return data (MATCH, RETURN).
    async fn execute_cypher(
        &self,
        cypher: &str,
        params: Params,
    ) -> Result<RowStream<'_>, RepositoryError>;

    /// Executes a Cypher query without returning results.
    ///
    /// Use this for mutations (CREATE, MERGE, DELETE, SET).
    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), RepositoryError>;
}

#[async_trait]
impl<E: CypherExecutor + ?Sized> CypherExecutor for std::sync::Arc<E> {
    async fn execute_cypher(
        &self,
        cypher: &str,
        params: Params,
    ) -> Result<RowStream<'_>, RepositoryError> {
        (**self).execute_cypher(cypher, params).await
    }

    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), RepositoryError> {
        (**self).run_cypher(cypher, params).await
    }
}
