//! Fluent Cypher statements over any executor.

use futures::{StreamExt, TryStreamExt};
use serde::Serialize;

use crate::error::RepositoryError;
use crate::graph::row::{to_param, Params, Row, RowStream};
use crate::graph::traits::CypherExecutor;

/// A Cypher statement and its parameters, bound to an executor.
///
/// A parameter that fails to serialize does not panic: the first such
/// error is kept and returned when the statement is sent.
///
/// ```ignore
/// let row = client
///     .query("MATCH (u:User {id: $id}) RETURN u")
///     .param("id", "u1")
///     .fetch_one()
///     .await?;
/// ```
pub struct Query<'a, E: CypherExecutor + ?Sized> {
    executor: &'a E,
    cypher: String,
    params: Params,
    error: Option<RepositoryError>,
}

impl<'a, E: CypherExecutor + ?Sized> Query<'a, E> {
    pub fn new(executor: &'a E, cypher: impl Into<String>) -> Self {
        Self {
            executor,
            cypher: cypher.into(),
            params: Params::new(),
            error: None,
        }
    }

    /// Binds `$name` to `value`.
    pub fn param<T: Serialize>(mut self, name: &str, value: T) -> Self {
        match to_param(&value) {
            Ok(value) => {
                self.params.insert(name.to_string(), value);
            }
            Err(err) => {
                self.error.get_or_insert(err);
            }
        }
        self
    }

    /// Binds every entry of a prepared map.
    pub fn params(mut self, params: Params) -> Self {
        self.params.extend(params);
        self
    }

    /// Sends the statement and streams its rows.
    pub async fn execute(self) -> Result<RowStream<'a>, RepositoryError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        self.executor.execute_cypher(&self.cypher, self.params).await
    }

    pub async fn fetch_all(self) -> Result<Vec<Row>, RepositoryError> {
        self.execute().await?.try_collect().await
    }

    /// Reads no more than `limit` rows; the rest of the result is dropped
    /// unread.
    pub async fn fetch_up_to(self, limit: usize) -> Result<Vec<Row>, RepositoryError> {
        self.execute().await?.take(limit).try_collect().await
    }

    pub async fn fetch_one(self) -> Result<Option<Row>, RepositoryError> {
        Ok(self.fetch_up_to(1).await?.pop())
    }

    /// Sends a statement whose rows are not needed.
    pub async fn run(self) -> Result<(), RepositoryError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        self.executor.run_cypher(&self.cypher, self.params).await
    }
}

/// `executor.query("...")` for every [`CypherExecutor`].
pub trait QueryExt: CypherExecutor {
    fn query(&self, cypher: impl Into<String>) -> Query<'_, Self>
    where
        Self: Sized,
    {
        Query::new(self, cypher)
    }
}

impl<E: CypherExecutor> QueryExt for E {}
