//! Sessions: the five operations generated code is built on.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::entity::{Entity, Identifier};
use crate::error::{RepositoryError, Result};
use crate::graph::{CypherExecutor, Params, QueryExt, Row};

/// Handle to an open graph database.
///
/// Generated repository methods and [`NeoRepositoryImpl`] call nothing but
/// these five operations.
///
/// [`NeoRepositoryImpl`]: crate::NeoRepositoryImpl
#[async_trait]
pub trait Session: Send + Sync {
    /// Creates or replaces the node for `entity`.
    async fn save<T: Entity>(&self, entity: &T) -> Result<()>;

    /// Removes the node for `entity` and its relationships.
    async fn delete<T: Entity>(&self, entity: &T) -> Result<()>;

    /// Loads the entity of type `T` identified by `id`.
    async fn load<T: Entity, ID: Identifier>(&self, id: &ID) -> Result<Option<T>>;

    /// Runs `query` and decodes every row.
    async fn query<T: DeserializeOwned + Send + 'static>(
        &self,
        query: &str,
        params: Params,
    ) -> Result<Vec<T>>;

    /// Runs `query` and decodes its only row, if any.
    ///
    /// More than one row is an error.
    async fn query_for_object<T: DeserializeOwned + Send + 'static>(
        &self,
        query: &str,
        params: Params,
    ) -> Result<Option<T>>;
}

/// [`Session`] over any [`CypherExecutor`].
///
/// Entities are stored as nodes labelled [`Entity::LABEL`] whose properties
/// are the entity's serialized fields, keyed by [`Entity::ID_PROPERTY`].
pub struct GraphSession<E: CypherExecutor> {
    executor: E,
}

impl<E: CypherExecutor> GraphSession<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }
}

/// `MATCH`/`MERGE` pattern for the node identified by `$id`.
fn node_pattern<T: Entity>() -> String {
    format!(
        "(n:{} {{{}: $id}})",
        escape_name(T::LABEL),
        escape_name(T::ID_PROPERTY)
    )
}

/// Backtick-quotes a label or property name.
fn escape_name(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Serialized properties of `entity` and the value of its identifier.
fn properties<T: Entity>(entity: &T) -> Result<(JsonValue, JsonValue)> {
    let properties = serde_json::to_value(entity)?;
    let id = match &properties {
        JsonValue::Object(map) => map.get(T::ID_PROPERTY).cloned(),
        _ => {
            return Err(RepositoryError::Internal(format!(
                "entity `{}` must serialize to a map",
                T::LABEL
            )))
        }
    };
    match id {
        Some(id) if !id.is_null() => Ok((properties, id)),
        _ => Err(RepositoryError::MissingIdentifier {
            label: T::LABEL.to_string(),
            property: T::ID_PROPERTY.to_string(),
        }),
    }
}

#[async_trait]
impl<E: CypherExecutor> Session for GraphSession<E> {
    async fn save<T: Entity>(&self, entity: &T) -> Result<()> {
        let (props, id) = properties(entity)?;
        tracing::debug!(label = T::LABEL, "Saving entity");
        self.executor
            .query(format!("MERGE {} SET n = $props", node_pattern::<T>()))
            .param("id", id)
            .param("props", props)
            .run()
            .await
    }

    async fn delete<T: Entity>(&self, entity: &T) -> Result<()> {
        let (_, id) = properties(entity)?;
        tracing::debug!(label = T::LABEL, "Deleting entity");
        self.executor
            .query(format!("MATCH {} DETACH DELETE n", node_pattern::<T>()))
            .param("id", id)
            .run()
            .await
    }

    async fn load<T: Entity, ID: Identifier>(&self, id: &ID) -> Result<Option<T>> {
        let rows = self
            .executor
            .query(format!("MATCH {} RETURN n", node_pattern::<T>()))
            .param("id", id)
            .fetch_up_to(2)
            .await?;
        single_row(rows, T::LABEL)
    }

    async fn query<T: DeserializeOwned + Send + 'static>(
        &self,
        query: &str,
        params: Params,
    ) -> Result<Vec<T>> {
        let rows = self.executor.query(query).params(params).fetch_all().await?;
        tracing::debug!(rows = rows.len(), "Query returned");
        rows.into_iter().map(Row::decode).collect()
    }

    async fn query_for_object<T: DeserializeOwned + Send + 'static>(
        &self,
        query: &str,
        params: Params,
    ) -> Result<Option<T>> {
        let rows = self
            .executor
            .query(query)
            .params(params)
            .fetch_up_to(2)
            .await?;
        single_row(rows, query)
    }
}

/// Decodes the only row of a result read with `fetch_up_to(2)`.
fn single_row<T: DeserializeOwned>(mut rows: Vec<Row>, context: &str) -> Result<Option<T>> {
    match rows.len() {
        0 => Ok(None),
        1 => rows.pop().map(Row::decode).transpose(),
        count => {
            tracing::warn!(count, context, "Expected at most one row");
            Err(RepositoryError::TooManyRows {
                context: context.to_string(),
                count,
            })
        }
    }
}
