//! Neo4j backend over the Bolt protocol.
//!
//! Parameters and rows cross the boundary as JSON: parameters are converted
//! to Bolt values before a query is sent, and every returned value is
//! converted back. Nodes and relationships become their property maps.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use neo4rs::{query, BoltList, BoltMap, BoltNull, BoltString, BoltType, Graph};
use serde_json::{Map as JsonMap, Number, Value as JsonValue};

use crate::config::Neo4jConfig;
use crate::error::RepositoryError;
use crate::graph::row::{Params, Row, RowStream};
use crate::graph::traits::CypherExecutor;

/// Neo4j client implementing [`CypherExecutor`].
///
/// Cheap to clone; clones share the driver's connection pool.
#[derive(Clone)]
pub struct Neo4jClient {
    graph: Arc<Graph>,
}

impl Neo4jClient {
    /// Connects to a Neo4j server.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = Neo4jClient::connect("bolt://localhost:7687", "neo4j", "secret").await?;
    /// ```
    pub async fn connect(uri: &str, user: &str, password: &str) -> Result<Self, RepositoryError> {
        tracing::debug!(uri, user, "Connecting to Neo4j");
        let graph = Graph::new(uri, user, password).await?;
        Ok(Self {
            graph: Arc::new(graph),
        })
    }

    /// Connects using the `[neo4j]` configuration section.
    pub async fn from_config(config: &Neo4jConfig) -> Result<Self, RepositoryError> {
        Self::connect(
            &config.uri,
            &config.user,
            config.password.as_deref().unwrap_or(""),
        )
        .await
    }

    /// Wraps an existing driver handle.
    pub fn from_graph(graph: Arc<Graph>) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    fn build_query(cypher: &str, params: Params) -> Result<neo4rs::Query, RepositoryError> {
        params
            .into_iter()
            .try_fold(query(cypher), |q, (name, value)| {
                Ok(q.param(&name, json_to_bolt(value)?))
            })
    }
}

#[async_trait]
impl CypherExecutor for Neo4jClient {
    async fn execute_cypher(
        &self,
        cypher: &str,
        params: Params,
    ) -> Result<RowStream<'_>, RepositoryError> {
        tracing::debug!(cypher, "Executing Cypher");
        let statement = Self::build_query(cypher, params)?;
        let stream = self
            .graph
            .execute(statement)
            .await
            .map_err(|e| query_error(e, cypher))?;

        let rows = futures::stream::try_unfold(stream, |mut stream| async move {
            match stream.next().await? {
                Some(row) => Ok(Some((parse_bolt_row(&row)?, stream))),
                None => Ok::<_, RepositoryError>(None),
            }
        });
        Ok(Box::pin(rows))
    }

    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), RepositoryError> {
        tracing::debug!(cypher, "Running Cypher");
        let statement = Self::build_query(cypher, params)?;
        self.graph
            .run(statement)
            .await
            .map_err(|e| query_error(e, cypher))
    }
}

fn query_error(err: neo4rs::Error, cypher: &str) -> RepositoryError {
    RepositoryError::Query {
        message: err.to_string(),
        query: cypher.to_string(),
    }
}

fn parse_bolt_row(row: &neo4rs::Row) -> Result<Row, RepositoryError> {
    let columns: HashMap<String, BoltType> = row
        .to()
        .map_err(|e| RepositoryError::Decode(format!("failed to read row: {}", e)))?;

    let data = columns
        .into_iter()
        .map(|(name, value)| bolt_to_json(value).map(|value| (name, value)))
        .collect::<Result<HashMap<_, _>, _>>()?;
    Ok(Row::new(data))
}

/// Converts a JSON parameter into a Bolt value.
///
/// Bolt integers are signed 64-bit; larger unsigned numbers are rejected
/// rather than sent as floats.
pub fn json_to_bolt(value: JsonValue) -> Result<BoltType, RepositoryError> {
    Ok(match value {
        JsonValue::Null => BoltType::Null(BoltNull),
        JsonValue::Bool(b) => BoltType::from(b),
        JsonValue::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => BoltType::from(i),
            _ if n.is_u64() => {
                return Err(RepositoryError::Parameter(format!(
                    "{} does not fit a 64-bit signed integer",
                    n
                )))
            }
            (None, Some(f)) => BoltType::from(f),
            (None, None) => {
                return Err(RepositoryError::Parameter(format!("unrepresentable number {}", n)))
            }
        },
        JsonValue::String(s) => BoltType::from(s),
        JsonValue::Array(items) => {
            let mut list = BoltList::new();
            for item in items {
                list.push(json_to_bolt(item)?);
            }
            BoltType::List(list)
        }
        JsonValue::Object(entries) => BoltType::Map(bolt_map(entries)?),
    })
}

fn bolt_map(entries: JsonMap<String, JsonValue>) -> Result<BoltMap, RepositoryError> {
    let mut map = BoltMap::new();
    for (key, value) in entries {
        map.put(BoltString::from(key), json_to_bolt(value)?);
    }
    Ok(map)
}

/// Converts a returned Bolt value into JSON.
///
/// Nodes and relationships are reduced to their properties.
pub fn bolt_to_json(value: BoltType) -> Result<JsonValue, RepositoryError> {
    Ok(match value {
        BoltType::Null(_) => JsonValue::Null,
        BoltType::Boolean(b) => JsonValue::Bool(b.value),
        BoltType::Integer(i) => JsonValue::Number(i.value.into()),
        BoltType::Float(f) => Number::from_f64(f.value)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        BoltType::String(s) => JsonValue::String(s.value),
        BoltType::List(list) => JsonValue::Array(
            list.value
                .into_iter()
                .map(bolt_to_json)
                .collect::<Result<_, _>>()?,
        ),
        BoltType::Map(map) => properties_to_json(map)?,
        BoltType::Node(node) => properties_to_json(node.properties)?,
        BoltType::Relation(rel) => properties_to_json(rel.properties)?,
        other => {
            return Err(RepositoryError::Decode(format!(
                "unsupported Bolt value: {:?}",
                other
            )))
        }
    })
}

fn properties_to_json(map: BoltMap) -> Result<JsonValue, RepositoryError> {
    let mut object = JsonMap::new();
    for (key, value) in map.value {
        object.insert(key.value, bolt_to_json(value)?);
    }
    Ok(JsonValue::Object(object))
}
