//! Row and streaming types for query results.

use crate::error::RepositoryError;
use futures::Stream;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::pin::Pin;

/// Parameters for Cypher queries.
///
/// A map of parameter names to JSON values that can be passed to queries.
pub type Params = HashMap<String, JsonValue>;

/// A stream of rows from a query result.
///
/// Rows are fetched on demand, not loaded all at once.
pub type RowStream<'a> = Pin<Box<dyn Stream<Item = Result<Row, RepositoryError>> + Send + 'a>>;

/// Serializes a value for use as a query parameter.
pub fn to_param<T: Serialize + ?Sized>(value: &T) -> Result<JsonValue, RepositoryError> {
    Ok(serde_json::to_value(value)?)
}

/// A single row from a query result.
///
/// Contains column values as JSON, with typed extraction via [`Row::get`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    data: HashMap<String, JsonValue>,
}

impl Row {
    /// Creates a new row from a map of column names to values.
    pub fn new(data: HashMap<String, JsonValue>) -> Self {
        Self { data }
    }

    /// Gets a value from the row by column name, deserializing to the requested type.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let id: String = row.get("id")?;
    /// let count: i64 = row.get("count")?;
    /// ```
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, RepositoryError> {
        self.data
            .get(key)
            .ok_or_else(|| RepositoryError::Decode(format!("column not found: {}", key)))
            .and_then(|v| {
                serde_json::from_value(v.clone()).map_err(|e| {
                    RepositoryError::Decode(format!("failed to deserialize '{}': {}", key, e))
                })
            })
    }

    /// Decodes the whole row into `T`.
    ///
    /// A single-column row (`RETURN u`) decodes from that column's value;
    /// any other row decodes from the map of columns.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, RepositoryError> {
        let value = if self.data.len() == 1 {
            self.data
                .into_values()
                .next()
                .unwrap_or(JsonValue::Null)
        } else {
            JsonValue::Object(self.data.into_iter().collect())
        };
        serde_json::from_value(value)
            .map_err(|e| RepositoryError::Decode(format!("failed to deserialize row: {}", e)))
    }
}
