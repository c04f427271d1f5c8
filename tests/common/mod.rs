//! Shared fixtures: entities and a session that records every call.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use neorepo::{Entity, Identifier, Params, RepositoryError, Result, Session, Updatable};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub revision: u32,
}

impl User {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            email: None,
            revision: 0,
        }
    }
}

impl Entity for User {
    const LABEL: &'static str = "User";
}

impl Updatable for User {
    fn update(&mut self) {
        self.revision += 1;
    }
}

/// An entity without an update hook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
}

impl Entity for Tag {
    const LABEL: &'static str = "Tag";
}

/// One session operation as the session saw it.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Save { label: &'static str, entity: JsonValue },
    Delete { label: &'static str, entity: JsonValue },
    Load { label: &'static str, id: JsonValue },
    Query { text: String, params: Params },
    QueryForObject { text: String, params: Params },
}

/// In-memory [`Session`] that records calls and answers queries with
/// canned rows.
#[derive(Default)]
pub struct RecordingSession {
    calls: Mutex<Vec<Call>>,
    rows: Mutex<HashMap<String, Vec<JsonValue>>>,
    stored: Mutex<HashMap<(&'static str, String), JsonValue>>,
    failing: AtomicBool,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows returned for `text`, each decoded as the requested type.
    pub fn with_rows(self, text: &str, rows: Vec<JsonValue>) -> Self {
        self.rows
            .lock()
            .unwrap()
            .insert(text.to_string(), rows);
        self
    }

    /// Makes every subsequent call fail.
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn saved(&self) -> Vec<JsonValue> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Save { entity, .. } => Some(entity),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepositoryError::Internal("session unavailable".to_string()));
        }
        Ok(())
    }

    fn rows_for(&self, text: &str) -> Vec<JsonValue> {
        self.rows
            .lock()
            .unwrap()
            .get(text)
            .cloned()
            .unwrap_or_default()
    }
}

fn key<T: Serialize + ?Sized>(id: &T) -> String {
    serde_json::to_string(id).unwrap()
}

fn decode<T: DeserializeOwned>(value: JsonValue) -> Result<T> {
    serde_json::from_value(value).map_err(|e| RepositoryError::Decode(e.to_string()))
}

#[async_trait]
impl Session for RecordingSession {
    async fn save<T: Entity>(&self, entity: &T) -> Result<()> {
        let value = serde_json::to_value(entity)?;
        self.record(Call::Save {
            label: T::LABEL,
            entity: value.clone(),
        })?;
        let id = key(&value[T::ID_PROPERTY]);
        self.stored.lock().unwrap().insert((T::LABEL, id), value);
        Ok(())
    }

    async fn delete<T: Entity>(&self, entity: &T) -> Result<()> {
        let value = serde_json::to_value(entity)?;
        self.record(Call::Delete {
            label: T::LABEL,
            entity: value.clone(),
        })?;
        let id = key(&value[T::ID_PROPERTY]);
        self.stored.lock().unwrap().remove(&(T::LABEL, id));
        Ok(())
    }

    async fn load<T: Entity, ID: Identifier>(&self, id: &ID) -> Result<Option<T>> {
        self.record(Call::Load {
            label: T::LABEL,
            id: serde_json::to_value(id)?,
        })?;
        let found = self
            .stored
            .lock()
            .unwrap()
            .get(&(T::LABEL, key(id)))
            .cloned();
        found.map(decode).transpose()
    }

    async fn query<T: DeserializeOwned + Send + 'static>(
        &self,
        query: &str,
        params: Params,
    ) -> Result<Vec<T>> {
        self.record(Call::Query {
            text: query.to_string(),
            params,
        })?;
        self.rows_for(query).into_iter().map(decode).collect()
    }

    async fn query_for_object<T: DeserializeOwned + Send + 'static>(
        &self,
        query: &str,
        params: Params,
    ) -> Result<Option<T>> {
        self.record(Call::QueryForObject {
            text: query.to_string(),
            params,
        })?;
        let mut rows = self.rows_for(query);
        if rows.len() > 1 {
            return Err(RepositoryError::TooManyRows {
                context: query.to_string(),
                count: rows.len(),
            });
        }
        rows.pop().map(decode).transpose()
    }
}

pub fn params(pairs: &[(&str, JsonValue)]) -> Params {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}
