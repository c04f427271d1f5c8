//! neorepo - graph repositories generated from annotated traits.
//!
//! Declare a repository as a trait extending [`NeoRepository`] and mark it
//! with [`repository`]. The attribute generates an implementation over any
//! [`Session`]; [`GraphSession`] provides one over a Cypher backend such as
//! [`graph::backends::neo4j::Neo4jClient`].
//!
//! ```ignore
//! use std::sync::Arc;
//! use neorepo::{repository, GraphSession, NeoRepository, Result};
//! use neorepo::graph::backends::neo4j::Neo4jClient;
//!
//! #[repository]
//! pub trait UserRepository: NeoRepository<User, String> {
//!     #[query("MATCH (u:User {name: $name}) RETURN u")]
//!     async fn find_by_name(&self, name: String) -> Result<User>;
//!
//!     #[update]
//!     async fn touch(&self, user: User) -> Result<User>;
//! }
//!
//! let client = Neo4jClient::connect("bolt://localhost:7687", "neo4j", "secret").await?;
//! let users = user_repository(Arc::new(GraphSession::new(client)));
//! let ada = users.find_by_name("ada".to_string()).await?;
//! ```

pub mod cli;
pub mod config;
pub mod entity;
pub mod error;
pub mod graph;
pub mod repository;
pub mod session;

pub use entity::{Entity, Identifier, Updatable};
pub use error::{RepositoryError, Result};
pub use graph::{to_param, Params};
pub use repo_macros::repository;
pub use repository::{NeoRepository, NeoRepositoryImpl};
pub use session::{GraphSession, Session};

/// Items generated code refers to. Not public API.
#[doc(hidden)]
pub mod __private {
    pub use crate::entity::hook::{UpdateHook, ViaUpdatable, WithoutHook};
    pub use async_trait::async_trait;
    pub use serde::de::IgnoredAny;
}
