//! Graph abstraction layer for backend-agnostic database access.
//!
//! [`CypherExecutor`] is the single seam between sessions and a database.
//! Backends implement it; [`Query`] and [`QueryExt`] add a fluent builder on
//! top of any executor.
//!
//! # Usage
//!
//! ```ignore
//! use neorepo::graph::QueryExt;
//!
//! // Query with parameters
//! let rows = client.query("MATCH (n:User) WHERE n.id = $id RETURN n")
//!     .param("id", user_id)
//!     .fetch_all()
//!     .await?;
//!
//! // Write query (no results)
//! client.query("CREATE (n:User {id: $id, name: $name})")
//!     .param("id", new_id)
//!     .param("name", name)
//!     .run()
//!     .await?;
//! ```

mod query;
mod row;
mod traits;

pub mod backends;

pub use query::{Query, QueryExt};
pub use row::{to_param, Params, Row, RowStream};
pub use traits::CypherExecutor;
