//! Backend implementations of [`CypherExecutor`](crate::graph::CypherExecutor).
//!
//! | Backend | Module | Status |
//! |---------|--------|--------|
//! | Neo4j (Bolt) | [`neo4j`] | Available |
//!
//! A backend only needs to run Cypher and hand rows back as JSON maps;
//! everything else lives in [`GraphSession`](crate::session::GraphSession).

pub mod neo4j;
