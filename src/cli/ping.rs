//! Ping command handler.

use color_eyre::eyre::eyre;
use color_eyre::Result;

use crate::config::Config;
use crate::graph::backends::neo4j::Neo4jClient;
use crate::graph::QueryExt;

pub(super) async fn run(config: &Config) -> Result<()> {
    tracing::info!("Connecting to Neo4j at {}", config.neo4j.uri);
    let client = Neo4jClient::from_config(&config.neo4j)
        .await
        .map_err(|e| eyre!("Failed to connect: {}", e))?;

    let row = client
        .query("RETURN 1 AS ok")
        .fetch_one()
        .await
        .map_err(|e| eyre!("Query failed: {}", e))?
        .ok_or_else(|| eyre!("Server returned no rows"))?;
    let ok: i64 = row.get("ok").map_err(|e| eyre!("{}", e))?;

    tracing::info!("Neo4j is reachable (RETURN 1 -> {})", ok);
    Ok(())
}
