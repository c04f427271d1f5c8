//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. User config: `~/.config/neorepo/config.toml` (XDG) or platform config dir
//! 2. Project config: `neorepo.toml`
//! 3. Environment variables: `NEOREPO_*`, with `__` separating sections
//!    (`NEOREPO_NEO4J__URI`, `NEOREPO_GENERATOR__OUTPUT_DIR`)
//!
//! # Intended Usage
//!
//! **Global config** (`~/.config/neorepo/config.toml`):
//! ```toml
//! [neo4j]
//! uri = "bolt://localhost:7687"
//! user = "neo4j"
//! password = "secret"
//! ```
//!
//! **Project config** (`neorepo.toml` next to `Cargo.toml`):
//! ```toml
//! [generator]
//! runtime = "::neorepo"
//! namespace = "crate::repositories"
//! output_dir = "target/neorepo"
//! ```
//!
//! Every key has a default, so both files are optional.

use std::ops::Deref;
use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use repo_codegen::GeneratorConfig;
use serde::Deserialize;

/// Project config file name, looked up in the working directory.
pub const PROJECT_CONFIG: &str = "neorepo.toml";

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub neo4j: Neo4jConfig,
    pub generator: GeneratorConfig,
}

/// Neo4j connection settings.
///
/// Typically defined in global config (`~/.config/neorepo/config.toml`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Neo4jConfig {
    /// Bolt URI, e.g. `bolt://localhost:7687`.
    pub uri: String,
    pub user: String,
    /// Empty when unset.
    pub password: Option<String>,
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: None,
        }
    }
}

impl Config {
    /// Load config with layered resolution (user → project → env).
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment(Self::user_config_path()))
    }

    /// The layered provider stack, exposed so callers can add overrides.
    pub fn figment(user_config: PathBuf) -> Figment {
        Figment::new()
            // Layer 1: User config (lowest priority)
            .merge(Toml::file(user_config))
            // Layer 2: Project config
            .merge(Toml::file(PROJECT_CONFIG))
            // Layer 3: Environment variables (highest priority)
            .merge(Env::prefixed("NEOREPO_").split("__"))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        figment.extract().map_err(ConfigError::from)
    }

    /// User config path: ~/.config/neorepo/config.toml (XDG) or platform config dir.
    fn user_config_path() -> PathBuf {
        // Prefer XDG config location (~/.config) on all platforms
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("neorepo").join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        // Fall back to platform-specific config dir
        dirs::config_dir()
            .map(|p| p.join("neorepo").join("config.toml"))
            .unwrap_or_default()
    }
}
