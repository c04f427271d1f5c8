//! Generator settings.

use std::path::PathBuf;

use serde::Deserialize;

/// Runtime crate path used when nothing else is configured.
pub const DEFAULT_RUNTIME: &str = "::neorepo";

/// Settings for one generation pass.
///
/// Typically read from the `[generator]` section of `neorepo.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Path of the runtime crate as seen from generated code.
    pub runtime: String,
    /// Module path assumed for traits whose declaring module is unknown.
    pub namespace: Option<String>,
    /// Directory generated files are written to in file mode.
    pub output_dir: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            runtime: DEFAULT_RUNTIME.to_string(),
            namespace: None,
            output_dir: PathBuf::from("generated"),
        }
    }
}

impl GeneratorConfig {
    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = runtime.into();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }
}
