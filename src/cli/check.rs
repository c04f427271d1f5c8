//! Check command handler.

use std::path::PathBuf;

use color_eyre::Result;

use crate::config::Config;

use super::SourceArgs;

pub(super) fn run(config: &Config, files: &[PathBuf], source: &SourceArgs) -> Result<()> {
    let discovered = super::discover(files, source)?;
    let report = super::generator(config)?.run(&discovered);

    for unit in &report.units {
        tracing::info!(
            "{}: ok ({} method(s), factory `{}`)",
            unit.interface,
            unit.methods.len(),
            unit.factory.name
        );
    }
    super::finish(&report)
}
