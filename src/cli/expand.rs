//! Expand command handler.

use std::path::Path;

use color_eyre::Result;

use crate::config::Config;

use super::SourceArgs;

pub(super) fn run(config: &Config, file: &Path, source: &SourceArgs) -> Result<()> {
    let discovered = super::discover(&[file.to_path_buf()], source)?;
    if discovered.is_empty() {
        tracing::info!("No repository traits in {}", super::display(file));
        return Ok(());
    }

    let report = super::generator(config)?.run(&discovered);
    for unit in &report.units {
        println!("{}", unit.render());
    }
    super::finish(&report)
}
