//! CLI module for neorepo.
//!
//! Subcommands:
//! - `expand`: Print the code generated for one source file
//! - `check`: Report diagnostics without writing anything
//! - `generate`: Write one file per repository trait
//! - `ping`: Check the configured Neo4j connection

mod check;
mod expand;
mod generate;
mod ping;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use repo_codegen::{collect_repositories, module_path_for, Discovered, GenerationReport, Generator};

use crate::config::Config;

/// neorepo - graph repositories generated from annotated traits
#[derive(Parser)]
#[command(name = "neorepo")]
#[command(about = "Inspect and generate #[repository] implementations")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the generated implementation of every repository trait in a file
    Expand {
        file: PathBuf,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Report diagnostics for repository traits without writing anything
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Write one generated file per repository trait
    Generate {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output directory (defaults to `generator.output_dir`)
        #[arg(short, long)]
        out: Option<PathBuf>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Connect to Neo4j and run a trivial query
    Ping,
}

/// Options shared by commands that read source files.
#[derive(Args)]
pub struct SourceArgs {
    /// Crate `src` directory, used to derive each file's module path
    #[arg(long)]
    pub src_root: Option<PathBuf>,
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;
        match self.command {
            Command::Expand { ref file, ref source } => expand::run(&config, file, source),
            Command::Check {
                ref files,
                ref source,
            } => check::run(&config, files, source),
            Command::Generate {
                ref files,
                ref out,
                ref source,
            } => generate::run(&config, files, out.as_deref(), source),
            Command::Ping => ping::run(&config).await,
        }
    }
}

fn generator(config: &Config) -> Result<Generator> {
    Generator::new(config.generator.clone()).map_err(|e| eyre!("{}", e))
}

/// Parses every file and collects its repository traits, in argument order.
fn discover(files: &[PathBuf], source: &SourceArgs) -> Result<Vec<Discovered>> {
    let mut discovered = Vec::new();
    for file in files {
        let text = std::fs::read_to_string(file)
            .wrap_err_with(|| format!("Failed to read {}", file.display()))?;
        let parsed = syn::parse_file(&text)
            .map_err(|e| eyre!("Failed to parse {}: {}", file.display(), e))?;
        let module_path = source
            .src_root
            .as_deref()
            .and_then(|root| module_path_for(root, file));

        let found = collect_repositories(&parsed, module_path.as_deref());
        tracing::debug!(
            "{}: {} repository trait(s) in {}",
            file.display(),
            found.len(),
            module_path.as_deref().unwrap_or("unknown module")
        );
        discovered.extend(found);
    }
    Ok(discovered)
}

/// Logs every diagnostic in the report and fails if there were any.
fn finish(report: &GenerationReport) -> Result<()> {
    for failure in &report.failures {
        for error in &failure.errors {
            tracing::error!("{}: {}", failure.interface, error);
        }
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(eyre!(
            "{} of {} repository trait(s) failed",
            report.failures.len(),
            report.failures.len() + report.units.len()
        ))
    }
}

fn discovered_name(found: &Discovered) -> String {
    let name = match &found.item {
        syn::Item::Trait(item_trait) => item_trait.ident.to_string(),
        _ => "item".to_string(),
    };
    match &found.module_path {
        Some(module) => format!("{}::{}", module, name),
        None => name,
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
