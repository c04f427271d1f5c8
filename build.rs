//! Generates the repository units `tests/external_repository.rs` includes,
//! the same way a downstream build script would.

use std::env;
use std::error::Error;
use std::path::{Path, PathBuf};

use repo_codegen::{collect_repositories, DirectorySink, Generator, GeneratorConfig};

const FIXTURE: &str = "tests/fixtures/notes.rs";
const FIXTURE_MODULE: &str = "crate::notes";

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed={FIXTURE}");
    println!("cargo:rerun-if-changed=build.rs");

    if !Path::new(FIXTURE).exists() {
        return Ok(());
    }

    let source = std::fs::read_to_string(FIXTURE)?;
    let file = syn::parse_file(&source)?;
    let discovered = collect_repositories(&file, Some(FIXTURE_MODULE));
    let report = Generator::new(GeneratorConfig::default())?.run(&discovered);
    if let Some(failure) = report.failures.first() {
        let errors: Vec<String> = failure.errors.iter().map(ToString::to_string).collect();
        return Err(format!("{}: {}", failure.interface, errors.join("; ")).into());
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let mut sink = DirectorySink::new(out_dir);
    if let Some(err) = report.write_to(&mut sink).errors.into_iter().next() {
        return Err(err.into());
    }
    Ok(())
}
