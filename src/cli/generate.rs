//! Generate command handler.

use std::path::{Path, PathBuf};

use color_eyre::eyre::eyre;
use color_eyre::Result;
use repo_codegen::{Discovered, DirectorySink};

use crate::config::Config;

use super::SourceArgs;

pub(super) fn run(
    config: &Config,
    files: &[PathBuf],
    out: Option<&Path>,
    source: &SourceArgs,
) -> Result<()> {
    let discovered = external_only(super::discover(files, source)?);
    let report = super::generator(config)?.run(&discovered);

    let out = out.unwrap_or(&config.generator.output_dir);
    let mut sink = DirectorySink::new(out);
    let summary = report.write_to(&mut sink);

    for path in sink.written() {
        tracing::debug!("Wrote {}", super::display(&path));
    }
    tracing::info!(
        "Generated {} file(s) in {}",
        summary.written.len(),
        super::display(out)
    );
    for err in &summary.errors {
        tracing::error!("{}", err);
    }

    super::finish(&report)?;
    if summary.is_success() {
        Ok(())
    } else {
        Err(eyre!(
            "Failed to write {} generated file(s)",
            summary.errors.len()
        ))
    }
}

/// Keeps the traits whose implementation comes from a generated file.
///
/// A plain `#[repository]` already expands in place, so writing a unit for
/// it would define everything twice once included.
fn external_only(discovered: Vec<Discovered>) -> Vec<Discovered> {
    discovered
        .into_iter()
        .filter(|found| {
            if !found.external {
                tracing::warn!(
                    "Skipping {}: mark it #[repository(external)] to use a generated file",
                    super::discovered_name(found)
                );
            }
            found.external
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPOS: &str = r#"
        #[repository(external)]
        pub trait UserRepository: NeoRepository<User, String> {
            #[insert]
            async fn register(&self, user: User) -> Result<()>;
        }

        #[repository]
        pub trait TagRepository: NeoRepository<Tag, String> {
            #[insert]
            async fn add(&self, tag: Tag) -> Result<()>;
        }
    "#;

    #[test]
    fn test_writes_external_traits_only() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir_all(src.join("store")).unwrap();
        let file = src.join("store").join("users.rs");
        std::fs::write(&file, REPOS).unwrap();
        let out = dir.path().join("generated");

        run(
            &Config::default(),
            &[file],
            Some(out.as_path()),
            &SourceArgs {
                src_root: Some(src),
            },
        )
        .unwrap();

        let written: Vec<String> = std::fs::read_dir(&out)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(written, vec!["store__users__user_repository_impl.rs"]);

        let text = std::fs::read_to_string(out.join(&written[0])).unwrap();
        assert!(text.starts_with("// @generated by neorepo from `crate::store::users::UserRepository`"));
        assert!(!text.contains("TagRepository"));
    }
}
