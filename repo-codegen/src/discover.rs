//! Source discovery for file mode.
//!
//! Walks a parsed source file for traits carrying `#[repository]`, keeping
//! track of the module each one is declared in.

use std::path::{Component, Path};

use proc_macro2::TokenStream;
use syn::{Attribute, File, Item, LitStr, Meta};

/// Whether `attr` is the repository marker, however it was imported.
pub fn is_repository_attr(attr: &Attribute) -> bool {
    attr.path()
        .segments
        .last()
        .map(|segment| segment.ident == "repository")
        .unwrap_or(false)
}

/// Arguments of `#[repository(...)]`.
#[derive(Debug, Default)]
pub struct RepositoryArgs {
    /// `crate = "path"`: where the runtime crate is reachable from.
    pub runtime: Option<LitStr>,
    /// `external`: the implementation comes from a generated file, so the
    /// attribute only cleans up the trait.
    pub external: bool,
}

impl RepositoryArgs {
    pub fn parse(args: TokenStream) -> syn::Result<Self> {
        let mut parsed = RepositoryArgs::default();
        let parser = syn::meta::parser(|meta| {
            if meta.path.is_ident("crate") {
                parsed.runtime = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("external") {
                parsed.external = true;
                Ok(())
            } else {
                Err(meta.error(
                    "unsupported repository argument, expected `crate = \"path\"` or `external`",
                ))
            }
        });
        syn::parse::Parser::parse2(parser, args)?;
        Ok(parsed)
    }

    /// Reads the arguments of a marker attribute found in source.
    pub fn from_attr(attr: &Attribute) -> syn::Result<Self> {
        match &attr.meta {
            Meta::List(list) => Self::parse(list.tokens.clone()),
            _ => Ok(Self::default()),
        }
    }
}

/// A repository trait found in a source file.
#[derive(Debug, Clone)]
pub struct Discovered {
    pub item: Item,
    /// Declaring module, e.g. `crate::repos::user`.
    pub module_path: Option<String>,
    /// Marked `#[repository(external)]`, so its unit is meant to be
    /// `include!`d next to the trait.
    pub external: bool,
}

/// Collects every `#[repository]` trait in `file`, including those in
/// inline modules, in source order.
pub fn collect_repositories(file: &File, module_path: Option<&str>) -> Vec<Discovered> {
    let mut found = Vec::new();
    collect_items(&file.items, module_path.map(str::to_string), &mut found);
    found
}

fn collect_items(items: &[Item], module_path: Option<String>, found: &mut Vec<Discovered>) {
    for item in items {
        match item {
            Item::Trait(item_trait) if item_trait.attrs.iter().any(is_repository_attr) => {
                let external = item_trait
                    .attrs
                    .iter()
                    .filter(|attr| is_repository_attr(attr))
                    .filter_map(|attr| RepositoryArgs::from_attr(attr).ok())
                    .any(|args| args.external);
                found.push(Discovered {
                    item: item.clone(),
                    module_path: module_path.clone(),
                    external,
                });
            }
            Item::Mod(module) => {
                if let Some((_, items)) = &module.content {
                    let nested = match &module_path {
                        Some(parent) => format!("{}::{}", parent, module.ident),
                        None => module.ident.to_string(),
                    };
                    collect_items(items, Some(nested), found);
                }
            }
            _ => {}
        }
    }
}

/// Derives the module path of `file` relative to the crate's `src_root`.
///
/// `src/lib.rs` and `src/main.rs` are the crate root, `src/a/mod.rs` and
/// `src/a.rs` are `crate::a`. Returns `None` when `file` is outside
/// `src_root` or is not a `.rs` file.
pub fn module_path_for(src_root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(src_root).ok()?;
    if relative.extension()? != "rs" {
        return None;
    }

    let mut segments = vec!["crate".to_string()];
    let components: Vec<&str> = relative
        .components()
        .map(|component| match component {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Option<_>>()?;

    let (last, parents) = components.split_last()?;
    segments.extend(parents.iter().map(|part| part.to_string()));

    let stem = last.strip_suffix(".rs")?;
    let is_root = parents.is_empty() && (stem == "lib" || stem == "main");
    if stem != "mod" && !is_root {
        segments.push(stem.to_string());
    }

    Some(segments.join("::"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_collects_marked_traits_only() {
        let file: File = parse_quote! {
            #[repository]
            pub trait UserRepository: NeoRepository<User, String> {}

            pub trait Plain {}

            #[neorepo::repository(crate = "crate")]
            pub trait OrderRepository: NeoRepository<Order, i64> {}
        };
        let found = collect_repositories(&file, Some("crate::repos"));
        assert_eq!(found.len(), 2);
        assert!(found
            .iter()
            .all(|d| d.module_path.as_deref() == Some("crate::repos")));
    }

    #[test]
    fn test_external_marker() {
        let file: File = parse_quote! {
            #[repository(external)]
            pub trait UserRepository: NeoRepository<User, String> {}

            #[repository(crate = "crate")]
            pub trait OrderRepository: NeoRepository<Order, i64> {}
        };
        let found = collect_repositories(&file, None);
        assert!(found[0].external);
        assert!(!found[1].external);
    }

    #[test]
    fn test_repository_args() {
        let args = RepositoryArgs::parse(quote::quote!(external, crate = "crate::rt")).unwrap();
        assert!(args.external);
        assert_eq!(args.runtime.unwrap().value(), "crate::rt");

        let err = RepositoryArgs::parse(quote::quote!(label = "User")).unwrap_err();
        assert!(err.to_string().contains("unsupported repository argument"));
    }

    #[test]
    fn test_inline_modules_extend_path() {
        let file: File = parse_quote! {
            mod store {
                pub mod graph {
                    #[repository]
                    pub trait UserRepository: NeoRepository<User, String> {}
                }
            }
        };
        let found = collect_repositories(&file, Some("crate"));
        assert_eq!(found[0].module_path.as_deref(), Some("crate::store::graph"));

        let found = collect_repositories(&file, None);
        assert_eq!(found[0].module_path.as_deref(), Some("store::graph"));
    }

    #[test]
    fn test_module_path_for() {
        let root = Path::new("/work/app/src");
        let cases = [
            ("/work/app/src/lib.rs", Some("crate")),
            ("/work/app/src/main.rs", Some("crate")),
            ("/work/app/src/repos.rs", Some("crate::repos")),
            ("/work/app/src/repos/mod.rs", Some("crate::repos")),
            ("/work/app/src/repos/user.rs", Some("crate::repos::user")),
            ("/work/app/src/bin/lib.rs", Some("crate::bin::lib")),
            ("/work/app/build.rs", None),
            ("/work/app/src/notes.md", None),
        ];
        for (file, expected) in cases {
            assert_eq!(
                module_path_for(root, Path::new(file)).as_deref(),
                expected,
                "{}",
                file
            );
        }
    }
}
