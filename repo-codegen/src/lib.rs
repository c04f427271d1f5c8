//! Generation engine behind the `#[repository]` attribute.
//!
//! A repository trait goes through four stages, each in its own module:
//!
//! - [`extract`] decodes the trait syntax into a [`RepositoryDeclaration`]
//! - [`classify`] assigns every method a [`Behavior`]
//! - [`emit`] writes one method body per behavior, using [`types`] to read
//!   return shapes
//! - [`assemble`] wraps the bodies into an implementation type, base
//!   delegation and a factory
//!
//! [`Generator`] drives the stages. The proc macro calls [`expand`]; the
//! CLI discovers traits with [`discover`] and writes units through a
//! [`sink::OutputSink`].

pub mod assemble;
pub mod classify;
pub mod config;
pub mod cypher;
pub mod discover;
pub mod emit;
pub mod error;
pub mod extract;
pub mod model;
pub mod sink;
pub mod types;

use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use syn::{Item, Path};

pub use config::GeneratorConfig;
pub use discover::{collect_repositories, module_path_for, Discovered, RepositoryArgs};
pub use error::{to_compile_errors, GenerateError};
pub use model::{
    Behavior, FactoryDescriptor, GeneratedUnit, MethodDeclaration, ParameterDeclaration,
    RepositoryDeclaration, ReturnShape,
};
pub use sink::{DirectorySink, MemorySink, OutputSink, SinkError};

use crate::assemble::{clean_trait, Assembler};

/// Runs the generation stages over repository traits.
///
/// Holds no state between traits: every call to [`Generator::generate`]
/// sees only the item it is given.
#[derive(Debug, Clone)]
pub struct Generator {
    config: GeneratorConfig,
    runtime: Path,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Result<Self, GenerateError> {
        let runtime = syn::parse_str::<Path>(&config.runtime)
            .map_err(|_| GenerateError::InvalidConfig(config.runtime.clone()))?;
        Ok(Self { config, runtime })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn runtime(&self) -> &Path {
        &self.runtime
    }

    /// Generates the unit for one item.
    pub fn generate(
        &self,
        item: &Item,
        module_path: Option<&str>,
    ) -> Result<GeneratedUnit, Vec<GenerateError>> {
        let module_path = module_path.or(self.config.namespace.as_deref());
        let decl = extract::extract(item, module_path)?;
        let classified = classify::classify_all(&decl)?;
        Ok(Assembler::new(&self.runtime).assemble(&decl, &classified))
    }

    /// Generates units for every discovered trait.
    ///
    /// A trait that fails is recorded in the report and does not stop the
    /// others.
    pub fn run(&self, discovered: &[Discovered]) -> GenerationReport {
        let mut report = GenerationReport::default();
        for found in discovered {
            match self.generate(&found.item, found.module_path.as_deref()) {
                Ok(unit) => report.units.push(unit),
                Err(errors) => report.failures.push(Failure {
                    interface: interface_name(&found.item, found.module_path.as_deref()),
                    errors,
                }),
            }
        }
        report
    }

    /// Macro-mode expansion: the cleaned trait followed by its generated
    /// implementation, or by diagnostics when generation fails.
    ///
    /// With `external` the implementation is left out, since it comes from
    /// a file-mode unit `include!`d next to the trait. Diagnostics are
    /// still reported.
    pub fn expand_item(&self, item: &Item, external: bool) -> TokenStream {
        let cleaned = match item {
            Item::Trait(item_trait) => clean_trait(item_trait, &self.runtime).into_token_stream(),
            other => other.into_token_stream(),
        };

        match self.generate(item, None) {
            Ok(_) if external => cleaned,
            Ok(unit) => {
                let tokens = unit.tokens;
                quote! {
                    #cleaned
                    #tokens
                }
            }
            Err(errors) => {
                let errors = to_compile_errors(&errors);
                quote! {
                    #cleaned
                    #errors
                }
            }
        }
    }
}

/// Outcome of one generation pass.
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub units: Vec<GeneratedUnit>,
    pub failures: Vec<Failure>,
}

/// All diagnostics for one trait that could not be generated.
#[derive(Debug)]
pub struct Failure {
    pub interface: String,
    pub errors: Vec<GenerateError>,
}

impl GenerationReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Writes every unit to `sink`.
    ///
    /// A unit that cannot be written is recorded and the remaining units
    /// are still written.
    pub fn write_to(&self, sink: &mut dyn OutputSink) -> WriteSummary {
        let mut summary = WriteSummary::default();
        for unit in &self.units {
            match sink.write(&unit.file_name, &unit.render()) {
                Ok(()) => summary.written.push(unit.file_name.clone()),
                Err(err) => summary.errors.push(err),
            }
        }
        summary
    }
}

/// Files written by [`GenerationReport::write_to`] and the writes that
/// failed.
#[derive(Debug, Default)]
pub struct WriteSummary {
    pub written: Vec<String>,
    pub errors: Vec<SinkError>,
}

impl WriteSummary {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

fn interface_name(item: &Item, module_path: Option<&str>) -> String {
    let name = match item {
        Item::Trait(item_trait) => item_trait.ident.to_string(),
        other => other
            .to_token_stream()
            .into_iter()
            .take(3)
            .map(|token| token.to_string())
            .collect::<Vec<_>>()
            .join(" "),
    };
    match module_path {
        Some(module) => format!("{}::{}", module, name),
        None => name,
    }
}

/// Entry point for the `#[repository]` attribute.
pub fn expand(args: TokenStream, item: TokenStream) -> TokenStream {
    let args = match RepositoryArgs::parse(args) {
        Ok(args) => args,
        Err(err) => {
            let err = err.to_compile_error();
            return quote! { #item #err };
        }
    };

    let item: Item = match syn::parse2(item.clone()) {
        Ok(item) => item,
        Err(err) => {
            let err = err.to_compile_error();
            return quote! { #item #err };
        }
    };

    let mut config = GeneratorConfig::default();
    if let Some(runtime) = &args.runtime {
        config.runtime = runtime.value();
    }

    match Generator::new(config) {
        Ok(generator) => generator.expand_item(&item, args.external),
        Err(err) => {
            let span = args
                .runtime
                .as_ref()
                .map(|lit| lit.span())
                .unwrap_or_else(proc_macro2::Span::call_site);
            let err = syn::Error::new(span, err.to_string()).to_compile_error();
            quote! { #item #err }
        }
    }
}
