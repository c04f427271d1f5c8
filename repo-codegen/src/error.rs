//! Generation-time diagnostics.

use proc_macro2::{Span, TokenStream};
use thiserror::Error;

/// A diagnostic that aborts generation for one repository trait.
///
/// Every variant carries the span of the offending syntax so the proc macro
/// can point at it; the CLI only uses the message.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("`{item}` cannot be used as a repository: {reason}")]
    MetadataUnavailable {
        item: String,
        reason: String,
        span: Span,
    },

    #[error("method `{interface}::{method}` is not a repository method: {reason}")]
    UnclassifiedMethod {
        interface: String,
        method: String,
        reason: String,
        span: Span,
    },

    #[error("binding key \"{key}\" on `{interface}::{method}` {reason}")]
    DanglingBindingKey {
        interface: String,
        method: String,
        key: String,
        reason: String,
        span: Span,
    },

    #[error("unsupported signature for `{interface}::{method}`: {reason}")]
    InvalidSignature {
        interface: String,
        method: String,
        reason: String,
        span: Span,
    },

    #[error("{0}")]
    Attribute(#[from] syn::Error),

    #[error("invalid runtime crate path `{0}`")]
    InvalidConfig(String),
}

impl GenerateError {
    pub fn span(&self) -> Span {
        match self {
            GenerateError::MetadataUnavailable { span, .. }
            | GenerateError::UnclassifiedMethod { span, .. }
            | GenerateError::DanglingBindingKey { span, .. }
            | GenerateError::InvalidSignature { span, .. } => *span,
            GenerateError::Attribute(err) => err.span(),
            GenerateError::InvalidConfig(_) => Span::call_site(),
        }
    }

    pub fn to_syn_error(&self) -> syn::Error {
        match self {
            GenerateError::Attribute(err) => err.clone(),
            other => syn::Error::new(other.span(), other.to_string()),
        }
    }
}

/// Folds a list of diagnostics into `compile_error!` invocations.
pub fn to_compile_errors(errors: &[GenerateError]) -> TokenStream {
    let mut combined: Option<syn::Error> = None;
    for error in errors {
        let error = error.to_syn_error();
        match combined.as_mut() {
            Some(all) => all.combine(error),
            None => combined = Some(error),
        }
    }
    combined
        .map(|err| err.to_compile_error())
        .unwrap_or_default()
}
