//! Method classification.
//!
//! Detectors run in a fixed priority order: query, then insert, then update.
//! A method none of them accepts is [`Behavior::Unclassified`] and becomes a
//! diagnostic instead of a generated body.

use std::collections::{BTreeMap, BTreeSet};

use crate::cypher;
use crate::error::GenerateError;
use crate::model::{
    Behavior, Classified, MethodDeclaration, Passing, RepositoryDeclaration, ReturnShape,
};

/// Assigns a behavior to one method.
pub fn classify(method: &MethodDeclaration) -> Behavior {
    let markers = &method.markers;

    if let Some(text) = &markers.query {
        return Behavior::Query { text: text.clone() };
    }
    if markers.insert.is_some() && method.arity() == 1 {
        return Behavior::Insert;
    }
    if markers.update.is_some() && method.arity() == 1 {
        return Behavior::Update;
    }

    let reason = if markers.insert.is_some() {
        format!(
            "#[insert] methods take exactly one parameter, found {}",
            method.arity()
        )
    } else if markers.update.is_some() {
        format!(
            "#[update] methods take exactly one parameter, found {}",
            method.arity()
        )
    } else {
        "expected one of #[query(\"...\")], #[insert] or #[update]".to_string()
    };
    Behavior::Unclassified { reason }
}

/// Classifies and validates every method of a declaration.
pub fn classify_all(
    decl: &RepositoryDeclaration,
) -> Result<Vec<Classified<'_>>, Vec<GenerateError>> {
    let interface = decl.ident.to_string();
    let mut classified = Vec::with_capacity(decl.methods.len());
    let mut errors = Vec::new();

    for method in &decl.methods {
        match classify(method) {
            Behavior::Unclassified { reason } => {
                errors.push(GenerateError::UnclassifiedMethod {
                    interface: interface.clone(),
                    method: method.name.to_string(),
                    reason,
                    span: method.span,
                });
            }
            behavior => {
                errors.append(&mut validate(&interface, method, &behavior));
                classified.push(Classified { method, behavior });
            }
        }
    }

    if errors.is_empty() {
        Ok(classified)
    } else {
        Err(errors)
    }
}

fn validate(interface: &str, method: &MethodDeclaration, behavior: &Behavior) -> Vec<GenerateError> {
    match behavior {
        Behavior::Query { text } => validate_bindings(interface, method, &text.value()),
        Behavior::Insert => validate_save(interface, method, "insert"),
        Behavior::Update => validate_save(interface, method, "update"),
        Behavior::Unclassified { .. } => Vec::new(),
    }
}

fn validate_save(interface: &str, method: &MethodDeclaration, marker: &str) -> Vec<GenerateError> {
    let invalid = |reason: String, span| GenerateError::InvalidSignature {
        interface: interface.to_string(),
        method: method.name.to_string(),
        reason,
        span,
    };

    let mut errors = Vec::new();
    let param = &method.params[0];

    if let Some(key) = &param.binding_key {
        errors.push(invalid(
            "#[param] only applies to #[query] methods".to_string(),
            key.span(),
        ));
    }

    match &method.returns {
        ReturnShape::Void => {}
        ReturnShape::NonNull(_) if param.passing == Passing::Owned => {}
        ReturnShape::NonNull(_) => errors.push(invalid(
            "returning the saved entity requires taking it by value".to_string(),
            method.span,
        )),
        other => errors.push(invalid(
            format!(
                "#[{}] methods return `()` or the saved entity, not {}",
                marker,
                other.describe()
            ),
            method.span,
        )),
    }

    if marker == "update" && param.passing == Passing::Shared {
        errors.push(invalid(
            "#[update] takes the entity by value or `&mut` so its update hook can run".to_string(),
            param.name.span(),
        ));
    }

    errors
}

fn validate_bindings(interface: &str, method: &MethodDeclaration, text: &str) -> Vec<GenerateError> {
    let mut errors = Vec::new();
    let variables = match cypher::parameters(text) {
        Ok(variables) => variables,
        Err(err) => {
            errors.push(GenerateError::InvalidSignature {
                interface: interface.to_string(),
                method: method.name.to_string(),
                reason: err.to_string(),
                span: method.span,
            });
            BTreeSet::new()
        }
    };
    let mut bound: BTreeMap<String, usize> = BTreeMap::new();

    for param in &method.params {
        let key = param.key();
        let span = param
            .binding_key
            .as_ref()
            .map(|lit| lit.span())
            .unwrap_or_else(|| param.name.span());
        let dangling = |reason: &str| GenerateError::DanglingBindingKey {
            interface: interface.to_string(),
            method: method.name.to_string(),
            key: key.clone(),
            reason: reason.to_string(),
            span,
        };

        if param.binding_key.is_some() {
            if !is_variable_name(&key) {
                errors.push(dangling("is not a valid query variable name"));
            } else if !variables.contains(&key) {
                errors.push(dangling("does not match any `$` variable in the query"));
            }
        }

        let count = bound.entry(key.clone()).or_insert(0);
        *count += 1;
        if *count == 2 {
            errors.push(dangling("is bound by more than one parameter"));
        }
    }

    errors
}

fn is_variable_name(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
