//! Type resolution.
//!
//! Maps type references to canonical names, treating fully-qualified paths
//! into `std`/`core`/`alloc` as the prelude names they stand for, and lifts
//! `Option` into a separate nullability flag.

use quote::ToTokens;
use syn::{GenericArgument, PathArguments, ReturnType, Type, TypePath};

use crate::model::{Passing, ResolvedType, ReturnShape};

/// Fully-qualified std paths and the names they resolve to.
const CANONICAL_PATHS: &[(&str, &str)] = &[
    ("std::option::Option", "Option"),
    ("core::option::Option", "Option"),
    ("std::result::Result", "Result"),
    ("core::result::Result", "Result"),
    ("std::string::String", "String"),
    ("alloc::string::String", "String"),
    ("std::vec::Vec", "Vec"),
    ("alloc::vec::Vec", "Vec"),
    ("std::collections::VecDeque", "VecDeque"),
    ("std::collections::vec_deque::VecDeque", "VecDeque"),
    ("alloc::collections::VecDeque", "VecDeque"),
    ("std::collections::LinkedList", "LinkedList"),
    ("std::collections::linked_list::LinkedList", "LinkedList"),
    ("std::collections::HashSet", "HashSet"),
    ("std::collections::hash_set::HashSet", "HashSet"),
    ("std::collections::BTreeSet", "BTreeSet"),
    ("std::collections::btree_set::BTreeSet", "BTreeSet"),
    ("alloc::collections::BTreeSet", "BTreeSet"),
];

/// Containers a query may collect zero or more rows into.
const SEQUENCES: &[&str] = &["Vec", "VecDeque", "LinkedList", "HashSet", "BTreeSet"];

/// Canonical name of a path without its generic arguments.
pub fn canonical_path(path: &syn::Path) -> String {
    let written = path
        .segments
        .iter()
        .map(|segment| segment.ident.to_string())
        .collect::<Vec<_>>()
        .join("::");

    CANONICAL_PATHS
        .iter()
        .find(|(full, _)| *full == written)
        .map(|(_, short)| (*short).to_string())
        .unwrap_or(written)
}

/// Resolves a type reference.
///
/// References are looked through; `Option<T>` resolves to `T` marked
/// nullable.
pub fn resolve(ty: &Type) -> ResolvedType {
    match ty {
        Type::Paren(inner) => resolve(&inner.elem),
        Type::Group(inner) => resolve(&inner.elem),
        Type::Reference(reference) => resolve(&reference.elem),
        Type::Path(type_path) if type_path.qself.is_none() => resolve_path(type_path),
        other => ResolvedType {
            name: render(other),
            ty: other.clone(),
            nullable: false,
            args: Vec::new(),
        },
    }
}

fn resolve_path(type_path: &TypePath) -> ResolvedType {
    let name = canonical_path(&type_path.path);
    let args = type_arguments(type_path);

    if name == "Option" && args.len() == 1 {
        let mut inner = resolve(args[0]);
        inner.nullable = true;
        return inner;
    }

    let args: Vec<ResolvedType> = args.into_iter().map(resolve).collect();
    let name = if args.is_empty() {
        name
    } else {
        let rendered: Vec<String> = args.iter().map(display_name).collect();
        format!("{}<{}>", name, rendered.join(", "))
    };

    ResolvedType {
        name,
        ty: Type::Path(type_path.clone()),
        nullable: false,
        args,
    }
}

/// Name including the nullable wrapper, for rendering nested arguments.
fn display_name(resolved: &ResolvedType) -> String {
    if resolved.nullable {
        format!("Option<{}>", resolved.name)
    } else {
        resolved.name.clone()
    }
}

/// Type arguments of the last path segment, lifetimes and consts skipped.
fn type_arguments(type_path: &TypePath) -> Vec<&Type> {
    let Some(last) = type_path.path.segments.last() else {
        return Vec::new();
    };
    match &last.arguments {
        PathArguments::AngleBracketed(bracketed) => bracketed
            .args
            .iter()
            .filter_map(|arg| match arg {
                GenericArgument::Type(ty) => Some(ty),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn render(ty: &Type) -> String {
    ty.to_token_stream().to_string()
}

/// How a parameter of type `ty` is passed.
pub fn passing(ty: &Type) -> Passing {
    match ty {
        Type::Reference(reference) if reference.mutability.is_some() => Passing::Exclusive,
        Type::Reference(_) => Passing::Shared,
        Type::Paren(inner) => passing(&inner.elem),
        Type::Group(inner) => passing(&inner.elem),
        _ => Passing::Owned,
    }
}

fn is_unit(ty: &Type) -> bool {
    match ty {
        Type::Tuple(tuple) => tuple.elems.is_empty(),
        Type::Paren(inner) => is_unit(&inner.elem),
        Type::Group(inner) => is_unit(&inner.elem),
        _ => false,
    }
}

/// Classifies a method's return type.
///
/// The declared type must be a `Result` (any path ending in `Result`, with
/// one or two type arguments); its `Ok` side decides the shape.
pub fn return_shape(output: &ReturnType) -> Result<ReturnShape, String> {
    let ty = match output {
        ReturnType::Default => {
            return Err("repository methods must return a `Result`".to_string());
        }
        ReturnType::Type(_, ty) => ty.as_ref(),
    };

    let ok = ok_type(ty).ok_or_else(|| {
        format!(
            "return type `{}` is not a `Result`; failures must reach the caller",
            render(ty)
        )
    })?;

    if is_unit(ok) {
        return Ok(ReturnShape::Void);
    }

    if let Type::Path(type_path) = ok {
        if type_path.qself.is_none() {
            let name = canonical_path(&type_path.path);
            let args = type_arguments(type_path);
            if args.len() == 1 {
                if name == "Option" {
                    let mut inner = resolve(args[0]);
                    inner.nullable = true;
                    return Ok(ReturnShape::Nullable(inner));
                }
                if SEQUENCES.contains(&name.as_str()) {
                    return Ok(ReturnShape::Collection(resolve(args[0])));
                }
            }
        }
    }

    Ok(ReturnShape::NonNull(resolve(ok)))
}

/// The `Ok` type of a `Result`-like return type.
fn ok_type(ty: &Type) -> Option<&Type> {
    match ty {
        Type::Paren(inner) => ok_type(&inner.elem),
        Type::Group(inner) => ok_type(&inner.elem),
        Type::Path(type_path) if type_path.qself.is_none() => {
            let last = type_path.path.segments.last()?;
            if last.ident != "Result" {
                return None;
            }
            let args = type_arguments(type_path);
            match args.len() {
                1 | 2 => Some(args[0]),
                _ => None,
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn output(ty: Type) -> ReturnType {
        ReturnType::Type(Default::default(), Box::new(ty))
    }

    #[test]
    fn test_canonical_std_paths() {
        let resolved = resolve(&parse_quote!(std::vec::Vec<std::string::String>));
        assert_eq!(resolved.name, "Vec<String>");
        assert!(!resolved.nullable);
        assert_eq!(resolved.args.len(), 1);
        assert_eq!(resolved.args[0].name, "String");
    }

    #[test]
    fn test_user_paths_untouched() {
        let resolved = resolve(&parse_quote!(crate::models::User));
        assert_eq!(resolved.name, "crate::models::User");
    }

    #[test]
    fn test_option_is_nullability_not_name() {
        let resolved = resolve(&parse_quote!(core::option::Option<User>));
        assert_eq!(resolved.name, "User");
        assert!(resolved.nullable);
    }

    #[test]
    fn test_nested_option_rendered_in_args() {
        let resolved = resolve(&parse_quote!(Vec<Option<String>>));
        assert_eq!(resolved.name, "Vec<Option<String>>");
        assert!(resolved.args[0].nullable);
        assert_eq!(resolved.args[0].name, "String");
    }

    #[test]
    fn test_references_looked_through() {
        let ty: Type = parse_quote!(&mut User);
        assert_eq!(resolve(&ty).name, "User");
        assert_eq!(passing(&ty), Passing::Exclusive);
        assert_eq!(passing(&parse_quote!(&str)), Passing::Shared);
        assert_eq!(passing(&parse_quote!(String)), Passing::Owned);
    }

    #[test]
    fn test_shape_void() {
        let shape = return_shape(&output(parse_quote!(Result<()>))).unwrap();
        assert!(matches!(shape, ReturnShape::Void));
    }

    #[test]
    fn test_shape_nullable() {
        let shape =
            return_shape(&output(parse_quote!(Result<Option<User>, RepositoryError>))).unwrap();
        match shape {
            ReturnShape::Nullable(inner) => {
                assert_eq!(inner.name, "User");
                assert!(inner.nullable);
            }
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_shape_collections() {
        for ty in [
            parse_quote!(Result<Vec<User>>),
            parse_quote!(neorepo::Result<std::collections::VecDeque<User>>),
            parse_quote!(Result<std::collections::BTreeSet<User>>),
        ] {
            match return_shape(&output(ty)).unwrap() {
                ReturnShape::Collection(element) => assert_eq!(element.name, "User"),
                other => panic!("unexpected shape {:?}", other),
            }
        }
    }

    #[test]
    fn test_shape_non_null() {
        match return_shape(&output(parse_quote!(std::result::Result<User, MyError>))).unwrap() {
            ReturnShape::NonNull(ty) => {
                assert_eq!(ty.name, "User");
                assert!(!ty.nullable);
            }
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_shape_requires_result() {
        assert!(return_shape(&ReturnType::Default).is_err());
        let err = return_shape(&output(parse_quote!(User))).unwrap_err();
        assert!(err.contains("not a `Result`"));
    }
}
