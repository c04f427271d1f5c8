//! Metadata extraction.
//!
//! Decodes an item annotated with `#[repository]` into a
//! [`RepositoryDeclaration`]. Problems are collected per trait so a single
//! pass reports every offending method.

use syn::spanned::Spanned;
use syn::{
    Attribute, FnArg, GenericArgument, Item, ItemTrait, LitStr, Pat, PathArguments, TraitItem,
    TraitItemFn, Type, TypeParamBound,
};

use crate::error::GenerateError;
use crate::model::{Markers, MethodDeclaration, ParameterDeclaration, RepositoryDeclaration};
use crate::types;

/// Name of the base repository capability every repository trait extends.
pub const BASE_TRAIT: &str = "NeoRepository";

const QUERY: &str = "query";
const INSERT: &str = "insert";
const UPDATE: &str = "update";
const PARAM: &str = "param";

/// Prefix of the locals generated bodies declare.
const RESERVED_PREFIX: &str = "__";

/// Extracts the declaration of a repository trait.
pub fn extract(
    item: &Item,
    module_path: Option<&str>,
) -> Result<RepositoryDeclaration, Vec<GenerateError>> {
    let Item::Trait(item_trait) = item else {
        return Err(vec![GenerateError::MetadataUnavailable {
            item: item_name(item),
            reason: "`#[repository]` only applies to traits".to_string(),
            span: item.span(),
        }]);
    };
    extract_trait(item_trait, module_path)
}

/// Extracts the declaration of a repository trait.
pub fn extract_trait(
    item: &ItemTrait,
    module_path: Option<&str>,
) -> Result<RepositoryDeclaration, Vec<GenerateError>> {
    let interface = item.ident.to_string();
    let unavailable = |reason: &str, span| {
        vec![GenerateError::MetadataUnavailable {
            item: interface.clone(),
            reason: reason.to_string(),
            span,
        }]
    };

    if !item.generics.params.is_empty() {
        return Err(unavailable(
            "generic repository traits are not supported",
            item.generics.span(),
        ));
    }

    let (entity, id) = match base_arguments(item) {
        Ok(arguments) => arguments,
        Err(reason) => return Err(unavailable(&reason, item.ident.span())),
    };

    let mut errors = Vec::new();
    let mut methods = Vec::new();
    let mut passthrough = Vec::new();

    for trait_item in &item.items {
        match trait_item {
            TraitItem::Fn(method) => {
                match extract_method(&interface, method) {
                    Ok(Some(declaration)) => methods.push(declaration),
                    Ok(None) => passthrough.push(method.sig.ident.clone()),
                    Err(mut method_errors) => errors.append(&mut method_errors),
                }
            }
            TraitItem::Const(constant) if constant.default.is_some() => {}
            other => errors.push(GenerateError::MetadataUnavailable {
                item: interface.clone(),
                reason: "only methods and associated consts with a default are supported"
                    .to_string(),
                span: other.span(),
            }),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(RepositoryDeclaration {
        ident: item.ident.clone(),
        module_path: module_path.map(str::to_string),
        vis: item.vis.clone(),
        entity,
        id,
        methods,
        passthrough,
    })
}

/// Finds `NeoRepository<Entity, Id>` among the supertraits.
fn base_arguments(item: &ItemTrait) -> Result<(Type, Type), String> {
    let missing = || format!("`{}` must extend `{}<Entity, Id>`", item.ident, BASE_TRAIT);

    let base = item
        .supertraits
        .iter()
        .filter_map(|bound| match bound {
            TypeParamBound::Trait(bound) => bound.path.segments.last(),
            _ => None,
        })
        .find(|segment| segment.ident == BASE_TRAIT)
        .ok_or_else(missing)?;

    let PathArguments::AngleBracketed(bracketed) = &base.arguments else {
        return Err(missing());
    };
    let arguments: Vec<&Type> = bracketed
        .args
        .iter()
        .filter_map(|arg| match arg {
            GenericArgument::Type(ty) => Some(ty),
            _ => None,
        })
        .collect();

    match arguments.as_slice() {
        [entity, id] => Ok(((*entity).clone(), (*id).clone())),
        _ => Err(format!(
            "`{}` takes exactly two type arguments, found {}",
            BASE_TRAIT,
            arguments.len()
        )),
    }
}

/// Returns `Ok(None)` for default-bodied methods left to the trait.
fn extract_method(
    interface: &str,
    method: &TraitItemFn,
) -> Result<Option<MethodDeclaration>, Vec<GenerateError>> {
    let name = method.sig.ident.clone();
    let invalid = |reason: &str, span| GenerateError::InvalidSignature {
        interface: interface.to_string(),
        method: name.to_string(),
        reason: reason.to_string(),
        span,
    };

    let markers =
        parse_markers(&method.attrs).map_err(|err| vec![GenerateError::from(err)])?;

    if method.default.is_some() {
        if markers.is_empty() {
            return Ok(None);
        }
        return Err(vec![invalid(
            "methods with a default body cannot carry #[query], #[insert] or #[update]",
            method.sig.ident.span(),
        )]);
    }

    let mut errors = Vec::new();

    match method.sig.receiver() {
        Some(receiver) if receiver.reference.is_some() && receiver.mutability.is_none() => {}
        _ => errors.push(invalid(
            "repository methods take `&self`",
            method.sig.span(),
        )),
    }

    let is_async = method.sig.asyncness.is_some();
    if !is_async {
        errors.push(invalid(
            "repository methods must be `async fn`",
            method.sig.fn_token.span(),
        ));
    }

    let mut params = Vec::new();
    for input in &method.sig.inputs {
        let FnArg::Typed(typed) = input else {
            continue;
        };
        let ident = match typed.pat.as_ref() {
            Pat::Ident(pat)
                if pat.by_ref.is_none() && pat.mutability.is_none() && pat.subpat.is_none() =>
            {
                pat.ident.clone()
            }
            other => {
                errors.push(invalid("parameters must be plain identifiers", other.span()));
                continue;
            }
        };
        if ident.to_string().starts_with(RESERVED_PREFIX) {
            errors.push(invalid(
                "parameter names starting with `__` are reserved for generated locals",
                ident.span(),
            ));
            continue;
        }
        let binding_key = match parse_binding_key(&typed.attrs) {
            Ok(key) => key,
            Err(err) => {
                errors.push(GenerateError::from(err));
                continue;
            }
        };
        params.push(ParameterDeclaration {
            name: ident,
            ty: types::resolve(&typed.ty),
            passing: types::passing(&typed.ty),
            binding_key,
        });
    }

    let returns = match types::return_shape(&method.sig.output) {
        Ok(shape) => Some(shape),
        Err(reason) => {
            errors.push(invalid(&reason, method.sig.output.span()));
            None
        }
    };

    match returns {
        Some(returns) if errors.is_empty() => {
            let mut sig = method.sig.clone();
            strip_param_attributes(&mut sig);
            Ok(Some(MethodDeclaration {
                name,
                sig,
                params,
                returns,
                is_async,
                markers,
                span: method.sig.ident.span(),
            }))
        }
        _ => Err(errors),
    }
}

fn parse_markers(attrs: &[Attribute]) -> syn::Result<Markers> {
    let mut markers = Markers::default();
    for attr in attrs {
        if attr.path().is_ident(QUERY) {
            if markers.query.is_some() {
                return Err(syn::Error::new_spanned(attr, "duplicate #[query] attribute"));
            }
            markers.query = Some(attr.parse_args::<LitStr>().map_err(|err| {
                syn::Error::new(err.span(), "expected #[query(\"<cypher>\")]")
            })?);
        } else if attr.path().is_ident(INSERT) {
            attr.meta.require_path_only()?;
            markers.insert = Some(attr.span());
        } else if attr.path().is_ident(UPDATE) {
            attr.meta.require_path_only()?;
            markers.update = Some(attr.span());
        }
    }
    Ok(markers)
}

fn parse_binding_key(attrs: &[Attribute]) -> syn::Result<Option<LitStr>> {
    let mut key = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident(PARAM)) {
        if key.is_some() {
            return Err(syn::Error::new_spanned(attr, "duplicate #[param] attribute"));
        }
        key = Some(attr.parse_args::<LitStr>()?);
    }
    Ok(key)
}

fn is_marker(attr: &Attribute) -> bool {
    let path = attr.path();
    path.is_ident(QUERY) || path.is_ident(INSERT) || path.is_ident(UPDATE)
}

fn strip_param_attributes(sig: &mut syn::Signature) {
    for input in sig.inputs.iter_mut() {
        if let FnArg::Typed(typed) = input {
            typed.attrs.retain(|attr| !attr.path().is_ident(PARAM));
        }
    }
}

/// Removes the generator's helper attributes so the trait compiles on its own.
pub fn strip_markers(item: &mut ItemTrait) {
    item.attrs
        .retain(|attr| !crate::discover::is_repository_attr(attr));
    for trait_item in item.items.iter_mut() {
        if let TraitItem::Fn(method) = trait_item {
            method.attrs.retain(|attr| !is_marker(attr));
            strip_param_attributes(&mut method.sig);
        }
    }
}

fn item_name(item: &Item) -> String {
    let ident = match item {
        Item::Struct(item) => Some(&item.ident),
        Item::Enum(item) => Some(&item.ident),
        Item::Union(item) => Some(&item.ident),
        Item::Fn(item) => Some(&item.sig.ident),
        Item::Impl(_) => return "impl block".to_string(),
        Item::Mod(item) => Some(&item.ident),
        Item::Type(item) => Some(&item.ident),
        Item::TraitAlias(item) => Some(&item.ident),
        _ => None,
    };
    ident
        .map(|ident| ident.to_string())
        .unwrap_or_else(|| "item".to_string())
}
