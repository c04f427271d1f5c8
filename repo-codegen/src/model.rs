//! Declaration-level model produced by the extractor and consumed by the
//! classifier, emitter and assembler.

use heck::ToSnakeCase;
use proc_macro2::{Span, TokenStream};
use quote::format_ident;
use syn::{Ident, LitStr, Signature, Type, Visibility};

/// A repository trait, decoded from its syntax.
#[derive(Debug, Clone)]
pub struct RepositoryDeclaration {
    /// The trait name.
    pub ident: Ident,
    /// Module the trait was declared in, when known (`crate::repos::user`).
    pub module_path: Option<String>,
    pub vis: Visibility,
    /// Entity type argument of `NeoRepository<Entity, Id>`.
    pub entity: Type,
    /// Identifier type argument of `NeoRepository<Entity, Id>`.
    pub id: Type,
    /// Abstract methods that need a generated body, in declaration order.
    pub methods: Vec<MethodDeclaration>,
    /// Methods with a default body, left to the trait.
    pub passthrough: Vec<Ident>,
}

impl RepositoryDeclaration {
    /// `crate::repos::user::UserRepository`, or the bare name when the
    /// module is unknown.
    pub fn qualified_name(&self) -> String {
        match &self.module_path {
            Some(module) => format!("{}::{}", module, self.ident),
            None => self.ident.to_string(),
        }
    }

    /// `UserRepositoryImpl`
    pub fn impl_ident(&self) -> Ident {
        format_ident!("{}Impl", self.ident)
    }

    /// `user_repository`
    pub fn factory_ident(&self) -> Ident {
        format_ident!("{}", self.ident.to_string().to_snake_case())
    }

    /// `user_repository_impl.rs`, prefixed by the module path below the
    /// crate root: `crate::repos::UserRepository` writes
    /// `repos__user_repository_impl.rs`.
    pub fn file_name(&self) -> String {
        let mut parts: Vec<String> = self
            .module_path
            .iter()
            .flat_map(|module| module.split("::"))
            .map(str::trim)
            .filter(|segment| !matches!(*segment, "" | "crate" | "self"))
            .map(|segment| segment.to_snake_case())
            .collect();
        parts.push(format!("{}_impl", self.ident.to_string().to_snake_case()));
        format!("{}.rs", parts.join("__"))
    }
}

/// One abstract method of a repository trait.
#[derive(Debug, Clone)]
pub struct MethodDeclaration {
    pub name: Ident,
    /// Signature with marker attributes stripped, reused verbatim in the impl.
    pub sig: Signature,
    pub params: Vec<ParameterDeclaration>,
    pub returns: ReturnShape,
    pub is_async: bool,
    /// Raw marker attributes found on the method.
    pub markers: Markers,
    pub span: Span,
}

impl MethodDeclaration {
    /// Number of parameters, receiver excluded.
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Marker attributes as written on a method. Classification decides which
/// one wins.
#[derive(Debug, Clone, Default)]
pub struct Markers {
    pub query: Option<LitStr>,
    pub insert: Option<Span>,
    pub update: Option<Span>,
}

impl Markers {
    pub fn is_empty(&self) -> bool {
        self.query.is_none() && self.insert.is_none() && self.update.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct ParameterDeclaration {
    pub name: Ident,
    pub ty: ResolvedType,
    pub passing: Passing,
    /// Query variable override from `#[param("key")]`.
    pub binding_key: Option<LitStr>,
}

impl ParameterDeclaration {
    /// The query variable this parameter is bound to.
    pub fn key(&self) -> String {
        match &self.binding_key {
            Some(key) => key.value(),
            None => self.name.to_string(),
        }
    }
}

/// How a parameter is passed to the method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Passing {
    Owned,
    Shared,
    Exclusive,
}

/// A type reference with nullability tracked separately from its name.
#[derive(Debug, Clone)]
pub struct ResolvedType {
    /// Canonical rendering without the nullable wrapper, e.g. `Vec<User>`.
    pub name: String,
    /// The syntax to emit, without the nullable wrapper or reference.
    pub ty: Type,
    pub nullable: bool,
    pub args: Vec<ResolvedType>,
}

/// Shape of the `Ok` side of a method's declared return type.
#[derive(Debug, Clone)]
pub enum ReturnShape {
    Void,
    Nullable(ResolvedType),
    NonNull(ResolvedType),
    /// Element type of a sequence container.
    Collection(ResolvedType),
}

impl ReturnShape {
    pub fn describe(&self) -> &'static str {
        match self {
            ReturnShape::Void => "()",
            ReturnShape::Nullable(_) => "Option<T>",
            ReturnShape::NonNull(_) => "T",
            ReturnShape::Collection(_) => "a collection",
        }
    }
}

/// Behavior category of a method.
#[derive(Debug, Clone)]
pub enum Behavior {
    Query { text: LitStr },
    Insert,
    Update,
    Unclassified { reason: String },
}

/// A method together with the behavior it was classified into.
#[derive(Debug, Clone)]
pub struct Classified<'a> {
    pub method: &'a MethodDeclaration,
    pub behavior: Behavior,
}

/// Factory function emitted next to the implementation type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryDescriptor {
    /// `user_repository`
    pub name: String,
    /// The trait the factory returns, `UserRepository`.
    pub returns: String,
}

/// One output artifact per repository trait.
#[derive(Debug, Clone)]
pub struct GeneratedUnit {
    /// Module the generated items belong to.
    pub namespace: String,
    /// Qualified name of the source trait.
    pub interface: String,
    pub impl_name: String,
    pub file_name: String,
    /// Generated trait methods in declaration order.
    pub methods: Vec<TokenStream>,
    pub factory: FactoryDescriptor,
    /// Implementation type, impls and factory.
    pub tokens: TokenStream,
}

impl GeneratedUnit {
    /// Renders the unit as a standalone file meant to be `include!`d into
    /// the module that declares the trait.
    pub fn render(&self) -> String {
        format!(
            "// @generated by neorepo from `{}`. Do not edit.\n{}\n",
            self.interface, self.tokens
        )
    }
}
