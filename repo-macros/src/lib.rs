//! The `#[repository]` attribute for neorepo.
//!
//! This crate is a thin adapter: parsing, classification and emission live
//! in `repo-codegen` so they can be tested and run outside the compiler.
//! Use it through the `neorepo` re-export, which is the path generated code
//! refers to by default.

use proc_macro::TokenStream;

/// Generates an implementation of a repository trait.
///
/// The trait must extend `NeoRepository<Entity, Id>`. Every method without
/// a default body must be an `async fn` taking `&self`, returning a
/// `Result`, and carrying exactly one of:
///
/// - `#[query("...")]` runs the query with every parameter bound under its
///   name, or under the key given by `#[param("key")]`
/// - `#[insert]` saves its single parameter
/// - `#[update]` runs the entity's update hook, then saves it
///
/// Next to the trait the macro emits `<Trait>Impl<S>`, which owns the
/// session and forwards the `NeoRepository` methods to a
/// `NeoRepositoryImpl`, and a snake-case factory returning
/// `Box<dyn Trait>`.
///
/// # Requirements
///
/// - Query results must deserialize into the declared type
/// - Insert and update parameters must implement `Entity`
/// - The trait's error type must implement `From<RepositoryError>`
///
/// # Example
///
/// ```ignore
/// use neorepo::{repository, NeoRepository, Result};
///
/// #[repository]
/// pub trait UserRepository: NeoRepository<User, String> {
///     #[query("MATCH (u:User {name: $name}) RETURN u")]
///     async fn find_by_name(&self, name: String) -> Result<User>;
///
///     #[query("MATCH (u:User {email: $address}) RETURN u")]
///     async fn find_by_email(&self, #[param("address")] email: &str) -> Result<Option<User>>;
///
///     #[insert]
///     async fn register(&self, user: User) -> Result<()>;
/// }
///
/// // Generated:
/// // pub(crate) struct UserRepositoryImpl<S: Session> { ... }
/// // pub fn user_repository<S: Session>(session: Arc<S>) -> Box<dyn UserRepository>
/// ```
///
/// # Custom Runtime Path
///
/// Generated code refers to `::neorepo`. Inside the runtime crate itself,
/// or when it is renamed, pass the path explicitly:
///
/// ```ignore
/// #[repository(crate = "crate")]
/// pub trait UserRepository: NeoRepository<User, String> { ... }
/// ```
///
/// # Generated Files
///
/// `#[repository(external)]` checks the trait and cleans it up but emits no
/// implementation. Pair it with the unit `neorepo generate` wrote for the
/// trait:
///
/// ```ignore
/// #[repository(external)]
/// pub trait UserRepository: NeoRepository<User, String> { ... }
///
/// include!(concat!(env!("OUT_DIR"), "/repos__user_repository_impl.rs"));
/// ```
#[proc_macro_attribute]
pub fn repository(args: TokenStream, item: TokenStream) -> TokenStream {
    repo_codegen::expand(args.into(), item.into()).into()
}
