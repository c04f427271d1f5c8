//! Method body emission.
//!
//! Every body talks to the session through fully-qualified trait calls so
//! the generated code does not depend on what the user has imported, and
//! every fallible call uses `?` so failures surface in the caller's declared
//! error type.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Ident, LitStr, Path};

use crate::model::{Behavior, Classified, MethodDeclaration, Passing, ReturnShape};

pub struct Emitter<'a> {
    runtime: &'a Path,
    interface: &'a Ident,
}

impl<'a> Emitter<'a> {
    pub fn new(runtime: &'a Path, interface: &'a Ident) -> Self {
        Self { runtime, interface }
    }

    /// Emits the full trait method: the declared signature plus its body.
    pub fn emit(&self, classified: &Classified<'_>) -> TokenStream {
        let method = classified.method;
        let sig = &method.sig;
        let body = match &classified.behavior {
            Behavior::Query { text } => self.query_body(method, text),
            Behavior::Insert => self.insert_body(method),
            Behavior::Update => self.update_body(method),
            Behavior::Unclassified { reason } => {
                let message = format!("unclassified repository method: {}", reason);
                quote! { ::core::compile_error!(#message) }
            }
        };

        quote! {
            #sig {
                #body
            }
        }
    }

    fn query_body(&self, method: &MethodDeclaration, text: &LitStr) -> TokenStream {
        let rt = self.runtime;
        let bindings = self.bindings(method);
        let text = LitStr::new(&text.value(), text.span());

        let call = match &method.returns {
            ReturnShape::Void => quote! {
                #rt::Session::query::<#rt::__private::IgnoredAny>(&*self.session, __query, __params)
                    .await?;
                ::core::result::Result::Ok(())
            },
            ReturnShape::Collection(element) => {
                let element = &element.ty;
                quote! {
                    let __rows = #rt::Session::query::<#element>(&*self.session, __query, __params)
                        .await?;
                    ::core::result::Result::Ok(::core::iter::IntoIterator::into_iter(__rows).collect())
                }
            }
            ReturnShape::NonNull(ty) => {
                let ty = &ty.ty;
                let context = format!("{}::{}", self.interface, method.name);
                quote! {
                    match #rt::Session::query_for_object::<#ty>(&*self.session, __query, __params)
                        .await?
                    {
                        ::core::option::Option::Some(__found) => ::core::result::Result::Ok(__found),
                        ::core::option::Option::None => ::core::result::Result::Err(
                            ::core::convert::From::from(#rt::RepositoryError::not_found(#context)),
                        ),
                    }
                }
            }
            ReturnShape::Nullable(inner) => {
                let inner = &inner.ty;
                quote! {
                    let __found =
                        #rt::Session::query_for_object::<#inner>(&*self.session, __query, __params)
                            .await?;
                    ::core::result::Result::Ok(__found)
                }
            }
        };

        quote! {
            let __query: &str = #text;
            #bindings
            #call
        }
    }

    /// Builds the full parameter map before the query runs.
    fn bindings(&self, method: &MethodDeclaration) -> TokenStream {
        let rt = self.runtime;
        if method.params.is_empty() {
            return quote! { let __params = #rt::Params::new(); };
        }

        let inserts = method.params.iter().map(|param| {
            let name = &param.name;
            let key = param.key();
            quote! {
                __params.insert(
                    ::std::string::String::from(#key),
                    #rt::to_param(&#name)?,
                );
            }
        });

        quote! {
            let mut __params = #rt::Params::new();
            #(#inserts)*
        }
    }

    fn insert_body(&self, method: &MethodDeclaration) -> TokenStream {
        let rt = self.runtime;
        let param = &method.params[0];
        let entity = &param.name;
        let borrowed = borrow(entity, param.passing);
        let result = saved_result(method, entity);

        quote! {
            #rt::Session::save(&*self.session, #borrowed).await?;
            #result
        }
    }

    fn update_body(&self, method: &MethodDeclaration) -> TokenStream {
        let rt = self.runtime;
        let param = &method.params[0];
        let entity = &param.name;
        let borrowed = borrow(entity, param.passing);
        let result = saved_result(method, entity);

        let (rebind, exclusive) = match param.passing {
            Passing::Exclusive => (quote! {}, quote! { &mut *#entity }),
            _ => (quote! { let mut #entity = #entity; }, quote! { &mut #entity }),
        };

        let hook = run_update_hook(rt, exclusive);

        quote! {
            #rebind
            #hook
            #rt::Session::save(&*self.session, #borrowed).await?;
            #result
        }
    }
}

/// Calls `Updatable::update` on `target` when its concrete type implements
/// it, and does nothing otherwise.
pub(crate) fn run_update_hook(rt: &Path, target: TokenStream) -> TokenStream {
    quote! {
        {
            #[allow(unused_imports)]
            use #rt::__private::{ViaUpdatable as _, WithoutHook as _};
            #rt::__private::UpdateHook(#target).run_update_hook();
        }
    }
}

/// `&T` view of a parameter for `Session::save`.
fn borrow(entity: &Ident, passing: Passing) -> TokenStream {
    match passing {
        Passing::Owned => quote! { &#entity },
        Passing::Shared => quote! { #entity },
        Passing::Exclusive => quote! { &*#entity },
    }
}

/// `()` or the saved entity echoed back.
fn saved_result(method: &MethodDeclaration, entity: &Ident) -> TokenStream {
    match method.returns {
        ReturnShape::NonNull(_) => quote! { ::core::result::Result::Ok(#entity) },
        _ => quote! { ::core::result::Result::Ok(()) },
    }
}
