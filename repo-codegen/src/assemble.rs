//! Unit assembly.
//!
//! Wraps the emitted methods into an implementation type that owns a
//! session and a `NeoRepositoryImpl`, forwards the base capability to the
//! latter, and pairs it with a factory function.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{ItemTrait, Path};

use crate::emit::{run_update_hook, Emitter};
use crate::model::{Classified, FactoryDescriptor, GeneratedUnit, RepositoryDeclaration};

pub struct Assembler<'a> {
    runtime: &'a Path,
}

impl<'a> Assembler<'a> {
    pub fn new(runtime: &'a Path) -> Self {
        Self { runtime }
    }

    pub fn assemble(
        &self,
        decl: &RepositoryDeclaration,
        classified: &[Classified<'_>],
    ) -> GeneratedUnit {
        let rt = self.runtime;
        let interface = &decl.ident;
        let impl_ident = decl.impl_ident();
        let factory = decl.factory_ident();
        let entity = &decl.entity;
        let id = &decl.id;
        let vis = &decl.vis;

        let emitter = Emitter::new(rt, interface);
        let methods: Vec<TokenStream> = classified.iter().map(|c| emitter.emit(c)).collect();
        let delegation = self.delegation(decl);
        let hook = run_update_hook(rt, quote!(entity));

        let struct_doc = format!(" Generated implementation of [`{}`].", interface);
        let factory_doc = format!(
            " Creates a [`{}`] backed by the given session.",
            interface
        );

        let tokens = quote! {
            #[doc = #struct_doc]
            #[allow(dead_code)]
            pub(crate) struct #impl_ident<S: #rt::Session + 'static> {
                session: ::std::sync::Arc<S>,
                base: #rt::NeoRepositoryImpl<#entity, #id, S>,
            }

            impl<S: #rt::Session + 'static> #impl_ident<S> {
                pub(crate) fn new(session: ::std::sync::Arc<S>) -> Self {
                    Self {
                        base: #rt::NeoRepositoryImpl::with_update_hook(
                            ::std::sync::Arc::clone(&session),
                            |entity: &mut #entity| #hook,
                        ),
                        session,
                    }
                }
            }

            #delegation

            #[#rt::__private::async_trait]
            impl<S: #rt::Session + 'static> #interface for #impl_ident<S> {
                #(#methods)*
            }

            #[doc = #factory_doc]
            #[allow(dead_code)]
            #vis fn #factory<S: #rt::Session + 'static>(
                session: ::std::sync::Arc<S>,
            ) -> ::std::boxed::Box<dyn #interface> {
                ::std::boxed::Box::new(#impl_ident::new(session))
            }
        };

        GeneratedUnit {
            namespace: decl
                .module_path
                .clone()
                .unwrap_or_else(|| "self".to_string()),
            interface: decl.qualified_name(),
            impl_name: impl_ident.to_string(),
            file_name: decl.file_name(),
            methods,
            factory: FactoryDescriptor {
                name: factory.to_string(),
                returns: interface.to_string(),
            },
            tokens,
        }
    }

    /// Forwards every base-capability method to the owned base
    /// implementation.
    fn delegation(&self, decl: &RepositoryDeclaration) -> TokenStream {
        let rt = self.runtime;
        let impl_ident = decl.impl_ident();
        let entity = &decl.entity;
        let id = &decl.id;
        let base = quote! { #rt::NeoRepository<#entity, #id> };

        quote! {
            #[#rt::__private::async_trait]
            impl<S: #rt::Session + 'static> #base for #impl_ident<S> {
                async fn create(&self, data: #entity) -> #rt::Result<#entity> {
                    <#rt::NeoRepositoryImpl<#entity, #id, S> as #base>::create(&self.base, data).await
                }

                async fn update(&self, data: #entity) -> #rt::Result<#entity> {
                    <#rt::NeoRepositoryImpl<#entity, #id, S> as #base>::update(&self.base, data).await
                }

                async fn find_by_id(&self, id: #id) -> #rt::Result<::core::option::Option<#entity>> {
                    <#rt::NeoRepositoryImpl<#entity, #id, S> as #base>::find_by_id(&self.base, id).await
                }

                async fn delete_by_id(&self, id: #id) -> #rt::Result<()> {
                    <#rt::NeoRepositoryImpl<#entity, #id, S> as #base>::delete_by_id(&self.base, id).await
                }

                async fn delete(&self, data: #entity) -> #rt::Result<()> {
                    <#rt::NeoRepositoryImpl<#entity, #id, S> as #base>::delete(&self.base, data).await
                }
            }
        }
    }
}

/// The trait as it should appear after expansion: helper attributes removed
/// and `async_trait` applied unless the user already did.
pub fn clean_trait(item: &ItemTrait, runtime: &Path) -> ItemTrait {
    let mut item = item.clone();
    crate::extract::strip_markers(&mut item);

    let has_async_trait = item.attrs.iter().any(|attr| {
        attr.path()
            .segments
            .last()
            .map(|segment| segment.ident == "async_trait")
            .unwrap_or(false)
    });
    if !has_async_trait {
        item.attrs
            .insert(0, syn::parse_quote!(#[#runtime::__private::async_trait]));
    }
    item
}
