extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{parse_macro_input, parse_quote, Data, DeriveInput, Fields, Ident};

/// Implements `Component` and collects the capability tags listed in an
/// optional `#[component(...)]` attribute.
///
/// ```ignore
/// #[derive(Component)]
/// #[component(event, no_stack)]
/// struct CollisionCheckEvent { ... }
/// ```
///
/// Accepted tags: `event`, `effect`, `stack`, `no_stack`, `transform`,
/// `required`, `unique`. Listing both `stack` and `no_stack` is refused at
/// compile time.
#[proc_macro_derive(Component, attributes(component))]
pub fn derive_component(input: TokenStream) -> TokenStream {
    let mut ast = parse_macro_input!(input as DeriveInput);

    let mut tags = Vec::new();
    let mut stacked = false;
    let mut not_stacked = false;

    for attr in &ast.attrs {
        if !attr.path().is_ident("component") {
            continue;
        }
        let parsed = attr.parse_nested_meta(|meta| {
            let Some(ident) = meta.path.get_ident() else {
                return Err(meta.error("expected a tag name"));
            };
            let variant = match ident.to_string().as_str() {
                "event" => "Event",
                "effect" => "Effect",
                "stack" => {
                    stacked = true;
                    "Stack"
                }
                "no_stack" => {
                    not_stacked = true;
                    "NoStack"
                }
                "transform" => "Transform",
                "required" => "Required",
                "unique" => "Unique",
                unknown => return Err(meta.error(format!("unknown component tag `{unknown}`"))),
            };
            tags.push(Ident::new(variant, Span::call_site()));
            Ok(())
        });
        if let Err(error) = parsed {
            return error.to_compile_error().into();
        }
    }

    if stacked && not_stacked {
        return syn::Error::new(
            Span::call_site(),
            "`stack` and `no_stack` are mutually exclusive component tags",
        )
        .to_compile_error()
        .into();
    }

    ast.generics
        .make_where_clause()
        .predicates
        .push(parse_quote! { Self: 'static });

    let struct_name = &ast.ident;
    let (impl_generics, type_generics, where_clause) = &ast.generics.split_for_impl();

    TokenStream::from(quote! {
        impl #impl_generics keel_ecs::component::Component for #struct_name #type_generics #where_clause {
            const TAGS: keel_ecs::tag::TagSet = keel_ecs::tag::TagSet::empty()
                #(.with(keel_ecs::tag::Tag::#tags))*;
        }
    })
}

/// Implements `Effect` for a struct carrying its state in a named field
/// `effect: EffectState`.
#[proc_macro_derive(Effect)]
pub fn derive_effect(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    let has_state_field = match &ast.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields
                .named
                .iter()
                .any(|field| field.ident.as_ref().is_some_and(|ident| ident == "effect")),
            _ => false,
        },
        _ => false,
    };
    if !has_state_field {
        return syn::Error::new(
            Span::call_site(),
            "derive(Effect) requires a named field `effect: EffectState`",
        )
        .to_compile_error()
        .into();
    }

    let struct_name = &ast.ident;
    let (impl_generics, type_generics, where_clause) = &ast.generics.split_for_impl();

    TokenStream::from(quote! {
        impl #impl_generics keel_ecs::effect::Effect for #struct_name #type_generics #where_clause {
            fn state(&self) -> &keel_ecs::effect::EffectState {
                &self.effect
            }

            fn state_mut(&mut self) -> &mut keel_ecs::effect::EffectState {
                &mut self.effect
            }
        }
    })
}
