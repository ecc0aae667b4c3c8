//! Procedural macros for Vestibule.
//!
//! - `#[actions]` - builds the `Actions` method table of a controller from an
//!   inherent `impl` block

use heck::ToLowerCamelCase;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Attribute, FnArg, Ident, ImplItem, ImplItemFn, ItemImpl, LitStr, Token,
    ext::IdentExt,
    parse::{Parse, ParseStream},
    parse_macro_input,
};

/// Implement `Actions` for the type of an inherent `impl` block.
///
/// Every `async fn` taking `&mut self` or `&self` becomes an entry point,
/// named by converting its identifier to camelCase: `index_action` is
/// invoked as `indexAction`, `index_json` as `indexJson`. An entry point may
/// take one more parameter, which receives the callback arguments
/// (`vestibule::Arguments`). Its return type must implement
/// `vestibule::IntoPayload`.
///
/// Methods are configured with `#[action(...)]`:
///
/// - `#[action(name = "show")]` - invoke under a different name
/// - `#[action(skip)]` - not an entry point
///
/// ```rust,ignore
/// #[actions]
/// impl PostsController {
///     async fn index_action(&mut self) -> Result<Value, AppError> { ... }
///     async fn index_json(&mut self, arguments: Arguments) -> Payload { ... }
/// }
/// ```
#[proc_macro_attribute]
pub fn actions(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new(
            proc_macro2::TokenStream::from(attr).into_iter().next().map_or_else(
                proc_macro2::Span::call_site,
                |token| token.span(),
            ),
            "#[actions] takes no arguments",
        )
        .to_compile_error()
        .into();
    }
    let mut input = parse_macro_input!(item as ItemImpl);

    match expand(&mut input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => err.to_compile_error().into(),
    }
}

struct Entry {
    name: String,
    method: Ident,
    takes_arguments: bool,
}

fn expand(input: &mut ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &input.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[actions] must be placed on an inherent impl block",
        ));
    }

    let mut entries = Vec::new();
    for item in &mut input.items {
        let ImplItem::Fn(function) = item else {
            continue;
        };
        let args = take_action_args(&mut function.attrs)?;
        if args.skip {
            continue;
        }
        if let Some(entry) = entry_point(function, args.name)? {
            if entries.iter().any(|known: &Entry| known.name == entry.name) {
                return Err(syn::Error::new_spanned(
                    &function.sig.ident,
                    format!("duplicate action name `{}`", entry.name),
                ));
            }
            entries.push(entry);
        }
    }

    let self_ty = &input.self_ty;
    let (impl_generics, _, where_clause) = input.generics.split_for_impl();

    let arms = entries.iter().map(|entry| {
        let name = &entry.name;
        let method = &entry.method;
        let call = if entry.takes_arguments {
            quote! { self.#method(__arguments).await }
        } else {
            quote! { { ::core::mem::drop(__arguments); self.#method().await } }
        };
        quote! {
            #name => ::vestibule::IntoPayload::into_payload(#call),
        }
    });

    let names: Vec<_> = entries.iter().map(|entry| entry.name.as_str()).collect();
    let has_action = if names.is_empty() {
        quote! {
            let _ = __method;
            false
        }
    } else {
        quote! { ::core::matches!(__method, #(#names)|*) }
    };

    Ok(quote! {
        #input

        impl #impl_generics ::vestibule::Actions for #self_ty #where_clause {
            fn invoke<'__a>(
                &'__a mut self,
                __method: &'__a str,
                __arguments: ::vestibule::Arguments,
            ) -> ::vestibule::BoxFuture<'__a, ::core::result::Result<::vestibule::Payload, ::vestibule::InvokeError>> {
                ::std::boxed::Box::pin(async move {
                    match __method {
                        #(#arms)*
                        _ => {
                            ::core::mem::drop(__arguments);
                            ::core::result::Result::Err(::vestibule::InvokeError::MissingMethod {
                                target: ::std::any::type_name::<Self>().to_owned(),
                                method: __method.to_owned(),
                            })
                        }
                    }
                })
            }

            fn has_action(&self, __method: &str) -> bool {
                #has_action
            }
        }
    })
}

/// Arguments of the `#[action(...)]` helper attribute.
#[derive(Default)]
struct ActionArgs {
    name: Option<String>,
    skip: bool,
}

impl Parse for ActionArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = ActionArgs::default();

        while !input.is_empty() {
            let ident: Ident = input.parse()?;

            match ident.to_string().as_str() {
                "name" => {
                    input.parse::<Token![=]>()?;
                    let lit: LitStr = input.parse()?;
                    if lit.value().is_empty() {
                        return Err(syn::Error::new(lit.span(), "action name must not be empty"));
                    }
                    args.name = Some(lit.value());
                }
                "skip" => args.skip = true,
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(args)
    }
}

fn take_action_args(attrs: &mut Vec<Attribute>) -> syn::Result<ActionArgs> {
    let mut args = ActionArgs::default();
    let mut result = Ok(());
    attrs.retain(|attr| {
        if !attr.path().is_ident("action") {
            return true;
        }
        match attr.parse_args::<ActionArgs>() {
            Ok(parsed) => {
                args.name = parsed.name.or(args.name.take());
                args.skip |= parsed.skip;
            }
            Err(err) => result = Err(err),
        }
        false
    });
    result.map(|()| args)
}

fn entry_point(function: &ImplItemFn, name: Option<String>) -> syn::Result<Option<Entry>> {
    let sig = &function.sig;
    let Some(FnArg::Receiver(receiver)) = sig.inputs.first() else {
        return Ok(None);
    };
    if sig.asyncness.is_none() {
        return Ok(None);
    }
    if receiver.reference.is_none() {
        return Err(syn::Error::new_spanned(
            receiver,
            "actions must take `&mut self` or `&self`",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "actions cannot be generic",
        ));
    }

    let takes_arguments = match sig.inputs.len() {
        1 => false,
        2 => true,
        _ => {
            return Err(syn::Error::new_spanned(
                &sig.inputs,
                "actions take at most one parameter besides `self`: the callback arguments",
            ));
        }
    };

    Ok(Some(Entry {
        name: name.unwrap_or_else(|| action_name(&sig.ident)),
        method: sig.ident.clone(),
        takes_arguments,
    }))
}

fn action_name(ident: &Ident) -> String {
    ident.unraw().to_string().to_lower_camel_case()
}
