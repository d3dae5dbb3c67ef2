use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{parse_macro_input, ItemFn};

/// Test attribute preparing the shared test environment (logging, backtrace) before the body runs.
/// Async functions are executed on a tokio runtime.
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new(Span::call_site(), "hydro_test::test does not take arguments")
            .to_compile_error()
            .into();
    }

    let ItemFn { attrs, vis, sig, block } = parse_macro_input!(item as ItemFn);

    let runner = if sig.asyncness.is_some() {
        quote! { #[::hydro_test::tokio::test(crate = "::hydro_test::tokio")] }
    } else {
        quote! { #[::core::prelude::v1::test] }
    };

    let output = quote! {
        #runner
        #(#attrs)*
        #vis #sig {
            ::hydro_test::setup_test();
            #block
        }
    };

    output.into()
}
