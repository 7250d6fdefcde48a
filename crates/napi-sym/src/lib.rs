// Wraps N-API function implementations with the runtime's napi_wrap!
// macro, which adds the extern "C" signature and the entry preamble
// (environment resolution, last-error bookkeeping, status conversion).

use proc_macro::TokenStream;
use quote::quote;

#[proc_macro_attribute]
pub fn napi_sym(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let func = syn::parse::<syn::ItemFn>(item).expect("expected a function");
    TokenStream::from(quote! {
        crate::napi_wrap! {
            #func
        }
    })
}
