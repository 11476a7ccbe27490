// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use quote::quote;
use syn::{Data, DeriveInput, Fields, Result};

use crate::derive_error::types::{BacktracePolicy, ErrorFieldRef, FromConfig};
use crate::utils::bail;

/// Generate From trait implementations for specified types
pub fn generate_from_implementations(
    input: &DeriveInput,
    error_field: &ErrorFieldRef,
    from_configs: &[FromConfig],
    backtrace_policy: BacktracePolicy,
) -> Result<proc_macro2::TokenStream> {
    if from_configs.is_empty() {
        return Ok(quote! {});
    }

    let Data::Struct(data_struct) = &input.data else {
        bail!("From implementations only support structs");
    };

    match &data_struct.fields {
        Fields::Named(_) => generate_from_implementations_named(input, error_field, from_configs, backtrace_policy),
        Fields::Unnamed(_) => generate_from_implementations_tuple(input, error_field, from_configs, backtrace_policy),
        Fields::Unit => bail!("From implementations not supported for unit structs"),
    }
}

#[expect(clippy::option_if_let_else, reason = "Would decrease readability")]
fn generate_from_implementations_named(
    input: &DeriveInput,
    error_field: &ErrorFieldRef,
    from_configs: &[FromConfig],
    backtrace_policy: BacktracePolicy,
) -> Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let ErrorFieldRef::Named(error_field_name) = error_field else {
        bail!("Expected named field for named struct");
    };

    let Data::Struct(data_struct) = &input.data else {
        bail!("From implementations for named structs only support structs");
    };

    let Fields::Named(fields) = &data_struct.fields else {
        bail!("From implementations for named structs only support structs with named fields");
    };

    // Get all field names except the error field
    let other_fields: Vec<_> = fields
        .named
        .iter()
        .filter_map(|field| field.ident.as_ref().filter(|ident| *ident != error_field_name))
        .collect();

    let caused_by_core = backtrace_policy.to_builder_call_with_error();

    let from_impls = from_configs.iter().map(|from_config| {
        let from_type = &from_config.from_type;

        // Generate field initializations
        let field_defaults = other_fields.iter().map(|field_name| {
            let field_name_str = field_name.to_string();
            if let Some(custom_expr) = from_config.field_expressions.get(&field_name_str) {
                // Use the custom expression provided in the attribute
                quote! { #field_name: #custom_expr }
            } else {
                // Default to Default::default() for fields not specified
                quote! { #field_name: Default::default() }
            }
        });

        let error_field_access = error_field.to_field_access();

        quote! {
            impl #impl_generics From<#from_type> for #name #ty_generics #where_clause {
                fn from(error: #from_type) -> Self {
                    Self {
                        #(#field_defaults,)*
                        #error_field_access: #caused_by_core,
                    }
                }
            }
        }
    });

    Ok(quote! {
        #(#from_impls)*
    })
}

#[expect(clippy::option_if_let_else, reason = "Would decrease readability")]
fn generate_from_implementations_tuple(
    input: &DeriveInput,
    error_field: &ErrorFieldRef,
    from_configs: &[FromConfig],
    backtrace_policy: BacktracePolicy,
) -> Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let ErrorFieldRef::Indexed(index) = error_field else {
        bail!("Expected indexed field for tuple struct");
    };
    let error_field_index = index.index as usize;

    let Data::Struct(data_struct) = &input.data else {
        bail!("From implementations for tuple structs only support structs");
    };

    let Fields::Unnamed(fields) = &data_struct.fields else {
        bail!("From implementations for tuple structs only support structs with unnamed fields");
    };

    let total_fields = fields.unnamed.len();
    let caused_by_core = backtrace_policy.to_builder_call_with_error();

    let from_impls = from_configs.iter().map(|from_config| {
        let from_type = &from_config.from_type;

        // Generate default values for all fields except the error field
        // Note: Field expressions for tuple structs would use indices like "0", "1", etc.
        let field_defaults: Vec<proc_macro2::TokenStream> = (0..total_fields)
            .map(|i| {
                if i == error_field_index {
                    caused_by_core.clone()
                } else {
                    let field_index_str = i.to_string();
                    if let Some(custom_expr) = from_config.field_expressions.get(&field_index_str) {
                        quote! { #custom_expr }
                    } else {
                        quote! { Default::default() }
                    }
                }
            })
            .collect();

        quote! {
            impl #impl_generics From<#from_type> for #name #ty_generics #where_clause {
                fn from(error: #from_type) -> Self {
                    Self(#(#field_defaults),*)
                }
            }
        }
    });

    Ok(quote! {
        #(#from_impls)*
    })
}
