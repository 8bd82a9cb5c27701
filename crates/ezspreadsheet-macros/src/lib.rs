use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, parse_macro_input, spanned::Spanned};

/// Derive `Record`, `Instance` and `ToValue` for a struct with named fields.
///
/// Columns follow field declaration order. Attributes:
/// * `#[record(name = "Animal")]` on the struct overrides the type name.
/// * `#[record(rename = "Conservation Status")]` on a field overrides its column name.
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(ts) => ts.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

struct FieldSpec {
    ident: syn::Ident,
    column: String,
    ty: syn::Type,
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    /* -------- 1 · struct-level attributes -------- */
    let ident = &input.ident;
    let mut type_name = ident.to_string();
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("record")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let lit: LitStr = meta.value()?.parse()?;
                type_name = lit.value();
                Ok(())
            } else {
                Err(meta.error("expected `name = \"...\"`"))
            }
        })?;
    }

    /* -------- 2 · named fields, in declaration order -------- */
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new(
            input.span(),
            "Record can only be derived for structs",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new(
            data.fields.span(),
            "Record requires named fields",
        ));
    };

    let mut fields = Vec::with_capacity(named.named.len());
    for field in &named.named {
        let Some(field_ident) = field.ident.clone() else {
            continue;
        };
        let mut column = field_ident.to_string();
        if let Some(stripped) = column.strip_prefix("r#") {
            column = stripped.to_string();
        }
        for attr in field.attrs.iter().filter(|a| a.path().is_ident("record")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let lit: LitStr = meta.value()?.parse()?;
                    column = lit.value();
                    Ok(())
                } else {
                    Err(meta.error("expected `rename = \"...\"`"))
                }
            })?;
        }
        fields.push(FieldSpec {
            ident: field_ident,
            column,
            ty: field.ty.clone(),
        });
    }

    /* -------- 3 · generated items -------- */
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let descriptors = fields.iter().map(|f| {
        let column = &f.column;
        let ty = &f.ty;
        quote! {
            ::ezspreadsheet::FieldDescriptor::new(
                #column,
                <#ty as ::ezspreadsheet::FromValue>::KIND,
            )
        }
    });

    let values = fields.iter().map(|f| {
        let field_ident = &f.ident;
        quote! { ::ezspreadsheet::ToValue::to_value(&self.#field_ident) }
    });

    let named_values = fields.iter().map(|f| {
        let field_ident = &f.ident;
        let column = &f.column;
        quote! {
            (
                ::std::string::String::from(#column),
                ::ezspreadsheet::ToValue::to_value(&self.#field_ident),
            )
        }
    });

    let constructs = fields.iter().map(|f| {
        let field_ident = &f.ident;
        let ty = &f.ty;
        quote! { #field_ident: cursor.field::<#ty>()? }
    });

    Ok(quote! {
        impl #impl_generics ::ezspreadsheet::Instance for #ident #ty_generics #where_clause {
            fn type_name(&self) -> &str {
                #type_name
            }

            fn matches(&self, ty: &::ezspreadsheet::RecordType) -> bool {
                ty.is::<Self>()
            }

            fn values(&self) -> ::std::vec::Vec<::ezspreadsheet::Value> {
                ::std::vec![ #(#values),* ]
            }
        }

        impl #impl_generics ::ezspreadsheet::Record for #ident #ty_generics #where_clause {
            fn declaration() -> ::std::option::Option<::ezspreadsheet::Declaration> {
                ::std::option::Option::Some(::ezspreadsheet::Declaration {
                    name: #type_name,
                    fields: ::std::vec![ #(#descriptors),* ],
                })
            }

            fn construct(
                ty: &::ezspreadsheet::RecordType,
                values: ::std::vec::Vec<::ezspreadsheet::Value>,
            ) -> ::std::result::Result<Self, ::ezspreadsheet::DecodeError> {
                let mut cursor = ::ezspreadsheet::FieldCursor::new(ty, values)?;
                ::std::result::Result::Ok(Self {
                    #(#constructs),*
                })
            }
        }

        impl #impl_generics ::ezspreadsheet::ToValue for #ident #ty_generics #where_clause {
            fn to_value(&self) -> ::ezspreadsheet::Value {
                ::ezspreadsheet::Value::Record {
                    name: ::std::string::String::from(#type_name),
                    fields: ::std::vec![ #(#named_values),* ],
                }
            }
        }
    })
}
