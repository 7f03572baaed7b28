use darling::{ast, FromDeriveInput, FromField};
use proc_macro2::{TokenStream, TokenTree};
use quote::{format_ident, quote, ToTokens};
use syn::Meta;

#[derive(Debug, FromDeriveInput)]
#[darling(supports(struct_named), forward_attrs)]
struct Model {
	ident: syn::Ident,
	vis: syn::Visibility,
	generics: syn::Generics,
	data: ast::Data<(), Field>,
	attrs: Vec<syn::Attribute>,
}

#[derive(Debug, FromField)]
#[darling(forward_attrs)]
struct Field {
	ident: Option<syn::Ident>,
	vis: syn::Visibility,
	ty: syn::Type,
	attrs: Vec<syn::Attribute>,
}

impl Field {
	/// Server-owned fields are marked `#[serde(skip_deserializing)]` or
	/// `#[serde(skip)]` and never come from a client.
	fn is_input(&self) -> bool {
		!self.attrs.iter().any(|attr| {
			let Meta::List(list) = &attr.meta else {
				return false;
			};

			list.path.is_ident("serde")
				&& list.tokens.to_token_stream().into_iter().any(|token| {
					matches!(&token, TokenTree::Ident(ident) if ident == "skip" || ident == "skip_deserializing")
				})
		})
	}
}

/// Emits `Create{Model}` holding the input fields.
fn create_struct(model: &Model, fields: &[&Field]) -> TokenStream {
	let Model {
		ident,
		vis,
		generics,
		attrs,
		..
	} = model;
	let name = format_ident!("Create{ident}");

	let fields = fields.iter().map(|field| {
		let Field {
			ident,
			vis,
			ty,
			attrs,
		} = field;

		quote! {
			#(#attrs)*
			#vis #ident: #ty
		}
	});

	quote! {
		#(#attrs)*
		#vis struct #name #generics {
			#(#fields,)*
		}
	}
}

pub fn from_input(
	args: proc_macro::TokenStream,
	input: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
	if !args.is_empty() {
		return syn::Error::new(
			proc_macro2::Span::call_site(),
			"#[model] does not take arguments",
		)
		.into_compile_error()
		.into();
	}

	let input = syn::parse_macro_input!(input as syn::DeriveInput);
	let model = match Model::from_derive_input(&input) {
		Ok(model) => model,
		Err(error) => return error.write_errors().into(),
	};

	let fields = match &model.data {
		ast::Data::Struct(fields) => fields
			.iter()
			.filter(|field| field.ident.is_some() && field.is_input())
			.collect::<Vec<_>>(),
		ast::Data::Enum(..) => Vec::new(),
	};

	let create = create_struct(&model, &fields);

	quote! {
		#input
		#create
	}
	.into()
}
