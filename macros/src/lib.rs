mod model;

use proc_macro::TokenStream;

/// Derives `CreateX` from a model `X`: the fields a client may submit.
///
/// Fields with `#[serde(skip_deserializing)]` or `#[serde(skip)]` are left out,
/// and all other fields are included verbatim (including attributes), as are
/// the model's own attributes.
#[proc_macro_attribute]
pub fn model(args: TokenStream, input: TokenStream) -> TokenStream {
	model::from_input(args, input)
}
