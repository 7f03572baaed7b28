pub use crate::{
	model::CreateComment as CommentForm,
	route::model::{PageInput, Paginator},
};

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::extract::required;

/// The form used to recommend a post to someone by email.
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct EmailPostForm {
	/// The name of the person sharing the post.
	#[serde(default)]
	#[validate(
		custom(function = "required"),
		length(max = 25, message = "Ensure this value has at most 25 characters.")
	)]
	pub name: String,
	/// The address of the person sharing the post, used as the reply address.
	#[serde(default)]
	#[validate(
		custom(function = "required"),
		email(message = "Enter a valid email address.")
	)]
	pub email: String,
	/// The recipient.
	#[serde(default)]
	#[validate(
		custom(function = "required"),
		email(message = "Enter a valid email address.")
	)]
	pub to: String,
	#[serde(default)]
	pub comments: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchInput {
	/// Absent when the search form has not been submitted.
	pub query: Option<String>,
}

#[derive(Debug, Default, Serialize, Validate)]
pub struct SearchForm {
	#[validate(custom(function = "required"))]
	pub query: String,
}
