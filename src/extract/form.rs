use std::collections::BTreeMap;

use axum::extract::{FromRequest, Request};
use serde::{de, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::AppError;

pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// Fails on empty or whitespace-only strings.
pub fn required(value: &str) -> Result<(), ValidationError> {
	if value.trim().is_empty() {
		let mut error = ValidationError::new("required");
		error.message = Some(REQUIRED_MESSAGE.into());

		return Err(error);
	}

	Ok(())
}

/// The first validation message of every invalid field, keyed by field name.
///
/// Serializes as a plain map so templates can do `form.errors.email`.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
	/// Runs the validators of `input`, collecting any failures.
	pub fn validate<T: Validate>(input: &T) -> Self {
		input.validate().err().map(Self::from).unwrap_or_default()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	#[cfg(test)]
	pub fn get(&self, field: &str) -> Option<&str> {
		self.0.get(field).map(String::as_str)
	}
}

impl From<ValidationErrors> for FieldErrors {
	fn from(errors: ValidationErrors) -> Self {
		Self(
			errors
				.field_errors()
				.into_iter()
				.filter_map(|(field, errors)| {
					let error = errors.first()?;
					let message = error
						.message
						.as_ref()
						.map_or_else(|| error.code.to_string(), ToString::to_string);

					Some((field.to_string(), message))
				})
				.collect(),
		)
	}
}

/// Extractor that deserializes a url-encoded form body and validates it.
///
/// Unlike a JSON body, an invalid form is not a rejection: the handler gets
/// both the data and its [`FieldErrors`] so it can re-render the form. The
/// whole form serializes into a template as `form.data` and `form.errors`.
///
/// ```rust
/// async fn route(form: Form<Input>) {
///   if form.is_valid() {
///     // ...
///   }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct Form<T> {
	pub data: T,
	pub errors: FieldErrors,
}

impl<T> Form<T> {
	/// A form that has not been submitted, so it has no errors.
	pub fn unbound(data: T) -> Self {
		Self {
			data,
			errors: FieldErrors::default(),
		}
	}

	/// A submitted form, validated.
	pub fn bound(data: T) -> Self
	where
		T: Validate,
	{
		let errors = FieldErrors::validate(&data);

		Self { data, errors }
	}

	pub fn is_valid(&self) -> bool {
		self.errors.is_empty()
	}
}

#[axum::async_trait]
impl<T, S> FromRequest<S> for Form<T>
where
	T: de::DeserializeOwned + Validate,
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let data = axum::extract::Form::<T>::from_request(req, state).await?.0;

		Ok(Self::bound(data))
	}
}
