use std::borrow::Cow;

use axum::{
	body::Body,
	extract::rejection,
	http::{Response, StatusCode},
	response::{Html, IntoResponse},
};

use crate::mail;

/// Error type shared by every route.
///
/// The Display trait is not sent to the client, so it can show
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("template error: {0}")]
	Template(#[from] tera::Error),
	#[error("mail error: {0}")]
	Mail(#[from] mail::Error),
	#[error("xml error: {0}")]
	Xml(#[from] quick_xml::DeError),
	#[error("form error: {0}")]
	Form(#[from] rejection::FormRejection),
	#[error("query error: {0}")]
	Query(#[from] rejection::QueryRejection),
	#[error("path error: {0}")]
	Path(#[from] rejection::PathRejection),
}

/// A single message shown on an error page.
#[derive(Debug)]
pub struct Message<'a> {
	pub content: Cow<'a, str>,
}

impl<'a> Message<'a> {
	pub fn new(content: impl Into<Cow<'a, str>>) -> Self {
		Self {
			content: content.into(),
		}
	}

	pub fn into_vec(self) -> Vec<Self> {
		vec![self]
	}
}

/// How a route-specific error is presented to the client.
pub trait ErrorShape: std::error::Error {
	fn status(&self) -> StatusCode;

	fn errors(&self) -> Vec<Message<'_>>;
}

impl ErrorShape for AppError {
	fn status(&self) -> StatusCode {
		match self {
			Self::Database(..) | Self::Template(..) | Self::Mail(..) | Self::Xml(..) => {
				StatusCode::INTERNAL_SERVER_ERROR
			}
			Self::Form(..) | Self::Query(..) => StatusCode::BAD_REQUEST,
			Self::Path(..) => StatusCode::NOT_FOUND,
		}
	}

	fn errors(&self) -> Vec<Message<'_>> {
		match self {
			Self::Form(rejection) => Message::new(rejection.body_text()).into_vec(),
			Self::Query(rejection) => Message::new(rejection.body_text()).into_vec(),
			_ => Vec::new(),
		}
	}
}

/// The error returned from route handlers: either a shared [`AppError`]
/// or the route module's own error type.
#[derive(Debug, thiserror::Error)]
pub enum RouteError<E> {
	#[error(transparent)]
	App(#[from] AppError),
	#[error(transparent)]
	Route(E),
}

impl<E> From<sqlx::Error> for RouteError<E> {
	fn from(error: sqlx::Error) -> Self {
		Self::App(error.into())
	}
}

impl<E> From<tera::Error> for RouteError<E> {
	fn from(error: tera::Error) -> Self {
		Self::App(error.into())
	}
}

impl<E> From<mail::Error> for RouteError<E> {
	fn from(error: mail::Error) -> Self {
		Self::App(error.into())
	}
}

/// Renders a bare HTML error page. Templates are not used here so an error
/// in the template set cannot hide the original error.
fn error_page(status: StatusCode, errors: &[Message<'_>]) -> Response<Body> {
	let reason = status.canonical_reason().unwrap_or("Error");
	let items = errors
		.iter()
		.map(|message| format!("<li>{}</li>", tera::escape_html(&message.content)))
		.collect::<String>();

	let html = format!(
		"<!DOCTYPE html><html><head><title>{reason}</title></head><body><h1>{code} {reason}</h1><ul>{items}</ul></body></html>",
		code = status.as_u16(),
	);

	(status, Html(html)).into_response()
}

fn shape_response(error: &impl ErrorShape) -> Response<Body> {
	let status = error.status();

	if status.is_server_error() {
		tracing::error!(%error, "request failed");
	}

	error_page(status, &error.errors())
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response<Body> {
		shape_response(&self)
	}
}

impl<E> IntoResponse for RouteError<E>
where
	E: ErrorShape,
{
	fn into_response(self) -> Response<Body> {
		match self {
			Self::App(error) => shape_response(&error),
			Self::Route(error) => shape_response(&error),
		}
	}
}
