mod form;

pub use form::{required, Form};

use axum::extract::FromRequestParts;

use crate::error::AppError;

/// [`axum::extract::Query`] rejecting with an [`AppError`], so a malformed
/// query string renders the same error page as everything else.
///
/// ```rust
/// async fn route(Query(params): Query<Params>) {
///   // ...
/// }
/// ```
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct Query<T>(pub T);

/// [`axum::extract::Path`] rejecting with an [`AppError`].
///
/// Segments that fail to parse (e.g. a non-numeric year) are treated
/// as an unknown page rather than a bad request.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct Path<T>(pub T);
