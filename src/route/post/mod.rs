use axum::{
	http::StatusCode,
	routing::{get, post},
	Router,
};

use crate::{error, AppState};

pub mod model;
pub mod route;


/// Posts per page on the post list.
pub const POSTS_PER_PAGE: i64 = 3;
/// Maximum number of similar posts shown below a post.
pub const SIMILAR_POSTS: i64 = 4;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown post {0}")]
	UnknownPost(String),
	#[error("unknown tag {0}")]
	UnknownTag(String),
}

pub type RouteError = error::RouteError<Error>;

impl From<Error> for RouteError {
	fn from(error: Error) -> Self {
		Self::Route(error)
	}
}

pub fn routes() -> Router<AppState> {
	use route::*;

	Router::new()
		.route("/", get(post_list))
		.route("/tag/:tag_slug", get(post_list_by_tag))
		.route("/:year/:month/:day/:slug", get(post_detail))
		.route("/post/:id/share", get(share_form).post(share))
		.route("/post/:id/comment", post(comment))
		.route("/search", get(search))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownPost(..) | Self::UnknownTag(..) => StatusCode::NOT_FOUND,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		let content = match self {
			Self::UnknownPost(..) => "No post matches the given query.",
			Self::UnknownTag(..) => "No tag matches the given query.",
		};

		error::Message::new(content).into_vec()
	}
}
