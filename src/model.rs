use chrono::{DateTime, Datelike, Utc};
use macros::model;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::extract::required;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(type_name = "post_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Status {
	Draft,
	Published,
}

/// A single blog post, written in Markdown.
///
/// Posts are authored outside of this service, so there is no input type.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Post {
	pub id: i64,
	pub title: String,
	/// Unique per publish date.
	pub slug: String,
	pub body: String,
	pub status: Status,
	pub publish: DateTime<Utc>,
	pub created: DateTime<Utc>,
	pub updated: DateTime<Utc>,
}

impl Post {
	/// The canonical path of the post, e.g. `/2024/1/5/hello-world`.
	pub fn url(&self) -> String {
		format!(
			"/{}/{}/{}/{}",
			self.publish.year(),
			self.publish.month(),
			self.publish.day(),
			self.slug
		)
	}

	/// Whether the post is visible to the public at `now`.
	pub fn is_published(&self, now: DateTime<Utc>) -> bool {
		self.status == Status::Published && self.publish <= now
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Tag {
	pub id: i64,
	pub name: String,
	pub slug: String,
}

/// A tag along with the post it is attached to.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostTag {
	pub post_id: i64,
	#[sqlx(flatten)]
	pub tag: Tag,
}

/// A reader comment on a post.
///
/// `CreateComment` doubles as the comment form: missing fields deserialize
/// to empty strings so they surface as validation errors.
#[model]
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, sqlx::FromRow)]
pub struct Comment {
	#[serde(skip_deserializing)]
	pub id: i64,
	#[serde(skip_deserializing)]
	pub post_id: i64,
	#[serde(default)]
	#[validate(
		custom(function = "required"),
		length(max = 80, message = "Ensure this value has at most 80 characters.")
	)]
	pub name: String,
	#[serde(default)]
	#[validate(
		custom(function = "required"),
		email(message = "Enter a valid email address.")
	)]
	pub email: String,
	#[serde(default)]
	#[validate(custom(function = "required"))]
	pub body: String,
	#[serde(skip_deserializing)]
	pub created: DateTime<Utc>,
	#[serde(skip_deserializing)]
	pub updated: DateTime<Utc>,
	/// Inactive comments are hidden from the post page.
	#[serde(skip_deserializing)]
	pub active: bool,
}

/// A post annotated with its total number of comments.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CommentedPost {
	#[sqlx(flatten)]
	#[serde(flatten)]
	pub post: Post,
	pub total_comments: i64,
}

/// A post matched by a search, with its title similarity to the query.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SearchHit {
	#[sqlx(flatten)]
	#[serde(flatten)]
	pub post: Post,
	pub similarity: f32,
}
