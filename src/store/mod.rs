mod postgres;

#[cfg(test)]
pub mod memory;

pub use postgres::PgStore;

use chrono::NaiveDate;

use crate::model::{Comment, CommentedPost, CreateComment, Post, PostTag, SearchHit, Tag};

pub type Result<T, E = sqlx::Error> = std::result::Result<T, E>;

/// Search results must be more similar than this to the query.
pub const SIMILARITY_THRESHOLD: f32 = 0.1;

/// Read and write access to the blog's content.
///
/// Every method that returns posts only considers published posts
/// (status `published` and a publish time that is not in the future),
/// ordered newest first unless stated otherwise.
#[axum::async_trait]
pub trait Store: Send + Sync {
	/// Looks up a tag by its slug, published posts or not.
	async fn tag_by_slug(&self, slug: &str) -> Result<Option<Tag>>;

	/// Counts published posts, optionally only those carrying `tag`.
	async fn count_posts(&self, tag: Option<i64>) -> Result<i64>;

	/// Returns a window of published posts, optionally only those carrying `tag`.
	async fn list_posts(&self, tag: Option<i64>, limit: i64, offset: i64) -> Result<Vec<Post>>;

	/// Looks up a published post by its slug and publish date (UTC).
	async fn post_by_date(&self, date: NaiveDate, slug: &str) -> Result<Option<Post>>;

	async fn post_by_id(&self, id: i64) -> Result<Option<Post>>;

	/// Returns the tags of the given posts, sorted by name.
	async fn tags_of(&self, post_ids: &[i64]) -> Result<Vec<PostTag>>;

	/// Returns the active comments of a post, oldest first.
	async fn active_comments(&self, post_id: i64) -> Result<Vec<Comment>>;

	/// Stores a new, active comment on a post.
	async fn create_comment(&self, post_id: i64, input: CreateComment) -> Result<Comment>;

	/// Returns published posts sharing at least one tag with `post_id`,
	/// excluding it, ordered by shared tag count and then recency.
	async fn similar_posts(&self, post_id: i64, limit: i64) -> Result<Vec<Post>>;

	/// Returns published posts with their total comment count, most commented first.
	async fn most_commented(&self, limit: i64) -> Result<Vec<CommentedPost>>;

	/// Returns published posts whose title has a trigram similarity to `query`
	/// above [`SIMILARITY_THRESHOLD`], most similar first.
	async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}
