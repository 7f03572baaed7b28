use chrono::NaiveDate;

use crate::model::{Comment, CommentedPost, CreateComment, Post, PostTag, SearchHit, Tag};

use super::{Result, Store, SIMILARITY_THRESHOLD};

pub type Database = sqlx::Pool<sqlx::Postgres>;

/// [`Store`] backed by PostgreSQL. Search relies on the `pg_trgm` extension.
#[derive(Clone)]
pub struct PgStore {
	database: Database,
}

impl PgStore {
	pub fn new(database: Database) -> Self {
		Self { database }
	}

	/// Connects to the database and applies pending migrations.
	pub async fn connect(url: &str) -> Result<Self> {
		let database = Database::connect(url).await?;

		sqlx::migrate!()
			.run(&database)
			.await
			.map_err(|error| sqlx::Error::Migrate(Box::new(error)))?;

		Ok(Self::new(database))
	}
}

#[axum::async_trait]
impl Store for PgStore {
	async fn tag_by_slug(&self, slug: &str) -> Result<Option<Tag>> {
		sqlx::query_as::<_, Tag>("SELECT id, name, slug FROM tag WHERE slug = $1")
			.bind(slug)
			.fetch_optional(&self.database)
			.await
	}

	async fn count_posts(&self, tag: Option<i64>) -> Result<i64> {
		sqlx::query_scalar(
			r#"
				SELECT COUNT(*) FROM post
				WHERE status = 'published' AND publish <= NOW()
					AND ($1::BIGINT IS NULL OR id IN (SELECT post_id FROM post_tag WHERE tag_id = $1))
			"#,
		)
		.bind(tag)
		.fetch_one(&self.database)
		.await
	}

	async fn list_posts(&self, tag: Option<i64>, limit: i64, offset: i64) -> Result<Vec<Post>> {
		sqlx::query_as::<_, Post>(
			r#"
				SELECT * FROM post
				WHERE status = 'published' AND publish <= NOW()
					AND ($1::BIGINT IS NULL OR id IN (SELECT post_id FROM post_tag WHERE tag_id = $1))
				ORDER BY publish DESC, id DESC
				LIMIT $2 OFFSET $3
			"#,
		)
		.bind(tag)
		.bind(limit)
		.bind(offset)
		.fetch_all(&self.database)
		.await
	}

	async fn post_by_date(&self, date: NaiveDate, slug: &str) -> Result<Option<Post>> {
		sqlx::query_as::<_, Post>(
			r#"
				SELECT * FROM post
				WHERE status = 'published' AND publish <= NOW()
					AND slug = $1 AND (publish AT TIME ZONE 'UTC')::DATE = $2
			"#,
		)
		.bind(slug)
		.bind(date)
		.fetch_optional(&self.database)
		.await
	}

	async fn post_by_id(&self, id: i64) -> Result<Option<Post>> {
		sqlx::query_as::<_, Post>(
			r#"
				SELECT * FROM post
				WHERE status = 'published' AND publish <= NOW() AND id = $1
			"#,
		)
		.bind(id)
		.fetch_optional(&self.database)
		.await
	}

	async fn tags_of(&self, post_ids: &[i64]) -> Result<Vec<PostTag>> {
		sqlx::query_as::<_, PostTag>(
			r#"
				SELECT post_tag.post_id, tag.id, tag.name, tag.slug
				FROM tag JOIN post_tag ON post_tag.tag_id = tag.id
				WHERE post_tag.post_id = ANY($1)
				ORDER BY tag.name
			"#,
		)
		.bind(post_ids)
		.fetch_all(&self.database)
		.await
	}

	async fn active_comments(&self, post_id: i64) -> Result<Vec<Comment>> {
		sqlx::query_as::<_, Comment>(
			r#"
				SELECT * FROM comment
				WHERE post_id = $1 AND active
				ORDER BY created, id
			"#,
		)
		.bind(post_id)
		.fetch_all(&self.database)
		.await
	}

	async fn create_comment(&self, post_id: i64, input: CreateComment) -> Result<Comment> {
		sqlx::query_as::<_, Comment>(
			r#"
				INSERT INTO comment (post_id, name, email, body)
				VALUES ($1, $2, $3, $4)
				RETURNING *
			"#,
		)
		.bind(post_id)
		.bind(input.name)
		.bind(input.email)
		.bind(input.body)
		.fetch_one(&self.database)
		.await
	}

	async fn similar_posts(&self, post_id: i64, limit: i64) -> Result<Vec<Post>> {
		sqlx::query_as::<_, Post>(
			r#"
				SELECT post.*, COUNT(post_tag.tag_id) AS same_tags
				FROM post JOIN post_tag ON post_tag.post_id = post.id
				WHERE post.status = 'published' AND post.publish <= NOW()
					AND post.id <> $1
					AND post_tag.tag_id IN (SELECT tag_id FROM post_tag WHERE post_id = $1)
				GROUP BY post.id
				ORDER BY same_tags DESC, post.publish DESC, post.id DESC
				LIMIT $2
			"#,
		)
		.bind(post_id)
		.bind(limit)
		.fetch_all(&self.database)
		.await
	}

	async fn most_commented(&self, limit: i64) -> Result<Vec<CommentedPost>> {
		sqlx::query_as::<_, CommentedPost>(
			r#"
				SELECT post.*, COUNT(comment.id) AS total_comments
				FROM post LEFT JOIN comment ON comment.post_id = post.id
				WHERE post.status = 'published' AND post.publish <= NOW()
				GROUP BY post.id
				ORDER BY total_comments DESC, post.publish DESC, post.id DESC
				LIMIT $1
			"#,
		)
		.bind(limit)
		.fetch_all(&self.database)
		.await
	}

	async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
		sqlx::query_as::<_, SearchHit>(
			r#"
				SELECT * FROM (
					SELECT post.*, similarity(post.title, $1) AS similarity
					FROM post
					WHERE post.status = 'published' AND post.publish <= NOW()
				) AS ranked
				WHERE similarity > $2
				ORDER BY similarity DESC, publish DESC, id DESC
			"#,
		)
		.bind(query)
		.bind(SIMILARITY_THRESHOLD)
		.fetch_all(&self.database)
		.await
	}
}
