use std::{
	cmp::Ordering,
	collections::HashSet,
	sync::{Mutex, MutexGuard},
};

use chrono::{DateTime, NaiveDate, Utc};

use crate::model::{
	Comment, CommentedPost, CreateComment, Post, PostTag, SearchHit, Status, Tag,
};

use super::{Result, Store, SIMILARITY_THRESHOLD};

/// The trigrams of every word in `text`, padded the way `pg_trgm` pads them.
fn trigrams(text: &str) -> HashSet<[char; 3]> {
	text.split(|c: char| !c.is_alphanumeric())
		.filter(|word| !word.is_empty())
		.flat_map(|word| {
			let padded = format!("  {} ", word.to_lowercase()).chars().collect::<Vec<_>>();

			padded
				.windows(3)
				.map(|window| [window[0], window[1], window[2]])
				.collect::<Vec<_>>()
		})
		.collect()
}

/// Trigram similarity as computed by `pg_trgm`'s `similarity()`.
pub fn similarity(a: &str, b: &str) -> f32 {
	let a = trigrams(a);
	let b = trigrams(b);
	let union = a.union(&b).count();

	if union == 0 {
		return 0.0;
	}

	a.intersection(&b).count() as f32 / union as f32
}

fn newest_first(a: &Post, b: &Post) -> Ordering {
	b.publish.cmp(&a.publish).then(b.id.cmp(&a.id))
}

#[derive(Default)]
struct Inner {
	posts: Vec<Post>,
	tags: Vec<Tag>,
	post_tags: Vec<(i64, i64)>,
	comments: Vec<Comment>,
}

impl Inner {
	fn published(&self) -> Vec<&Post> {
		let now = Utc::now();
		let mut posts = self
			.posts
			.iter()
			.filter(|post| post.is_published(now))
			.collect::<Vec<_>>();

		posts.sort_by(|a, b| newest_first(a, b));
		posts
	}

	fn tag_ids(&self, post_id: i64) -> HashSet<i64> {
		self.post_tags
			.iter()
			.filter(|(post, _)| *post == post_id)
			.map(|(_, tag)| *tag)
			.collect()
	}

	fn tagged(&self, tag: Option<i64>) -> Vec<&Post> {
		self.published()
			.into_iter()
			.filter(|post| tag.map_or(true, |tag| self.post_tags.contains(&(post.id, tag))))
			.collect()
	}
}

/// In-memory [`Store`] for tests, with the same visibility and ordering rules
/// as [`super::PgStore`].
#[derive(Default)]
pub struct MemoryStore {
	inner: Mutex<Inner>,
}

impl MemoryStore {
	fn lock(&self) -> MutexGuard<'_, Inner> {
		self.inner.lock().unwrap()
	}

	pub fn add_post(&self, title: &str, status: Status, publish: DateTime<Utc>) -> Post {
		let mut inner = self.lock();
		let post = Post {
			id: inner.posts.len() as i64 + 1,
			title: title.into(),
			slug: title.to_lowercase().replace(' ', "-"),
			body: format!("The body of *{title}*."),
			status,
			publish,
			created: publish,
			updated: publish,
		};

		inner.posts.push(post.clone());
		post
	}

	pub fn set_body(&self, post_id: i64, body: &str) {
		let mut inner = self.lock();

		if let Some(post) = inner.posts.iter_mut().find(|post| post.id == post_id) {
			post.body = body.into();
		}
	}

	pub fn add_tag(&self, name: &str) -> Tag {
		let mut inner = self.lock();
		let tag = Tag {
			id: inner.tags.len() as i64 + 1,
			name: name.into(),
			slug: name.to_lowercase().replace(' ', "-"),
		};

		inner.tags.push(tag.clone());
		tag
	}

	pub fn tag_post(&self, post: &Post, tag: &Tag) {
		self.lock().post_tags.push((post.id, tag.id));
	}

	pub fn set_comment_active(&self, comment_id: i64, active: bool) {
		let mut inner = self.lock();

		if let Some(comment) = inner.comments.iter_mut().find(|c| c.id == comment_id) {
			comment.active = active;
		}
	}

	pub fn comments(&self) -> Vec<Comment> {
		self.lock().comments.clone()
	}
}

#[axum::async_trait]
impl Store for MemoryStore {
	async fn tag_by_slug(&self, slug: &str) -> Result<Option<Tag>> {
		Ok(self.lock().tags.iter().find(|tag| tag.slug == slug).cloned())
	}

	async fn count_posts(&self, tag: Option<i64>) -> Result<i64> {
		Ok(self.lock().tagged(tag).len() as i64)
	}

	async fn list_posts(&self, tag: Option<i64>, limit: i64, offset: i64) -> Result<Vec<Post>> {
		Ok(self
			.lock()
			.tagged(tag)
			.into_iter()
			.skip(usize::try_from(offset).unwrap_or(0))
			.take(usize::try_from(limit).unwrap_or(0))
			.cloned()
			.collect())
	}

	async fn post_by_date(&self, date: NaiveDate, slug: &str) -> Result<Option<Post>> {
		Ok(self
			.lock()
			.published()
			.into_iter()
			.find(|post| post.slug == slug && post.publish.date_naive() == date)
			.cloned())
	}

	async fn post_by_id(&self, id: i64) -> Result<Option<Post>> {
		Ok(self
			.lock()
			.published()
			.into_iter()
			.find(|post| post.id == id)
			.cloned())
	}

	async fn tags_of(&self, post_ids: &[i64]) -> Result<Vec<PostTag>> {
		let inner = self.lock();
		let mut tags = inner
			.post_tags
			.iter()
			.filter(|(post, _)| post_ids.contains(post))
			.filter_map(|(post, tag)| {
				let tag = inner.tags.iter().find(|t| t.id == *tag)?;

				Some(PostTag {
					post_id: *post,
					tag: tag.clone(),
				})
			})
			.collect::<Vec<_>>();

		tags.sort_by(|a, b| a.tag.name.cmp(&b.tag.name));
		Ok(tags)
	}

	async fn active_comments(&self, post_id: i64) -> Result<Vec<Comment>> {
		Ok(self
			.lock()
			.comments
			.iter()
			.filter(|comment| comment.post_id == post_id && comment.active)
			.cloned()
			.collect())
	}

	async fn create_comment(&self, post_id: i64, input: CreateComment) -> Result<Comment> {
		let mut inner = self.lock();
		let now = Utc::now();
		let comment = Comment {
			id: inner.comments.len() as i64 + 1,
			post_id,
			name: input.name,
			email: input.email,
			body: input.body,
			created: now,
			updated: now,
			active: true,
		};

		inner.comments.push(comment.clone());
		Ok(comment)
	}

	async fn similar_posts(&self, post_id: i64, limit: i64) -> Result<Vec<Post>> {
		let inner = self.lock();
		let tags = inner.tag_ids(post_id);

		let mut similar = inner
			.published()
			.into_iter()
			.filter(|post| post.id != post_id)
			.map(|post| (inner.tag_ids(post.id).intersection(&tags).count(), post))
			.filter(|(same_tags, _)| *same_tags > 0)
			.collect::<Vec<_>>();

		similar.sort_by(|(a_tags, a), (b_tags, b)| b_tags.cmp(a_tags).then(newest_first(a, b)));

		Ok(similar
			.into_iter()
			.take(usize::try_from(limit).unwrap_or(0))
			.map(|(_, post)| post.clone())
			.collect())
	}

	async fn most_commented(&self, limit: i64) -> Result<Vec<CommentedPost>> {
		let inner = self.lock();
		let mut posts = inner
			.published()
			.into_iter()
			.map(|post| CommentedPost {
				post: post.clone(),
				total_comments: inner
					.comments
					.iter()
					.filter(|comment| comment.post_id == post.id)
					.count() as i64,
			})
			.collect::<Vec<_>>();

		posts.sort_by(|a, b| {
			b.total_comments
				.cmp(&a.total_comments)
				.then(newest_first(&a.post, &b.post))
		});
		posts.truncate(usize::try_from(limit).unwrap_or(0));

		Ok(posts)
	}

	async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
		let mut hits = self
			.lock()
			.published()
			.into_iter()
			.map(|post| SearchHit {
				similarity: similarity(&post.title, query),
				post: post.clone(),
			})
			.filter(|hit| hit.similarity > SIMILARITY_THRESHOLD)
			.collect::<Vec<_>>();

		hits.sort_by(|a, b| {
			b.similarity
				.total_cmp(&a.similarity)
				.then(newest_first(&a.post, &b.post))
		});

		Ok(hits)
	}
}

#[cfg(test)]
mod test {
	use super::similarity;

	#[test]
	fn test_similarity_identical() {
		assert!((similarity("Hello world", "hello world") - 1.0).abs() < f32::EPSILON);
	}

	#[test]
	fn test_similarity_partial() {
		let score = similarity("Learning Rust", "rust");

		assert!(score > 0.1 && score < 1.0);
	}

	#[test]
	fn test_similarity_unrelated() {
		assert_eq!(similarity("Hello world", "xyz"), 0.0);
		assert_eq!(similarity("", ""), 0.0);
	}
}
