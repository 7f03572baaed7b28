//! Data shared by every page: the sidebar helpers and site information.

use serde::Serialize;
use tera::Context;

use crate::{config::Site, model::CommentedPost, store::Store};

use super::PostView;

/// Number of posts shown in each sidebar section.
pub const SIDEBAR_COUNT: i64 = 3;

/// The number of published posts.
pub async fn total_posts(store: &dyn Store) -> sqlx::Result<i64> {
	store.count_posts(None).await
}

/// The `count` most recently published posts.
pub async fn show_latest_posts(store: &dyn Store, count: i64) -> sqlx::Result<Vec<PostView>> {
	let posts = store.list_posts(None, count, 0).await?;

	Ok(posts.into_iter().map(PostView::new).collect())
}

#[derive(Debug, Serialize)]
pub struct CommentedPostView {
	#[serde(flatten)]
	pub post: PostView,
	pub total_comments: i64,
}

/// The `count` posts with the most comments, counting inactive ones.
pub async fn most_commented_posts(
	store: &dyn Store,
	count: i64,
) -> sqlx::Result<Vec<CommentedPostView>> {
	let posts = store.most_commented(count).await?;

	Ok(posts
		.into_iter()
		.map(|commented: CommentedPost| CommentedPostView {
			post: PostView::new(commented.post),
			total_comments: commented.total_comments,
		})
		.collect())
}

/// Builds the context every page starts from: `site`, `total_posts`,
/// `latest_posts` and `most_commented_posts`.
pub async fn base_context(store: &dyn Store, site: &Site) -> sqlx::Result<Context> {
	let mut context = Context::new();

	context.insert("site", site);
	context.insert("total_posts", &total_posts(store).await?);
	context.insert(
		"latest_posts",
		&show_latest_posts(store, SIDEBAR_COUNT).await?,
	);
	context.insert(
		"most_commented_posts",
		&most_commented_posts(store, SIDEBAR_COUNT).await?,
	);

	Ok(context)
}

#[cfg(test)]
mod test {
	use super::{base_context, most_commented_posts, SIDEBAR_COUNT};
	use crate::{
		model::{CreateComment, Post},
		store::Store,
		test::*,
	};

	async fn comment(store: &MemoryStore, post: &Post, times: usize) {
		for _ in 0..times {
			store
				.create_comment(
					post.id,
					CreateComment {
						name: "John".into(),
						email: "john@smith.com".into(),
						body: "Nice".into(),
					},
				)
				.await
				.unwrap();
		}
	}

	#[tokio::test]
	async fn test_most_commented_posts() {
		let store = MemoryStore::default();

		store.add_post("Old", Status::Published, days_ago(4));
		let popular = store.add_post("Popular", Status::Published, days_ago(3));
		let some = store.add_post("Some", Status::Published, days_ago(2));
		store.add_post("Quiet", Status::Published, days_ago(1));
		let draft = store.add_post("Draft", Status::Draft, days_ago(1));

		comment(&store, &popular, 3).await;
		comment(&store, &some, 1).await;
		comment(&store, &draft, 5).await;

		// inactive comments still count
		store.set_comment_active(1, false);

		let posts = most_commented_posts(&store, SIDEBAR_COUNT).await.unwrap();
		let summary = posts
			.iter()
			.map(|post| (post.post.post.title.as_str(), post.total_comments))
			.collect::<Vec<_>>();

		assert_eq!(summary, [("Popular", 3), ("Some", 1), ("Quiet", 0)]);
	}

	#[tokio::test]
	async fn test_base_context() {
		let store = MemoryStore::default();

		for day in 1..=5 {
			store.add_post(&format!("Post {day}"), Status::Published, days_ago(day));
		}

		let context = base_context(&store, &site()).await.unwrap().into_json();

		assert_eq!(context["site"]["name"], "My blog");
		assert_eq!(context["total_posts"], 5);
		assert_eq!(context["latest_posts"].as_array().unwrap().len(), 3);
		assert_eq!(context["latest_posts"][0]["title"], "Post 1");
		assert_eq!(context["most_commented_posts"].as_array().unwrap().len(), 3);
	}
}
