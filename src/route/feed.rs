use axum::{
	extract::State,
	http::header,
	response::IntoResponse,
	routing::get,
	Router,
};
use rss::{Channel, Guid, Item};

use crate::{
	config::Site,
	error::AppError,
	model::Post,
	template::filters::{markdown_to_html, truncate_words_html},
	AppState,
};

/// Number of posts in the feed.
pub const FEED_ITEMS: i64 = 5;
/// Item descriptions are cut after this many words.
pub const DESCRIPTION_WORDS: usize = 30;

pub fn routes() -> Router<AppState> {
	Router::new().route("/feed", get(latest_posts))
}

fn item(site: &Site, post: &Post) -> Item {
	let link = site.absolute(&post.url());
	let mut item = Item::default();

	item.set_title(post.title.clone());
	item.set_link(link.clone());
	item.set_guid(Guid {
		value: link,
		permalink: true,
	});
	item.set_description(truncate_words_html(
		&markdown_to_html(&post.body),
		DESCRIPTION_WORDS,
	));
	item.set_pub_date(post.publish.to_rfc2822());

	item
}

/// Builds an RSS channel from posts, keeping their order.
pub fn channel(site: &Site, posts: &[Post]) -> Channel {
	let mut channel = Channel::default();

	channel.set_title(site.name.clone());
	channel.set_link(site.absolute("/"));
	channel.set_description(site.description.clone());
	channel.set_items(posts.iter().map(|post| item(site, post)).collect::<Vec<_>>());

	channel
}

/// The most recently published posts as an RSS 2.0 feed.
pub async fn latest_posts(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
	let posts = state.store.list_posts(None, FEED_ITEMS, 0).await?;

	Ok((
		[(header::CONTENT_TYPE, "application/rss+xml; charset=utf-8")],
		channel(&state.site, &posts).to_string(),
	))
}

#[cfg(test)]
mod test {
	use rss::Channel;

	use crate::test::*;

	#[tokio::test]
	async fn test_feed_latest_posts() {
		let app = app();

		for day in (1..=7).rev() {
			app.store
				.add_post(&format!("Post {day}"), Status::Published, days_ago(day));
		}

		app.store.add_post("Draft", Status::Draft, days_ago(0));

		let response = app.get("/feed").await;

		assert_eq!(response.status_code(), StatusCode::OK);
		assert!(response
			.header("content-type")
			.to_str()
			.unwrap()
			.starts_with("application/rss+xml"));

		let channel = Channel::read_from(response.text().as_bytes()).unwrap();
		let titles = channel
			.items()
			.iter()
			.filter_map(|item| item.title())
			.collect::<Vec<_>>();

		assert_eq!(channel.title(), "My blog");
		assert_eq!(channel.link(), "http://localhost:3000/");
		assert_eq!(channel.description(), "New posts of my blog.");
		assert_eq!(titles, ["Post 1", "Post 2", "Post 3", "Post 4", "Post 5"]);
	}

	#[tokio::test]
	async fn test_feed_item_fields() {
		let app = app();
		let post = app.store.add_post("Hello", Status::Published, days_ago(1));
		let words = (1..=40)
			.map(|n| format!("word{n}"))
			.collect::<Vec<_>>()
			.join(" ");

		app.store.set_body(post.id, &words);

		let channel = Channel::read_from(app.get("/feed").await.text().as_bytes()).unwrap();
		let item = &channel.items()[0];
		let link = format!("http://localhost:3000{}", post.url());
		let description = item.description().unwrap();

		assert_eq!(item.link(), Some(link.as_str()));
		assert_eq!(item.guid().map(rss::Guid::value), Some(link.as_str()));
		assert_eq!(item.pub_date(), Some(post.publish.to_rfc2822().as_str()));
		assert!(description.contains("word30 …"));
		assert!(!description.contains("word31"));
	}
}
