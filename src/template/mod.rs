pub mod filters;
pub mod tags;

use axum::response::Html;
use serde::Serialize;
use tera::{Context, Tera};

use crate::model::{Post, PostTag, Tag};

macro_rules! templates {
	($($name:literal),* $(,)?) => {
		&[$(($name, include_str!(concat!("../../templates/", $name)))),*]
	};
}

/// Every template, embedded into the binary.
const TEMPLATES: &[(&str, &str)] = templates![
	"base.html",
	"pagination.html",
	"blog/post/list.html",
	"blog/post/detail.html",
	"blog/post/share.html",
	"blog/post/comment.html",
	"blog/post/search.html",
	"blog/post/latest_posts.html",
	"blog/post/includes/comment_form.html",
];

/// The compiled template set, with the blog's filters registered.
pub struct Templates {
	tera: Tera,
}

impl Templates {
	pub fn new() -> Result<Self, tera::Error> {
		let mut tera = Tera::default();

		tera.add_raw_templates(TEMPLATES.iter().copied())?;
		tera.register_filter("markdown", filters::markdown);
		tera.register_filter("truncatewords_html", filters::truncatewords_html);

		Ok(Self { tera })
	}

	pub fn render(&self, name: &str, context: &Context) -> Result<Html<String>, tera::Error> {
		self.tera.render(name, context).map(Html)
	}
}

/// A post as seen by templates: the post itself, its URL and its tags.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
	#[serde(flatten)]
	pub post: Post,
	pub url: String,
	pub tags: Vec<Tag>,
}

impl PostView {
	pub fn new(post: Post) -> Self {
		Self {
			url: post.url(),
			post,
			tags: Vec::new(),
		}
	}

	/// Pairs every post with its tags, keeping the order of `posts`.
	pub fn with_tags(posts: Vec<Post>, tags: Vec<PostTag>) -> Vec<Self> {
		let mut views = posts.into_iter().map(Self::new).collect::<Vec<_>>();

		for PostTag { post_id, tag } in tags {
			if let Some(view) = views.iter_mut().find(|view| view.post.id == post_id) {
				view.tags.push(tag);
			}
		}

		views
	}
}
