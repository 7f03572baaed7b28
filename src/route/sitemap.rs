use axum::{
	extract::State,
	http::header,
	response::IntoResponse,
	routing::get,
	Router,
};
use serde::Serialize;

use crate::{config::Site, error::AppError, model::Post, AppState};

pub const XMLNS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
pub const CHANGE_FREQUENCY: &str = "weekly";
pub const PRIORITY: &str = "0.9";

pub fn routes() -> Router<AppState> {
	Router::new().route("/sitemap.xml", get(sitemap))
}

#[derive(Serialize)]
#[serde(rename = "urlset")]
struct UrlSet {
	#[serde(rename = "@xmlns")]
	xmlns: &'static str,
	#[serde(rename = "url")]
	urls: Vec<Url>,
}

#[derive(Serialize)]
struct Url {
	loc: String,
	lastmod: String,
	changefreq: &'static str,
	priority: &'static str,
}

/// Renders a sitemap document listing every post.
pub fn render(site: &Site, posts: &[Post]) -> Result<String, quick_xml::DeError> {
	let urls = posts
		.iter()
		.map(|post| Url {
			loc: site.absolute(&post.url()),
			lastmod: post.updated.format("%Y-%m-%d").to_string(),
			changefreq: CHANGE_FREQUENCY,
			priority: PRIORITY,
		})
		.collect();

	let xml = quick_xml::se::to_string(&UrlSet { xmlns: XMLNS, urls })?;

	Ok(format!(r#"<?xml version="1.0" encoding="UTF-8"?>{xml}"#))
}

/// Every published post, for crawlers.
pub async fn sitemap(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
	let count = state.store.count_posts(None).await?;
	let posts = state.store.list_posts(None, count, 0).await?;

	Ok((
		[(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
		render(&state.site, &posts)?,
	))
}

#[cfg(test)]
mod test {
	use super::render;
	use crate::test::*;

	#[tokio::test]
	async fn test_sitemap_lists_published_posts() {
		let app = app();
		let post = app.store.add_post("Hello", Status::Published, days_ago(2));

		app.store.add_post("Draft", Status::Draft, days_ago(1));

		let response = app.get("/sitemap.xml").await;
		let xml = response.text();

		assert_eq!(response.status_code(), StatusCode::OK);
		assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
		assert!(xml.contains(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#));
		assert_eq!(xml.matches("<url>").count(), 1);
		assert!(xml.contains(&format!(
			"<loc>http://localhost:3000{}</loc>",
			post.url()
		)));
		assert!(xml.contains(&format!(
			"<lastmod>{}</lastmod>",
			post.updated.format("%Y-%m-%d")
		)));
		assert!(xml.contains("<changefreq>weekly</changefreq>"));
		assert!(xml.contains("<priority>0.9</priority>"));
	}

	#[test]
	fn test_render_empty() {
		let xml = render(&site(), &[]).unwrap();

		assert!(xml.contains("urlset"));
		assert!(!xml.contains("<url>"));
	}
}
