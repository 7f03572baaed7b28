use axum::{extract::State, response::Html};
use chrono::NaiveDate;

use crate::{
	config::Site,
	extract::{Form, Path, Query},
	mail::Mail,
	model::{Post, Tag},
	template::{tags, PostView},
	AppState,
};

use super::{model, Error, RouteError, POSTS_PER_PAGE, SIMILAR_POSTS};

async fn find_post(state: &AppState, id: i64) -> Result<Post, RouteError> {
	state
		.store
		.post_by_id(id)
		.await?
		.ok_or_else(|| Error::UnknownPost(id.to_string()).into())
}

/// Attaches tags to a single post.
async fn post_view(state: &AppState, post: Post) -> Result<PostView, RouteError> {
	let tags = state.store.tags_of(&[post.id]).await?;
	let mut view = PostView::new(post);

	view.tags = tags.into_iter().map(|tag| tag.tag).collect();

	Ok(view)
}

async fn list(
	state: &AppState,
	tag: Option<Tag>,
	input: &model::PageInput,
) -> Result<Html<String>, RouteError> {
	let tag_id = tag.as_ref().map(|tag| tag.id);
	let paginator = model::Paginator::new(state.store.count_posts(tag_id).await?, POSTS_PER_PAGE);
	let number = paginator.number(input.page.as_deref());

	let posts = state
		.store
		.list_posts(tag_id, paginator.limit(), paginator.offset(number))
		.await?;
	let ids = posts.iter().map(|post| post.id).collect::<Vec<_>>();
	let tags = state.store.tags_of(&ids).await?;

	let mut context = tags::base_context(&*state.store, &state.site).await?;
	context.insert("posts", &paginator.page(number, PostView::with_tags(posts, tags)));
	context.insert("tag", &tag);

	Ok(state.templates.render("blog/post/list.html", &context)?)
}

/// Lists published posts, newest first, three per page.
pub async fn post_list(
	State(state): State<AppState>,
	Query(input): Query<model::PageInput>,
) -> Result<Html<String>, RouteError> {
	list(&state, None, &input).await
}

/// Lists published posts carrying a tag.
pub async fn post_list_by_tag(
	State(state): State<AppState>,
	Path(tag_slug): Path<String>,
	Query(input): Query<model::PageInput>,
) -> Result<Html<String>, RouteError> {
	let tag = state
		.store
		.tag_by_slug(&tag_slug)
		.await?
		.ok_or(Error::UnknownTag(tag_slug))?;

	list(&state, Some(tag), &input).await
}

/// Shows a single post with its active comments, a comment form
/// and posts sharing its tags.
pub async fn post_detail(
	State(state): State<AppState>,
	Path((year, month, day, slug)): Path<(i32, u32, u32, String)>,
) -> Result<Html<String>, RouteError> {
	let unknown = || Error::UnknownPost(format!("{year}/{month}/{day}/{slug}"));

	let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(unknown)?;
	let post = state
		.store
		.post_by_date(date, &slug)
		.await?
		.ok_or_else(unknown)?;

	let comments = state.store.active_comments(post.id).await?;
	let similar_posts = state.store.similar_posts(post.id, SIMILAR_POSTS).await?;
	let post = post_view(&state, post).await?;

	let mut context = tags::base_context(&*state.store, &state.site).await?;
	context.insert("post", &post);
	context.insert("comments", &comments);
	context.insert("form", &Form::unbound(model::CommentForm::default()));
	context.insert(
		"similar_posts",
		&similar_posts
			.into_iter()
			.map(PostView::new)
			.collect::<Vec<_>>(),
	);

	Ok(state.templates.render("blog/post/detail.html", &context)?)
}

fn share_mail(site: &Site, post: &Post, form: &model::EmailPostForm) -> Mail {
	let url = site.absolute(&post.url());

	Mail {
		from_name: form.name.clone(),
		reply_to: form.email.clone(),
		to: form.to.clone(),
		subject: format!("{} recommends you read {}", form.name, post.title),
		body: format!(
			"Read {} at {}\n\n{}'s comments: {}",
			post.title, url, form.name, form.comments
		),
	}
}

async fn render_share(
	state: &AppState,
	post: Post,
	form: &Form<model::EmailPostForm>,
	sent: bool,
) -> Result<Html<String>, RouteError> {
	let mut context = tags::base_context(&*state.store, &state.site).await?;
	context.insert("post", &PostView::new(post));
	context.insert("form", form);
	context.insert("sent", &sent);

	Ok(state.templates.render("blog/post/share.html", &context)?)
}

/// Shows the form used to recommend a post by email.
pub async fn share_form(
	State(state): State<AppState>,
	Path(id): Path<i64>,
) -> Result<Html<String>, RouteError> {
	let post = find_post(&state, id).await?;

	render_share(
		&state,
		post,
		&Form::unbound(model::EmailPostForm::default()),
		false,
	)
	.await
}

/// Recommends a post by email. An invalid form is shown again with
/// its errors and nothing is sent.
pub async fn share(
	State(state): State<AppState>,
	Path(id): Path<i64>,
	form: Form<model::EmailPostForm>,
) -> Result<Html<String>, RouteError> {
	let post = find_post(&state, id).await?;
	let sent = form.is_valid();

	if sent {
		state
			.mailer
			.send(share_mail(&state.site, &post, &form.data))
			.await?;

		tracing::info!(post = post.id, to = %form.data.to, "post shared");
	}

	render_share(&state, post, &form, sent).await
}

/// Adds a comment to a post. An invalid form is shown again with
/// its errors and nothing is stored.
pub async fn comment(
	State(state): State<AppState>,
	Path(id): Path<i64>,
	form: Form<model::CommentForm>,
) -> Result<Html<String>, RouteError> {
	let post = find_post(&state, id).await?;

	let comment = if form.is_valid() {
		let comment = state
			.store
			.create_comment(post.id, form.data.clone())
			.await?;

		tracing::info!(post = post.id, comment = comment.id, "comment created");

		Some(comment)
	} else {
		None
	};

	let mut context = tags::base_context(&*state.store, &state.site).await?;
	context.insert("post", &PostView::new(post));
	context.insert("form", &form);
	context.insert("comment", &comment);

	Ok(state.templates.render("blog/post/comment.html", &context)?)
}

/// Searches published post titles by trigram similarity.
pub async fn search(
	State(state): State<AppState>,
	Query(input): Query<model::SearchInput>,
) -> Result<Html<String>, RouteError> {
	let (form, query, results) = match input.query {
		None => (Form::unbound(model::SearchForm::default()), None, Vec::new()),
		Some(query) => {
			let form = Form::bound(model::SearchForm { query });

			if form.is_valid() {
				let query = form.data.query.trim().to_string();
				let results = state
					.store
					.search(&query)
					.await?
					.into_iter()
					.map(|hit| PostView::new(hit.post))
					.collect::<Vec<_>>();

				(form, Some(query), results)
			} else {
				(form, None, Vec::new())
			}
		}
	};

	let mut context = tags::base_context(&*state.store, &state.site).await?;
	context.insert("form", &form);
	context.insert("query", &query);
	context.insert("results", &results);

	Ok(state.templates.render("blog/post/search.html", &context)?)
}
