#![warn(clippy::pedantic)]

mod config;
mod error;
mod extract;
mod mail;
mod model;
mod ratelimit;
mod route;
mod store;
mod template;
mod trace;


use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{body::Body, http::Response, Router};
use tower_governor::GovernorLayer;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing::Span;

use crate::{
	config::{Config, Site},
	mail::{LogMailer, Mailer, SmtpMailer},
	store::{PgStore, Store},
	template::Templates,
};

pub type AppState = State;

/// The shared application state.
///
/// The store and mailer are trait objects so the routes can be exercised
/// without a database or an SMTP server.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub store: Arc<dyn Store>,
	pub mailer: Arc<dyn Mailer>,
	pub templates: Arc<Templates>,
	pub site: Arc<Site>,
}

/// Records the request latency as a histogram picked up by the metrics layer.
#[allow(clippy::cast_possible_truncation)]
fn record_latency(response: &Response<Body>, latency: Duration, _span: &Span) {
	tracing::info!(
		histogram.latency_ms = latency.as_millis() as u64,
		status = response.status().as_u16(),
		"finished processing request"
	);
}

/// Every route of the blog, without rate limiting.
pub fn router(state: State) -> Router {
	Router::new()
		.merge(route::post::routes())
		.merge(route::feed::routes())
		.merge(route::sitemap::routes())
		.layer(TraceLayer::new_for_http().on_response(record_latency))
		.layer(CompressionLayer::new())
		.with_state(state)
}

#[tokio::main]
async fn main() {
	dotenvy::dotenv().ok();

	let config = Config::from_env().expect("invalid configuration");
	let _guard = trace::init_tracing_subscriber(&config);

	let store = PgStore::connect(&config.database_url)
		.await
		.expect("failed to connect to database");

	let mailer: Arc<dyn Mailer> = match &config.smtp {
		Some(smtp) => Arc::new(
			SmtpMailer::new(smtp, &config.mail_from).expect("failed to configure smtp transport"),
		),
		None => {
			tracing::warn!("SMTP_HOST is not set, outgoing mail will only be logged");

			Arc::new(LogMailer::new(&config.mail_from).expect("MAIL_FROM must be an email address"))
		}
	};

	let state = State {
		store: Arc::new(store),
		mailer,
		templates: Arc::new(Templates::new().expect("failed to compile templates")),
		site: Arc::new(config.site.clone()),
	};

	let governor = ratelimit::per_ip();
	ratelimit::cleanup_old_limits(&[&governor]);

	let app = router(state).layer(GovernorLayer { config: governor });

	let listener = tokio::net::TcpListener::bind(("127.0.0.1", config.port))
		.await
		.expect("failed to bind to port");

	tracing::info!("listening on port {}", config.port);

	axum::serve(
		listener,
		app.into_make_service_with_connect_info::<SocketAddr>(),
	)
	.await
	.expect("server error");
}
