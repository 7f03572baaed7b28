use std::{env, num::ParseIntError};

use serde::Serialize;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{0} must be set")]
	Missing(&'static str),
	#[error("{name} must be a number: {source}")]
	NotANumber {
		name: &'static str,
		source: ParseIntError,
	},
}

/// Public facing information about the site, used to build absolute
/// URLs for the feed, sitemap and shared emails.
#[derive(Debug, Clone, Serialize)]
pub struct Site {
	/// The base URL without a trailing slash, e.g. `https://example.com`.
	pub url: String,
	pub name: String,
	pub description: String,
}

impl Site {
	/// Joins a path (starting with `/`) onto the site URL.
	pub fn absolute(&self, path: &str) -> String {
		format!("{}{}", self.url, path)
	}
}

#[derive(Debug, Clone)]
pub struct Smtp {
	pub host: String,
	pub port: u16,
	pub credentials: Option<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct Config {
	pub database_url: String,
	pub port: u16,
	pub site: Site,
	/// Address used in the `From` header of outgoing mail.
	pub mail_from: String,
	/// When unset, outgoing mail is only logged.
	pub smtp: Option<Smtp>,
	pub log_level: String,
	pub otlp_endpoint: Option<String>,
}

fn var(name: &'static str) -> Option<String> {
	env::var(name).ok().filter(|value| !value.is_empty())
}

/// Parses the value of the port variable `name`, falling back to `default` when unset.
fn parse_port(name: &'static str, value: Option<String>, default: u16) -> Result<u16, Error> {
	value.map_or(Ok(default), |value| {
		value
			.parse()
			.map_err(|source| Error::NotANumber { name, source })
	})
}

impl Config {
	/// Reads the configuration from the environment. Call
	/// [`dotenvy::dotenv`] first to pick up a `.env` file.
	pub fn from_env() -> Result<Self, Error> {
		let port = parse_port("PORT", var("PORT"), DEFAULT_PORT)?;

		let smtp = match var("SMTP_HOST") {
			Some(host) => Some(Smtp {
				host,
				port: parse_port("SMTP_PORT", var("SMTP_PORT"), DEFAULT_SMTP_PORT)?,
				credentials: var("SMTP_USERNAME").zip(var("SMTP_PASSWORD")),
			}),
			None => None,
		};

		Ok(Self {
			database_url: var("DATABASE_URL").ok_or(Error::Missing("DATABASE_URL"))?,
			port,
			site: Site {
				url: var("SITE_URL")
					.map(|url| url.trim_end_matches('/').to_string())
					.unwrap_or_else(|| format!("http://localhost:{port}")),
				name: var("SITE_NAME").unwrap_or_else(|| "My blog".into()),
				description: var("SITE_DESCRIPTION")
					.unwrap_or_else(|| "New posts of my blog.".into()),
			},
			mail_from: var("MAIL_FROM").unwrap_or_else(|| "noreply@example.com".into()),
			smtp,
			log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".into()),
			otlp_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT"),
		})
	}
}

#[cfg(test)]
mod test {
	use super::{parse_port, Error, Site, DEFAULT_SMTP_PORT};

	#[test]
	fn test_site_absolute() {
		let site = Site {
			url: "https://example.com".into(),
			name: "My blog".into(),
			description: String::new(),
		};

		assert_eq!(
			site.absolute("/2024/1/5/hello"),
			"https://example.com/2024/1/5/hello"
		);
	}

	#[test]
	fn test_parse_port() {
		assert_eq!(
			parse_port("SMTP_PORT", None, DEFAULT_SMTP_PORT).unwrap(),
			DEFAULT_SMTP_PORT
		);
		assert_eq!(
			parse_port("SMTP_PORT", Some("2525".into()), DEFAULT_SMTP_PORT).unwrap(),
			2525
		);
		assert!(matches!(
			parse_port("PORT", Some("http".into()), 3000),
			Err(Error::NotANumber { name: "PORT", .. })
		));
	}
}
