use lettre::{
	message::{header::ContentType, Mailbox},
	transport::smtp::authentication::Credentials,
	Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::Smtp;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid address: {0}")]
	Address(#[from] lettre::address::AddressError),
	#[error("invalid message: {0}")]
	Message(#[from] lettre::error::Error),
	#[error("smtp error: {0}")]
	Smtp(#[from] lettre::transport::smtp::Error),
}

/// An outgoing plain text email.
///
/// The sender address is owned by the [`Mailer`]; `from_name` is only the
/// display name shown next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
	pub from_name: String,
	pub reply_to: String,
	pub to: String,
	pub subject: String,
	pub body: String,
}

#[axum::async_trait]
pub trait Mailer: Send + Sync {
	async fn send(&self, mail: Mail) -> Result<(), Error>;
}

fn build_message(from: &Address, mail: &Mail) -> Result<Message, Error> {
	Ok(Message::builder()
		.from(Mailbox::new(Some(mail.from_name.clone()), from.clone()))
		.reply_to(mail.reply_to.parse()?)
		.to(mail.to.parse()?)
		.subject(mail.subject.as_str())
		.header(ContentType::TEXT_PLAIN)
		.body(mail.body.clone())?)
}

/// Delivers mail through an SMTP relay using STARTTLS.
pub struct SmtpMailer {
	transport: AsyncSmtpTransport<Tokio1Executor>,
	from: Address,
}

impl SmtpMailer {
	pub fn new(smtp: &Smtp, from: &str) -> Result<Self, Error> {
		let mut builder =
			AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)?.port(smtp.port);

		if let Some((username, password)) = &smtp.credentials {
			builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
		}

		Ok(Self {
			transport: builder.build(),
			from: from.parse()?,
		})
	}
}

#[axum::async_trait]
impl Mailer for SmtpMailer {
	async fn send(&self, mail: Mail) -> Result<(), Error> {
		let message = build_message(&self.from, &mail)?;

		self.transport.send(message).await?;
		tracing::debug!(to = %mail.to, "mail delivered");

		Ok(())
	}
}

/// Logs mail instead of sending it. Used when no SMTP host is configured.
pub struct LogMailer {
	from: Address,
}

impl LogMailer {
	pub fn new(from: &str) -> Result<Self, Error> {
		Ok(Self { from: from.parse()? })
	}
}

#[axum::async_trait]
impl Mailer for LogMailer {
	async fn send(&self, mail: Mail) -> Result<(), Error> {
		let message = build_message(&self.from, &mail)?;

		tracing::info!(
			to = %mail.to,
			subject = %mail.subject,
			"{}",
			String::from_utf8_lossy(&message.formatted())
		);

		Ok(())
	}
}
