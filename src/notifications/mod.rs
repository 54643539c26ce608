//! Transactional email: the order confirmation and the providers that send it.

mod resend;
mod templates;

pub use resend::{LogMailer, ResendMailer};
pub use templates::order_confirmation;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailError {
    #[error("Email request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Email provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("No recipient address")]
    MissingRecipient,

    #[error("Email template failed to render: {0}")]
    Render(#[from] askama::Error),
}

/// A rendered message ready to hand to a provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}
