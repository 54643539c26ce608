use thiserror::Error;

use crate::order_actor::OrderError;
use crate::profile_actor::ProfileError;
use crate::validation::FieldError;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Payment provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Payment provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Invalid webhook signature")]
    InvalidSignature,

    #[error("Malformed webhook payload: {0}")]
    MalformedPayload(String),

    #[error("Order store error: {0}")]
    Order(#[from] OrderError),

    #[error("Profile store error: {0}")]
    Profile(#[from] ProfileError),
}
