//! Payment bridge: hosted checkout initialization and webhook reconciliation.

mod error;
pub mod paystack;
mod service;
pub mod signature;
pub mod webhook;

pub use error::PaymentError;
pub use paystack::{PaymentGateway, PaystackGateway};
pub use service::{PaymentInitRequest, PaymentInitResponse, PaymentService, PaymentSettings, WebhookOutcome};

#[cfg(test)]
mod tests;
