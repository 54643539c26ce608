//! Order-specific domain logic: creation rules, admin patches, and payment confirmation.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
