//! Buyer profiles referenced by orders and the account view.

pub mod entity;
pub mod error;

pub use error::*;
