//! Checkout and order reconciliation service for a bilingual storefront.
//!
//! Orders and profiles live in single-owner actors (see [`actor_framework`]);
//! the HTTP surface in [`http`] drives them through typed clients.

pub mod actor_framework;
pub mod app_system;
pub mod cart;
pub mod catalog;
pub mod clients;
pub mod config;
pub mod domain;
pub mod geo;
pub mod http;
pub mod notifications;
pub mod order_actor;
pub mod payments;
pub mod profile_actor;
pub mod validation;

#[cfg(test)]
mod fakes;
#[cfg(test)]
mod mock_framework;
