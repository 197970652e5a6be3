//! Storefront client core
//!
//! Declarative form validation plus classification, retry and dispatch of failed
//! API calls for the storefront client.

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod retry;
pub mod transport;
pub mod validation;

mod client;

pub use client::*;
