//! Retry with exponential backoff.

mod config;
mod handler;

pub use config::RetryConfig;
pub use handler::RetryError;
pub use handler::RetryHandler;
pub use handler::backoff_delay;
pub use handler::retry;
