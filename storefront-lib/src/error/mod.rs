//! Error types

mod api;
mod classification;
mod config;
mod outcome;
mod validation;

pub use api::*;
pub use classification::*;
pub use config::*;
pub use outcome::*;
pub use validation::*;
