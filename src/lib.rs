pub mod cli;
pub mod config;
pub mod error;
pub mod pseudonyms;
pub mod sanitize;
pub mod storage;

pub use config::Options;
pub use error::{GatewayError, Result};
pub use sanitize::Sanitizer;
