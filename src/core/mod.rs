mod config;
pub mod error;

pub use config::{Config, ServiceOptions, API_KEY_VAR};
pub use error::LLMError;
