//! # ymdeck Config
//!
//! Optional TOML configuration for the ymdeck plugin. Every section has
//! defaults, so a missing file behaves like an empty one.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_CONFIG_FILE};
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
