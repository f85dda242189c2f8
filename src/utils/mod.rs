/// TOML + environment configuration.
pub mod config;

pub use config::{ConfigError, JoigoConfig};
