use common::ErrorLocation;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config Missing Error: {name} is not set {location}")]
    Missing {
        location: ErrorLocation,
        name: &'static str,
    },

    #[error("Config Invalid Error: {name}: {reason} {location}")]
    Invalid {
        location: ErrorLocation,
        name: &'static str,
        reason: String,
    },

    #[error("Config DotEnv Error: {reason} {location}")]
    DotEnv {
        location: ErrorLocation,
        reason: String,
    },
}
