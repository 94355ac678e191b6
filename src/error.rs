// Error types module

use std::path::PathBuf;
use thiserror::Error;

/// Errors escalated to the caller of the pipeline.
///
/// Only a base image that cannot be probed or decoded is fatal; an
/// unreadable file surfaces as a decode failure too. Optional
/// stages (watermark, transcode, re-save) degrade and log instead of
/// surfacing here.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The base image header or pixel data could not be decoded
    #[error("Failed to decode image '{path}': {message}")]
    Decode { path: PathBuf, message: String },
}

impl PipelineError {
    pub fn decode(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Environment variable '{0}' is referenced but not set")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
