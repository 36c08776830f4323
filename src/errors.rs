// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::filter::FilterFormatError;
use crate::settings::SettingsError;

#[derive(Error, Debug)]
pub enum TestorchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Filter error: {0}")]
    Filter(#[from] FilterFormatError),

    #[error("Run settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TestorchError>;
