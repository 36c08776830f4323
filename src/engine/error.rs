// src/engine/error.rs

//! Failure kinds reported by the execution engine.

use std::fmt;

use thiserror::Error;

use crate::settings::SettingsError;

pub type EngineResult<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Engine-level operational failure.
    Platform,
    /// Run settings invalid or unsupported.
    Settings,
    /// Engine invoked in a state it does not support.
    InvalidOperation,
    NotImplemented,
    Unknown,
}

impl ErrorKind {
    /// Kinds the orchestrator absorbs into a `false` outcome. Everything
    /// else is a defect and propagates.
    pub fn is_recoverable(self) -> bool {
        matches!(
            self,
            ErrorKind::Platform | ErrorKind::Settings | ErrorKind::InvalidOperation
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Platform => "platform error",
            ErrorKind::Settings => "settings error",
            ErrorKind::InvalidOperation => "invalid operation",
            ErrorKind::NotImplemented => "not implemented",
            ErrorKind::Unknown => "unknown error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct EngineError {
    kind: ErrorKind,
    message: String,
}

impl EngineError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn platform(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Platform, message)
    }

    pub fn settings(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Settings, message)
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidOperation, message)
    }

    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotImplemented, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<SettingsError> for EngineError {
    fn from(e: SettingsError) -> Self {
        EngineError::settings(e.to_string())
    }
}
