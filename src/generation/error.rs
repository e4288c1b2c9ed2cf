//! Error taxonomy for the generation pipeline

use thiserror::Error;

/// Broad class of a generation failure, used by consumers to pick a recovery path
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Missing file or invalid option - send the user back to the upload step
    Input,
    /// The uploaded file could not be read
    Extraction,
    /// Network failure or unexpected gateway status
    Transport,
    /// The service answered with an explicit error message
    Application,
    /// The service answered with something that is not a deck
    Schema,
}

/// Flavor of an application-level error reported by the generation service
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationErrorKind {
    /// HTTP 429
    RateLimited,
    /// HTTP 402
    PaymentRequired,
    Other,
}

impl ApplicationErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            429 => Self::RateLimited,
            402 => Self::PaymentRequired,
            _ => Self::Other,
        }
    }
}

/// Errors surfaced by the generation pipeline
///
/// Messages are kept as strings so a failed run can be stored and shown again.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    #[error("No file provided")]
    MissingFile,

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Failed to read file: {0}")]
    FileRead(String),

    #[error("{0}")]
    Transport(String),

    #[error("AI gateway error: {status}")]
    Gateway { status: u16 },

    #[error("{message}")]
    Application {
        message: String,
        kind: ApplicationErrorKind,
    },

    #[error("Invalid response from generation service: {0}")]
    InvalidResponse(String),

    /// The caller stopped waiting before the run finished
    #[error("Generation was interrupted before it finished")]
    Interrupted,
}

impl GenerationError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::MissingFile | Self::InvalidOption(_) => ErrorClass::Input,
            Self::FileRead(_) => ErrorClass::Extraction,
            Self::Transport(_) | Self::Gateway { .. } | Self::Interrupted => ErrorClass::Transport,
            Self::Application { .. } => ErrorClass::Application,
            Self::InvalidResponse(_) => ErrorClass::Schema,
        }
    }

    /// Application error carrying the service's message verbatim
    pub fn application(message: impl Into<String>, status: u16) -> Self {
        Self::Application {
            message: message.into(),
            kind: ApplicationErrorKind::from_status(status),
        }
    }
}
