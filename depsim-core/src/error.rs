//! Error type shared by every part of the simulation core.

use thiserror::Error;

/// Everything that can go wrong inside the simulation core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DepError {
    /// A field source was assembled from charges that break its invariants
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// A value passed to an operation is outside its accepted domain
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("cannot take the unit vector of a zero-length vector")]
    ZeroLengthVector,

    #[error("{operation} is not supported")]
    Unsupported { operation: &'static str },

    /// A physics step produced a position that is not a number
    #[error("particle {index} reached a non-finite position during a step")]
    NonFinitePosition { index: usize },

    #[error("stepper panicked: {message}")]
    StepperPanicked { message: String },
}

impl DepError {
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DepError>;
