//! Error types and handling for the `ClimateWise` backend

use thiserror::Error;

/// Main error type for the `ClimateWise` backend
#[derive(Error, Debug)]
pub enum ClimateError {
    /// Network, DNS or timeout failure while calling a provider
    #[error("{provider} request failed: {message}")]
    UpstreamTransport { provider: String, message: String },

    /// Provider answered with a non-success HTTP status
    #[error("{provider} responded with status {status}")]
    UpstreamStatus { provider: String, status: u16 },

    /// Provider answered successfully but the expected data is missing
    #[error("{provider} returned unexpected data: {message}")]
    UpstreamShape { provider: String, message: String },

    /// Caller-supplied input failed a required-field check
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Model output is not the requested JSON after fence stripping
    #[error("Model output could not be parsed: {message}")]
    ModelParse { message: String },

    /// Configuration or credential problems
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ClimateError {
    /// Create a new transport error
    pub fn transport<P: Into<String>, S: ToString>(provider: P, source: S) -> Self {
        Self::UpstreamTransport {
            provider: provider.into(),
            message: source.to_string(),
        }
    }

    /// Create a new status error
    pub fn status<P: Into<String>>(provider: P, status: u16) -> Self {
        Self::UpstreamStatus {
            provider: provider.into(),
            status,
        }
    }

    /// Create a new shape error
    pub fn shape<P: Into<String>, S: Into<String>>(provider: P, message: S) -> Self {
        Self::UpstreamShape {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new model parse error
    pub fn model_parse<S: ToString>(source: S) -> Self {
        Self::ModelParse {
            message: source.to_string(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// HTTP status code this error surfaces as
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            ClimateError::Validation { .. } => 400,
            _ => 500,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ClimateError::UpstreamTransport { .. }
            | ClimateError::UpstreamStatus { .. }
            | ClimateError::UpstreamShape { .. } => {
                "Unable to reach an external service. Please try again later.".to_string()
            }
            ClimateError::Validation { message } => message.clone(),
            ClimateError::ModelParse { .. } => "Invalid AI response format".to_string(),
            ClimateError::Config { .. } => {
                "Server configuration error. Please check the API credentials.".to_string()
            }
        }
    }
}
