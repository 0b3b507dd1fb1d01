/*!
 * Error types for the autovoice application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when calling the external collaborators
/// (translation LLM and synthesis backend)
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors that can occur during script parsing or rewriting
#[derive(Error, Debug)]
pub enum ScriptError {
    /// Error reading or writing the script file
    #[error("Script file error: {0}")]
    Io(String),

    /// A statement expected during rewrite was not found in the file
    #[error("Statement not found in script: {character}: {text}")]
    StatementNotFound {
        /// Speaking character
        character: String,
        /// Statement text
        text: String,
    },
}

/// Errors that can occur while selecting a model pair for a task
#[derive(Error, Debug)]
pub enum SelectionError {
    /// A required candidate category had no files
    #[error("No candidate files for {category} under {directory}")]
    EmptyCategory {
        /// Which category was empty (gpt, sovits, reference audio)
        category: String,
        /// The directory that was scanned
        directory: String,
    },

    /// The collaborator response did not resolve to any candidate
    #[error("Selection response did not match any candidate: {0}")]
    Unresolved(String),

    /// Error from the collaborator with no possible fallback
    #[error("Selection failed with no fallback: {0}")]
    NoFallback(String),
}

/// Errors produced by the voicing pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Error from a collaborator
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error selecting a model pair
    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    /// Error persisting a generated audio file
    #[error("Audio persistence error: {0}")]
    AudioPersist(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from script processing
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    /// Error from the pipeline
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
