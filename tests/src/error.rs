//! Error types for the scenario framework.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for scenario operations.
pub type ScenarioResult<T> = Result<T, ScenarioError>;

/// Errors that can occur when running scenarios.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// Failed to read a file.
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse an operations file.
    #[error("failed to parse operations file '{path}': {message}")]
    OperationsParse { path: PathBuf, message: String },

    /// A seed step failed.
    #[error("step '{step}' failed: {message}")]
    StepExecution { step: String, message: String },

    #[error("assertion failed for step '{step}': {message}")]
    AssertionFailed { step: String, message: String },

    #[error("step '{step}' not found in operations file")]
    StepNotFound { step: String },

    /// A `-- @` directive the runner does not understand.
    #[error("step '{step}': bad directive '{directive}'")]
    BadDirective { step: String, directive: String },

    #[error("operations not specified for scenario '{scenario}'")]
    MissingOperations { scenario: String },

    /// The fixture could not be set up.
    #[error("store error: {0}")]
    Store(#[from] circ_store::StoreError),

    #[error("session error: {0}")]
    Session(#[from] circ_session::SessionError),
}

impl ScenarioError {
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    pub fn operations_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::OperationsParse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn step_execution(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StepExecution {
            step: step.into(),
            message: message.into(),
        }
    }

    pub fn assertion_failed(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            step: step.into(),
            message: message.into(),
        }
    }

    pub fn step_not_found(step: impl Into<String>) -> Self {
        Self::StepNotFound { step: step.into() }
    }

    pub fn bad_directive(step: impl Into<String>, directive: impl Into<String>) -> Self {
        Self::BadDirective {
            step: step.into(),
            directive: directive.into(),
        }
    }

    pub fn missing_operations(scenario: impl Into<String>) -> Self {
        Self::MissingOperations {
            scenario: scenario.into(),
        }
    }
}
