//! Error types for Playlet.
//!
//! Exactly two failure channels exist in this crate: task-level failures
//! travel in-band inside the result stream (a `failed` flag on the emitted
//! result), while the errors defined here are reserved for setup problems
//! and programming errors that abort a run outright.

use thiserror::Error;

/// Result type alias for Playlet operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Playlet.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Setup Errors
    // ========================================================================
    /// Error parsing a playbook source.
    #[error("Failed to parse playbook: {message}")]
    PlaybookParse {
        /// Error message
        message: String,
        /// Source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error validating playbook structure.
    #[error("Playbook validation failed: {0}")]
    PlaybookValidation(String),

    // ========================================================================
    // Formatting Errors
    // ========================================================================
    /// A raw result reached the formatter without an invocation sub-map.
    ///
    /// The task runner guarantees the key is always attached, so hitting
    /// this means a backend or formatter broke its contract.
    #[error("Raw result for task '{task}' (module '{module}') has no invocation map")]
    MissingInvocation {
        /// Task name
        task: String,
        /// Module name
        module: String,
    },

    /// A custom result formatter failed.
    ///
    /// Formatters must not fail as a contract; this aborts the run.
    #[error("Formatter for module '{module}' failed: {message}")]
    Formatter {
        /// Module name the formatter was registered for
        module: String,
        /// Error message
        message: String,
    },

    // ========================================================================
    // IO / Serialization Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ========================================================================
    // Other Errors
    // ========================================================================
    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Creates a new playbook parse error.
    pub fn playbook_parse(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::PlaybookParse {
            message: message.into(),
            source,
        }
    }

    /// Creates a new formatter error.
    pub fn formatter(module: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Formatter {
            module: module.into(),
            message: message.into(),
        }
    }

    /// Returns the error code for CLI exit status.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::PlaybookParse { .. } | Error::PlaybookValidation(_) => 4,
            Error::MissingInvocation { .. } | Error::Formatter { .. } => 5,
            Error::Io(_) | Error::YamlParse(_) | Error::JsonParse(_) => 3,
            _ => 1,
        }
    }
}
