//! Shared error types for modscore.
//!
//! Structural problems (an invalid feature catalog, a forbidden dependency
//! cycle) unwind the whole analysis through [`Error`]. Per-file read
//! failures during scanning never reach this type: they are logged and the
//! file is skipped.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for modscore operations
#[derive(Debug, Error)]
pub enum Error {
    /// File system related errors
    #[error("File system error: {message}")]
    FileSystem {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    /// A removal pattern in the feature catalog did not compile
    #[error("Invalid pattern `{pattern}` for feature `{feature}`: {message}")]
    Pattern {
        feature: String,
        pattern: String,
        message: String,
    },

    /// A catalog override names a feature the catalog does not contain
    #[error("Feature override references unknown feature `{name}`")]
    UnknownFeatureOverride { name: String },

    /// A catalog addition reuses the name of an existing feature
    #[error("Feature `{name}` is already defined in the catalog")]
    DuplicateFeature { name: String },

    /// Adding `from -> to` would close a cycle that the exception policy does not cover
    #[error("Dependency cycle detected between `{from}` and `{to}`")]
    DependencyCycle { from: String, to: String },

    /// One or more enabled features have no evidence of use
    #[error("{count} unused feature(s) found in {module}")]
    UnusedFeatures { module: String, count: usize },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic errors with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML errors
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Wrap an I/O error with the path that caused it
    pub fn io_at(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::FileSystem {
            message: format!("{}: {}", path.display(), source),
            path: Some(path),
            source: Some(source),
        }
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            message: self.to_string(),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}
