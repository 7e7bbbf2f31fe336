//! Error types for engine construction and resolution.

use thiserror::Error;

/// Errors raised while building an engine from its configuration.
///
/// Out-of-range cutoffs and empty candidate sets are not errors; they
/// degrade to "no match" or "match anything" at resolution time.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("normalization rule {index} has an empty pattern")]
    EmptyPattern { index: usize },

    #[error("normalization rule {index} has an invalid regex pattern '{pattern}': {source}")]
    InvalidPattern {
        index: usize,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A failure reported by a backing slug store.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StoreError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors surfaced by [`crate::Resolver::resolve`].
///
/// "No match" is never an error; it is `Ok(None)`.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("candidate store for resolver '{resolver}' failed: {source}")]
    Store {
        resolver: String,
        #[source]
        source: StoreError,
    },
}

impl ResolveError {
    pub(crate) fn store(resolver: &str, source: StoreError) -> Self {
        Self::Store {
            resolver: resolver.to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
