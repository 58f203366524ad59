//! Public error taxonomy.
//!
//! Fetch and generation failures are opaque on purpose: callers only learn
//! *that* a step failed. The underlying cause is kept as the error source so
//! it can still be logged.

use thiserror::Error;

/// Startup problems. A component that hits one of these is never built.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("credential '{name}' is not set or empty")]
    MissingCredential { name: String },

    #[error("invalid endpoint URL '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("platform '{0}' has no instruction template")]
    MissingTemplate(String),
}

/// Anything that went wrong while fetching news articles.
#[derive(Error, Debug)]
#[error("failed to fetch news articles")]
pub struct NewsFetchError {
    #[source]
    source: anyhow::Error,
}

impl NewsFetchError {
    pub fn new(source: impl Into<anyhow::Error>) -> Self {
        Self { source: source.into() }
    }

    /// Underlying cause, for logs.
    pub fn cause(&self) -> &anyhow::Error {
        &self.source
    }
}

/// Anything that went wrong while generating one platform's content.
#[derive(Error, Debug)]
#[error("failed to generate content")]
pub struct GenerationError {
    #[source]
    source: anyhow::Error,
}

impl GenerationError {
    pub fn new(source: impl Into<anyhow::Error>) -> Self {
        Self { source: source.into() }
    }

    pub fn cause(&self) -> &anyhow::Error {
        &self.source
    }
}

/// Why a cycle did not complete.
#[derive(Error, Debug)]
pub enum CycleError {
    /// Precondition violation; nothing was started or mutated.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    NewsFetch(#[from] NewsFetchError),
}
