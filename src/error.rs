//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror`, while the
//! CLI/main layer uses `anyhow` for convenient propagation.
//!
//! Note that provider failures during aggregation never surface through
//! these types - the engine swallows them per provider (see
//! `aggregator::engine`). [`Error::Provider`] only appears when a caller
//! talks to a gateway directly.

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
///
/// Aggregates errors from all subsystems for unified handling.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Cache database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Cached record payload could not be encoded/decoded
    #[error("Cache payload error: {0}")]
    Payload(#[from] serde_json::Error),

    /// Upstream provider error
    #[error("Provider error: {0}")]
    Provider(#[from] crate::providers::ProviderError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Database(e).context(ctx))
    }
}
