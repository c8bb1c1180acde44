//! Analytics error model.

use thiserror::Error;

/// Result type used across the analytics layer.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Analytics-level error.
///
/// Keep this focused on read-path failures (bad filters, upstream query
/// failures). Persistence and transport concerns belong to the collaborators
/// that own them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    /// A filter or option failed validation (e.g. unknown sort key).
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// The backing store rejected or failed a query.
    #[error("query failed: {0}")]
    Query(String),

    /// The backing store was unreachable.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl AnalyticsError {
    pub fn invalid_filter(msg: impl Into<String>) -> Self {
        Self::InvalidFilter(msg.into())
    }

    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Wrap with a human-readable operation context, preserving the variant.
    pub fn context(self, op: &str) -> Self {
        match self {
            Self::InvalidFilter(m) => Self::InvalidFilter(format!("{op}: {m}")),
            Self::Query(m) => Self::Query(format!("{op}: {m}")),
            Self::Unavailable(m) => Self::Unavailable(format!("{op}: {m}")),
        }
    }
}
