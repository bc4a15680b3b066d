//! Allow-list parsing errors.

use thiserror::Error;

/// Reasons an allow-list entry is rejected at load time.
///
/// These never fail startup: the entry is skipped and logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("entry is empty")]
    Empty,

    #[error("entry '{0}' contains whitespace")]
    Whitespace(String),

    #[error("entry '{0}' has more than one wildcard")]
    MultipleWildcards(String),

    #[error("entry '{0}' has an invalid scheme")]
    InvalidScheme(String),

    #[error("entry '{0}' has no host")]
    MissingHost(String),

    #[error("entry '{0}' contains a path, query or fragment")]
    UnexpectedPath(String),
}
