use thiserror::Error;

use crate::form::DraftError;

/// Failure of a single call to the benchmark API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request never completed (connect, DNS, reset, body read).
    #[error("network failure: {0}")]
    Network(String),
    /// The server answered with a non-2xx status.
    #[error("server responded with status {status}: {message}")]
    Server { status: u16, message: String },
    /// A 2xx body that does not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
    /// Rejected before sending; nothing went over the wire.
    #[error("invalid request: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    Network,
    Server,
    Malformed,
    Validation,
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::Network(_) => FetchErrorKind::Network,
            Self::Server { .. } => FetchErrorKind::Server,
            Self::Malformed(_) => FetchErrorKind::Malformed,
            Self::Validation(_) => FetchErrorKind::Validation,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error(transparent)]
    Draft(#[from] DraftError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("no experiment is selected")]
    NoSelection,
}
