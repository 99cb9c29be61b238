use thiserror::Error;

/// Why a single release check failed. None of these are fatal to the poller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error("network error while checking for updates: {0}")]
    NetworkError(String),
    #[error("the release server did not return a usable response")]
    InvalidResponse,
    #[error("release check failed with HTTP {0}")]
    ServerError(u16),
    #[error("the release server returned an empty response")]
    EmptyBody,
    #[error("failed to parse release response: {0}")]
    ParseError(String),
    #[error("invalid release endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Fieldless discriminant of [`CheckError`], for matching and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Network,
    InvalidResponse,
    Server,
    EmptyBody,
    Parse,
    InvalidEndpoint,
}

impl CheckError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NetworkError(_) => ErrorKind::Network,
            Self::InvalidResponse => ErrorKind::InvalidResponse,
            Self::ServerError(_) => ErrorKind::Server,
            Self::EmptyBody => ErrorKind::EmptyBody,
            Self::ParseError(_) => ErrorKind::Parse,
            Self::InvalidEndpoint(_) => ErrorKind::InvalidEndpoint,
        }
    }

    pub(crate) fn network(error: &reqwest::Error) -> Self {
        Self::NetworkError(error.to_string())
    }
}
