use reqwest::StatusCode;

pub type ApiResult<T> = Result<T, ApiError>;

/// Coarse classification of an [`ApiError`], kept so callers can tell a
/// network failure from a server rejection even when the UI message is generic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Request,
    Encode,
    Decode,
    Cancelled,
    Config,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// The request never reached the server or never came back (DNS, connect, timeout).
    #[error("network error for {url}: {source}")]
    Transport {
        url: String,
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status or an `"error"` envelope.
    #[error("{message}")]
    Request {
        url: String,
        status: StatusCode,
        message: String,
    },

    #[error("failed to encode request body for {url}: {source}")]
    Encode {
        url: String,
        source: serde_json::Error,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[error("request to {url} was cancelled")]
    Cancelled { url: String },

    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("missing required environment variable: {key}")]
    MissingEnv { key: String },

    #[error("invalid value for {key}: {reason}")]
    InvalidConfig { key: String, reason: String },
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport { .. } => ErrorKind::Transport,
            ApiError::Request { .. } => ErrorKind::Request,
            ApiError::Encode { .. } => ErrorKind::Encode,
            ApiError::Decode { .. } => ErrorKind::Decode,
            ApiError::Cancelled { .. } => ErrorKind::Cancelled,
            ApiError::InvalidUrl { .. }
            | ApiError::MissingEnv { .. }
            | ApiError::InvalidConfig { .. } => ErrorKind::Config,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    pub fn is_request(&self) -> bool {
        self.kind() == ErrorKind::Request
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind() == ErrorKind::Cancelled
    }

    /// HTTP status of a `Request` error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}
