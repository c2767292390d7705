use thiserror::Error;

/// Result type alias for the ObjectScale client
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the ObjectScale client
#[derive(Error, Debug)]
pub enum Error {
    /// Connection, TLS or timeout failure while talking to the management API
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A session could not be established or renewed
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The management API rejected the request
    #[error("API error (HTTP {status}{}): {message}", code_suffix(.code))]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Response body did not match the declared content type or shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// Request body could not be serialized
    #[error("Encode error: {0}")]
    Encode(String),

    /// Request is malformed before it ever reaches the network
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref()
        .map(|c| format!(", code {c}"))
        .unwrap_or_default()
}

impl Error {
    /// HTTP status reported by the API, if the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// API error code, if the response carried a structured error payload.
    pub fn code(&self) -> Option<&str> {
        match self {
            Error::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Whether the caller may reasonably retry the whole operation later.
    ///
    /// The dispatcher never retries these itself; only session expiry is
    /// recovered internally.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(e) => e.is_timeout() || e.is_connect(),
            Error::Api { status, .. } => *status == 429 || (500..600).contains(status),
            Error::Authentication(_)
            | Error::Decode(_)
            | Error::Encode(_)
            | Error::InvalidRequest(_)
            | Error::InvalidUrl(_)
            | Error::Configuration(_) => false,
        }
    }
}
