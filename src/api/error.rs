use thiserror::Error;

/// Errors from talking to the NextMove services. Timeouts are kept
/// distinct from connection failures so the UI can tell "server is slow"
/// from "server is down".
#[derive(Debug, Error)]
pub(crate) enum ApiError {
    #[error("request timed out")]
    Timeout,

    #[error("could not connect to the server")]
    Connection,

    /// Non-2xx answer, with whatever message the service put in the body.
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("unexpected response from server: {0}")]
    Decode(String),

    #[error("no token received from server")]
    MissingToken,

    #[error("not authenticated")]
    AuthRequired,

    #[error(transparent)]
    Transport(reqwest::Error),
}

impl ApiError {
    /// True for the statuses that invalidate the local session.
    pub(crate) fn is_auth_error(&self) -> bool {
        matches!(self, Self::Server { status: 401 | 403, .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err)
        }
    }
}
