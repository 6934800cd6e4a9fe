use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single request against the GitHub API.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("GitHub API error ({status}): {body}")]
    Status { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// How a failure is reported to the person using the explorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The API answered `403 Forbidden`, which GitHub uses for exhausted rate limits.
    RateLimited,
    /// Any other non-success status or network failure.
    Remote,
    /// Anything that is not a transport failure, e.g. a body we cannot decode.
    Unexpected,
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Status { status, .. } if *status == StatusCode::FORBIDDEN => {
                FailureKind::RateLimited
            }
            FetchError::Status { .. } | FetchError::Transport(_) => FailureKind::Remote,
            FetchError::Decode(_) => FailureKind::Unexpected,
        }
    }
}

impl FailureKind {
    /// Text shown in place of the search results.
    pub fn search_message(self) -> &'static str {
        match self {
            FailureKind::RateLimited => "Rate limit exceeded. Please try again later.",
            FailureKind::Remote => {
                "Failed to fetch users. Please check your network or Github token."
            }
            FailureKind::Unexpected => "An unexpected error occurred.",
        }
    }
}
