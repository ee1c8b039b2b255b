use thiserror::Error;

/// Errors raised while talking to the issue tracker
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Jira returned {status} for {url}: {body}")]
    Status { status: u16, url: String, body: String },

    #[error("Unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid board id '{0}'")]
    InvalidBoard(String),

    #[error("Tracker configuration error: {0}")]
    Config(String),
}

impl TrackerError {
    pub fn status(status: u16, url: impl Into<String>, body: &str) -> Self {
        // keep error messages readable when Jira returns an HTML error page
        let body: String = body.chars().take(200).collect();
        TrackerError::Status {
            status,
            url: url.into(),
            body,
        }
    }

    /// Authentication failures will not go away by retrying another endpoint
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, TrackerError::Status { status: 401 | 403, .. })
    }
}
