use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while publishing reports to Confluence
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Confluence returned {status} for {url}: {body}")]
    Status { status: u16, url: String, body: String },

    #[error("Unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No Confluence page id given; set CONFLUENCE_PAGE_ID or pass --page-id")]
    MissingPageId,

    #[error("Page {0} not found. Please check CONFLUENCE_PAGE_ID")]
    PageNotFound(String),

    #[error("Page {page_id} is a draft and could not be published (status {status}); publish it manually and retry")]
    DraftPublish { page_id: String, status: u16 },

    #[error("Reports directory not found: {0}")]
    ReportsDirMissing(PathBuf),

    #[error("Confluence configuration error: {0}")]
    Config(String),
}

impl PublishError {
    pub fn status(status: u16, url: impl Into<String>, body: &str) -> Self {
        let body: String = body.chars().take(200).collect();
        PublishError::Status {
            status,
            url: url.into(),
            body,
        }
    }
}
