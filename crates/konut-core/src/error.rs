use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KonutError {
    /// A GET that did not answer with HTTP 200, or never answered at all.
    #[error("Unable to fetch {url}: {reason}")]
    Fetch {
        url: String,
        status: Option<u16>,
        reason: String,
    },
    #[error("Request cancelled: {url}")]
    Cancelled { url: String },
    #[error("Scraping error: {0}")]
    Scraping(String),
    #[error("Invalid value for {field}: {value:?}")]
    InvalidQuery { field: String, value: String },
    #[error("Value {value} of {field} was not seen when the encoding table was built")]
    UnknownCategory { field: String, value: i64 },
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Model error: {0}")]
    Model(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl KonutError {
    /// Whether retrying the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            KonutError::Fetch { status: None, .. } => true,
            KonutError::Fetch { status: Some(code), .. } => *code == 429 || *code >= 500,
            KonutError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, KonutError>;
