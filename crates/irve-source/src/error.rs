use thiserror::Error;

/// Errors raised while reading an upstream IRVE source. All of them are fatal
/// to an import run.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid source URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Malformed record or a transport failure while reading the body.
    #[error("CSV error: {0}")]
    Csv(#[from] csv_async::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("pagination limit reached for {url}: exceeded {max_pages} pages")]
    PaginationLimit { url: String, max_pages: usize },
}
