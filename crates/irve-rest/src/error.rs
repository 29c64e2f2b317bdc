use thiserror::Error;

/// Errors returned by the PostgREST upsert client.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a status outside 200/201/204.
    #[error("HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The base URL could not be turned into an endpoint URL.
    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The API key contains bytes not allowed in an HTTP header.
    #[error("API key is not a valid header value")]
    InvalidApiKey,
}
