//! HTTP access to the upstream IRVE sources.

use std::pin::Pin;
use std::time::Duration;

use futures::TryStreamExt;
use reqwest::{Client, Url};
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;

use crate::csv_stream::CsvRowStream;
use crate::error::SourceError;
use crate::records::RecordsPage;

/// Streamed response body of a download.
pub type BodyReader = Pin<Box<dyn AsyncRead + Send>>;

/// Client for the CSV snapshot and the opendatasoft records API.
///
/// The CSV download has no overall timeout since the snapshot is large and
/// read incrementally; only connecting is bounded. JSON page requests use
/// `request_timeout`.
pub struct SourceClient {
    client: Client,
    request_timeout: Duration,
}

impl SourceClient {
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(user_agent: &str, request_timeout_secs: u64) -> Result<Self, SourceError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }

    /// Starts downloading the CSV at `url` and returns a lazy row stream over
    /// the response body. Dropping the stream closes the connection.
    ///
    /// # Errors
    ///
    /// - [`SourceError::Http`] if the request cannot be sent.
    /// - [`SourceError::UnexpectedStatus`] for any non-2xx response.
    pub async fn open_csv(&self, url: &str) -> Result<CsvRowStream<BodyReader>, SourceError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "text/csv,*/*;q=0.8")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        tracing::info!(
            url,
            content_length = response.content_length(),
            "streaming IRVE CSV"
        );

        let body = response.bytes_stream().map_err(std::io::Error::other);
        let reader: BodyReader = Box::pin(StreamReader::new(body));
        Ok(CsvRowStream::new(reader))
    }

    /// Fetches one page of the records endpoint, restricted to records that
    /// carry coordinates.
    ///
    /// # Errors
    ///
    /// - [`SourceError::InvalidUrl`] if `url` does not parse.
    /// - [`SourceError::Http`] on network failure.
    /// - [`SourceError::UnexpectedStatus`] for any non-2xx response.
    /// - [`SourceError::Deserialize`] if the body is not a records page.
    pub async fn fetch_records_page(
        &self,
        url: &str,
        limit: u32,
        offset: u64,
    ) -> Result<RecordsPage, SourceError> {
        let page_url = Self::records_url(url, limit, offset)?;

        let response = self
            .client
            .get(page_url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.request_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::UnexpectedStatus {
                status: status.as_u16(),
                url: page_url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<RecordsPage>(&body).map_err(|e| SourceError::Deserialize {
            context: format!("records page at offset {offset}"),
            source: e,
        })
    }

    fn records_url(url: &str, limit: u32, offset: u64) -> Result<Url, SourceError> {
        let mut parsed = Url::parse(url).map_err(|e| SourceError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
        parsed
            .query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string())
            .append_pair("where", "coordonneesxy IS NOT NULL");
        Ok(parsed)
    }
}
