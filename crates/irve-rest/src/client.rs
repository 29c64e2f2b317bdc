//! HTTP client for the Supabase PostgREST `stations_irve` endpoint.
//!
//! Every request carries the service-role key twice, as `apikey` and as a
//! bearer token, and asks PostgREST to merge on primary-key conflicts while
//! returning no body.

use std::time::Duration;

use irve_core::{Station, STATIONS_TABLE};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode, Url};

use crate::error::UploadError;
use crate::isolate::{upload_with_isolation, IsolationReport};

const PREFER_UPSERT: &str = "resolution=merge-duplicates,return=minimal";

/// Statuses PostgREST uses for a successful bulk upsert.
const ACCEPTED: [StatusCode; 3] = [StatusCode::OK, StatusCode::CREATED, StatusCode::NO_CONTENT];

/// Upsert client for the stations table.
pub struct StationsClient {
    client: Client,
    endpoint: Url,
}

impl StationsClient {
    /// Creates a client posting to `{base_url}/rest/v1/stations_irve`.
    ///
    /// # Errors
    ///
    /// - [`UploadError::InvalidBaseUrl`] if `base_url` does not parse.
    /// - [`UploadError::InvalidApiKey`] if `api_key` cannot be sent as a header.
    /// - [`UploadError::Http`] if the `reqwest::Client` cannot be constructed.
    pub fn new(
        base_url: &str,
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, UploadError> {
        let endpoint = Self::endpoint_url(base_url)?;

        let mut key = HeaderValue::from_str(api_key).map_err(|_| UploadError::InvalidApiKey)?;
        key.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| UploadError::InvalidApiKey)?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, endpoint })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sends `batch` as one bulk upsert.
    ///
    /// # Errors
    ///
    /// - [`UploadError::Http`] on network failure.
    /// - [`UploadError::UnexpectedStatus`] for any status other than
    ///   200, 201 or 204; the response body is kept for diagnostics.
    pub async fn upsert_stations(&self, batch: &[Station]) -> Result<(), UploadError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("Prefer", PREFER_UPSERT)
            .json(batch)
            .send()
            .await?;

        let status = response.status();
        if ACCEPTED.contains(&status) {
            return Ok(());
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
        Err(UploadError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        })
    }

    /// Upserts `batch`, isolating and dropping records the server rejects.
    ///
    /// Never fails as a whole: each dropped record is logged at `warn` with
    /// its id and error and listed in the returned report.
    pub async fn upsert_with_isolation<'a>(
        &self,
        batch: &'a [Station],
    ) -> IsolationReport<'a, Station> {
        let report = upload_with_isolation(batch, |chunk| self.upsert_stations(chunk)).await;

        for rejected in &report.rejected {
            tracing::warn!(
                station_id = %rejected.item.id,
                station_name = %rejected.item.name,
                error = %rejected.error,
                "skipping record due to error"
            );
        }
        if report.requests > 1 {
            tracing::info!(
                batch_size = batch.len(),
                requests = report.requests,
                uploaded = report.uploaded,
                dropped = report.dropped(),
                "batch upload needed isolation"
            );
        }

        report
    }

    fn endpoint_url(base_url: &str) -> Result<Url, UploadError> {
        let raw = format!(
            "{}/rest/v1/{STATIONS_TABLE}",
            base_url.trim().trim_end_matches('/')
        );
        Url::parse(&raw).map_err(|e| UploadError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })
    }
}
