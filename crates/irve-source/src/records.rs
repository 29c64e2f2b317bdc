//! Offset pagination over the opendatasoft `records` endpoint.

use std::time::Duration;

use serde::Deserialize;

use crate::client::SourceClient;
use crate::error::SourceError;

/// Page size accepted by the opendatasoft v2.1 records API.
pub const RECORDS_PAGE_SIZE: u32 = 100;

/// Upper bound on pages per run, guarding against a server that never
/// reports an end.
pub const MAX_PAGES: usize = 2_000;

/// One page of the records endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordsPage {
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
}

/// Walks the records endpoint page by page.
///
/// Stops once `offset` reaches the reported `total_count` or a page comes
/// back empty. `inter_request_delay_ms` is slept before every page except
/// the first.
pub struct RecordPager<'a> {
    client: &'a SourceClient,
    url: String,
    limit: u32,
    inter_request_delay_ms: u64,
    offset: u64,
    total: Option<u64>,
    pages: usize,
    finished: bool,
}

impl<'a> RecordPager<'a> {
    #[must_use]
    pub fn new(client: &'a SourceClient, url: &str, inter_request_delay_ms: u64) -> Self {
        Self {
            client,
            url: url.to_owned(),
            limit: RECORDS_PAGE_SIZE,
            inter_request_delay_ms,
            offset: 0,
            total: None,
            pages: 0,
            finished: false,
        }
    }

    /// Total record count reported by the last page, if any.
    #[must_use]
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Returns the next page of raw records, or `None` when paging is done.
    ///
    /// # Errors
    ///
    /// - Any error from [`SourceClient::fetch_records_page`].
    /// - [`SourceError::PaginationLimit`] after [`MAX_PAGES`] pages.
    pub async fn next_page(&mut self) -> Result<Option<Vec<serde_json::Value>>, SourceError> {
        if self.finished || self.total.is_some_and(|total| self.offset >= total) {
            return Ok(None);
        }

        if self.pages >= MAX_PAGES {
            return Err(SourceError::PaginationLimit {
                url: self.url.clone(),
                max_pages: MAX_PAGES,
            });
        }

        if self.pages > 0 && self.inter_request_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.inter_request_delay_ms)).await;
        }
        self.pages += 1;

        let page = self
            .client
            .fetch_records_page(&self.url, self.limit, self.offset)
            .await?;

        self.total = page.total_count.or(self.total);
        self.offset += u64::from(self.limit);

        tracing::debug!(
            page = self.pages,
            offset = self.offset,
            total = self.total,
            records = page.results.len(),
            "fetched records page"
        );

        if page.results.is_empty() {
            self.finished = true;
            return Ok(None);
        }
        Ok(Some(page.results))
    }
}
