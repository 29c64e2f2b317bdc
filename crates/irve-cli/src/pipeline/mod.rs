//! The import pipeline: source rows → stations → batches → isolated upserts.
//!
//! Everything runs sequentially on the caller's task. Only source errors
//! propagate; upload failures are absorbed by isolation and counted.

mod batch;

use std::io::Write;
use std::time::Duration;

use irve_core::{AppConfig, Station};
use irve_rest::{IsolationReport, StationsClient};
use irve_source::{map_record, map_station, RecordPager, SourceClient, SourceError};

use self::batch::Batcher;

/// Knobs for one pipeline run.
#[derive(Debug, Clone)]
pub(crate) struct PipelineOptions {
    pub batch_size: usize,
    /// Pause after each full batch and between records-API pages.
    pub cooldown: Duration,
    /// Stop after this many mapped stations.
    pub limit: Option<usize>,
}

impl PipelineOptions {
    pub(crate) fn from_config(config: &AppConfig, limit: Option<usize>) -> Self {
        Self {
            batch_size: config.batch_size,
            cooldown: Duration::from_millis(config.cooldown_ms),
            limit,
        }
    }
}

/// Counters for a finished run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct ImportSummary {
    /// Source rows or records read.
    pub rows_read: usize,
    /// Rows without usable coordinates.
    pub rows_skipped: usize,
    /// Stations handed to the uploader.
    pub submitted: usize,
    /// Stations rejected even when sent alone.
    pub dropped: usize,
    /// Upsert requests sent, isolation retries included.
    pub requests: usize,
}

/// What one batch upload cost and lost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct BatchOutcome {
    pub dropped: usize,
    pub requests: usize,
}

impl<T> From<&IsolationReport<'_, T>> for BatchOutcome {
    fn from(report: &IsolationReport<'_, T>) -> Self {
        Self {
            dropped: report.dropped(),
            requests: report.requests,
        }
    }
}

/// Destination for station batches. Implementations absorb their own
/// failures.
pub(crate) trait StationSink {
    async fn upsert(&self, batch: &[Station]) -> BatchOutcome;
}

impl StationSink for StationsClient {
    async fn upsert(&self, batch: &[Station]) -> BatchOutcome {
        BatchOutcome::from(&self.upsert_with_isolation(batch).await)
    }
}

/// Progress line printed after each full batch.
pub(crate) fn progress_line(submitted: usize) -> String {
    format!("Imported {submitted} stations")
}

/// Last line of a successful run.
pub(crate) fn completion_line(submitted: usize) -> String {
    format!("Import completed: {submitted} stations")
}

/// Feeds mapped stations into batches and uploads them.
///
/// `sink` is `None` for dry runs: batches are counted but not sent.
struct Loader<'a, S, W> {
    sink: Option<&'a S>,
    out: &'a mut W,
    batcher: Batcher<Station>,
    cooldown: Duration,
    limit: Option<usize>,
    summary: ImportSummary,
}

impl<'a, S, W> Loader<'a, S, W>
where
    S: StationSink,
    W: Write,
{
    fn new(sink: Option<&'a S>, out: &'a mut W, options: &PipelineOptions) -> Self {
        Self {
            sink,
            out,
            batcher: Batcher::new(options.batch_size),
            cooldown: options.cooldown,
            limit: options.limit,
            summary: ImportSummary::default(),
        }
    }

    fn limit_reached(&self) -> bool {
        self.limit.is_some_and(|limit| self.mapped() >= limit)
    }

    fn mapped(&self) -> usize {
        self.summary.rows_read - self.summary.rows_skipped
    }

    fn skip(&mut self) {
        self.summary.rows_read += 1;
        self.summary.rows_skipped += 1;
    }

    async fn accept(&mut self, station: Station) {
        self.summary.rows_read += 1;
        let Some(batch) = self.batcher.push(station) else {
            return;
        };

        self.flush(batch).await;
        if let Err(e) = writeln!(self.out, "{}", progress_line(self.summary.submitted)) {
            tracing::warn!(error = %e, "failed to write progress line");
        }

        if self.sink.is_some() && !self.cooldown.is_zero() {
            tokio::time::sleep(self.cooldown).await;
        }
    }

    /// Uploads the tail batch through the same isolation path as full
    /// batches, without a trailing cooldown.
    async fn finish(mut self) -> ImportSummary {
        if let Some(batch) = self.batcher.finish() {
            self.flush(batch).await;
        }
        self.summary
    }

    async fn flush(&mut self, batch: Vec<Station>) {
        self.summary.submitted += batch.len();

        let Some(sink) = self.sink else {
            tracing::debug!(size = batch.len(), "dry run: batch not uploaded");
            return;
        };

        let outcome = sink.upsert(&batch).await;
        self.summary.dropped += outcome.dropped;
        self.summary.requests += outcome.requests;
    }
}

/// Streams the CSV snapshot at `url` through the pipeline, writing progress
/// lines to `out`.
///
/// # Errors
///
/// Returns the first [`SourceError`] from opening or reading the CSV. Batches
/// uploaded before the error stay uploaded.
pub(crate) async fn import_csv<S, W>(
    source: &SourceClient,
    url: &str,
    sink: Option<&S>,
    options: &PipelineOptions,
    out: &mut W,
) -> Result<ImportSummary, SourceError>
where
    S: StationSink,
    W: Write,
{
    let mut loader = Loader::new(sink, out, options);
    let mut rows = source.open_csv(url).await?;

    while !loader.limit_reached() {
        let Some(row) = rows.next_row().await? else {
            break;
        };
        match map_station(&row) {
            Some(station) => loader.accept(station).await,
            None => loader.skip(),
        }
    }

    Ok(loader.finish().await)
}

/// Pages through the records API at `url` and feeds every record through the
/// pipeline.
///
/// # Errors
///
/// Returns the first [`SourceError`] from the records API.
pub(crate) async fn import_records<S, W>(
    source: &SourceClient,
    url: &str,
    sink: Option<&S>,
    options: &PipelineOptions,
    out: &mut W,
) -> Result<ImportSummary, SourceError>
where
    S: StationSink,
    W: Write,
{
    let cooldown_ms = u64::try_from(options.cooldown.as_millis()).unwrap_or(u64::MAX);
    let mut loader = Loader::new(sink, out, options);
    let mut pager = RecordPager::new(source, url, cooldown_ms);

    'pages: while let Some(records) = pager.next_page().await? {
        for record in &records {
            if loader.limit_reached() {
                break 'pages;
            }
            match map_record(record) {
                Some(station) => loader.accept(station).await,
                None => loader.skip(),
            }
        }
        tracing::info!(
            read = loader.summary.rows_read,
            total = pager.total(),
            "records page processed"
        );
    }

    Ok(loader.finish().await)
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
