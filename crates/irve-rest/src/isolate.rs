//! Isolation-by-halving for bulk uploads.
//!
//! When a bulk request is rejected, the batch is split at its midpoint and
//! each half is retried on its own, until every chunk either succeeds or is
//! down to a single record. A single record that still fails is reported and
//! dropped. One bad record in a batch of `n` costs `O(log n)` extra requests.
//!
//! Chunks are kept on an explicit stack (left half on top), which sends the
//! same requests in the same order as the recursive formulation without
//! growing the call stack.

use std::future::Future;

use crate::error::UploadError;

/// A record that failed even when uploaded alone.
#[derive(Debug)]
pub struct Rejected<'a, T> {
    pub item: &'a T,
    pub error: UploadError,
}

/// Outcome of [`upload_with_isolation`].
#[derive(Debug)]
pub struct IsolationReport<'a, T> {
    /// Records accepted by the server.
    pub uploaded: usize,
    /// Requests sent, including the first full-batch attempt.
    pub requests: usize,
    pub rejected: Vec<Rejected<'a, T>>,
}

impl<T> IsolationReport<'_, T> {
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.rejected.len()
    }
}

/// Uploads `items` through `upload`, bisecting rejected chunks until the
/// failing records are isolated.
///
/// Every record ends up either counted in `uploaded` exactly once or listed
/// in `rejected`. An empty slice sends no request.
pub async fn upload_with_isolation<'a, T, F, Fut>(
    items: &'a [T],
    mut upload: F,
) -> IsolationReport<'a, T>
where
    F: FnMut(&'a [T]) -> Fut,
    Fut: Future<Output = Result<(), UploadError>>,
{
    let mut report = IsolationReport {
        uploaded: 0,
        requests: 0,
        rejected: Vec::new(),
    };

    let mut pending: Vec<&'a [T]> = Vec::new();
    if !items.is_empty() {
        pending.push(items);
    }

    while let Some(chunk) = pending.pop() {
        report.requests += 1;
        match upload(chunk).await {
            Ok(()) => report.uploaded += chunk.len(),
            Err(error) if chunk.len() == 1 => {
                report.rejected.push(Rejected {
                    item: &chunk[0],
                    error,
                });
            }
            Err(error) => {
                tracing::debug!(size = chunk.len(), error = %error, "chunk rejected, splitting");
                let (left, right) = chunk.split_at(chunk.len() / 2);
                pending.push(right);
                pending.push(left);
            }
        }
    }

    report
}
