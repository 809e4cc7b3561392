//! Sequential chunked processing with a failure policy.
//!
//! Large slices are handed to a callback a few items at a time. The next
//! chunk only starts once the previous callback has finished, so the
//! callback never runs concurrently with itself.

use crate::error::{Error, Result};
use std::future::Future;
use tracing::{debug, warn};

/// Outcome of a chunked run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkSummary {
    /// Chunks handed to the callback.
    pub chunks: usize,
    /// Chunks whose callback failed and were skipped.
    pub failed: usize,
}

/// Process `items` in consecutive chunks of `chunk_size`.
///
/// A failing chunk is logged and skipped when `continue_on_failure` is set;
/// otherwise processing stops and the error is returned with the chunk's
/// start index.
pub async fn process_in_chunks<T, F, Fut>(
    items: &[T],
    chunk_size: usize,
    mut callback: F,
    continue_on_failure: bool,
) -> Result<ChunkSummary>
where
    F: FnMut(&[T]) -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    if chunk_size == 0 {
        return Err(Error::InvalidChunkSize);
    }

    let mut summary = ChunkSummary::default();
    for (index, chunk) in items.chunks(chunk_size).enumerate() {
        summary.chunks += 1;
        if let Err(source) = callback(chunk).await {
            handle_failure(&mut summary, index * chunk_size, source, continue_on_failure)?;
        }
    }

    debug!(chunks = summary.chunks, failed = summary.failed, "chunked processing done");
    Ok(summary)
}

/// [`process_in_chunks`] for a synchronous callback.
pub fn process_in_chunks_blocking<T, F>(
    items: &[T],
    chunk_size: usize,
    mut callback: F,
    continue_on_failure: bool,
) -> Result<ChunkSummary>
where
    F: FnMut(&[T]) -> anyhow::Result<()>,
{
    if chunk_size == 0 {
        return Err(Error::InvalidChunkSize);
    }

    let mut summary = ChunkSummary::default();
    for (index, chunk) in items.chunks(chunk_size).enumerate() {
        summary.chunks += 1;
        if let Err(source) = callback(chunk) {
            handle_failure(&mut summary, index * chunk_size, source, continue_on_failure)?;
        }
    }
    Ok(summary)
}

fn handle_failure(
    summary: &mut ChunkSummary,
    start: usize,
    source: anyhow::Error,
    continue_on_failure: bool,
) -> Result<()> {
    if !continue_on_failure {
        return Err(Error::ChunkFailed { start, source });
    }
    warn!(start, "chunk failed, continuing: {source:#}");
    summary.failed += 1;
    Ok(())
}
