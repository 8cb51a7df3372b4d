//! CPU worker for commit nonce search.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;
use tracing::debug;

use crate::matcher::TargetPrefix;
use crate::object::{ContentBuffer, Digest};

use super::SearchResult;

/// Hashes tried between two looks at the stop flag.
pub const CANCEL_CHECK_INTERVAL: u64 = 1024;

/// Statistics shared by all workers of a pool.
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Total digests computed
    pub hashes_tried: AtomicU64,
    /// Matches found
    pub matches_found: AtomicU64,
}

impl WorkerStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_hashes(&self) -> u64 {
        self.hashes_tried.load(Ordering::Relaxed)
    }

    pub fn total_matches(&self) -> u64 {
        self.matches_found.load(Ordering::Relaxed)
    }
}

/// One search thread's state.
///
/// Worker `id` of `stride` tests counters `id, id + stride, id + 2 * stride, ..`
/// so no two workers of a pool ever hash the same nonce.
pub struct CpuWorker {
    id: usize,
    stride: u64,
    buffer: ContentBuffer,
    prefix: TargetPrefix,
    result_tx: Sender<SearchResult>,
    stop_flag: Arc<AtomicBool>,
    stats: Arc<WorkerStats>,
}

impl CpuWorker {
    /// Creates a worker with its own framed copy of `content`.
    pub fn new(
        id: usize,
        stride: usize,
        content: &[u8],
        prefix: TargetPrefix,
        result_tx: Sender<SearchResult>,
        stop_flag: Arc<AtomicBool>,
        stats: Arc<WorkerStats>,
    ) -> Self {
        Self {
            id,
            stride: stride as u64,
            buffer: ContentBuffer::frame(content),
            prefix,
            result_tx,
            stop_flag,
            stats,
        }
    }

    /// Runs the worker loop until a match is found or the stop flag is set.
    ///
    /// On a match the result is sent exactly once and the worker returns.
    pub fn run(mut self) {
        let Some((counter, digest)) = self.search() else {
            debug!(worker = self.id, "stopped without a match");
            return;
        };

        self.stats.matches_found.fetch_add(1, Ordering::Relaxed);
        debug!(worker = self.id, counter, "match found");

        let header_len = self.buffer.header_len();
        let result = SearchResult {
            buffer: self.buffer.into_bytes(),
            header_len,
            digest,
            counter,
            worker_id: self.id,
        };

        // The pool may already be gone.
        let _ = self.result_tx.send(result);
    }

    /// The hot loop. Returns the matching counter and digest, or `None` once
    /// the stop flag is observed.
    fn search(&mut self) -> Option<(u64, Digest)> {
        let mut counter = self.id as u64;

        loop {
            if self.stop_flag.load(Ordering::Relaxed) {
                return None;
            }

            for tried in 1..=CANCEL_CHECK_INTERVAL {
                self.buffer.set_counter(counter);
                let digest = self.buffer.digest();

                if self.prefix.matches(&digest).is_match() {
                    self.stats.hashes_tried.fetch_add(tried, Ordering::Relaxed);
                    return Some((counter, digest));
                }

                counter = counter.wrapping_add(self.stride);
            }

            self.stats
                .hashes_tried
                .fetch_add(CANCEL_CHECK_INTERVAL, Ordering::Relaxed);
        }
    }

    /// Returns the worker ID.
    pub fn id(&self) -> usize {
        self.id
    }
}
