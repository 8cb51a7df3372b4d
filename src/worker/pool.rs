//! Worker pool management.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use tracing::{debug, info, warn};

use crate::matcher::{PrefixError, TargetPrefix};
use crate::object::{decode_counter_hex, Digest, NONCE_WIDTH};

use super::cpu::{CpuWorker, WorkerStats};

/// Errors that prevent a search from producing a result.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("worker count must be greater than zero")]
    InvalidWorkerCount,
    #[error(transparent)]
    Prefix(#[from] PrefixError),
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] io::Error),
    #[error("worker {0} panicked")]
    WorkerPanicked(usize),
    #[error("all workers exited without finding a match")]
    Aborted,
}

/// A framed commit object whose digest starts with the requested prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// The full framed object (`commit <len>\0` header included)
    pub buffer: Vec<u8>,
    /// SHA-1 of `buffer`
    pub digest: Digest,
    /// Counter encoded in the nonce
    pub counter: u64,
    /// The ID of the worker that found this result
    pub worker_id: usize,
    pub(crate) header_len: usize,
}

impl SearchResult {
    /// Digest as lowercase hex, the form git prints object IDs in.
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }

    /// The commit body without its header, as `git hash-object -t commit` expects it.
    pub fn body(&self) -> &[u8] {
        &self.buffer[self.header_len..]
    }

    /// The nonce characters at the end of the object.
    pub fn nonce(&self) -> &[u8] {
        &self.buffer[self.buffer.len() - NONCE_WIDTH..]
    }

    /// Counter recovered from the nonce bytes.
    pub fn decoded_counter(&self) -> Option<u64> {
        decode_counter_hex(self.nonce())
    }

    pub fn into_parts(self) -> (Vec<u8>, Digest) {
        (self.buffer, self.digest)
    }
}

/// Manages a fixed pool of threads racing to find one matching nonce.
pub struct WorkerPool {
    /// Number of workers
    num_workers: usize,
    /// The prefix being searched for
    prefix: TargetPrefix,
    /// Worker thread handles (Option to allow taking during join)
    handles: Option<Vec<JoinHandle<()>>>,
    /// Channel receiver for results
    result_rx: Receiver<SearchResult>,
    /// Shared stop flag
    stop_flag: Arc<AtomicBool>,
    /// Shared statistics
    stats: Arc<WorkerStats>,
    /// Start time
    start_time: Instant,
}

impl WorkerPool {
    /// Frames `content` once per worker and starts `num_workers` threads.
    pub fn new(
        num_workers: usize,
        content: &[u8],
        prefix: TargetPrefix,
    ) -> Result<Self, SearchError> {
        if num_workers == 0 {
            return Err(SearchError::InvalidWorkerCount);
        }

        // Each worker sends at most once, so sends never block.
        let (result_tx, result_rx) = bounded(num_workers);
        let stop_flag = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(WorkerStats::new());
        let mut handles = Vec::with_capacity(num_workers);

        for id in 0..num_workers {
            let worker = CpuWorker::new(
                id,
                num_workers,
                content,
                prefix.clone(),
                result_tx.clone(),
                stop_flag.clone(),
                stats.clone(),
            );

            let spawned = thread::Builder::new()
                .name(format!("commit-vanity-worker-{}", id))
                .spawn(move || worker.run());

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    stop_flag.store(true, Ordering::Relaxed);
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(SearchError::Spawn(e));
                }
            }
        }

        // Drop our sender so the channel closes when all workers finish
        drop(result_tx);

        debug!(workers = num_workers, prefix = %prefix, "worker pool started");

        Ok(Self {
            num_workers,
            prefix,
            handles: Some(handles),
            result_rx,
            stop_flag,
            stats,
            start_time: Instant::now(),
        })
    }

    /// Blocks until a match is found, then stops the pool and returns the winner.
    pub fn search(mut self) -> Result<SearchResult, SearchError> {
        match self.result_rx.recv() {
            Ok(first) => Ok(self.finish(first)),
            Err(_) => Err(self.exit_error()),
        }
    }

    /// Waits for a result with a timeout.
    ///
    /// Returns `Ok(None)` if the timeout expires. Once every worker has
    /// exited without a match the workers are joined and the error says
    /// whether one of them panicked.
    pub fn wait_for_result(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<SearchResult>, SearchError> {
        match self.result_rx.recv_timeout(timeout) {
            Ok(result) => Ok(Some(result)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(self.exit_error()),
        }
    }

    /// Stops every worker and picks the winner.
    ///
    /// Only results already queued when this is called compete with `first`;
    /// the lowest worker index wins. Matches found while the workers wind
    /// down are discarded.
    pub fn finish(mut self, first: SearchResult) -> SearchResult {
        let winner = self.result_rx.try_iter().fold(first, |best, candidate| {
            if candidate.worker_id < best.worker_id {
                candidate
            } else {
                best
            }
        });

        self.stop();
        for id in self.join_workers() {
            warn!(worker = id, "worker panicked after a match was found");
        }

        let late = self.result_rx.try_iter().count();
        if late > 0 {
            debug!(late, "discarded matches found after stop");
        }

        info!(
            worker = winner.worker_id,
            counter = winner.counter,
            digest = %winner.digest_hex(),
            hashes = self.total_hashes(),
            elapsed_ms = self.elapsed().as_millis() as u64,
            "search finished"
        );

        winner
    }

    /// Signals all workers to stop.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    /// Joins every worker and returns the IDs of those that panicked.
    fn join_workers(&mut self) -> Vec<usize> {
        let Some(handles) = self.handles.take() else {
            return Vec::new();
        };

        handles
            .into_iter()
            .enumerate()
            .filter_map(|(id, handle)| handle.join().err().map(|_| id))
            .collect()
    }

    fn exit_error(&mut self) -> SearchError {
        match self.join_workers().first() {
            Some(&id) => SearchError::WorkerPanicked(id),
            None => SearchError::Aborted,
        }
    }

    /// Returns the number of workers.
    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Returns the prefix being searched for.
    pub fn prefix(&self) -> &TargetPrefix {
        &self.prefix
    }

    /// Returns the total digests computed across all workers.
    pub fn total_hashes(&self) -> u64 {
        self.stats.total_hashes()
    }

    /// Returns the total matches found.
    pub fn total_matches(&self) -> u64 {
        self.stats.total_matches()
    }

    /// Returns the elapsed time since the pool was created.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns the current hash rate.
    pub fn hashes_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.total_hashes() as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Returns a clone of the stop flag for external use (e.g., signal handlers).
    pub fn stop_flag_clone(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Returns true if the pool has been signaled to stop.
    pub fn is_stopped(&self) -> bool {
        self.stop_flag.load(Ordering::Relaxed)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.stop();
        self.join_workers();
    }
}
