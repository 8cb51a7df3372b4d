//! # commit_vanity
//!
//! Brute-forces a nonce appended to a git commit so that the commit's SHA-1
//! object ID starts with a chosen prefix.
//!
//! ## Architecture
//!
//! - `object`: Commit framing, nonce encoding and hashing
//! - `matcher`: Digest prefix matching
//! - `worker`: Parallel execution and worker pool management
//! - `config`: Runtime configuration

pub mod config;
pub mod matcher;
pub mod object;
pub mod worker;

pub use config::Config;
pub use matcher::{MatchResult, PrefixError, TargetPrefix};
pub use object::{ContentBuffer, Digest};
pub use worker::{SearchError, SearchResult, WorkerPool};

/// Searches for a nonce that gives `content` a digest starting with `prefix`.
///
/// With `use_half_nibble` only the high nibble of the last prefix byte is
/// matched. Blocks until a match is found; there is no timeout.
pub fn bruteforce(
    content: &[u8],
    prefix: &[u8],
    use_half_nibble: bool,
    worker_count: usize,
) -> Result<SearchResult, SearchError> {
    if worker_count == 0 {
        return Err(SearchError::InvalidWorkerCount);
    }
    let prefix = TargetPrefix::from_raw(prefix, use_half_nibble)?;
    WorkerPool::new(worker_count, content, prefix)?.search()
}
