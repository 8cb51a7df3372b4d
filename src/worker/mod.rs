//! Worker pool for parallel nonce search.
//!
//! This module provides:
//! - CPU workers, each walking its own residue class of the counter space
//! - A pool that races them, stops the losers and picks one result
//! - Progress tracking and reporting

mod cpu;
mod pool;

pub use cpu::{CpuWorker, WorkerStats, CANCEL_CHECK_INTERVAL};
pub use pool::{SearchError, SearchResult, WorkerPool};
