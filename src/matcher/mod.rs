//! Digest prefix matching.
//!
//! A target is a run of whole bytes, optionally followed by the high nibble
//! of one more byte.

mod prefix;

pub use prefix::{MatchResult, PrefixError, TargetPrefix, MAX_PREFIX_LEN};
