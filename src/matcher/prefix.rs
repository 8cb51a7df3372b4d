//! Digest prefix matching.

use std::fmt;

use crate::object::{Digest, DIGEST_LEN};

/// Longest prefix (in bytes) that can be requested.
pub const MAX_PREFIX_LEN: usize = DIGEST_LEN;

/// Errors raised while building a [`TargetPrefix`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrefixError {
    #[error("prefix is {0} bytes, at most 20 allowed")]
    TooLong(usize),
    #[error("half nibble requested but the prefix is empty")]
    MissingHalfNibble,
    #[error("prefix must contain only hex characters (0-9, a-f): {0}")]
    InvalidHex(String),
}

/// Result of a prefix match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    Match,
    NoMatch,
}

impl MatchResult {
    #[inline]
    pub fn is_match(self) -> bool {
        matches!(self, MatchResult::Match)
    }
}

/// The digest prefix being searched for: whole bytes plus an optional high
/// nibble of the byte that follows them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPrefix {
    bytes: Vec<u8>,
    half_nibble: Option<u8>,
}

impl TargetPrefix {
    /// Builds a prefix from raw bytes.
    ///
    /// With `use_half_nibble` the last byte is not matched whole: only its high
    /// nibble is, against the digest byte following the remaining prefix.
    pub fn from_raw(prefix: &[u8], use_half_nibble: bool) -> Result<Self, PrefixError> {
        if prefix.len() > MAX_PREFIX_LEN {
            return Err(PrefixError::TooLong(prefix.len()));
        }

        if !use_half_nibble {
            return Ok(Self {
                bytes: prefix.to_vec(),
                half_nibble: None,
            });
        }

        match prefix.split_last() {
            Some((&last, full)) => Ok(Self {
                bytes: full.to_vec(),
                half_nibble: Some(last >> 4),
            }),
            None => Err(PrefixError::MissingHalfNibble),
        }
    }

    /// Parses a hex prefix such as `"c0ffee"`. An odd number of digits
    /// requests a half nibble for the last one.
    pub fn from_hex(hex_prefix: &str) -> Result<Self, PrefixError> {
        let hex_prefix = hex_prefix.strip_prefix("0x").unwrap_or(hex_prefix);
        let lower = hex_prefix.to_ascii_lowercase();

        if !lower.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(PrefixError::InvalidHex(hex_prefix.to_string()));
        }

        let use_half_nibble = lower.len() % 2 == 1;
        let padded = if use_half_nibble {
            format!("{}0", lower)
        } else {
            lower
        };

        let raw =
            hex::decode(&padded).map_err(|_| PrefixError::InvalidHex(hex_prefix.to_string()))?;
        Self::from_raw(&raw, use_half_nibble)
    }

    /// Whole bytes that must lead the digest.
    pub fn full_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Required high nibble of `digest[full_bytes().len()]`, if any.
    pub fn half_nibble(&self) -> Option<u8> {
        self.half_nibble
    }

    /// Number of digest bits constrained by this prefix.
    pub fn bits(&self) -> u32 {
        let half = if self.half_nibble.is_some() { 4 } else { 0 };
        (self.bytes.len() as u32 * 8 + half).min(DIGEST_LEN as u32 * 8)
    }

    /// Tests a digest against this prefix.
    #[inline]
    pub fn matches(&self, digest: &Digest) -> MatchResult {
        let n = self.bytes.len();
        let matched = digest[..n] == self.bytes[..]
            && self
                .half_nibble
                .map_or(true, |nibble| digest[n] >> 4 == nibble);

        if matched {
            MatchResult::Match
        } else {
            MatchResult::NoMatch
        }
    }

    /// Expected number of hashes before a match (`16^nibbles`).
    pub fn estimated_difficulty(&self) -> u64 {
        16u64.saturating_pow(self.bits() / 4)
    }

    /// Returns a human-readable difficulty estimate.
    pub fn difficulty_description(&self) -> String {
        let diff = self.estimated_difficulty();
        match diff {
            0..=1_000 => "Very Easy (< 1 second)".into(),
            1_001..=100_000_000 => "Easy (seconds)".into(),
            100_000_001..=10_000_000_000 => "Medium (minutes)".into(),
            10_000_000_001..=1_000_000_000_000 => "Hard (hours)".into(),
            _ => "Very Hard (days or more)".into(),
        }
    }
}

impl fmt::Display for TargetPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.bytes))?;
        if let Some(nibble) = self.half_nibble {
            write!(f, "{:x}", nibble)?;
        }
        Ok(())
    }
}
