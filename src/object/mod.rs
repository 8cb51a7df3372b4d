//! Commit object construction and hashing.
//!
//! This module provides:
//! - Framing of commit content into a hashable git object buffer
//! - The little-endian hex nonce embedded at the end of the object
//! - SHA-1 digests of framed objects

mod buffer;
pub mod nonce;

pub use buffer::{header_len, ContentBuffer, HEADER_TERMINATOR, OBJECT_KIND};
pub use nonce::{decode_counter_hex, write_counter_hex, NONCE_WIDTH};

use sha1::{Digest as _, Sha1};

/// Width of a SHA-1 digest in bytes.
pub const DIGEST_LEN: usize = 20;

/// A SHA-1 digest.
pub type Digest = [u8; DIGEST_LEN];

/// SHA-1 of arbitrary bytes.
#[inline]
pub fn sha1(input: &[u8]) -> Digest {
    Sha1::digest(input).into()
}
