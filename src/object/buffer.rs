//! Commit object framing.
//!
//! Layout: `commit <len>\0` + content + `\n\n` + 16 nonce chars, where `<len>`
//! counts everything after the header. The header (terminator included) is
//! part of the hashed bytes, as in a git loose object.

use super::nonce::{write_counter_hex, NONCE_WIDTH};
use super::{sha1, Digest};

/// Object type written into the header.
pub const OBJECT_KIND: &str = "commit";

/// Byte that ends the header.
pub const HEADER_TERMINATOR: u8 = 0;

const SEPARATOR: &[u8; 2] = b"\n\n";

/// Length of the header (terminator included) for a body of `body_len` bytes.
pub fn header_len(body_len: usize) -> usize {
    OBJECT_KIND.len() + 1 + body_len.to_string().len() + 1
}

/// An owned, framed commit object whose nonce can be rewritten in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBuffer {
    bytes: Vec<u8>,
    header_len: usize,
    counter_offset: usize,
}

impl ContentBuffer {
    /// Frames `content` with a zeroed nonce.
    pub fn frame(content: &[u8]) -> Self {
        let body_len = content.len() + SEPARATOR.len() + NONCE_WIDTH;
        let header = format!("{} {}", OBJECT_KIND, body_len);
        let header_len = header.len() + 1;

        let mut bytes = Vec::with_capacity(header_len + body_len);
        bytes.extend_from_slice(header.as_bytes());
        bytes.push(HEADER_TERMINATOR);
        bytes.extend_from_slice(content);
        bytes.extend_from_slice(SEPARATOR);
        let counter_offset = bytes.len();
        bytes.resize(counter_offset + NONCE_WIDTH, 0);

        let mut buffer = Self {
            bytes,
            header_len,
            counter_offset,
        };
        buffer.set_counter(0);
        buffer
    }

    /// Rewrites the nonce region for `counter`. Never reallocates.
    #[inline]
    pub fn set_counter(&mut self, counter: u64) {
        write_counter_hex(&mut self.bytes[self.counter_offset..], counter);
    }

    /// SHA-1 of the full framed object.
    #[inline]
    pub fn digest(&self) -> Digest {
        sha1(&self.bytes)
    }

    /// The full framed object, header included.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The object body (everything after the header terminator).
    pub fn body(&self) -> &[u8] {
        &self.bytes[self.header_len..]
    }

    /// The current nonce characters.
    pub fn nonce(&self) -> &[u8] {
        &self.bytes[self.counter_offset..]
    }

    /// Offset of the nonce region within the framed object.
    pub fn counter_offset(&self) -> usize {
        self.counter_offset
    }

    /// Length of the header, terminator included.
    pub fn header_len(&self) -> usize {
        self.header_len
    }

    /// Total framed length; this is the number of bytes hashed.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::nonce::decode_counter_hex;

    #[test]
    fn test_header_layout() {
        let buf = ContentBuffer::frame(b"tree abc\n");
        // 9 content + 2 separator + 16 nonce = 27
        assert!(buf.as_bytes().starts_with(b"commit 27\0tree abc\n\n\n"));
        assert_eq!(buf.header_len(), header_len(27));
        assert_eq!(buf.header_len(), 10);
        assert_eq!(buf.body().len(), 27);
        assert_eq!(buf.len(), 37);
        assert_eq!(buf.counter_offset(), 21);
    }

    #[test]
    fn test_empty_content() {
        let buf = ContentBuffer::frame(b"");
        assert_eq!(buf.as_bytes(), b"commit 18\0\n\n0000000000000000");
    }

    #[test]
    fn test_set_counter_in_place() {
        let mut buf = ContentBuffer::frame(b"hello");
        let ptr = buf.as_bytes().as_ptr();
        buf.set_counter(0x1f);
        assert_eq!(buf.nonce(), b"f100000000000000");
        assert_eq!(decode_counter_hex(buf.nonce()), Some(0x1f));
        assert_eq!(buf.as_bytes().as_ptr(), ptr);
        assert_eq!(buf.body(), b"hello\n\nf100000000000000");
    }

    #[test]
    fn test_framing_is_idempotent() {
        let mut a = ContentBuffer::frame(b"author A <a@x> 0 +0000\n");
        let mut b = ContentBuffer::frame(b"author A <a@x> 0 +0000\n");
        a.set_counter(42);
        b.set_counter(7);
        b.set_counter(42);
        assert_eq!(a, b);
        assert_eq!(a.digest(), b.digest());
    }

    #[test]
    fn test_header_length_digit_rollover() {
        // 82 + 18 = 100 pushes the length to three digits.
        let buf = ContentBuffer::frame(&[b'x'; 82]);
        assert!(buf.as_bytes().starts_with(b"commit 100\0"));
        assert_eq!(buf.header_len(), 11);
    }

    #[test]
    fn test_digest_matches_git_object_hash() {
        let buf = ContentBuffer::frame(b"hello");
        assert_eq!(
            hex::encode(buf.digest()),
            "7ee8610c0da2382083173283b80a3fbfaef4006f"
        );
    }
}
