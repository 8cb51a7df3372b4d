//! Hex nonce encoding.
//!
//! The counter is rendered least-significant nibble first: position `i` holds
//! the hex digit of `(counter >> (4 * i)) & 0xf`. Counter `1` therefore encodes
//! as `"1000000000000000"`. Matched objects embed these exact bytes, so the
//! mapping must never change.

/// Number of hex characters in the nonce region.
pub const NONCE_WIDTH: usize = 16;

const HEX_LUT: &[u8; 16] = b"0123456789abcdef";

/// Writes `counter` into `dst` as 16 lowercase hex digits, low nibble first.
///
/// `dst` must be exactly [`NONCE_WIDTH`] bytes long.
#[inline]
pub fn write_counter_hex(dst: &mut [u8], counter: u64) {
    debug_assert_eq!(dst.len(), NONCE_WIDTH);
    for (i, slot) in dst.iter_mut().enumerate() {
        *slot = HEX_LUT[((counter >> (i * 4)) & 0xf) as usize];
    }
}

/// Recovers the counter from a nonce written by [`write_counter_hex`].
///
/// Returns `None` unless `src` is exactly 16 lowercase hex digits.
pub fn decode_counter_hex(src: &[u8]) -> Option<u64> {
    if src.len() != NONCE_WIDTH {
        return None;
    }
    src.iter().enumerate().try_fold(0u64, |acc, (i, &c)| {
        let nibble = match c {
            b'0'..=b'9' => c - b'0',
            b'a'..=b'f' => c - b'a' + 10,
            _ => return None,
        };
        Some(acc | (u64::from(nibble) << (i * 4)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn encode(counter: u64) -> String {
        let mut buf = [0u8; NONCE_WIDTH];
        write_counter_hex(&mut buf, counter);
        String::from_utf8(buf.to_vec()).unwrap()
    }

    #[test]
    fn test_low_nibble_first() {
        assert_eq!(encode(0x1), "1000000000000000");
        assert_eq!(encode(0x0), "0000000000000000");
        assert_eq!(encode(0xab), "ba00000000000000");
    }

    #[test]
    fn test_full_width() {
        assert_eq!(encode(u64::MAX), "ffffffffffffffff");
        assert_eq!(encode(0x0123_4567_89ab_cdef), "fedcba9876543210");
    }

    #[test]
    fn test_decode_rejects_uppercase() {
        assert_eq!(decode_counter_hex(b"A000000000000000"), None);
        assert_eq!(decode_counter_hex(b"100"), None);
    }

    proptest! {
        #[test]
        fn nibble_at_position_matches_counter(counter: u64, pos in 0usize..NONCE_WIDTH) {
            let mut buf = [0u8; NONCE_WIDTH];
            write_counter_hex(&mut buf, counter);
            let expected = HEX_LUT[((counter >> (pos * 4)) & 0xf) as usize];
            prop_assert_eq!(buf[pos], expected);
            prop_assert_eq!(decode_counter_hex(&buf), Some(counter));
        }
    }
}
