//! Bit-level helpers shared by the jam encoder and the cue decoder.
//!
//! Streams are addressed from the low end: bit 0 of the stream lands in the
//! least-significant bit of the first byte of the envelope, which is exactly
//! the in-memory layout of `BitVec<u8, Lsb0>`.

use alloc::vec::Vec;
use bitvec::prelude::{BitSlice, BitVec, Lsb0};

/// Extend a bit sequence with high zero bits up to a whole byte count.
pub fn pad_to_bytes(bits: &mut BitVec<u8, Lsb0>) {
    let spare = bits.len() % 8;
    if spare != 0 {
        let len = bits.len();
        bits.resize(len + 8 - spare, false);
    }
}

/// Number of significant bits in a byte string: the position of the highest
/// set bit plus one, or zero when every byte is zero.
pub fn real_size(bytes: &[u8]) -> usize {
    match bytes.iter().rposition(|&byte| byte != 0) {
        Some(index) => index * 8 + (u8::BITS - bytes[index].leading_zeros()) as usize,
        None => 0,
    }
}

/// Reverse octet order, converting between the little-end-first envelope and
/// big-endian transports.
pub fn byte_reverse(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().rev().copied().collect()
}

/// Zero bits before the first set bit, reading from the low end. `None` when
/// the sequence contains no set bit.
pub fn count_trailing_zeros(bits: &BitSlice<u8, Lsb0>) -> Option<usize> {
    bits.first_one()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_pad_to_bytes() {
        let mut bits = BitVec::<u8, Lsb0>::new();
        bits.push(true);
        bits.push(true);
        pad_to_bytes(&mut bits);
        assert_eq!(bits.len(), 8);
        assert_eq!(bits.into_vec(), vec![0x03]);

        let mut whole = BitVec::<u8, Lsb0>::repeat(true, 8);
        pad_to_bytes(&mut whole);
        assert_eq!(whole.len(), 8);
    }

    #[test]
    fn test_real_size() {
        assert_eq!(real_size(&[]), 0);
        assert_eq!(real_size(&[0x00, 0x00]), 0);
        assert_eq!(real_size(&[0x02]), 2);
        assert_eq!(real_size(&[0xff, 0x01]), 9);
        // Trailing zero bytes are padding, not payload.
        assert_eq!(real_size(&[0x02, 0x00, 0x00]), 2);
    }

    #[test]
    fn test_byte_reverse() {
        assert_eq!(byte_reverse(&[1, 2, 3]), vec![3, 2, 1]);
        let octets = vec![0xde, 0xad, 0xbe, 0xef];
        assert_eq!(byte_reverse(&byte_reverse(&octets)), octets);
    }

    #[test]
    fn test_count_trailing_zeros() {
        let bits = BitSlice::<u8, Lsb0>::from_slice(&[0x08]);
        assert_eq!(count_trailing_zeros(bits), Some(3));
        let none = BitSlice::<u8, Lsb0>::from_slice(&[0x00]);
        assert_eq!(count_trailing_zeros(none), None);
    }

    // The padded little-end envelope and a byte-reversed big-endian rendering
    // of the same stream agree on the significant bit count.
    #[test]
    fn test_envelope_round_trip() {
        let mut bits = BitVec::<u8, Lsb0>::new();
        for bit in [true, false, false, true, false, true, true, false, true, true] {
            bits.push(bit);
        }
        let significant = bits.last_one().unwrap() + 1;
        pad_to_bytes(&mut bits);
        let envelope = bits.into_vec();
        assert_eq!(real_size(&envelope), significant);
        let big_endian = byte_reverse(&envelope);
        assert_eq!(real_size(&byte_reverse(&big_endian)), significant);
    }
}
