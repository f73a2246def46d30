//! CRC32 framing checksum for file store records
//!
//! The checksum covers the length prefix and the key/value body. A record
//! whose checksum does not match is never returned to a caller.

use crc32fast::Hasher;

/// Computes the CRC32 (IEEE) of the given byte slices, in order.
pub fn record_checksum(parts: &[&[u8]]) -> u32 {
    let mut hasher = Hasher::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_input_matches_contiguous() {
        let whole = record_checksum(&[b"VW:KEY001:1{\"version\":1}"]);
        let split = record_checksum(&[b"VW:KEY001:1", b"{\"version\":1}"]);
        assert_eq!(whole, split);
    }

    #[test]
    fn test_single_bit_flip_changes_checksum() {
        let mut data = b"VW:KEY002:__meta__".to_vec();
        let original = record_checksum(&[&data]);
        data[3] ^= 0x01;
        assert_ne!(original, record_checksum(&[&data]));
    }
}
