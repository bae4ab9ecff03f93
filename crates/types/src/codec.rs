// Path: crates/types/src/codec.rs

//! Defines the canonical, deterministic binary codec for all consensus-critical data.
//!
//! This module provides simple wrappers around `parity-scale-codec` (SCALE).
//! By centralizing the codec logic here in the base `types` crate, we ensure
//! that all components use the exact same serialization format for wire
//! transactions, preventing consensus failures due to different binary
//! representations of the same data.

use parity_scale_codec::{Decode, DecodeAll, Encode};

/// Encodes a value into a deterministic, canonical byte representation using SCALE codec.
///
/// This function should be used for all data that crosses the wire or is
/// included in a hash for signing or content addressing.
pub fn to_bytes_canonical<T: Encode>(v: &T) -> Result<Vec<u8>, String> {
    Ok(v.encode())
}

/// Decodes a value from a canonical byte representation using SCALE codec.
///
/// Fails fast on any decoding error, including trailing bytes. This is
/// critical for preventing two different byte strings from decoding to the
/// same transaction in a consensus context.
pub fn from_bytes_canonical<T: Decode>(b: &[u8]) -> Result<T, String> {
    T::decode_all(&mut &*b).map_err(|e| format!("canonical decode failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Encode, Decode, Debug, PartialEq, Eq)]
    struct TestStruct {
        id: u32,
        name: String,
        tags: Vec<u8>,
    }

    #[test]
    fn test_canonical_codec_roundtrip() {
        let original = TestStruct {
            id: 42,
            name: "test-data".to_string(),
            tags: vec![1, 2, 3],
        };

        let encoded = to_bytes_canonical(&original).unwrap();
        assert!(!encoded.is_empty());

        let decoded = from_bytes_canonical::<TestStruct>(&encoded).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_canonical_decode_rejects_trailing_bytes() {
        let original = TestStruct {
            id: 7,
            name: "x".to_string(),
            tags: vec![],
        };

        let mut encoded = to_bytes_canonical(&original).unwrap();
        encoded.push(0xff);

        let result = from_bytes_canonical::<TestStruct>(&encoded);
        assert!(result.is_err());
    }

    #[test]
    fn test_canonical_decode_failure() {
        let original = TestStruct {
            id: 99,
            name: "another-test".to_string(),
            tags: vec![10, 20, 30, 40, 50],
        };

        let mut encoded = to_bytes_canonical(&original).unwrap();
        encoded.pop();
        encoded.pop();

        let result = from_bytes_canonical::<TestStruct>(&encoded);
        assert!(result.is_err());
        let error_msg = result.unwrap_err();
        assert!(error_msg.contains("canonical decode failed"));
    }
}
