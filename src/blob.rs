//! Blob codec: zlib compression of entry payloads.
//!
//! Every captured payload is compressed before allocation, so an entry's
//! extents always hold compressed bytes and `get_size_of` reports compressed
//! sizes. Decompression of corrupt input fails outright; there is no partial
//! recovery.

use crate::error::{Result, VaultError};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Compress a payload with zlib at the default level
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Decompress a zlib payload, failing with a decode error on corrupt input
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| VaultError::Decode(e.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let data = b"Hello, World! ".repeat(100);
        let compressed = compress(&data).unwrap();
        let decompressed = decompress(&compressed).unwrap();

        assert_eq!(data.as_slice(), decompressed.as_slice());
        assert!(compressed.len() < data.len());
    }

    #[test]
    fn test_empty_payload() {
        let compressed = compress(b"").unwrap();
        assert!(!compressed.is_empty()); // zlib header + empty stream
        assert_eq!(decompress(&compressed).unwrap(), b"");
    }

    #[test]
    fn test_corrupt_input_is_a_decode_error() {
        let mut compressed = compress(b"some payload that matters").unwrap();
        let mid = compressed.len() / 2;
        compressed[mid] ^= 0xff;
        compressed.truncate(mid + 1);

        assert!(matches!(
            decompress(&compressed),
            Err(VaultError::Decode(_))
        ));
    }

    #[test]
    fn test_garbage_input_is_a_decode_error() {
        assert!(matches!(
            decompress(&[0xde, 0xad, 0xbe, 0xef]),
            Err(VaultError::Decode(_))
        ));
    }
}
