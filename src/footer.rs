//! Fixed-size trailing footer that makes a vault file self-describing.
//!
//! The footer is the last 28 bytes of a closed vault file:
//!
//! ```text
//! [magic "VULT" (4 ASCII bytes)]
//! [table_offset: u64 BE]  distance from end-of-file to the start of the
//!                         pointer table (spans table + footer)
//! [table_length: u64 BE]  serialized pointer-table length in bytes
//! [data_length: u64 BE]   high-water mark of the data region
//! ```
//!
//! Offsets are counted backward from end-of-file so the footer can be
//! located and decoded without knowing anything else about the file.

use crate::error::{Result, VaultError};

/// Magic bytes identifying a file as a vault
pub const MAGIC: [u8; 4] = *b"VULT";

/// Size of the encoded footer in bytes
pub const FOOTER_LEN: usize = 28;

/// Vault footer metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footer {
    /// Bytes from end-of-file to the start of the pointer table
    pub table_offset: u64,
    /// Length of the serialized pointer table in bytes
    pub table_length: u64,
    /// High-water mark of the data region, excluding table and footer
    pub data_length: u64,
}

impl Footer {
    /// Build a footer for a table of the given serialized length.
    ///
    /// `table_offset` is always `table_length + FOOTER_LEN`.
    pub fn for_table(table_length: u64, data_length: u64) -> Self {
        Footer {
            table_offset: table_length + FOOTER_LEN as u64,
            table_length,
            data_length,
        }
    }

    /// Serialize the footer to its fixed 28-byte form
    pub fn to_bytes(&self) -> [u8; FOOTER_LEN] {
        let mut bytes = [0u8; FOOTER_LEN];
        bytes[0..4].copy_from_slice(&MAGIC);
        bytes[4..12].copy_from_slice(&self.table_offset.to_be_bytes());
        bytes[12..20].copy_from_slice(&self.table_length.to_be_bytes());
        bytes[20..28].copy_from_slice(&self.data_length.to_be_bytes());
        bytes
    }

    /// Deserialize a footer from the last 28 bytes of a vault file
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < FOOTER_LEN {
            return Err(VaultError::CorruptFooter(format!(
                "need {} bytes, got {}",
                FOOTER_LEN,
                bytes.len()
            )));
        }

        if bytes[0..4] != MAGIC {
            return Err(VaultError::InvalidMagic);
        }

        let mut buf = [0u8; 8];
        buf.copy_from_slice(&bytes[4..12]);
        let table_offset = u64::from_be_bytes(buf);
        buf.copy_from_slice(&bytes[12..20]);
        let table_length = u64::from_be_bytes(buf);
        buf.copy_from_slice(&bytes[20..28]);
        let data_length = u64::from_be_bytes(buf);

        if table_offset != table_length + FOOTER_LEN as u64 {
            return Err(VaultError::CorruptFooter(format!(
                "table offset {} does not match table length {} + {}",
                table_offset, table_length, FOOTER_LEN
            )));
        }

        Ok(Footer {
            table_offset,
            table_length,
            data_length,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_footer_round_trip() {
        let footer = Footer::for_table(117, 4096);
        let bytes = footer.to_bytes();
        assert_eq!(bytes.len(), FOOTER_LEN);

        let decoded = Footer::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, footer);
        assert_eq!(decoded.table_offset, 117 + 28);
        assert_eq!(decoded.data_length, 4096);
    }

    #[test]
    fn test_footer_big_endian_layout() {
        let footer = Footer::for_table(1, 2);
        let bytes = footer.to_bytes();
        assert_eq!(&bytes[0..4], b"VULT");
        // 29 = 1 + 28, big-endian in bytes 4..12
        assert_eq!(bytes[11], 29);
        assert_eq!(bytes[19], 1);
        assert_eq!(bytes[27], 2);
    }

    #[test]
    fn test_invalid_magic() {
        let mut bytes = Footer::for_table(0, 0).to_bytes();
        bytes[0..4].copy_from_slice(b"NOPE");
        assert!(matches!(
            Footer::from_bytes(&bytes),
            Err(VaultError::InvalidMagic)
        ));
    }

    #[test]
    fn test_truncated_footer() {
        let bytes = Footer::for_table(0, 0).to_bytes();
        assert!(matches!(
            Footer::from_bytes(&bytes[..27]),
            Err(VaultError::CorruptFooter(_))
        ));
    }

    #[test]
    fn test_inconsistent_offset() {
        let mut bytes = Footer::for_table(100, 0).to_bytes();
        // Corrupt the table_length field so offset no longer matches
        bytes[12..20].copy_from_slice(&50u64.to_be_bytes());
        assert!(matches!(
            Footer::from_bytes(&bytes),
            Err(VaultError::CorruptFooter(_))
        ));
    }
}
