//! Pointer table model and its on-disk codec.
//!
//! The pointer table maps each entry name to the ordered extents holding its
//! compressed bytes. On disk it is a self-contained binary blob, all integers
//! big-endian:
//!
//! ```text
//! [entry_count: u32]
//! per entry:
//!   [name_len: u16][name: UTF-8 bytes]
//!   [extent_count: u32]
//!   per extent: [offset: u64][length: u64]
//! ```
//!
//! The reserved name `?empty` encodes the free list and is always written
//! first. `?` cannot appear in a file name on Windows, so the sentinel can
//! never collide with a captured entry. Decoding is pure data: it never
//! executes anything from the input.

use crate::error::{Result, VaultError};
use crate::extent::Extent;
use std::collections::BTreeMap;

/// Reserved pointer-table name holding the free list
pub const FREE_LIST: &str = "?empty";

/// In-memory pointer table: entry name -> ordered extents.
///
/// The free list is not stored here; it lives in
/// [`FreeSpace`](crate::allocator::FreeSpace) so that its iteration order is
/// explicit. The codec in this module joins the two for the on-disk form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointerTable {
    entries: BTreeMap<String, Vec<Extent>>,
}

impl PointerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, not counting the free list
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the table holds no entries besides the free list
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Extents of an entry, in concatenation order
    pub fn get(&self, name: &str) -> Option<&[Extent]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    /// Record extents for an entry.
    ///
    /// If the entry already exists the extents are appended to its list,
    /// which is how an entry grows incrementally.
    pub fn insert_extents(&mut self, name: &str, extents: Vec<Extent>) {
        self.entries
            .entry(name.to_owned())
            .or_default()
            .extend(extents);
    }

    /// Remove an entry, returning its extents
    pub fn remove(&mut self, name: &str) -> Option<Vec<Extent>> {
        self.entries.remove(name)
    }

    /// Sum of extent lengths for an entry (its compressed size)
    pub fn size_of(&self, name: &str) -> Option<u64> {
        self.entries
            .get(name)
            .map(|extents| extents.iter().map(|e| e.length).sum())
    }

    /// Iterate entries in table order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Extent])> {
        self.entries
            .iter()
            .map(|(name, extents)| (name.as_str(), extents.as_slice()))
    }
}

/// Serialize a pointer table plus free list to the on-disk form.
///
/// The free list is written first under the `?empty` sentinel, then each
/// entry in table order, so identical state always encodes to identical
/// bytes.
pub fn encode(table: &PointerTable, free: &[Extent]) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();

    let count = table.len() as u64 + 1;
    let count = u32::try_from(count)
        .map_err(|_| VaultError::CorruptTable(format!("too many entries: {}", count)))?;
    bytes.extend_from_slice(&count.to_be_bytes());

    encode_entry(&mut bytes, FREE_LIST, free)?;
    for (name, extents) in table.iter() {
        encode_entry(&mut bytes, name, extents)?;
    }

    Ok(bytes)
}

fn encode_entry(bytes: &mut Vec<u8>, name: &str, extents: &[Extent]) -> Result<()> {
    let name_len = u16::try_from(name.len())
        .map_err(|_| VaultError::CorruptTable(format!("entry name too long: {} bytes", name.len())))?;
    bytes.extend_from_slice(&name_len.to_be_bytes());
    bytes.extend_from_slice(name.as_bytes());

    let extent_count = u32::try_from(extents.len()).map_err(|_| {
        VaultError::CorruptTable(format!("too many extents for \"{}\": {}", name, extents.len()))
    })?;
    bytes.extend_from_slice(&extent_count.to_be_bytes());
    for extent in extents {
        bytes.extend_from_slice(&extent.offset.to_be_bytes());
        bytes.extend_from_slice(&extent.length.to_be_bytes());
    }

    Ok(())
}

/// Deserialize the on-disk form back into a pointer table and free list
pub fn decode(bytes: &[u8]) -> Result<(PointerTable, Vec<Extent>)> {
    let mut cursor = Cursor { bytes, pos: 0 };

    let entry_count = cursor.read_u32()?;
    let mut table = PointerTable::new();
    let mut free: Option<Vec<Extent>> = None;

    for _ in 0..entry_count {
        let name_len = cursor.read_u16()? as usize;
        let name_bytes = cursor.read_slice(name_len)?;
        let name = std::str::from_utf8(name_bytes)
            .map_err(|_| VaultError::CorruptTable("entry name is not valid UTF-8".into()))?
            .to_owned();

        let extent_count = cursor.read_u32()?;
        let mut extents = Vec::with_capacity(extent_count.min(4096) as usize);
        for _ in 0..extent_count {
            let offset = cursor.read_u64()?;
            let length = cursor.read_u64()?;
            extents.push(Extent::new(offset, length));
        }

        if name == FREE_LIST {
            if free.is_some() {
                return Err(VaultError::CorruptTable("duplicate free-list entry".into()));
            }
            free = Some(extents);
        } else {
            if table.contains(&name) {
                return Err(VaultError::CorruptTable(format!(
                    "duplicate entry name \"{}\"",
                    name
                )));
            }
            table.insert_extents(&name, extents);
        }
    }

    let free = free.ok_or_else(|| VaultError::CorruptTable("missing free-list entry".into()))?;
    Ok((table, free))
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn read_slice(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| VaultError::CorruptTable("unexpected end of table data".into()))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u16(&mut self) -> Result<u16> {
        let slice = self.read_slice(2)?;
        Ok(u16::from_be_bytes([slice[0], slice[1]]))
    }

    fn read_u32(&mut self) -> Result<u32> {
        let slice = self.read_slice(4)?;
        Ok(u32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]]))
    }

    fn read_u64(&mut self) -> Result<u64> {
        let slice = self.read_slice(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(slice);
        Ok(u64::from_be_bytes(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table_round_trip() {
        let table = PointerTable::new();
        let bytes = encode(&table, &[]).unwrap();

        let (decoded, free) = decode(&bytes).unwrap();
        assert!(decoded.is_empty());
        assert!(free.is_empty());
    }

    #[test]
    fn test_table_round_trip() {
        let mut table = PointerTable::new();
        table.insert_extents("a.txt", vec![Extent::new(0, 13)]);
        table.insert_extents("b.bin", vec![Extent::new(13, 7), Extent::new(100, 20)]);
        let free = vec![Extent::new(20, 80)];

        let bytes = encode(&table, &free).unwrap();
        let (decoded, decoded_free) = decode(&bytes).unwrap();

        assert_eq!(decoded, table);
        assert_eq!(decoded_free, free);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let mut table = PointerTable::new();
        table.insert_extents("z", vec![Extent::new(5, 5)]);
        table.insert_extents("a", vec![Extent::new(0, 5)]);
        let free = vec![Extent::new(10, 2)];

        assert_eq!(encode(&table, &free).unwrap(), encode(&table, &free).unwrap());
    }

    #[test]
    fn test_free_list_order_preserved() {
        // Free-list order drives first-fit allocation, so the codec must not
        // reorder it
        let table = PointerTable::new();
        let free = vec![Extent::new(50, 10), Extent::new(0, 10), Extent::new(30, 5)];

        let bytes = encode(&table, &free).unwrap();
        let (_, decoded_free) = decode(&bytes).unwrap();
        assert_eq!(decoded_free, free);
    }

    #[test]
    fn test_truncated_input() {
        let mut table = PointerTable::new();
        table.insert_extents("a.txt", vec![Extent::new(0, 13)]);
        let bytes = encode(&table, &[]).unwrap();

        for len in 0..bytes.len() {
            assert!(
                matches!(decode(&bytes[..len]), Err(VaultError::CorruptTable(_))),
                "decode of {} bytes should fail",
                len
            );
        }
    }

    #[test]
    fn test_missing_free_list() {
        // A table whose only entry is a normal one, no sentinel
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u32.to_be_bytes());
        bytes.extend_from_slice(&1u16.to_be_bytes());
        bytes.push(b'a');
        bytes.extend_from_slice(&0u32.to_be_bytes());

        assert!(matches!(
            decode(&bytes),
            Err(VaultError::CorruptTable(_))
        ));
    }

    #[test]
    fn test_invalid_utf8_name() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u32.to_be_bytes());
        bytes.extend_from_slice(&2u16.to_be_bytes());
        bytes.extend_from_slice(&[0xff, 0xfe]);
        bytes.extend_from_slice(&0u32.to_be_bytes());

        assert!(matches!(
            decode(&bytes),
            Err(VaultError::CorruptTable(_))
        ));
    }

    #[test]
    fn test_entry_extension() {
        let mut table = PointerTable::new();
        table.insert_extents("grow.bin", vec![Extent::new(0, 10)]);
        table.insert_extents("grow.bin", vec![Extent::new(50, 5)]);

        assert_eq!(
            table.get("grow.bin"),
            Some(&[Extent::new(0, 10), Extent::new(50, 5)][..])
        );
        assert_eq!(table.size_of("grow.bin"), Some(15));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_size_of_missing_entry() {
        let table = PointerTable::new();
        assert_eq!(table.size_of("nope"), None);
    }
}
