//! Byte ranges within the vault's data region.

/// A contiguous byte range in the data region.
///
/// Extents are the unit of space bookkeeping: every entry owns an ordered
/// sequence of extents, and the free list holds the extents of removed
/// entries. No two extents in a vault ever overlap, whether live or free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    /// Byte offset from the start of the data region
    pub offset: u64,
    /// Length in bytes
    pub length: u64,
}

impl Extent {
    pub fn new(offset: u64, length: u64) -> Self {
        Extent { offset, length }
    }

    /// First byte past the end of this extent
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }

    /// Check whether two extents share any byte. Zero-length extents hold
    /// no bytes and never overlap anything.
    pub fn overlaps(&self, other: &Extent) -> bool {
        self.length > 0
            && other.length > 0
            && self.offset < other.end()
            && other.offset < self.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_end() {
        let extent = Extent::new(10, 20);
        assert_eq!(extent.end(), 30);
    }

    #[test]
    fn test_extent_overlap() {
        let a = Extent::new(0, 10);
        let b = Extent::new(10, 10); // adjacent, not overlapping
        let c = Extent::new(5, 10);

        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
    }

    #[test]
    fn test_zero_length_extent_never_overlaps() {
        let empty = Extent::new(5, 0);
        let full = Extent::new(0, 10);
        assert!(!empty.overlaps(&full));
        assert!(!full.overlaps(&empty));
    }
}
