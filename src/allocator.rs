//! First-fit free-space allocation over the vault's data region.
//!
//! The allocator owns the free list and the data region's high-water mark.
//! Allocation walks the free list in list order and consumes as many slots
//! as it takes to satisfy the request, splitting the final slot when it is
//! larger than the remaining need. When the free list runs out, the
//! shortfall is appended at the end of the data region and `data_length`
//! grows by exactly that amount.
//!
//! Freed extents are returned to the list verbatim. Adjacent free extents
//! are never coalesced, so a heavily churned vault fragments over time;
//! `data_length` never shrinks.

use crate::extent::Extent;

/// Free list plus data-region high-water mark
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreeSpace {
    /// Free extents in allocation order. First-fit behavior depends on this
    /// order, which is why it is a `Vec` and not a map.
    slots: Vec<Extent>,

    /// High-water mark of the data region. Monotonically non-decreasing.
    data_length: u64,
}

impl FreeSpace {
    /// Free space of a brand-new vault: nothing freed, nothing written
    pub fn empty() -> Self {
        Self::default()
    }

    /// Restore free space from a decoded table and footer
    pub fn new(slots: Vec<Extent>, data_length: u64) -> Self {
        FreeSpace { slots, data_length }
    }

    pub fn data_length(&self) -> u64 {
        self.data_length
    }

    /// Free extents in allocation order
    pub fn slots(&self) -> &[Extent] {
        &self.slots
    }

    /// Total reusable bytes currently on the free list
    pub fn free_bytes(&self) -> u64 {
        self.slots.iter().map(|slot| slot.length).sum()
    }

    /// Allocate `requested` bytes, possibly growing the data region.
    ///
    /// Returns the extents to write into, in concatenation order. Slots are
    /// consumed first-fit: a slot smaller than the remaining need is used
    /// whole, a slot at least as large is split and its leftover tail goes
    /// back on the free list.
    pub fn allocate(&mut self, requested: u64) -> Vec<Extent> {
        let mut result = Vec::new();
        if requested == 0 {
            return result;
        }

        let mut written = 0u64;
        while !self.slots.is_empty() {
            let slot = self.slots[0];
            let need = requested - written;

            if slot.length >= need {
                result.push(Extent::new(slot.offset, need));
                self.slots.remove(0);
                if slot.length > need {
                    self.slots.push(Extent::new(slot.offset + need, slot.length - need));
                }
                return result;
            }

            // Slot is too small: consume it whole and keep walking
            result.push(slot);
            self.slots.remove(0);
            written += slot.length;
        }

        let shortfall = requested - written;
        result.push(Extent::new(self.data_length, shortfall));
        self.data_length += shortfall;
        result
    }

    /// Return freed extents to the free list verbatim: no merge, no sort
    pub fn reclaim(&mut self, extents: Vec<Extent>) {
        self.slots.extend(extents);
    }
}
