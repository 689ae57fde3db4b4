//! Shared row order and visibility state.
//!
//! One entry per row, doubling as the sort order and the filter result.
//! Entries are a plain `(row index, hidden flag)` struct pair, so sorting
//! reorders entries while each row's hidden status travels with it and the
//! two operations compose without clobbering each other.
//!
//! The rendering collaborators speak a packed integer per row — low 20 bits
//! row index, bit 20 hidden-by-filter — exposed through
//! [`OrderEntry::packed`] / [`OrderEntry::from_packed`].

/// Low 20 bits of the packed form: the row index.
pub const ROW_INDEX_MASK: u32 = 0x000F_FFFF;

/// Bit 20 of the packed form: hidden by the current filter.
pub const HIDDEN_FLAG: u32 = 1 << 20;

/// Maximum addressable row count.
pub const MAX_ROWS: usize = (ROW_INDEX_MASK as usize) + 1;

/// One row's position in the shared order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderEntry {
    /// Row index into the table's row array.
    pub row: u32,
    /// Hidden by the current filter.
    pub hidden: bool,
}

impl OrderEntry {
    /// Pack into the wire format consumed by rendering collaborators.
    pub fn packed(self) -> u32 {
        (self.row & ROW_INDEX_MASK) | if self.hidden { HIDDEN_FLAG } else { 0 }
    }

    /// Unpack from the wire format.
    pub fn from_packed(v: u32) -> Self {
        Self {
            row: v & ROW_INDEX_MASK,
            hidden: v & HIDDEN_FLAG != 0,
        }
    }
}

/// The shared order/visibility array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderVec {
    entries: Vec<OrderEntry>,
}

impl OrderVec {
    /// Identity order over `len` rows, all visible.
    pub fn identity(len: usize) -> Self {
        Self {
            entries: (0..len as u32)
                .map(|row| OrderEntry { row, hidden: false })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in current order.
    pub fn entries(&self) -> &[OrderEntry] {
        &self.entries
    }

    /// Mutable entries, for the sort comparator.
    pub fn entries_mut(&mut self) -> &mut [OrderEntry] {
        &mut self.entries
    }

    /// Clear every hidden flag: all rows visible.
    pub fn show_all(&mut self) {
        for entry in &mut self.entries {
            entry.hidden = false;
        }
    }

    /// Set one entry's hidden flag by position in the current order.
    pub fn set_hidden(&mut self, pos: usize, hidden: bool) {
        self.entries[pos].hidden = hidden;
    }

    /// Row indices currently visible, in order.
    pub fn visible_rows(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries
            .iter()
            .filter(|e| !e.hidden)
            .map(|e| e.row)
    }

    /// Packed wire form of the whole array.
    pub fn packed(&self) -> Vec<u32> {
        self.entries.iter().map(|e| e.packed()).collect()
    }

    /// Rebuild from the packed wire form.
    pub fn from_packed(packed: &[u32]) -> Self {
        Self {
            entries: packed.iter().map(|&v| OrderEntry::from_packed(v)).collect(),
        }
    }
}
