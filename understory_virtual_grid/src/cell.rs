// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Value types shared by the occupancy matrix, the filler, and layout queries.

/// One occupied cell of the occupancy matrix.
///
/// Every item present in the matrix owns exactly one anchor cell (its top-left
/// corner) plus zero or more covered cells filling out its `rows × columns`
/// rectangle. Keeping the anchor flag separate from the index means item `0`
/// is handled like every other item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    /// Index of the item occupying this cell.
    pub item: usize,
    /// `true` if this cell is the item's top-left (anchor) cell.
    pub anchor: bool,
}

impl GridCell {
    /// Creates the anchor cell of `item`.
    #[must_use]
    pub const fn anchor(item: usize) -> Self {
        Self { item, anchor: true }
    }

    /// Creates a covered, non-anchor cell of `item`.
    #[must_use]
    pub const fn covered(item: usize) -> Self {
        Self {
            item,
            anchor: false,
        }
    }

    /// Returns `true` if this cell is the anchor of `item`.
    #[must_use]
    pub const fn is_anchor_of(self, item: usize) -> bool {
        self.anchor && self.item == item
    }
}

/// Span of an item in lines (main axis) and columns (cross axis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridItemSize {
    /// Number of main-axis lines the item spans.
    pub rows: usize,
    /// Number of cross-axis slots the item spans.
    pub columns: usize,
}

impl GridItemSize {
    /// Size of a regular item.
    pub const ONE: Self = Self {
        rows: 1,
        columns: 1,
    };

    /// Creates a new size.
    #[must_use]
    pub const fn new(rows: usize, columns: usize) -> Self {
        Self { rows, columns }
    }

    /// Clamps the size into a grid with `cross_count` slots per line.
    ///
    /// Rows are at least one; columns are clamped into `1..=cross_count`.
    #[must_use]
    pub fn clamped(self, cross_count: usize) -> Self {
        Self {
            rows: self.rows.max(1),
            columns: self.columns.clamp(1, cross_count.max(1)),
        }
    }
}

impl Default for GridItemSize {
    fn default() -> Self {
        Self::ONE
    }
}

/// A `(line, cross)` position inside the occupancy matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    /// Main-axis line index.
    pub line: usize,
    /// Cross-axis slot index.
    pub cross: usize,
}

impl GridPos {
    /// Creates a new position.
    #[must_use]
    pub const fn new(line: usize, cross: usize) -> Self {
        Self { line, cross }
    }
}

/// Result of [`GridMatrix::find_end_idx`](crate::GridMatrix::find_end_idx).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndIndexInfo {
    /// Highest item index anchored at or before the queried line.
    pub item: usize,
    /// Line of that item's anchor.
    pub line: usize,
    /// Cross slot of that item's anchor.
    pub cross: usize,
}
