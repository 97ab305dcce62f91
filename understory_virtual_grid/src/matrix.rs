// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sparse occupancy matrix: main-axis line → (cross slot → [`GridCell`]).
//!
//! The matrix only ever holds a contiguous range of lines. Forward fills
//! append at the end of that range, and eviction trims either end. Within the
//! range, anchors appear in non-decreasing item order as the line index grows.
//! Inside a single line they may appear in any column order, because a later
//! item can fill a gap to the left of an earlier, wider one.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::ops::RangeBounds;

use crate::{EndIndexInfo, GridCell, GridItemSize, GridPos};

/// Cells of one main-axis line, keyed by cross slot.
pub type GridLine = BTreeMap<usize, GridCell>;

fn line_max(line: &GridLine) -> Option<usize> {
    line.values().map(|cell| cell.item).max()
}

fn line_min(line: &GridLine) -> Option<usize> {
    line.values().map(|cell| cell.item).min()
}

fn anchor_slot(line: &GridLine, item: usize) -> Option<usize> {
    line.iter()
        .find(|(_, cell)| cell.is_anchor_of(item))
        .map(|(&cross, _)| cross)
}

/// Sparse 2-level ordered map recording which item occupies which cell.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GridMatrix {
    lines: BTreeMap<usize, GridLine>,
}

impl GridMatrix {
    /// Creates an empty matrix.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: BTreeMap::new(),
        }
    }

    /// Returns `true` if no line has been filled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of filled lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Removes every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Returns the cells of `line`, if that line has been filled.
    #[must_use]
    pub fn line(&self, line: usize) -> Option<&GridLine> {
        self.lines.get(&line)
    }

    /// Returns `true` if `line` has been filled.
    #[must_use]
    pub fn contains_line(&self, line: usize) -> bool {
        self.lines.contains_key(&line)
    }

    /// Returns the cell at `(line, cross)`.
    #[must_use]
    pub fn cell(&self, line: usize, cross: usize) -> Option<GridCell> {
        self.lines.get(&line)?.get(&cross).copied()
    }

    /// Returns `true` if nothing occupies `(line, cross)`.
    #[must_use]
    pub fn is_free(&self, line: usize, cross: usize) -> bool {
        self.cell(line, cross).is_none()
    }

    /// Writes a single cell.
    pub fn set(&mut self, line: usize, cross: usize, cell: GridCell) {
        self.lines.entry(line).or_default().insert(cross, cell);
    }

    /// Writes the full rectangle of `item` anchored at `pos`.
    pub fn place(&mut self, item: usize, pos: GridPos, size: GridItemSize) {
        for line in pos.line..pos.line + size.rows.max(1) {
            for cross in pos.cross..pos.cross + size.columns.max(1) {
                self.set(line, cross, GridCell::covered(item));
            }
        }
        self.set(pos.line, pos.cross, GridCell::anchor(item));
    }

    /// First filled line.
    #[must_use]
    pub fn first_line(&self) -> Option<usize> {
        self.lines.keys().next().copied()
    }

    /// Last filled line (the fill frontier).
    #[must_use]
    pub fn last_line(&self) -> Option<usize> {
        self.lines.keys().next_back().copied()
    }

    /// Iterates filled lines in ascending order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (usize, &GridLine)> {
        self.lines.iter().map(|(&idx, line)| (idx, line))
    }

    /// Iterates filled lines within `range` in ascending order.
    pub fn range<R: RangeBounds<usize>>(
        &self,
        range: R,
    ) -> impl DoubleEndedIterator<Item = (usize, &GridLine)> {
        self.lines.range(range).map(|(&idx, line)| (idx, line))
    }

    /// Largest item index touching `line`, anchored or covered.
    #[must_use]
    pub fn max_item_in_line(&self, line: usize) -> Option<usize> {
        self.lines.get(&line).and_then(line_max)
    }

    /// Smallest item index touching `line`, anchored or covered.
    #[must_use]
    pub fn min_item_in_line(&self, line: usize) -> Option<usize> {
        self.lines.get(&line).and_then(line_min)
    }

    /// Smallest item index anchored on `line`.
    #[must_use]
    pub fn first_anchor_in_line(&self, line: usize) -> Option<usize> {
        self.lines
            .get(&line)?
            .values()
            .filter(|cell| cell.anchor)
            .map(|cell| cell.item)
            .min()
    }

    /// Finds the highest-indexed item anchored at or before `end_line`.
    ///
    /// Used to resume filling from the last known item.
    #[must_use]
    pub fn find_end_idx(&self, end_line: usize) -> Option<EndIndexInfo> {
        self.lines.range(..=end_line).rev().find_map(|(&line, cells)| {
            cells
                .iter()
                .filter(|(_, cell)| cell.anchor)
                .max_by_key(|(_, cell)| cell.item)
                .map(|(&cross, cell)| EndIndexInfo {
                    item: cell.item,
                    line,
                    cross,
                })
        })
    }

    /// Locates the line holding the anchor of `item`.
    ///
    /// Binary search relies on the per-line maximum being non-decreasing,
    /// which only holds while every line is completely filled. When the
    /// search lands on a line without the anchor, lines are rescanned from
    /// the end until one is completely filled and entirely below `item`.
    #[must_use]
    pub fn find_in_matrix(&self, item: usize, cross_count: usize) -> Option<usize> {
        if cross_count == 0 {
            return None;
        }
        let first = self.first_line()?;
        let last = self.last_line()?;

        let (mut lo, mut hi) = (first, last + 1);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.max_item_in_line(mid).is_some_and(|max| item <= max) {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        if self
            .lines
            .get(&lo)
            .is_some_and(|cells| anchor_slot(cells, item).is_some())
        {
            return Some(lo);
        }
        self.search_in_reverse(item, cross_count)
    }

    fn search_in_reverse(&self, item: usize, cross_count: usize) -> Option<usize> {
        for (&line, cells) in self.lines.iter().rev() {
            if anchor_slot(cells, item).is_some() {
                return Some(line);
            }
            if cells.len() == cross_count && line_max(cells).is_some_and(|max| max < item) {
                break;
            }
        }
        None
    }

    /// Returns the anchor position of `item`.
    ///
    /// The returned position always holds the anchor cell, never a covered one.
    #[must_use]
    pub fn item_pos(&self, item: usize, cross_count: usize) -> Option<GridPos> {
        let line = self.find_in_matrix(item, cross_count)?;
        let cross = anchor_slot(self.lines.get(&line)?, item)?;
        Some(GridPos::new(line, cross))
    }

    /// Returns the anchor position of the item occupying `pos`.
    ///
    /// Walks up, then left, while the neighbouring cell belongs to the same item.
    #[must_use]
    pub fn find_anchor(&self, pos: GridPos) -> Option<GridPos> {
        let item = self.cell(pos.line, pos.cross)?.item;
        let same =
            |line: usize, cross: usize| self.cell(line, cross).is_some_and(|c| c.item == item);

        let mut cur = pos;
        while cur.line > 0 && same(cur.line - 1, cur.cross) {
            cur.line -= 1;
        }
        while cur.cross > 0 && same(cur.line, cur.cross - 1) {
            cur.cross -= 1;
        }
        self.cell(cur.line, cur.cross)
            .filter(|cell| cell.anchor)
            .map(|_| cur)
    }

    /// Span of the item anchored at `anchor`, read back from the matrix.
    #[must_use]
    pub fn item_span(&self, anchor: GridPos) -> Option<GridItemSize> {
        let item = self.cell(anchor.line, anchor.cross)?.item;
        let same =
            |line: usize, cross: usize| self.cell(line, cross).is_some_and(|c| c.item == item);
        let mut rows = 1;
        while same(anchor.line + rows, anchor.cross) {
            rows += 1;
        }
        let mut columns = 1;
        while same(anchor.line, anchor.cross + columns) {
            columns += 1;
        }
        Some(GridItemSize::new(rows, columns))
    }

    /// Returns `true` if some item occupies both `line - 1` and `line`.
    ///
    /// Cutting the matrix between those two lines would split that item.
    #[must_use]
    pub fn straddles(&self, line: usize) -> bool {
        if line == 0 {
            return false;
        }
        let (Some(above), Some(cells)) = (self.lines.get(&(line - 1)), self.lines.get(&line))
        else {
            return false;
        };
        cells.iter().any(|(cross, cell)| {
            !cell.anchor && above.get(cross).is_some_and(|up| up.item == cell.item)
        })
    }

    /// Counts items in the inclusive line range `[start_line, end_line]`.
    ///
    /// Absent boundary lines are replaced by the nearest present line inside
    /// the range. Returns `0` if the range holds no filled line.
    #[must_use]
    pub fn item_count(&self, start_line: usize, end_line: usize) -> usize {
        if start_line > end_line {
            return 0;
        }
        let mut present = self.lines.range(start_line..=end_line);
        let Some((_, first)) = present.next() else {
            return 0;
        };
        let last = present.next_back().map_or(first, |(_, cells)| cells);
        match (line_min(first), line_max(last)) {
            (Some(min), Some(max)) if max >= min => max - min + 1,
            _ => 0,
        }
    }

    /// Removes every line at or after `line`.
    pub(crate) fn truncate_from(&mut self, line: usize) {
        drop(self.lines.split_off(&line));
    }

    /// Removes every line before `line`.
    pub(crate) fn truncate_before(&mut self, line: usize) {
        self.lines = self.lines.split_off(&line);
    }

    /// Removes cells whose item is `>= threshold` on lines at or after `from_line`.
    ///
    /// Returns the lines that became empty and were dropped.
    pub(crate) fn clear_items_from(&mut self, threshold: usize, from_line: usize) -> Vec<usize> {
        let mut emptied = Vec::new();
        for (&line, cells) in self.lines.range_mut(from_line..) {
            cells.retain(|_, cell| cell.item < threshold);
            if cells.is_empty() {
                emptied.push(line);
            }
        }
        for line in &emptied {
            self.lines.remove(line);
        }
        emptied
    }
}
