// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Incremental placement and measurement of grid items.

use core::fmt;

use smallvec::SmallVec;
use tracing::warn;

use crate::{
    FillParameters, FillResult, GridCell, GridItemSize, GridLayoutInfo, GridPos, ItemMeasure,
    ItemSpans,
};

/// Position of the fill cursor. `cross == None` means "before the first slot of `line`".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Cursor {
    line: usize,
    cross: Option<usize>,
}

/// Extends the occupancy matrix and the line height table of a [`GridLayoutInfo`].
///
/// A filler is built for a single operation and owns its cursor, so a fill
/// never leaks cursor state into the next one.
///
/// Placement is strictly in item order. Each item goes to the first line, at
/// or after the anchor line of the previous item, that has a free rectangle of
/// its size; within that line the leftmost fitting slot wins.
///
/// Matrix-only operations need [`ItemSpans`]; measuring ones need
/// [`ItemMeasure`].
///
/// A line gets a height only once every item touching it has been measured
/// and no further item can be placed on it. Until then the shares of the
/// measured items are kept pending, and range sums treat the line as unknown.
pub struct GridIrregularFiller<'a, S> {
    info: &'a mut GridLayoutInfo,
    items: S,
    pos: Cursor,
}

impl<S> fmt::Debug for GridIrregularFiller<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridIrregularFiller")
            .field("info", &self.info)
            .field("pos", &self.pos)
            .finish_non_exhaustive()
    }
}

impl<'a, S: ItemSpans> GridIrregularFiller<'a, S> {
    /// Creates a filler over `info`, sizing items through `items`.
    pub fn new(info: &'a mut GridLayoutInfo, items: S) -> Self {
        Self {
            info,
            items,
            pos: Cursor::default(),
        }
    }

    /// The layout state being filled.
    #[must_use]
    pub fn info(&self) -> &GridLayoutInfo {
        self.info
    }

    fn is_degenerate(&self) -> bool {
        self.info.cross_count == 0 || self.info.children_count == 0
    }

    fn item_size(&self, index: usize) -> GridItemSize {
        let cross_count = self.info.cross_count;
        self.items.item_size(index, cross_count).clamped(cross_count)
    }

    /// Puts the cursor before `line` and returns the first item to visit from there.
    fn init_pos(&mut self, line: usize) -> usize {
        self.pos = Cursor { line, cross: None };
        let matrix = self.info.matrix();
        if let Some(first) = matrix.first_anchor_in_line(line) {
            return first;
        }
        matrix.find_end_idx(line).map_or(0, |end| end.item + 1)
    }

    /// Puts the cursor on the last item anchored at or before `line` and returns it.
    fn init_pos_to_last_item(&mut self, line: usize) -> Option<usize> {
        match self.info.find_end_idx(line) {
            Some(end) => {
                self.pos = Cursor {
                    line: end.line,
                    cross: Some(end.cross),
                };
                Some(end.item)
            }
            None => {
                self.pos = Cursor {
                    line: self.info.matrix().first_line().unwrap_or(0),
                    cross: None,
                };
                None
            }
        }
    }

    /// Moves the cursor one cell in row-major order; `false` once it hits an empty cell.
    fn advance_pos(&mut self) -> bool {
        let next = self.pos.cross.map_or(0, |c| c + 1);
        let (line, cross) = if next >= self.info.cross_count {
            (self.pos.line + 1, 0)
        } else {
            (self.pos.line, next)
        };
        self.pos = Cursor {
            line,
            cross: Some(cross),
        };
        !self.info.matrix().is_free(line, cross)
    }

    /// Looks for the anchor of `target` at or after the cursor.
    ///
    /// On success the cursor sits on the anchor. On failure it is back on the
    /// line it started from, ready for [`fill_one`](Self::fill_one).
    fn find_next_item(&mut self, target: usize) -> bool {
        let start_line = self.pos.line;
        while self.advance_pos() {
            let Cursor { line, cross } = self.pos;
            let hit = cross
                .and_then(|c| self.info.matrix().cell(line, c))
                .is_some_and(|cell| cell.is_anchor_of(target));
            if hit {
                return true;
            }
        }

        // Walking cell by cell stops at gaps left by wide items; scan rows instead.
        let mut found = None;
        for (line, cells) in self.info.matrix().range(start_line..) {
            if let Some((&cross, _)) = cells.iter().find(|(_, cell)| cell.is_anchor_of(target)) {
                found = Some(GridPos::new(line, cross));
                break;
            }
            if cells.values().any(|cell| cell.anchor && cell.item > target) {
                break;
            }
        }
        match found {
            Some(pos) => {
                self.pos = Cursor {
                    line: pos.line,
                    cross: Some(pos.cross),
                };
                true
            }
            None => {
                self.pos.line = start_line;
                false
            }
        }
    }

    fn fits(&self, line: usize, cross: usize, size: GridItemSize) -> bool {
        let matrix = self.info.matrix();
        (line..line + size.rows)
            .all(|l| (cross..cross + size.columns).all(|c| matrix.is_free(l, c)))
    }

    /// Places `index` at the first free spot at or after the cursor line.
    fn fill_one(&mut self, index: usize) {
        let size = self.item_size(index);
        let slots = self.info.cross_count - size.columns;
        let mut line = self.pos.line;
        loop {
            if let Some(cross) = (0..=slots).find(|&c| self.fits(line, c, size)) {
                self.info
                    .matrix_mut()
                    .place(index, GridPos::new(line, cross), size);
                self.pos = Cursor {
                    line,
                    cross: Some(cross),
                };
                return;
            }
            line += 1;
        }
    }

    /// Anchor line of the last placed item, or `None` once every item is placed.
    ///
    /// Placement never goes above the previous anchor line, so lines before
    /// the returned one can no longer receive items.
    fn open_line(&self) -> Option<usize> {
        let matrix = self.info.matrix();
        let end = matrix.find_end_idx(matrix.last_line()?)?;
        (end.item + 1 < self.info.children_count).then_some(end.line)
    }

    /// Publishes pending lines that are closed and whose occupants are all measured.
    fn settle_lines(&mut self) {
        let open = self.open_line();
        let cross_count = self.info.cross_count;
        let (matrix, heights) = (self.info.matrix(), self.info.line_heights());
        let ready: SmallVec<[usize; 8]> = heights
            .pending_lines()
            .filter(|&line| {
                matrix.line(line).is_some_and(|cells| {
                    let closed = open.is_none_or(|open| line < open) || cells.len() == cross_count;
                    closed && cells.values().all(|c| heights.has_contribution(line, c.item))
                })
            })
            .collect();
        let heights = self.info.line_heights_mut();
        for line in ready {
            heights.commit(line);
        }
    }

    /// Places every item up to and including `target` without measuring.
    ///
    /// Returns the line holding `target`.
    pub fn fill_matrix_only(&mut self, target: usize) -> Option<usize> {
        if self.is_degenerate() {
            return None;
        }
        let target = target.min(self.info.children_count - 1);
        let last_line = self.info.matrix().last_line().unwrap_or(0);
        let mut next = self.init_pos_to_last_item(last_line).map_or(0, |i| i + 1);
        while next <= target {
            if !self.find_next_item(next) {
                self.fill_one(next);
            }
            next += 1;
        }
        self.info.find_in_matrix(target)
    }

    /// Places items from `starting_line` until the cursor reaches `target_line`, without measuring.
    ///
    /// Returns the last item visited.
    pub fn fill_matrix_by_line(
        &mut self,
        starting_line: usize,
        target_line: usize,
    ) -> Option<usize> {
        if self.is_degenerate() {
            return None;
        }
        let mut next = self.init_pos(starting_line);
        let mut last = next.checked_sub(1);
        while self.pos.line < target_line && next < self.info.children_count {
            if !self.find_next_item(next) {
                self.fill_one(next);
            }
            last = Some(next);
            next += 1;
        }
        last
    }
}

impl<S: ItemMeasure> GridIrregularFiller<'_, S> {
    /// Places and measures items from `starting_line` until `target_len` is covered.
    ///
    /// The length counts whole lines plus the gaps between them. The fill
    /// stops as soon as a completed line brings the length to `target_len`;
    /// the item that opened the next line is placed but not measured.
    pub fn fill(
        &mut self,
        params: &FillParameters,
        target_len: f32,
        starting_line: usize,
    ) -> FillResult {
        if self.is_degenerate() {
            return FillResult::default();
        }
        let children = self.info.children_count;
        let mut next = self.init_pos(starting_line);
        let mut len = -params.main_gap;
        let mut row = starting_line;
        while next < children {
            let idx = next;
            next += 1;
            if !self.find_next_item(idx) {
                self.fill_one(idx);
            }
            self.settle_lines();
            if self.update_length(&mut len, target_len, &mut row, self.pos.line, params.main_gap) {
                return FillResult {
                    length: len,
                    end_main_line: row,
                    end_index: idx.saturating_sub(1),
                };
            }
            self.measure_if_needed(params, idx);
        }

        let Some(last_row) = self.info.line_heights().last_line() else {
            return FillResult::default();
        };
        self.update_length(&mut len, target_len, &mut row, last_row + 1, params.main_gap);
        FillResult {
            length: len,
            end_main_line: last_row,
            end_index: children - 1,
        }
    }

    /// Places and measures items from `starting_line` through `target_idx`.
    ///
    /// Returns the line of the last item measured.
    pub fn fill_to_target(
        &mut self,
        params: &FillParameters,
        target_idx: usize,
        starting_line: usize,
    ) -> Option<usize> {
        if self.is_degenerate() {
            return None;
        }
        let target = target_idx.min(self.info.children_count - 1);
        let mut next = self.init_pos(starting_line);
        while next <= target {
            if !self.find_next_item(next) {
                self.fill_one(next);
            }
            self.settle_lines();
            self.measure_if_needed(params, next);
            next += 1;
        }
        Some(self.pos.line)
    }

    /// Measures lines from `starting_line` toward line 0 until `target_len` is covered.
    ///
    /// Every item touching a visited line is measured once, from its anchor.
    /// Lines that already have a height are only added to the length.
    /// `end_main_line` of the result is the topmost line visited and
    /// `end_index` the smallest item touching it.
    pub fn measure_backward(
        &mut self,
        params: &FillParameters,
        target_len: f32,
        starting_line: usize,
    ) -> FillResult {
        if self.is_degenerate() {
            return FillResult::default();
        }
        let mut result = FillResult {
            end_main_line: starting_line,
            ..FillResult::default()
        };
        for line in (0..=starting_line).rev() {
            if !self.measure_line(params, line) {
                break;
            }
            result.length += self.info.line_heights().get(line).unwrap_or(0.0) + params.main_gap;
            result.end_main_line = line;
            if result.length >= target_len {
                break;
            }
        }
        result.end_index = self
            .info
            .matrix()
            .min_item_in_line(result.end_main_line)
            .unwrap_or(0);
        result
    }

    /// Measures every line in `[target_line, starting_line]`, walking backward.
    pub fn measure_backward_to_target(
        &mut self,
        params: &FillParameters,
        target_line: usize,
        starting_line: usize,
    ) {
        if self.is_degenerate() {
            return;
        }
        for line in (target_line..=starting_line).rev() {
            if !self.measure_line(params, line) {
                return;
            }
        }
    }

    /// Makes `line` self-consistent before it is used for positioning.
    ///
    /// Items reaching into `line` from above that have not been measured yet
    /// are measured from their top row, together with everything in between.
    pub fn measure_line_with_irregulars(&mut self, params: &FillParameters, line: usize) {
        if line == 0 || self.is_degenerate() {
            return;
        }
        let matrix = self.info.matrix();
        let heights = self.info.line_heights();
        let Some(cells) = matrix.line(line) else {
            return;
        };
        let top = cells
            .iter()
            .filter(|(_, cell)| !cell.anchor && !heights.has_contribution(line, cell.item))
            .filter_map(|(&cross, _)| matrix.find_anchor(GridPos::new(line, cross)))
            .map(|anchor| anchor.line)
            .min();
        if let Some(top) = top {
            self.measure_backward_to_target(params, top, line);
        }
    }

    /// Measures the unmeasured items on `line`; `false` if the line is not in the matrix.
    fn measure_line(&mut self, params: &FillParameters, line: usize) -> bool {
        let Some(cells) = self.info.matrix().line(line) else {
            warn!(line, "matrix line missing during backward measurement");
            return false;
        };
        if self.info.line_heights().contains(line) {
            return true;
        }
        let cells: SmallVec<[(usize, GridCell); 8]> =
            cells.iter().map(|(&cross, &cell)| (cross, cell)).collect();
        for (cross, cell) in cells {
            if self.info.line_heights().has_contribution(line, cell.item) {
                continue;
            }
            let Some(anchor) = self.info.matrix().find_anchor(GridPos::new(line, cross)) else {
                warn!(item = cell.item, line, "anchor of a covered cell is missing");
                continue;
            };
            self.measure_item(params, cell.item, anchor);
        }
        self.settle_lines();
        true
    }

    /// Measures the item under the cursor unless it was measured before.
    fn measure_if_needed(&mut self, params: &FillParameters, index: usize) {
        let anchor = GridPos::new(self.pos.line, self.pos.cross.unwrap_or(0));
        if !self.info.line_heights().has_contribution(anchor.line, index) {
            self.measure_item(params, index, anchor);
            self.settle_lines();
        }
    }

    /// Measures `index` and spreads its extent over the lines it spans.
    fn measure_item(&mut self, params: &FillParameters, index: usize, anchor: GridPos) {
        let size = self.item_size(index);
        let cross_len = params.cross_len(anchor.cross, size.columns);
        let extent = self.items.measure(index, cross_len);
        let per_line = (extent - params.main_gap * (size.rows - 1) as f32) / size.rows as f32;
        let heights = self.info.line_heights_mut();
        for line in anchor.line..anchor.line + size.rows {
            heights.contribute(line, index, per_line);
        }
    }

    /// Adds lines `[row, bound)` to `len`; `true` once `len >= target_len`.
    ///
    /// On `true`, `row` is the line that reached the target.
    fn update_length(
        &self,
        len: &mut f32,
        target_len: f32,
        row: &mut usize,
        bound: usize,
        main_gap: f32,
    ) -> bool {
        while *row < bound {
            match self.info.line_heights().get(*row) {
                Some(h) => {
                    *len += h + main_gap;
                    if *len >= target_len {
                        return true;
                    }
                }
                None => warn!(line = *row, "line filled but not measured"),
            }
            *row += 1;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::GridIrregularFiller;
    use crate::{
        FillParameters, FillResult, GridCell, GridItemSize, GridLayoutInfo, GridLayoutOptions,
        GridPos, ItemMeasure, ItemSpans,
    };

    /// Measures every item as `extents[index]` (or `default`) and records calls.
    struct Stub {
        options: GridLayoutOptions,
        default: f32,
        extents: Vec<(usize, f32)>,
        calls: Vec<usize>,
    }

    impl Stub {
        fn new(options: GridLayoutOptions, default: f32) -> Self {
            Self {
                options,
                default,
                extents: Vec::new(),
                calls: Vec::new(),
            }
        }
    }

    impl ItemSpans for Stub {
        fn item_size(&self, index: usize, cross_count: usize) -> GridItemSize {
            self.options.item_size(index, cross_count)
        }
    }

    impl ItemMeasure for Stub {
        fn measure(&mut self, index: usize, _cross_len: f32) -> f32 {
            self.calls.push(index);
            self.extents
                .iter()
                .find(|(i, _)| *i == index)
                .map_or(self.default, |&(_, e)| e)
        }
    }

    fn params(cross: usize) -> FillParameters {
        FillParameters::uniform(cross, 100.0, 0.0, 10.0)
    }

    fn tall_first(rows: usize) -> GridLayoutOptions {
        GridLayoutOptions::new()
            .with_irregular_indexes([0])
            .with_size_fn(move |_| GridItemSize::new(rows, 1))
    }

    #[test]
    fn fill_places_regular_items_row_by_row() {
        let mut info = GridLayoutInfo::new(3, 10);
        let mut stub = Stub::new(GridLayoutOptions::new(), 100.0);
        let res = GridIrregularFiller::new(&mut info, &mut stub).fill(&params(3), 1000.0, 0);
        assert_eq!(
            res,
            FillResult {
                length: 430.0,
                end_main_line: 3,
                end_index: 9
            }
        );
        assert_eq!(info.matrix().line_count(), 4);
        assert_eq!(info.matrix().line(3).map(|l| l.len()), Some(1));
        assert_eq!(info.line_heights().get(3), Some(100.0));
        assert_eq!(stub.calls, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn fill_is_idempotent() {
        let mut info = GridLayoutInfo::new(3, 10);
        let mut stub = Stub::new(GridLayoutOptions::new(), 100.0);
        let first = GridIrregularFiller::new(&mut info, &mut stub).fill(&params(3), 1000.0, 0);
        let (matrix, heights) = (info.matrix().clone(), info.line_heights().clone());
        let second = GridIrregularFiller::new(&mut info, &mut stub).fill(&params(3), 1000.0, 0);
        assert_eq!(first, second);
        assert_eq!(info.matrix(), &matrix);
        assert_eq!(info.line_heights(), &heights);
        // Nothing is measured twice.
        assert_eq!(stub.calls.len(), 10);
    }

    #[test]
    fn fill_stops_once_target_is_covered() {
        let mut info = GridLayoutInfo::new(3, 10);
        let mut stub = Stub::new(GridLayoutOptions::new(), 100.0);
        let res = GridIrregularFiller::new(&mut info, &mut stub).fill(&params(3), 150.0, 0);
        assert_eq!(
            res,
            FillResult {
                length: 210.0,
                end_main_line: 1,
                end_index: 5
            }
        );
        // Item 6 opened line 2 but was not measured.
        assert!(info.matrix().contains_line(2));
        assert!(!info.line_heights().contains(2));
        assert_eq!(stub.calls.len(), 6);
    }

    #[test]
    fn tall_item_takes_first_free_column() {
        let mut info = GridLayoutInfo::new(2, 3);
        let opts = GridLayoutOptions::new()
            .with_irregular_indexes([1])
            .with_size_fn(|_| GridItemSize::new(2, 1));
        let line = GridIrregularFiller::new(&mut info, &opts).fill_matrix_only(2);
        assert_eq!(line, Some(1));
        let m = info.matrix();
        assert_eq!(m.cell(0, 0), Some(GridCell::anchor(0)));
        assert_eq!(m.cell(0, 1), Some(GridCell::anchor(1)));
        assert_eq!(m.cell(1, 1), Some(GridCell::covered(1)));
        assert_eq!(m.cell(1, 0), Some(GridCell::anchor(2)));
    }

    #[test]
    fn wide_item_opens_a_new_line() {
        // Item 2 spans two columns and does not fit beside item 1, so it opens
        // line 1. Item 3 follows it there and (0, 2) stays empty.
        let mut info = GridLayoutInfo::new(3, 4);
        let opts = GridLayoutOptions::new()
            .with_irregular_indexes([2])
            .with_size_fn(|_| GridItemSize::new(1, 2));
        GridIrregularFiller::new(&mut info, &opts).fill_matrix_only(3);
        let m = info.matrix();
        assert_eq!(info.item_pos(0), Some(GridPos::new(0, 0)));
        assert_eq!(info.item_pos(1), Some(GridPos::new(0, 1)));
        assert_eq!(info.item_pos(2), Some(GridPos::new(1, 0)));
        assert_eq!(m.cell(1, 1), Some(GridCell::covered(2)));
        assert_eq!(info.item_pos(3), Some(GridPos::new(1, 2)));
        assert!(m.is_free(0, 2));
    }

    #[test]
    fn placement_never_moves_above_predecessor() {
        // Item 1 spans both columns and opens line 1, leaving (0, 1) empty.
        // Later items never search above their predecessor's line.
        let mut info = GridLayoutInfo::new(2, 4);
        let opts = GridLayoutOptions::new()
            .with_irregular_indexes([1])
            .with_size_fn(|_| GridItemSize::new(1, 2));
        GridIrregularFiller::new(&mut info, &opts).fill_matrix_only(3);
        assert_eq!(info.item_pos(1), Some(GridPos::new(1, 0)));
        assert_eq!(info.item_pos(2), Some(GridPos::new(2, 0)));
        assert_eq!(info.item_pos(3), Some(GridPos::new(2, 1)));
        assert!(info.matrix().is_free(0, 1));

        // A second pass finds every item in place.
        let before = info.matrix().clone();
        let line = GridIrregularFiller::new(&mut info, &opts).fill_matrix_by_line(0, 3);
        assert_eq!(info.matrix(), &before);
        assert_eq!(line, Some(3));
    }

    #[test]
    fn every_filled_item_is_anchored_once() {
        let mut info = GridLayoutInfo::new(3, 30);
        let opts = GridLayoutOptions::new()
            .with_irregular_indexes([2, 5, 11, 17])
            .with_size_fn(|i| GridItemSize::new(1 + i % 3, 1 + i % 2));
        GridIrregularFiller::new(&mut info, &opts).fill_matrix_only(29);
        for item in 0..30 {
            let anchors = info
                .matrix()
                .iter()
                .flat_map(|(_, cells)| cells.values())
                .filter(|cell| cell.is_anchor_of(item))
                .count();
            assert_eq!(anchors, 1, "item {item}");
            let pos = info.item_pos(item).unwrap();
            assert_eq!(info.matrix().cell(pos.line, pos.cross), Some(GridCell::anchor(item)));
            let span = info.matrix().item_span(pos).unwrap();
            assert_eq!(span, opts.item_size(item, 3).clamped(3), "item {item}");
        }
    }

    #[test]
    fn fill_matrix_by_line_is_idempotent() {
        let mut info = GridLayoutInfo::new(3, 10);
        let opts = GridLayoutOptions::new();
        let first = GridIrregularFiller::new(&mut info, &opts).fill_matrix_by_line(0, 2);
        let before = info.matrix().clone();
        let second = GridIrregularFiller::new(&mut info, &opts).fill_matrix_by_line(0, 2);
        assert_eq!(first, Some(6));
        assert_eq!(first, second);
        assert_eq!(info.matrix(), &before);
        assert!(info.line_heights().is_empty());
    }

    #[test]
    fn fill_to_target_measures_through_target() {
        let mut info = GridLayoutInfo::new(3, 10);
        let mut stub = Stub::new(GridLayoutOptions::new(), 80.0);
        let line =
            GridIrregularFiller::new(&mut info, &mut stub).fill_to_target(&params(3), 7, 0);
        assert_eq!(line, Some(2));
        assert_eq!(stub.calls, (0..=7).collect::<Vec<_>>());
        // Line 2 still waits for item 8.
        assert_eq!(info.line_heights().len(), 2);
        assert!(!info.line_heights().contains(2));
    }

    #[test]
    fn measure_backward_measures_each_item_once() {
        let mut info = GridLayoutInfo::new(3, 10);
        GridIrregularFiller::new(&mut info, &GridLayoutOptions::new()).fill_matrix_only(9);
        let mut stub = Stub::new(GridLayoutOptions::new(), 100.0);
        let res =
            GridIrregularFiller::new(&mut info, &mut stub).measure_backward(&params(3), 250.0, 3);
        assert_eq!(
            res,
            FillResult {
                length: 330.0,
                end_main_line: 1,
                end_index: 3
            }
        );
        assert_eq!(stub.calls, [9, 6, 7, 8, 3, 4, 5]);
        assert!(!info.line_heights().contains(0));
    }

    #[test]
    fn backward_measure_reaches_tall_items_from_their_top() {
        let mut info = GridLayoutInfo::new(2, 5);
        let opts = tall_first(3);
        GridIrregularFiller::new(&mut info, &opts).fill_matrix_only(4);
        assert_eq!(info.item_pos(3), Some(GridPos::new(2, 1)));
        assert_eq!(info.item_pos(4), Some(GridPos::new(3, 0)));

        let mut stub = Stub::new(tall_first(3), 50.0);
        stub.extents.push((0, 320.0));
        GridIrregularFiller::new(&mut info, &mut stub).measure_backward_to_target(&params(2), 1, 2);
        assert_eq!(stub.calls, [0, 3, 2]);
        // 320 spread over three lines with two gaps of 10.
        for line in 1..3 {
            assert_eq!(info.line_heights().get(line), Some(100.0), "line {line}");
        }
        // Item 1 shares line 0 and has not been measured.
        assert_eq!(info.line_heights().get(0), None);
    }

    #[test]
    fn measure_line_with_irregulars_walks_up_to_anchor() {
        let mut info = GridLayoutInfo::new(2, 5);
        GridIrregularFiller::new(&mut info, &tall_first(3)).fill_matrix_only(4);
        let mut stub = Stub::new(tall_first(3), 50.0);
        GridIrregularFiller::new(&mut info, &mut stub)
            .measure_line_with_irregulars(&params(2), 2);
        assert_eq!(stub.calls, [0, 3, 2, 1]);

        let mut stub = Stub::new(tall_first(3), 50.0);
        GridIrregularFiller::new(&mut info, &mut stub)
            .measure_line_with_irregulars(&params(2), 0);
        assert!(stub.calls.is_empty());
    }

    #[test]
    fn partly_measured_lines_stay_unknown() {
        let mut info = GridLayoutInfo::new(2, 6);
        let mut stub = Stub::new(tall_first(3), 200.0);
        stub.extents.push((0, 320.0));
        let res = GridIrregularFiller::new(&mut info, &mut stub).fill(&params(2), 150.0, 0);
        assert_eq!(
            res,
            FillResult {
                length: 200.0,
                end_main_line: 0,
                end_index: 1
            }
        );
        assert_eq!(stub.calls, [0, 1]);
        assert_eq!(info.line_heights().get(0), Some(200.0));
        // Item 0 reaches lines 1 and 2, but items 2 and 3 are unmeasured.
        assert_eq!(info.matrix().cell(1, 1), Some(GridCell::anchor(2)));
        assert_eq!(info.line_heights().get(1), None);
        assert_eq!(info.line_heights().get(2), None);

        let res = GridIrregularFiller::new(&mut info, &mut stub).fill(&params(2), 1000.0, 0);
        assert_eq!(stub.calls, (0..6).collect::<Vec<_>>());
        for line in 0..4 {
            assert_eq!(info.line_heights().get(line), Some(200.0), "line {line}");
        }
        assert!((res.length - 830.0).abs() < 1e-3);
    }

    #[test]
    fn measured_lines_are_not_measured_again() {
        let mut info = GridLayoutInfo::new(2, 6);
        let mut stub = Stub::new(tall_first(3), 50.0);
        GridIrregularFiller::new(&mut info, &mut stub).fill(&params(2), 1000.0, 0);
        assert_eq!(info.line_heights().len(), 4);

        let mut stub = Stub::new(tall_first(3), 50.0);
        GridIrregularFiller::new(&mut info, &mut stub)
            .measure_line_with_irregulars(&params(2), 2);
        assert!(stub.calls.is_empty());

        let res =
            GridIrregularFiller::new(&mut info, &mut stub).measure_backward(&params(2), 1000.0, 3);
        assert!(stub.calls.is_empty());
        assert_eq!(res.end_main_line, 0);
        // Known lines still count toward the length.
        assert!((res.length - 4.0 * 60.0).abs() < 1e-3);
    }

    #[test]
    fn backward_measure_skips_items_measured_forward() {
        // Stopping early leaves lines 1 and 2 waiting on items 2 and 3.
        let mut info = GridLayoutInfo::new(2, 6);
        let mut stub = Stub::new(tall_first(3), 200.0);
        stub.extents.push((0, 320.0));
        GridIrregularFiller::new(&mut info, &mut stub).fill(&params(2), 150.0, 0);
        GridIrregularFiller::new(&mut info, &stub.options).fill_matrix_only(5);

        let mut stub = Stub::new(tall_first(3), 200.0);
        // Item 0 already spread its extent over line 2.
        GridIrregularFiller::new(&mut info, &mut stub)
            .measure_line_with_irregulars(&params(2), 2);
        assert!(stub.calls.is_empty());

        GridIrregularFiller::new(&mut info, &mut stub)
            .measure_backward_to_target(&params(2), 1, 2);
        assert_eq!(stub.calls, [3, 2]);
        assert_eq!(info.line_heights().get(1), Some(200.0));
        assert_eq!(info.line_heights().get(2), Some(200.0));
    }

    #[test]
    fn unmeasured_covered_lines_count_as_zero() {
        // One column: item 0 covers lines 0..3 and is never measured.
        let mut info = GridLayoutInfo::new(1, 2);
        GridIrregularFiller::new(&mut info, &tall_first(3)).fill_matrix_only(1);
        let mut stub = Stub::new(tall_first(3), 70.0);
        let res = GridIrregularFiller::new(&mut info, &mut stub).fill(&params(1), 1000.0, 1);
        assert_eq!(
            res,
            FillResult {
                length: 70.0,
                end_main_line: 3,
                end_index: 1
            }
        );
        assert_eq!(stub.calls, [1]);
    }

    #[test]
    fn zero_cross_count_places_nothing() {
        let mut info = GridLayoutInfo::new(0, 10);
        let mut stub = Stub::new(GridLayoutOptions::new(), 100.0);
        let mut filler = GridIrregularFiller::new(&mut info, &mut stub);
        assert_eq!(filler.fill(&params(0), 100.0, 0), FillResult::default());
        assert_eq!(filler.fill_matrix_only(5), None);
        assert_eq!(filler.fill_matrix_by_line(0, 3), None);
        assert_eq!(filler.fill_to_target(&params(0), 5, 0), None);
        assert!(info.matrix().is_empty());
        assert!(stub.calls.is_empty());
    }
}
