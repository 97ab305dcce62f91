// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Converting a large one-shot scroll delta into a new anchor item.

use core::fmt;

use tracing::debug;

use crate::{GridIrregularFiller, GridLayoutInfo, ItemSpans};

/// Resolves a scroll delta, possibly spanning several screens, into an item index.
///
/// Unknown line heights are estimated from the lines already walked. Missing
/// lines are placed in the matrix without measuring, one at a time, so no
/// more of the matrix is filled than the delta needs.
pub struct GridDeltaConverter<'a, S> {
    info: &'a mut GridLayoutInfo,
    items: S,
}

impl<S> fmt::Debug for GridDeltaConverter<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridDeltaConverter")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

/// Rounds a non-negative ratio up without relying on float intrinsics.
fn ceil_ratio(num: f32, den: f32) -> usize {
    if num <= 0.0 || den <= 0.0 {
        return 0;
    }
    let ratio = num / den;
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Ratio is positive; saturation on overflow is acceptable for a line count"
    )]
    let whole = ratio as usize;
    if (whole as f32) < ratio { whole + 1 } else { whole }
}

impl<'a, S: ItemSpans> GridDeltaConverter<'a, S> {
    /// Creates a converter over `info`, sizing items through `items`.
    pub fn new(info: &'a mut GridLayoutInfo, items: S) -> Self {
        Self { info, items }
    }

    /// Returns the item to anchor the viewport at after scrolling by `delta`.
    ///
    /// A negative `delta` moves the content up (toward later items); zero or
    /// a positive `delta` moves it down (toward earlier items).
    pub fn convert_offset_to_idx(&mut self, delta: f32, main_gap: f32) -> usize {
        if self.info.cross_count == 0 || self.info.children_count == 0 {
            return 0;
        }
        let idx = if delta < 0.0 {
            self.skip_lines_forward(-delta, main_gap)
        } else {
            self.skip_lines_backward(delta, main_gap)
        };
        debug!(delta, idx, "converted scroll delta");
        idx
    }

    /// Height of `line`, or the mean of the `counted` lines walked so far.
    fn estimate(&self, line: usize, walked_heights: f32, counted: usize) -> f32 {
        if let Some(h) = self.info.line_heights().get(line) {
            return h;
        }
        if counted == 0 {
            self.info.average_line_height()
        } else {
            walked_heights / counted as f32
        }
    }

    /// Walks lines from the start line toward the end until `distance` is covered.
    fn skip_lines_forward(&mut self, distance: f32, main_gap: f32) -> usize {
        let last_item = self.info.children_count - 1;
        let mut line = self.info.start_main_line;
        let mut heights = 0.0_f32;
        let mut counted = 0_usize;
        let mut found = self.info.start_index;
        loop {
            if !self.info.matrix().contains_line(line) {
                let frontier = self.info.matrix().last_line().unwrap_or(line);
                GridIrregularFiller::new(&mut *self.info, &self.items)
                    .fill_matrix_by_line(frontier.min(line), line + 1);
                if !self.info.matrix().contains_line(line) {
                    return found;
                }
            }
            if let Some(end) = self.info.find_end_idx(line) {
                found = end.item;
            }
            heights += self.estimate(line, heights, counted);
            counted += 1;
            if heights + counted as f32 * main_gap >= distance || found >= last_item {
                return found;
            }
            line += 1;
        }
    }

    /// Walks lines from the end line toward line 0 until `delta` plus the
    /// visible range is covered.
    fn skip_lines_backward(&mut self, delta: f32, main_gap: f32) -> usize {
        let (start, end) = (self.info.start_main_line, self.info.end_main_line);
        let target = delta + self.info.height_in_range(start, end + 1, main_gap);
        let first_line = self.info.matrix().first_line().unwrap_or(0);
        let mut line = end;
        let mut heights = 0.0_f32;
        let mut counted = 0_usize;
        loop {
            heights += self.estimate(line, heights, counted);
            counted += 1;
            let walked = heights + counted as f32 * main_gap;
            if walked >= target || line == 0 {
                break;
            }
            if line == first_line {
                let per_line = walked / counted as f32;
                return self.extrapolate_before(first_line, target - walked, per_line);
            }
            line -= 1;
        }
        self.info.matrix().min_item_in_line(line).unwrap_or(0)
    }

    /// Estimates the item `remaining` before the first retained line.
    fn extrapolate_before(&self, first_line: usize, remaining: f32, per_line: f32) -> usize {
        let matrix = self.info.matrix();
        let first_item = matrix.min_item_in_line(first_line).unwrap_or(0);
        let retained = matrix.line_count().max(1);
        let items = matrix.item_count(first_line, matrix.last_line().unwrap_or(first_line));
        let per_line_items = (items / retained).max(1);
        let lines = ceil_ratio(remaining, per_line).min(first_line);
        first_item.saturating_sub(lines * per_line_items)
    }
}
