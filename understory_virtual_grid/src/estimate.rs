// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Content size and position estimates.
//!
//! Two code paths exist, selected by [`GridFlags::BIG_ITEM`](crate::GridFlags::BIG_ITEM):
//!
//! - Regular grids average per *line*: every line holds `cross_count` items,
//!   so the number of lines is exact and only unknown heights are estimated.
//! - Irregular grids average per *item*: the known height is divided by the
//!   number of items the known lines hold, then scaled to the remaining items.

use crate::GridLayoutInfo;

impl GridLayoutInfo {
    /// Estimated main-axis extent of the whole content.
    #[must_use]
    pub fn content_height(&self, main_gap: f32) -> f32 {
        if self.has_big_item() {
            self.irregular_content_height(main_gap)
        } else {
            self.regular_content_height(main_gap)
        }
    }

    /// Content height of a grid whose items are all 1×1.
    #[must_use]
    pub fn regular_content_height(&self, main_gap: f32) -> f32 {
        if self.cross_count == 0 || self.children_count == 0 || self.line_heights().is_empty() {
            return 0.0;
        }
        let lines = self.children_count.div_ceil(self.cross_count);
        let (known, sum) = self
            .line_heights()
            .range(..lines)
            .fold((0_usize, 0.0_f32), |(n, s), (_, h)| (n + 1, s + h));
        let unknown = lines.saturating_sub(known);
        sum + unknown as f32 * self.average_line_height() + (lines - 1) as f32 * main_gap
    }

    /// Content height estimated from the average height per item.
    #[must_use]
    pub fn irregular_content_height(&self, main_gap: f32) -> f32 {
        if self.cross_count == 0 || self.children_count == 0 {
            return 0.0;
        }
        let heights = self.line_heights();
        let (Some(first), Some(last)) = (heights.first_line(), heights.last_line()) else {
            return 0.0;
        };
        let known_sum = heights.total(main_gap);
        let items = self.find_item_count(first, last);
        if items == 0 {
            return known_sum - main_gap;
        }
        let rest = self.children_count.saturating_sub(items);
        known_sum - main_gap + rest as f32 * known_sum / items as f32
    }

    /// Estimated distance already scrolled past.
    ///
    /// Exact when every line before the start line is known. Otherwise it is
    /// estimated per item (irregular grids) or per line (regular grids).
    #[must_use]
    pub fn content_offset(&self, main_gap: f32) -> f32 {
        if self.cross_count == 0 || self.line_heights().is_empty() {
            return 0.0;
        }
        let start = self.start_main_line;
        let before = if self.line_heights().known_in(0, start) == start {
            self.height_in_range(0, start, main_gap)
        } else if self.has_big_item() {
            self.start_index as f32 * self.average_item_height(main_gap)
        } else {
            start as f32 * (self.average_line_height() + main_gap)
        };
        before - self.current_offset
    }

    /// Number of items in the inclusive line range.
    #[must_use]
    pub fn find_item_count(&self, start_line: usize, end_line: usize) -> usize {
        self.matrix().item_count(start_line, end_line)
    }

    /// Known height per item, gaps included, over all known lines.
    #[must_use]
    pub fn average_item_height(&self, main_gap: f32) -> f32 {
        let heights = self.line_heights();
        let (Some(first), Some(last)) = (heights.first_line(), heights.last_line()) else {
            return 0.0;
        };
        let items = self.find_item_count(first, last);
        if items == 0 {
            return 0.0;
        }
        heights.total(main_gap) / items as f32
    }

    /// Distance from the end of the content to the end of the viewport.
    ///
    /// Returns `f32::INFINITY` until the last item is inside the window, since
    /// the end of the content is unknown before then. Treat that value as
    /// "unknown, do not clamp", not as a real distance.
    #[must_use]
    pub fn distance_to_bottom(&self, main_size: f32, height_in_view: f32) -> f32 {
        if self.line_heights().is_empty() || self.end_index + 1 < self.children_count {
            return f32::INFINITY;
        }
        self.current_offset + height_in_view - main_size
    }

    /// Total height of the lines in `[start_main_line, end_main_line]`.
    #[must_use]
    pub fn total_height_of_items_in_view(&self, main_gap: f32) -> f32 {
        let lines = self
            .line_heights()
            .known_in(self.start_main_line, self.end_main_line + 1);
        if lines == 0 {
            return 0.0;
        }
        self.height_in_range(self.start_main_line, self.end_main_line + 1, main_gap) - main_gap
    }

    /// Returns `true` if the known lines, gaps included, are shorter than `other`.
    #[must_use]
    pub fn height_sum_smaller(&self, other: f32, main_gap: f32) -> bool {
        let mut rest = other + main_gap;
        for (_, h) in self.line_heights().iter() {
            rest -= h + main_gap;
            if rest <= 0.0 {
                return false;
            }
        }
        true
    }

    /// The content start has been dragged past the viewport start.
    #[must_use]
    pub fn is_out_of_start(&self) -> bool {
        self.reach_start && self.current_offset > 0.0
    }

    /// The content end has been dragged past the viewport end.
    #[must_use]
    pub fn is_out_of_end(&self, main_gap: f32) -> bool {
        if self.reach_start && self.current_offset >= 0.0 {
            return false;
        }
        if self.children_count == 0 || self.end_index + 1 != self.children_count {
            return false;
        }
        self.current_offset + self.total_height_of_items_in_view(main_gap) < self.last_main_size
    }
}

#[cfg(test)]
mod tests {
    use crate::{GridFlags, GridItemSize, GridLayoutInfo, GridPos};

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() <= 1e-3
    }

    fn regular(cross: usize, children: usize, known_lines: usize, h: f32) -> GridLayoutInfo {
        let mut info = GridLayoutInfo::new(cross, children);
        for i in 0..(known_lines * cross).min(children) {
            info.matrix_mut()
                .place(i, GridPos::new(i / cross, i % cross), GridItemSize::ONE);
        }
        for line in 0..known_lines {
            info.line_heights_mut().set(line, h);
        }
        info
    }

    /// Five known lines holding six items, of 20 total.
    fn wide_items() -> GridLayoutInfo {
        let mut info = GridLayoutInfo::new(2, 20);
        info.set_flags(GridFlags::BIG_ITEM);
        let m = info.matrix_mut();
        m.place(0, GridPos::new(0, 0), GridItemSize::new(1, 2));
        m.place(1, GridPos::new(1, 0), GridItemSize::new(1, 2));
        m.place(2, GridPos::new(2, 0), GridItemSize::new(1, 2));
        m.place(3, GridPos::new(3, 0), GridItemSize::ONE);
        m.place(4, GridPos::new(3, 1), GridItemSize::ONE);
        m.place(5, GridPos::new(4, 0), GridItemSize::new(1, 2));
        for line in 0..5 {
            info.line_heights_mut().set(line, 50.0);
        }
        info
    }

    #[test]
    fn regular_height_is_exact_when_all_lines_known() {
        let info = regular(3, 10, 4, 100.0);
        assert!(approx_eq(info.content_height(10.0), 430.0));
    }

    #[test]
    fn regular_height_fills_unknown_lines_with_average() {
        // 10 lines, 2 known at 100.
        let info = regular(2, 20, 2, 100.0);
        assert!(approx_eq(info.content_height(10.0), 1000.0 + 90.0));
    }

    #[test]
    fn irregular_height_averages_per_item() {
        let info = wide_items();
        assert_eq!(info.find_item_count(0, 4), 6);
        assert!(approx_eq(info.content_height(10.0), 990.0));
    }

    #[test]
    fn full_line_counts_cross_count_items() {
        let info = regular(4, 16, 2, 10.0);
        assert_eq!(info.find_item_count(1, 1), 4);
    }

    #[test]
    fn zero_cross_count_is_neutral() {
        let mut info = wide_items();
        info.cross_count = 0;
        assert!(approx_eq(info.content_height(10.0), 0.0));
        assert!(approx_eq(info.content_offset(10.0), 0.0));
        assert_eq!(info.find_in_matrix(3), None);
        assert_eq!(info.item_pos(3), None);
    }

    #[test]
    fn content_offset_is_exact_with_known_prefix() {
        let mut info = wide_items();
        info.start_main_line = 3;
        info.start_index = 3;
        info.current_offset = -20.0;
        assert!(approx_eq(info.content_offset(10.0), 200.0));
    }

    #[test]
    fn content_offset_estimates_per_item_after_eviction() {
        let mut info = wide_items();
        info.clear_maps_from_start(2);
        info.start_main_line = 3;
        info.start_index = 3;
        // Three known lines (2..5) hold items 2..=5: 180 / 4 per item.
        assert!(approx_eq(info.content_offset(10.0), 3.0 * 45.0));
    }

    #[test]
    fn distance_to_bottom_is_unknown_before_the_end() {
        let mut info = regular(3, 10, 4, 100.0);
        info.end_index = 5;
        assert!(info.distance_to_bottom(300.0, 430.0).is_infinite());
        info.end_index = 9;
        info.current_offset = -50.0;
        assert!(approx_eq(info.distance_to_bottom(300.0, 430.0), 80.0));
    }

    #[test]
    fn items_in_view_and_height_sum() {
        let mut info = regular(3, 10, 4, 100.0);
        info.start_main_line = 1;
        info.end_main_line = 2;
        assert!(approx_eq(info.total_height_of_items_in_view(10.0), 210.0));
        assert!(info.height_sum_smaller(500.0, 10.0));
        assert!(!info.height_sum_smaller(430.0, 10.0));
    }

    #[test]
    fn out_of_bounds_checks() {
        let mut info = regular(3, 10, 4, 100.0);
        info.reach_start = true;
        info.current_offset = 15.0;
        assert!(info.is_out_of_start());
        assert!(!info.is_out_of_end(10.0));

        info.reach_start = false;
        info.current_offset = -200.0;
        info.start_main_line = 0;
        info.end_main_line = 3;
        info.end_index = 9;
        info.last_main_size = 300.0;
        assert!(info.is_out_of_end(10.0));
    }
}
