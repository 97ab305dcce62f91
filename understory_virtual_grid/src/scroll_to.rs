// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolving scroll-to-item requests into scroll positions.
//!
//! Positions returned here are absolute: the distance from the top of line 0
//! to the viewport's leading edge. They rely on the line heights from line 0
//! up to the target being known, so callers measure that range first.

use crate::{GridItemSize, GridLayoutInfo};

/// How to align an item when scrolling to it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScrollAlign {
    /// Align the item's leading edge with the viewport's leading edge.
    #[default]
    Start,
    /// Center the item within the viewport.
    Center,
    /// Align the item's trailing edge with the viewport's trailing edge.
    End,
    /// Move just enough to bring the item into view.
    Auto,
    /// Do not move.
    None,
}

impl GridLayoutInfo {
    /// Position of the leading edge of `line`, relative to the viewport.
    ///
    /// Unknown lines between the start line and `line` count as zero.
    #[must_use]
    pub fn item_top_pos(&self, line: usize, main_gap: f32) -> f32 {
        let start = self.start_main_line;
        if line >= start {
            self.current_offset + self.height_in_range(start, line, main_gap)
        } else {
            self.current_offset - self.height_in_range(line, start, main_gap)
        }
    }

    /// Position of the trailing edge of an item on `line` spanning `rows` lines.
    #[must_use]
    pub fn item_bottom_pos(&self, line: usize, rows: usize, main_gap: f32) -> f32 {
        self.item_top_pos(line, main_gap) + self.height_in_range(line, line + rows, main_gap)
            - main_gap
    }

    /// Distance from the top of `line` to the center of an item spanning `rows` lines.
    #[must_use]
    pub fn find_item_center(&self, line: usize, rows: usize, main_gap: f32) -> f32 {
        let len = self.height_in_range(line, line + rows.max(1), main_gap) - main_gap;
        len.max(0.0) / 2.0
    }

    fn span_of(&self, item: usize) -> Option<(usize, GridItemSize)> {
        let pos = self.item_pos(item)?;
        let span = self.matrix().item_span(pos)?;
        Some((pos.line, span))
    }

    /// Resolves [`ScrollAlign::Auto`] for `item` spanning `rows` lines.
    ///
    /// Returns [`ScrollAlign::None`] when the item is fully visible or covers
    /// the whole viewport; otherwise the edge it sticks out of, or the side of
    /// the window it lies on.
    #[must_use]
    pub fn transform_auto_scroll_align(
        &self,
        item: usize,
        rows: usize,
        main_size: f32,
        main_gap: f32,
    ) -> ScrollAlign {
        if (self.start_index..=self.end_index).contains(&item)
            && let Some(line) = self.find_in_matrix(item)
        {
            let top = self.item_top_pos(line, main_gap);
            let bottom = self.item_bottom_pos(line, rows, main_gap);
            if top <= 0.0 && bottom >= main_size {
                return ScrollAlign::None;
            }
            if top < 0.0 {
                return ScrollAlign::Start;
            }
            if bottom > main_size {
                return ScrollAlign::End;
            }
            return ScrollAlign::None;
        }
        if item > self.end_index {
            ScrollAlign::End
        } else {
            ScrollAlign::Start
        }
    }

    /// Target scroll position for `item` in an irregular grid.
    ///
    /// Returns `None` if the item is not in the matrix or no move is needed.
    #[must_use]
    pub fn animate_pos_irregular(
        &self,
        item: usize,
        align: ScrollAlign,
        main_size: f32,
        main_gap: f32,
    ) -> Option<f32> {
        let (line, span) = self.span_of(item)?;
        let align = match align {
            ScrollAlign::Auto => {
                self.transform_auto_scroll_align(item, span.rows, main_size, main_gap)
            }
            other => other,
        };
        self.aligned_pos(line, span.rows, align, main_size, main_gap)
    }

    /// Target scroll position for `item`.
    ///
    /// [`ScrollAlign::Auto`] compares the item's lines with the window:
    /// strictly inside means no move; on the start or end line it moves only
    /// when the item is cut off; otherwise it aligns to the nearer edge.
    #[must_use]
    pub fn grid_item_animate_pos(
        &self,
        item: usize,
        align: ScrollAlign,
        main_size: f32,
        main_gap: f32,
    ) -> Option<f32> {
        let (line, span) = self.span_of(item)?;
        let align = if align == ScrollAlign::Auto {
            self.auto_align_by_line(line, span.rows, main_size, main_gap)
        } else {
            align
        };
        self.aligned_pos(line, span.rows, align, main_size, main_gap)
    }

    fn auto_align_by_line(
        &self,
        line: usize,
        rows: usize,
        main_size: f32,
        main_gap: f32,
    ) -> ScrollAlign {
        let last = line + rows - 1;
        let (start, end) = (self.start_main_line, self.end_main_line);
        if line > start && last < end {
            return ScrollAlign::None;
        }
        if line >= start && last <= end {
            let top = self.item_top_pos(line, main_gap);
            let bottom = self.item_bottom_pos(line, rows, main_gap);
            if top >= 0.0 && bottom <= main_size {
                return ScrollAlign::None;
            }
        }
        if line <= start {
            ScrollAlign::Start
        } else {
            ScrollAlign::End
        }
    }

    fn aligned_pos(
        &self,
        line: usize,
        rows: usize,
        align: ScrollAlign,
        main_size: f32,
        main_gap: f32,
    ) -> Option<f32> {
        let top = self.total_height_from_zero_index(line, main_gap);
        match align {
            ScrollAlign::Start => Some(top),
            ScrollAlign::Center => Some(
                (top + self.find_item_center(line, rows, main_gap) - main_size / 2.0).max(0.0),
            ),
            ScrollAlign::End => {
                let bottom = self.total_height_from_zero_index(line + rows, main_gap) - main_gap;
                Some((bottom - main_size).max(0.0))
            }
            ScrollAlign::Auto | ScrollAlign::None => None,
        }
    }

    /// Scroll position that puts the end of the content at the end of the viewport.
    #[must_use]
    pub fn bottom_edge_pos(&self, main_size: f32, main_gap: f32) -> f32 {
        (self.irregular_content_height(main_gap) - main_size).max(0.0)
    }
}
