// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-grid layout state aggregate.

use tracing::debug;

use crate::{
    Axis, DragState, EndIndexInfo, GridFlags, GridLayoutOptions, GridMatrix, GridPos, LineHeights,
    ScrollAlign,
};

/// A pending jump request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JumpTarget {
    /// Jump to the given item.
    Index(usize),
    /// Jump to the last item.
    LastItem,
    /// Jump so that the end of the content meets the end of the viewport.
    BottomEdge,
}

impl JumpTarget {
    /// Item index this target refers to in a grid of `children_count` items.
    ///
    /// Returns `None` for an empty grid or an out-of-range index.
    #[must_use]
    pub fn resolve(self, children_count: usize) -> Option<usize> {
        let last = children_count.checked_sub(1)?;
        match self {
            Self::Index(idx) => (idx <= last).then_some(idx),
            Self::LastItem | Self::BottomEdge => Some(last),
        }
    }
}

/// Layout state of one virtualized grid.
///
/// A layout pass mutates the window fields directly, extends the occupancy
/// matrix and the line height table through a
/// [`GridIrregularFiller`](crate::GridIrregularFiller), then reads derived
/// values such as [`content_height`](Self::content_height).
///
/// After any external change (new offset, item count, viewport size) the
/// state is unsynced. The pass calls [`mark_synced`](Self::mark_synced) once
/// the window and heights agree with the offset again.
#[derive(Clone, Debug, Default)]
pub struct GridLayoutInfo {
    /// Scroll direction.
    pub axis: Axis,
    /// Slots per line along the cross axis.
    pub cross_count: usize,
    /// Number of items in the data source.
    pub children_count: usize,

    /// First item in the visible window.
    pub start_index: usize,
    /// Last item in the visible window.
    pub end_index: usize,
    /// First line in the visible window.
    pub start_main_line: usize,
    /// Last line in the visible window.
    pub end_main_line: usize,

    /// Offset of the start line's leading edge relative to the viewport's leading edge.
    ///
    /// Usually `<= 0`: the start line is partly scrolled out.
    pub current_offset: f32,
    /// `current_offset` of the previous pass.
    pub prev_offset: f32,
    /// Viewport main-axis size of the previous pass.
    pub last_main_size: f32,
    /// Extra space before the content, such as a header or a refresh indicator.
    pub extra_offset: Option<f32>,

    /// Pending jump request.
    pub jump_index: Option<JumpTarget>,
    /// Alignment of the pending jump.
    pub scroll_align: ScrollAlign,

    /// The start of the content is inside the viewport.
    pub reach_start: bool,
    /// The end of the content is inside the viewport.
    pub reach_end: bool,
    /// The end of the content is exactly at the end of the viewport.
    pub offset_end: bool,

    synced: bool,
    avg_line_height: f32,
    flags: GridFlags,
    matrix: GridMatrix,
    line_heights: LineHeights,
    pub(crate) drag: DragState,
}

impl GridLayoutInfo {
    /// Creates state for a regular grid.
    #[must_use]
    pub fn new(cross_count: usize, children_count: usize) -> Self {
        Self {
            cross_count,
            children_count,
            ..Self::default()
        }
    }

    /// Applies structural options: the axis and the capability flags.
    ///
    /// Flags are derived from the current `cross_count`, so set that first.
    pub fn apply_options(&mut self, options: &GridLayoutOptions) {
        self.axis = options.axis();
        self.flags = options.flags(self.cross_count);
    }

    /// Capability flags currently in effect.
    #[must_use]
    pub fn flags(&self) -> GridFlags {
        self.flags
    }

    /// Overrides the capability flags.
    pub fn set_flags(&mut self, flags: GridFlags) {
        self.flags = flags;
    }

    /// Some item spans more than one cell.
    #[must_use]
    pub fn has_big_item(&self) -> bool {
        self.flags.contains(GridFlags::BIG_ITEM)
    }

    /// Some item spans more than one line.
    #[must_use]
    pub fn has_multi_line_item(&self) -> bool {
        self.flags.contains(GridFlags::MULTI_LINE_ITEM)
    }

    /// The occupancy matrix.
    #[must_use]
    pub fn matrix(&self) -> &GridMatrix {
        &self.matrix
    }

    /// Mutable access to the occupancy matrix.
    pub fn matrix_mut(&mut self) -> &mut GridMatrix {
        &mut self.matrix
    }

    /// The line height table.
    #[must_use]
    pub fn line_heights(&self) -> &LineHeights {
        &self.line_heights
    }

    /// Mutable access to the line height table.
    pub fn line_heights_mut(&mut self) -> &mut LineHeights {
        &mut self.line_heights
    }

    /// Returns `true` once the window agrees with the offset.
    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// Marks the state as synced and freezes the average line height.
    pub fn mark_synced(&mut self) {
        self.avg_line_height = self.line_heights.average();
        self.synced = true;
    }

    /// Marks the state as unsynced.
    pub fn mark_unsynced(&mut self) {
        self.synced = false;
    }

    /// Average line height frozen at the last [`mark_synced`](Self::mark_synced).
    #[must_use]
    pub fn synced_average_line_height(&self) -> f32 {
        self.avg_line_height
    }

    /// Average of the known line heights.
    ///
    /// While synced this is the frozen value, so estimates stay stable while
    /// new lines are measured mid-pass.
    #[must_use]
    pub fn average_line_height(&self) -> f32 {
        if self.synced && self.avg_line_height > 0.0 {
            self.avg_line_height
        } else {
            self.line_heights.average()
        }
    }

    /// Clears the matrix, the heights and the window.
    ///
    /// Needed whenever the item count, the column template or the options change.
    pub fn reset_matrix(&mut self) {
        self.matrix.clear();
        self.line_heights.clear();
        self.start_index = 0;
        self.end_index = 0;
        self.start_main_line = 0;
        self.end_main_line = 0;
        self.synced = false;
        self.avg_line_height = 0.0;
    }

    /// Clears `reach_start`, `reach_end` and `offset_end`.
    pub fn reset_position_flags(&mut self) {
        self.reach_start = false;
        self.reach_end = false;
        self.offset_end = false;
    }

    /// Services the pending jump, clearing it.
    pub fn take_jump(&mut self) -> Option<(JumpTarget, ScrollAlign)> {
        let target = self.jump_index.take()?;
        debug!(?target, align = ?self.scroll_align, "servicing jump");
        Some((target, self.scroll_align))
    }

    /// Sets `start_index` to the smallest item touching the start line.
    pub fn update_start_index_by_start_line(&mut self) {
        if let Some(min) = self.matrix.min_item_in_line(self.start_main_line) {
            self.start_index = min;
        }
    }

    /// Pulls the end line in after the viewport shrank to `main_size`.
    pub fn update_end_line(&mut self, main_size: f32, main_gap: f32) {
        if main_size >= self.last_main_size {
            return;
        }
        let mut remaining = main_size - self.current_offset;
        for line in self.start_main_line..self.end_main_line {
            remaining -= self.line_heights.get(line).unwrap_or(0.0) + main_gap;
            if remaining + main_gap <= 0.0 {
                self.end_main_line = line;
                break;
            }
        }
        if let Some(end) = self.matrix.find_end_idx(self.end_main_line) {
            self.end_index = end.item;
        }
    }

    /// Highest item anchored at or before `end_line`.
    #[must_use]
    pub fn find_end_idx(&self, end_line: usize) -> Option<EndIndexInfo> {
        self.matrix.find_end_idx(end_line)
    }

    /// Line holding the anchor of `item`.
    #[must_use]
    pub fn find_in_matrix(&self, item: usize) -> Option<usize> {
        self.matrix.find_in_matrix(item, self.cross_count)
    }

    /// Same as [`find_in_matrix`](Self::find_in_matrix).
    #[must_use]
    pub fn line_index_by_index(&self, item: usize) -> Option<usize> {
        self.find_in_matrix(item)
    }

    /// Anchor position of `item`.
    #[must_use]
    pub fn item_pos(&self, item: usize) -> Option<GridPos> {
        self.matrix.item_pos(item, self.cross_count)
    }

    /// Sum of `height + gap` over the known lines in `[start_line, end_line)`.
    #[must_use]
    pub fn height_in_range(&self, start_line: usize, end_line: usize, main_gap: f32) -> f32 {
        self.line_heights
            .height_in_range(start_line, end_line, main_gap)
    }

    /// Distance from the top of line 0 to the top of `line`, from known heights.
    #[must_use]
    pub fn total_height_from_zero_index(&self, line: usize, main_gap: f32) -> f32 {
        self.height_in_range(0, line, main_gap)
    }

    /// Height of the start line, or `0.0` if unknown.
    #[must_use]
    pub fn current_line_height(&self) -> f32 {
        self.line_heights
            .get(self.start_main_line)
            .unwrap_or(0.0)
    }

    /// Evicts matrix and height entries at or after `line`.
    ///
    /// With multi-line items the cut moves down until no item straddles it.
    pub fn clear_maps_to_end(&mut self, line: usize) {
        let mut cut = line;
        if self.has_multi_line_item() {
            let last = self.matrix.last_line().unwrap_or(0);
            while cut <= last && self.matrix.straddles(cut) {
                cut += 1;
            }
            if cut != line {
                debug!(requested = line, cut, "moved trailing eviction boundary");
            }
        }
        self.matrix.truncate_from(cut);
        self.line_heights.truncate_from(cut);
    }

    /// Evicts matrix and height entries before `line`.
    ///
    /// With multi-line items the cut moves up until no item straddles it.
    pub fn clear_maps_from_start(&mut self, line: usize) {
        let mut cut = line;
        if self.has_multi_line_item() {
            let first = self.matrix.first_line().unwrap_or(0);
            while cut > first && self.matrix.straddles(cut) {
                cut -= 1;
            }
            if cut != line {
                debug!(requested = line, cut, "moved leading eviction boundary");
            }
        }
        self.matrix.truncate_before(cut);
        self.line_heights.truncate_before(cut);
    }

    /// Drops line heights at or after `line`, keeping the matrix.
    pub fn clear_heights_to_end(&mut self, line: usize) {
        self.line_heights.truncate_from(line);
    }

    /// Removes every cell of items `>= threshold` on lines at or after `line`.
    ///
    /// Lines left empty lose their heights too.
    pub fn clear_matrix_to_end(&mut self, threshold: usize, line: usize) {
        for emptied in self.matrix.clear_items_from(threshold, line) {
            self.line_heights.remove(emptied);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GridLayoutInfo, JumpTarget};
    use crate::{GridFlags, GridItemSize, GridLayoutOptions, GridPos, ScrollAlign};

    fn tall_item_grid() -> GridLayoutInfo {
        // cross 2: item 0 covers lines 0..3 in column 0.
        let mut info = GridLayoutInfo::new(2, 5);
        info.set_flags(GridFlags::BIG_ITEM | GridFlags::MULTI_LINE_ITEM);
        let m = info.matrix_mut();
        m.place(0, GridPos::new(0, 0), GridItemSize::new(3, 1));
        m.place(1, GridPos::new(0, 1), GridItemSize::ONE);
        m.place(2, GridPos::new(1, 1), GridItemSize::ONE);
        m.place(3, GridPos::new(2, 1), GridItemSize::ONE);
        m.place(4, GridPos::new(3, 0), GridItemSize::ONE);
        for line in 0..4 {
            info.line_heights_mut().set(line, 50.0);
        }
        info
    }

    #[test]
    fn eviction_to_end_never_splits_an_item() {
        let mut info = tall_item_grid();
        info.clear_maps_to_end(1);
        assert_eq!(info.matrix().last_line(), Some(2));
        assert_eq!(info.line_heights().last_line(), Some(2));
        assert_eq!(info.item_pos(0), Some(GridPos::new(0, 0)));
    }

    #[test]
    fn eviction_from_start_keeps_the_anchor() {
        let mut info = tall_item_grid();
        info.clear_maps_from_start(2);
        assert_eq!(info.matrix().first_line(), Some(0));

        info.clear_maps_from_start(3);
        assert_eq!(info.matrix().first_line(), Some(3));
        assert_eq!(info.line_heights().first_line(), Some(3));
    }

    #[test]
    fn regular_eviction_cuts_where_asked() {
        let mut info = tall_item_grid();
        info.set_flags(GridFlags::BIG_ITEM);
        info.clear_maps_to_end(1);
        assert_eq!(info.matrix().last_line(), Some(0));
    }

    #[test]
    fn clear_matrix_to_end_drops_emptied_heights() {
        let mut info = tall_item_grid();
        info.clear_matrix_to_end(4, 0);
        assert!(!info.matrix().contains_line(3));
        assert!(!info.line_heights().contains(3));
        assert_eq!(info.find_end_idx(10).map(|e| e.item), Some(3));
    }

    #[test]
    fn options_drive_flags() {
        let mut info = GridLayoutInfo::new(3, 10);
        info.apply_options(
            &GridLayoutOptions::new()
                .with_irregular_indexes([1])
                .with_size_fn(|_| GridItemSize::new(2, 2)),
        );
        assert!(info.has_big_item());
        assert!(info.has_multi_line_item());
    }

    #[test]
    fn start_index_follows_start_line() {
        let mut info = tall_item_grid();
        info.start_main_line = 2;
        info.update_start_index_by_start_line();
        assert_eq!(info.start_index, 0);
        info.start_main_line = 3;
        info.update_start_index_by_start_line();
        assert_eq!(info.start_index, 4);
    }

    #[test]
    fn shrinking_viewport_pulls_end_line_in() {
        let mut info = tall_item_grid();
        info.last_main_size = 300.0;
        info.end_main_line = 3;
        info.update_end_line(100.0, 10.0);
        assert_eq!(info.end_main_line, 1);
        assert_eq!(info.end_index, 2);
    }

    #[test]
    fn jumps_are_taken_once() {
        let mut info = GridLayoutInfo::new(3, 10);
        info.jump_index = Some(JumpTarget::LastItem);
        info.scroll_align = ScrollAlign::End;
        assert_eq!(
            info.take_jump(),
            Some((JumpTarget::LastItem, ScrollAlign::End))
        );
        assert_eq!(info.take_jump(), None);
        assert_eq!(JumpTarget::LastItem.resolve(10), Some(9));
        assert_eq!(JumpTarget::Index(10).resolve(10), None);
        assert_eq!(JumpTarget::BottomEdge.resolve(0), None);
    }

    #[test]
    fn synced_average_is_frozen() {
        let mut info = tall_item_grid();
        info.mark_synced();
        info.line_heights_mut().set(4, 250.0);
        assert!((info.average_line_height() - 50.0).abs() < f32::EPSILON);
        info.mark_unsynced();
        assert!((info.average_line_height() - 90.0).abs() < f32::EPSILON);
    }

    #[test]
    fn reset_clears_tables_and_window() {
        let mut info = tall_item_grid();
        info.end_index = 4;
        info.reset_matrix();
        assert!(info.matrix().is_empty());
        assert!(info.line_heights().is_empty());
        assert_eq!(info.end_index, 0);
    }
}
