// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag-reorder remapping over a regular grid.
//!
//! While a drag is in progress, the visual order of items is kept in a side
//! table mapping slot positions to item indexes. The occupancy matrix itself
//! is never renumbered. Slot positions count cells row-major from item 0, so
//! outside a drag position `p` shows item `p`.

use alloc::collections::BTreeMap;

use kurbo::Rect;
use smallvec::SmallVec;

use crate::GridLayoutInfo;

/// Side table of an in-progress drag.
///
/// In the table, `None` stands for an item dragged in from another grid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DragState {
    current_moving_item_position: Option<usize>,
    positions: BTreeMap<usize, Option<usize>>,
    foreign_rect: Option<Rect>,
}

impl DragState {
    /// Returns `true` while a drag is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.current_moving_item_position.is_some()
    }

    /// Current slot of the dragged item.
    #[must_use]
    pub fn current_moving_item_position(&self) -> Option<usize> {
        self.current_moving_item_position
    }

    /// The raw position → item table.
    #[must_use]
    pub fn positions(&self) -> &BTreeMap<usize, Option<usize>> {
        &self.positions
    }

    /// Bounds of an item dragged in from another grid.
    #[must_use]
    pub fn foreign_rect(&self) -> Option<Rect> {
        self.foreign_rect
    }

    fn occupant(&self, position: usize) -> Option<usize> {
        match self.positions.get(&position) {
            Some(&item) => item,
            None => Some(position),
        }
    }
}

impl GridLayoutInfo {
    /// The drag side table.
    #[must_use]
    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    /// Slot currently occupied by the dragged item.
    #[must_use]
    pub fn original_index(&self) -> Option<usize> {
        self.drag.current_moving_item_position
    }

    /// Ends the drag and discards the remapping.
    pub fn clear_drag_state(&mut self) {
        self.drag = DragState::default();
    }

    /// Records the bounds of an item dragged in from another grid.
    pub fn set_dragged_in_rect(&mut self, rect: Rect) {
        self.drag.foreign_rect = Some(rect);
    }

    /// Moves the dragged item to the slot of `insert_index`.
    ///
    /// `item` is the dragged item, or `None` for an item from another grid.
    /// A local item can only be inserted over an existing item; a foreign
    /// one may also be appended after the last item. Out-of-range requests
    /// are ignored.
    pub fn swap_items(&mut self, item: Option<usize>, insert_index: usize) {
        let bound = match item {
            Some(_) => self.children_count,
            None => self.children_count + 1,
        };
        if insert_index >= bound {
            return;
        }
        let current = self
            .drag
            .current_moving_item_position
            .unwrap_or(match item {
                Some(idx) => idx,
                None => self.children_count,
            });
        let insert = match item {
            Some(_) => self.position_of_item(insert_index).unwrap_or(insert_index),
            None => insert_index,
        };
        if insert < current {
            self.move_items_back(insert, current, item);
        } else if insert > current {
            self.move_items_forward(current, insert, item);
        }
        self.drag.current_moving_item_position = Some(insert);
    }

    /// Shifts the occupants of `[from, to)` one slot later and puts `item` at `from`.
    pub fn move_items_back(&mut self, from: usize, to: usize, item: Option<usize>) {
        if from > to {
            return;
        }
        let old: SmallVec<[Option<usize>; 16]> =
            (from..to).map(|p| self.drag.occupant(p)).collect();
        self.drag.positions.insert(from, item);
        for (offset, occupant) in old.into_iter().enumerate() {
            self.drag.positions.insert(from + offset + 1, occupant);
        }
    }

    /// Shifts the occupants of `(from, to]` one slot earlier and puts `item` at `to`.
    pub fn move_items_forward(&mut self, from: usize, to: usize, item: Option<usize>) {
        if from > to {
            return;
        }
        let old: SmallVec<[Option<usize>; 16]> =
            (from + 1..=to).map(|p| self.drag.occupant(p)).collect();
        for (offset, occupant) in old.into_iter().enumerate() {
            self.drag.positions.insert(from + offset, occupant);
        }
        self.drag.positions.insert(to, item);
    }

    /// Item shown at slot `position`.
    ///
    /// Returns `None` for the foreign item and for slots past the end.
    #[must_use]
    pub fn item_at_position(&self, position: usize) -> Option<usize> {
        if self.drag.is_active() {
            return self.drag.occupant(position);
        }
        (position < self.children_count).then_some(position)
    }

    /// Slot at which `item` is shown.
    #[must_use]
    pub fn position_of_item(&self, item: usize) -> Option<usize> {
        if !self.drag.is_active() {
            return (item < self.children_count).then_some(item);
        }
        if let Some((&position, _)) = self
            .drag
            .positions
            .iter()
            .find(|(_, mapped)| **mapped == Some(item))
        {
            return Some(position);
        }
        (!self.drag.positions.contains_key(&item)).then_some(item)
    }

    /// Item drawn in cell `(line, cross)` of a regular grid.
    #[must_use]
    pub fn visual_item_at(&self, line: usize, cross: usize) -> Option<usize> {
        if self.cross_count == 0 || cross >= self.cross_count {
            return None;
        }
        if !self.drag.is_active() {
            return self.matrix().cell(line, cross).map(|cell| cell.item);
        }
        let rel = line.checked_sub(self.start_main_line)?;
        let position = rel * self.cross_count + cross + self.start_index;
        self.item_at_position(position)
    }
}
