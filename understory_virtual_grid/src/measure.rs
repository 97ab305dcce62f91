// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collaborator traits for sizing and measuring grid items, plus fill inputs and outputs.

use smallvec::SmallVec;

use crate::GridItemSize;

/// Cheap span query for grid items.
///
/// Matrix-only fills use this to decide where an item goes without paying for
/// a full measure.
pub trait ItemSpans {
    /// Span of item `index` in a grid with `cross_count` slots per line.
    ///
    /// The returned size need not be clamped; the filler clamps it into
    /// `1..=cross_count` columns and at least one row.
    fn item_size(&self, index: usize, cross_count: usize) -> GridItemSize;
}

/// Expensive per-item measurement.
///
/// Implementations typically run the host's layout for the item. Methods take
/// `&mut self` so implementations are free to cache or record work without
/// exposing interior mutability.
pub trait ItemMeasure: ItemSpans {
    /// Measures item `index` given the cross-axis length available to it.
    ///
    /// Returns the item's main-axis extent. It must be finite and non-negative.
    fn measure(&mut self, index: usize, cross_len: f32) -> f32;
}

impl<T: ItemSpans + ?Sized> ItemSpans for &T {
    fn item_size(&self, index: usize, cross_count: usize) -> GridItemSize {
        (**self).item_size(index, cross_count)
    }
}

impl<T: ItemSpans + ?Sized> ItemSpans for &mut T {
    fn item_size(&self, index: usize, cross_count: usize) -> GridItemSize {
        (**self).item_size(index, cross_count)
    }
}

impl<T: ItemMeasure + ?Sized> ItemMeasure for &mut T {
    fn measure(&mut self, index: usize, cross_len: f32) -> f32 {
        (**self).measure(index, cross_len)
    }
}

/// Plain numeric inputs for a measuring fill.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FillParameters {
    /// Length of each cross-axis slot, indexed by cross position.
    pub cross_lens: SmallVec<[f32; 8]>,
    /// Gap between adjacent cross-axis slots.
    pub cross_gap: f32,
    /// Gap between adjacent main-axis lines.
    pub main_gap: f32,
}

impl FillParameters {
    /// Creates parameters for `cross_count` slots of equal length.
    #[must_use]
    pub fn uniform(cross_count: usize, cross_len: f32, cross_gap: f32, main_gap: f32) -> Self {
        Self {
            cross_lens: core::iter::repeat_n(cross_len, cross_count).collect(),
            cross_gap,
            main_gap,
        }
    }

    /// Cross-axis length available to an item spanning `columns` slots from `cross`.
    ///
    /// Slots without a configured length contribute zero.
    #[must_use]
    pub fn cross_len(&self, cross: usize, columns: usize) -> f32 {
        if columns == 0 {
            return 0.0;
        }
        let lens: f32 = (cross..cross + columns)
            .map(|c| self.cross_lens.get(c).copied().unwrap_or(0.0))
            .sum();
        lens + self.cross_gap * (columns - 1) as f32
    }
}

/// Outcome of a measuring fill.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FillResult {
    /// Accumulated main-axis length, gaps included.
    pub length: f32,
    /// Last line reached.
    pub end_main_line: usize,
    /// Last item measured.
    pub end_index: usize,
}
