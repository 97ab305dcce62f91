// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural grid options and the capability flags derived from them.

use alloc::boxed::Box;
use alloc::collections::BTreeSet;
use core::fmt;

use crate::{GridItemSize, ItemSpans};

/// Scroll direction of a grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Lines are rows; the cross axis runs horizontally.
    #[default]
    Vertical,
    /// Lines are columns; the cross axis runs vertically.
    Horizontal,
}

bitflags::bitflags! {
    /// Capability flags computed once from [`GridLayoutOptions`].
    ///
    /// They select between the cheap regular-grid code paths and the
    /// irregular ones.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct GridFlags: u8 {
        /// At least one item has a span other than 1×1.
        const BIG_ITEM        = 0b0000_0001;
        /// At least one item spans more than one line.
        const MULTI_LINE_ITEM = 0b0000_0010;
    }
}

/// Callback returning the span of an irregular item, as rows × columns of a vertical grid.
pub type ItemSizeFn = dyn Fn(usize) -> GridItemSize;

/// Which items are irregular and how large they are.
///
/// Indexes outside the irregular set are 1×1. An irregular index without a
/// size callback spans one line and the whole cross axis.
#[derive(Default)]
pub struct GridLayoutOptions {
    irregular_indexes: BTreeSet<usize>,
    size_fn: Option<Box<ItemSizeFn>>,
    axis: Axis,
}

impl fmt::Debug for GridLayoutOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridLayoutOptions")
            .field("irregular_indexes", &self.irregular_indexes)
            .field("size_fn", &self.size_fn.as_ref().map(|_| "Fn(usize)"))
            .field("axis", &self.axis)
            .finish()
    }
}

impl GridLayoutOptions {
    /// Options for a regular grid: every item is 1×1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scroll direction.
    #[must_use]
    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    /// Marks `indexes` as irregular.
    #[must_use]
    pub fn with_irregular_indexes<I: IntoIterator<Item = usize>>(mut self, indexes: I) -> Self {
        self.irregular_indexes.extend(indexes);
        self
    }

    /// Sets the size callback consulted for irregular indexes.
    #[must_use]
    pub fn with_size_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) -> GridItemSize + 'static,
    {
        self.size_fn = Some(Box::new(f));
        self
    }

    /// Scroll direction.
    #[must_use]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// The irregular index set.
    #[must_use]
    pub fn irregular_indexes(&self) -> &BTreeSet<usize> {
        &self.irregular_indexes
    }

    /// Returns `true` if `index` is irregular.
    #[must_use]
    pub fn is_irregular(&self, index: usize) -> bool {
        self.irregular_indexes.contains(&index)
    }

    /// Capability flags for a grid with `cross_count` slots per line.
    #[must_use]
    pub fn flags(&self, cross_count: usize) -> GridFlags {
        let mut flags = GridFlags::empty();
        if self.irregular_indexes.is_empty() {
            return flags;
        }
        flags |= GridFlags::BIG_ITEM;
        if self
            .irregular_indexes
            .iter()
            .any(|&idx| self.item_size(idx, cross_count).rows > 1)
        {
            flags |= GridFlags::MULTI_LINE_ITEM;
        }
        flags
    }
}

impl ItemSpans for GridLayoutOptions {
    fn item_size(&self, index: usize, cross_count: usize) -> GridItemSize {
        if !self.is_irregular(index) {
            return GridItemSize::ONE;
        }
        let Some(size_fn) = &self.size_fn else {
            return GridItemSize::new(1, cross_count).clamped(cross_count);
        };
        let size = size_fn(index);
        let size = match self.axis {
            Axis::Vertical => size,
            Axis::Horizontal => GridItemSize::new(size.columns, size.rows),
        };
        size.clamped(cross_count)
    }
}
