// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Measured main-axis extents of grid lines.

use alloc::collections::BTreeMap;
use core::ops::RangeBounds;

use hashbrown::HashSet;

/// Sparse table of measured line heights, keyed by line index.
///
/// A line only gets an entry once every item touching it has been measured.
/// A missing entry means "unknown", never "zero". Range queries silently skip
/// unknown lines; callers that need an exact answer must measure the range
/// first.
///
/// Contributions to a line whose occupants are not all measured yet are
/// held back in a pending buffer until the filler publishes the line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LineHeights {
    heights: BTreeMap<usize, f32>,
    pending: BTreeMap<usize, PendingLine>,
}

/// Unpublished contributions to one line.
#[derive(Clone, Debug, Default, PartialEq)]
struct PendingLine {
    height: f32,
    items: HashSet<usize>,
}

fn sanitize(height: f32) -> f32 {
    debug_assert!(
        height.is_finite(),
        "line heights must be finite; got {height:?}"
    );
    if height.is_finite() && height > 0.0 {
        height
    } else {
        0.0
    }
}

impl LineHeights {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            heights: BTreeMap::new(),
            pending: BTreeMap::new(),
        }
    }

    /// Returns `true` if no line has been measured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Number of measured lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    /// Forgets every measurement.
    pub fn clear(&mut self) {
        self.heights.clear();
        self.pending.clear();
    }

    /// Height of `line`, if known.
    #[must_use]
    pub fn get(&self, line: usize) -> Option<f32> {
        self.heights.get(&line).copied()
    }

    /// Returns `true` if `line` has been measured.
    #[must_use]
    pub fn contains(&self, line: usize) -> bool {
        self.heights.contains_key(&line)
    }

    /// Overwrites the height of `line`.
    ///
    /// Negative and non-finite heights are stored as `0.0`.
    pub fn set(&mut self, line: usize, height: f32) {
        self.pending.remove(&line);
        self.heights.insert(line, sanitize(height));
    }

    /// Raises the height of `line` to at least `height`.
    ///
    /// A line keeps the tallest contribution any of its items gave it.
    pub fn raise(&mut self, line: usize, height: f32) {
        let height = sanitize(height);
        self.pending.remove(&line);
        self.heights
            .entry(line)
            .and_modify(|h| *h = h.max(height))
            .or_insert(height);
    }

    /// Removes the height of `line`.
    pub fn remove(&mut self, line: usize) -> Option<f32> {
        self.pending.remove(&line);
        self.heights.remove(&line)
    }

    /// First measured line.
    #[must_use]
    pub fn first_line(&self) -> Option<usize> {
        self.heights.keys().next().copied()
    }

    /// Last measured line.
    #[must_use]
    pub fn last_line(&self) -> Option<usize> {
        self.heights.keys().next_back().copied()
    }

    /// Iterates `(line, height)` pairs in ascending line order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (usize, f32)> + '_ {
        self.heights.iter().map(|(&line, &h)| (line, h))
    }

    /// Iterates `(line, height)` pairs within `range`.
    pub fn range<R: RangeBounds<usize>>(
        &self,
        range: R,
    ) -> impl DoubleEndedIterator<Item = (usize, f32)> + '_ {
        self.heights.range(range).map(|(&line, &h)| (line, h))
    }

    /// Sum of `height + gap` over the known lines in `[start, end)`.
    ///
    /// Each line contributes its trailing gap, so the length of a fully
    /// measured range is this value minus one `gap`.
    #[must_use]
    pub fn height_in_range(&self, start: usize, end: usize, gap: f32) -> f32 {
        if start >= end {
            return 0.0;
        }
        self.heights.range(start..end).map(|(_, &h)| h + gap).sum()
    }

    /// Sum of `height + gap` over every known line.
    #[must_use]
    pub fn total(&self, gap: f32) -> f32 {
        self.heights.values().map(|&h| h + gap).sum()
    }

    /// Mean height of the known lines, or `0.0` if none is known.
    #[must_use]
    pub fn average(&self) -> f32 {
        if self.heights.is_empty() {
            return 0.0;
        }
        self.heights.values().sum::<f32>() / self.heights.len() as f32
    }

    /// Number of known lines in `[start, end)`.
    #[must_use]
    pub fn known_in(&self, start: usize, end: usize) -> usize {
        if start >= end {
            return 0;
        }
        self.heights.range(start..end).count()
    }

    /// Records the share of `item`'s extent that falls on `line`.
    ///
    /// An already published line is raised directly. Otherwise the
    /// contribution waits until [`commit`](Self::commit).
    pub(crate) fn contribute(&mut self, line: usize, item: usize, height: f32) {
        let height = sanitize(height);
        if let Some(h) = self.heights.get_mut(&line) {
            *h = h.max(height);
            return;
        }
        let pending = self.pending.entry(line).or_default();
        pending.height = pending.height.max(height);
        pending.items.insert(item);
    }

    /// Returns `true` if `item` has contributed to `line` or `line` is published.
    pub(crate) fn has_contribution(&self, line: usize, item: usize) -> bool {
        self.heights.contains_key(&line)
            || self
                .pending
                .get(&line)
                .is_some_and(|pending| pending.items.contains(&item))
    }

    /// Lines holding unpublished contributions.
    pub(crate) fn pending_lines(&self) -> impl Iterator<Item = usize> + '_ {
        self.pending.keys().copied()
    }

    /// Publishes the pending height of `line`.
    pub(crate) fn commit(&mut self, line: usize) -> Option<f32> {
        let pending = self.pending.remove(&line)?;
        self.heights.insert(line, pending.height);
        Some(pending.height)
    }

    /// Removes every line at or after `line`.
    pub(crate) fn truncate_from(&mut self, line: usize) {
        drop(self.heights.split_off(&line));
        drop(self.pending.split_off(&line));
    }

    /// Removes every line before `line`.
    pub(crate) fn truncate_before(&mut self, line: usize) {
        self.heights = self.heights.split_off(&line);
        self.pending = self.pending.split_off(&line);
    }
}
