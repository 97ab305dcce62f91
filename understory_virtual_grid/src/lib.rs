// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_virtual_grid --heading-base-level=0

//! Understory Virtual Grid: incremental layout state for virtualized 2D grids.
//!
//! This crate provides a renderer-agnostic core for virtualizing a scrollable
//! grid whose items may span several lines and columns. It never needs every
//! item to be measured: the grid is placed and measured incrementally around
//! the viewport, and everything else is estimated.
//!
//! The core concepts are:
//!
//! - [`GridMatrix`]: a sparse occupancy matrix mapping each line and cross
//!   slot to the [`GridCell`] of the item covering it. Every placed item has
//!   exactly one anchor cell (its top-left corner).
//! - [`LineHeights`]: measured main-axis extents per line. Missing entries
//!   mean "unknown", never "zero".
//! - [`GridLayoutInfo`]: the per-grid state aggregate. It owns the matrix and
//!   the heights, tracks the visible window and the scroll offset, and answers
//!   derived queries: content height and offset estimates, item positions,
//!   scroll-to-item targets and drag-reorder remapping.
//! - [`GridIrregularFiller`]: extends the matrix and the heights forward or
//!   backward from a known line until a length, line or item target is met.
//! - [`GridDeltaConverter`]: turns a large one-shot scroll delta into a new
//!   anchor item, filling only the lines it walks through.
//!
//! Host frameworks own the items. They describe spans through [`ItemSpans`]
//! (or simply [`GridLayoutOptions`]) and run real layout through
//! [`ItemMeasure`]. This crate does not know about widgets, display trees or
//! any particular UI framework.
//!
//! ## Minimal example
//!
//! A three-column grid whose second item spans two lines:
//!
//! ```rust
//! use understory_virtual_grid::{
//!     FillParameters, GridIrregularFiller, GridItemSize, GridLayoutInfo, GridLayoutOptions,
//!     GridPos, ItemMeasure, ItemSpans,
//! };
//!
//! struct Items(GridLayoutOptions);
//!
//! impl ItemSpans for Items {
//!     fn item_size(&self, index: usize, cross_count: usize) -> GridItemSize {
//!         self.0.item_size(index, cross_count)
//!     }
//! }
//!
//! impl ItemMeasure for Items {
//!     fn measure(&mut self, index: usize, _cross_len: f32) -> f32 {
//!         // Host layout would run here.
//!         if index == 1 { 210.0 } else { 100.0 }
//!     }
//! }
//!
//! let options = GridLayoutOptions::new()
//!     .with_irregular_indexes([1])
//!     .with_size_fn(|_| GridItemSize::new(2, 1));
//! let mut info = GridLayoutInfo::new(3, 20);
//! info.apply_options(&options);
//!
//! let params = FillParameters::uniform(3, 120.0, 8.0, 10.0);
//! let mut items = Items(options);
//! let filled = GridIrregularFiller::new(&mut info, &mut items).fill(&params, 400.0, 0);
//!
//! assert!(filled.length >= 400.0);
//! assert_eq!(info.item_pos(1), Some(GridPos::new(0, 1)));
//! assert!(info.content_height(params.main_gap) > filled.length);
//! ```
//!
//! ## Features
//!
//! - `std` *(default)*: enables `std` support in `kurbo` and `tracing`.
//! - `libm`: enables `no_std` + `alloc` builds that rely on `libm` for
//!   floating-point math in `kurbo`.
//!
//! All extents and offsets are `f32` in a caller-chosen coordinate space
//! (typically logical pixels) and are expected to be finite and non-negative.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod cell;
mod delta;
mod drag;
mod estimate;
mod filler;
mod layout_info;
mod line_heights;
mod matrix;
mod measure;
mod options;
mod scroll_to;

pub use cell::{EndIndexInfo, GridCell, GridItemSize, GridPos};
pub use delta::GridDeltaConverter;
pub use drag::DragState;
pub use filler::GridIrregularFiller;
pub use layout_info::{GridLayoutInfo, JumpTarget};
pub use line_heights::LineHeights;
pub use matrix::{GridLine, GridMatrix};
pub use measure::{FillParameters, FillResult, ItemMeasure, ItemSpans};
pub use options::{Axis, GridFlags, GridLayoutOptions, ItemSizeFn};
pub use scroll_to::ScrollAlign;
