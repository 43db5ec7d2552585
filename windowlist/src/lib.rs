//! A headless list-windowing engine for long scrollable lists of
//! variable-height items.
//!
//! The engine tracks a scrollable viewport, incrementally learns the real
//! rendered size of each item, and resolves which index range should be
//! materialized: prefix sums over item sizes, a shared nearest-index search
//! for offset → index lookup, overscanned windows, and safe full-run
//! fallbacks when windowing is disabled.
//!
//! It is UI-agnostic. A host layer is expected to provide:
//! - the scroll container's offset and visible height
//! - item size measurements as elements render and reflow
//!
//! For container discovery, viewport tracking and per-item size observation,
//! see the `windowlist-adapter` crate.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod cache;
mod offsets;
mod options;
mod types;
mod windower;

#[cfg(test)]
mod tests;

pub use cache::SizeCache;
pub use offsets::{OffsetTable, nearest_index};
pub use options::{OnChangeCallback, WindowerOptions};
pub use types::{Align, Measurement, ScrollDirection, Viewport};
pub use windower::Windower;
