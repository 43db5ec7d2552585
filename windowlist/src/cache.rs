#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

#[cfg(feature = "std")]
type SizeMap = HashMap<usize, u32>;
#[cfg(not(feature = "std"))]
type SizeMap = BTreeMap<usize, u32>;

/// Per-index cache of actually rendered item sizes.
///
/// Entries are created lazily as items are first measured and override the
/// size estimate from then on. Sizes are stored rounded to whole pixels with
/// a minimum of 1, so derived offset ranges can never overlap or run
/// backwards.
#[derive(Clone, Debug, Default)]
pub struct SizeCache {
    sizes: SizeMap,
}

impl SizeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a raw pixel measurement for `index`.
    ///
    /// Returns `false` when the stored value is unchanged, so callers can
    /// skip rebuilding anything downstream.
    pub fn record(&mut self, index: usize, measured_px: f64) -> bool {
        let size = round_size(measured_px);
        if self.sizes.get(&index) == Some(&size) {
            return false;
        }
        self.sizes.insert(index, size);
        true
    }

    pub fn get(&self, index: usize) -> Option<u32> {
        self.sizes.get(&index).copied()
    }

    /// Drops entries at `index >= count`, keeping the cache dense within the
    /// current item range when the list shrinks.
    ///
    /// Returns whether anything was removed.
    pub fn prune_beyond(&mut self, count: usize) -> bool {
        let before = self.sizes.len();
        self.sizes.retain(|&index, _| index < count);
        self.sizes.len() != before
    }

    pub fn clear(&mut self) {
        self.sizes.clear();
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

/// Rounds a raw pixel measurement to a usable size: nearest whole pixel,
/// never below 1. Non-finite and negative inputs clamp to 1 rather than
/// being rejected.
pub(crate) fn round_size(measured_px: f64) -> u32 {
    if !measured_px.is_finite() || measured_px < 1.0 {
        return 1;
    }
    // floor(x + 0.5): nearest-integer rounding without `std`.
    let rounded = (measured_px + 0.5) as u64;
    rounded.min(u32::MAX as u64) as u32
}
