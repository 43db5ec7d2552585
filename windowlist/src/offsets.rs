use alloc::vec::Vec;
use core::cmp;

use crate::Measurement;
use crate::Viewport;
use crate::cache::SizeCache;

/// Prefix-sum table of item extents.
///
/// Derived entirely from the item count, the size cache and the estimate:
/// rebuilding is a single O(count) left-to-right pass, re-run whenever any
/// of those inputs changes. Indices are visited in numeric order, so the
/// result does not depend on cache iteration order.
#[derive(Clone, Debug, Default)]
pub struct OffsetTable {
    items: Vec<Measurement>,
    total: u64,
}

impl OffsetTable {
    pub fn build<F>(count: usize, cache: &SizeCache, estimate_size: &F) -> Self
    where
        F: Fn(usize) -> u32 + ?Sized,
    {
        let mut items = Vec::with_capacity(count);
        let mut offset = 0u64;
        for index in 0..count {
            let size = match cache.get(index) {
                Some(measured) => measured,
                None => estimate_size(index).max(1),
            };
            items.push(Measurement {
                index,
                start: offset,
                size,
            });
            offset = offset.saturating_add(size as u64);
        }
        Self {
            items,
            total: offset,
        }
    }

    pub fn items(&self) -> &[Measurement] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<Measurement> {
        self.items.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Combined extent of all items; equals the last entry's `end()`.
    pub fn total_size(&self) -> u64 {
        self.total
    }

    /// Resolves the inclusive index bounds of the window covering `viewport`,
    /// expanded by `overscan` on both sides and clamped to valid indices.
    ///
    /// Callers must check `is_empty()` first; on an empty table there is no
    /// window to resolve.
    pub fn window(&self, viewport: Viewport, overscan: usize) -> (usize, usize) {
        debug_assert!(!self.items.is_empty(), "window on empty offset table");
        let start = nearest_index(&self.items, viewport.scroll_offset);
        let end = nearest_index(&self.items, viewport.end());
        let from = start.saturating_sub(overscan);
        let to = cmp::min(self.items.len() - 1, end.saturating_add(overscan));
        (from, to)
    }
}

/// Finds the item whose extent covers `target`: the index whose cumulative
/// `end()` is the tightest bound at or below the target, with an exact
/// `end() == target` match winning immediately.
///
/// Both window endpoints go through this one primitive, so the start and end
/// lookups can never diverge in tie-breaking.
pub fn nearest_index(items: &[Measurement], target: u64) -> usize {
    if items.is_empty() {
        return 0;
    }
    let mut low = 0usize;
    let mut high = items.len() - 1;
    let mut nearest = 0usize;
    while low <= high {
        let mid = low + (high - low) / 2;
        let end = items[mid].end();
        if end == target {
            return mid;
        }
        if end < target {
            nearest = mid;
            low = mid + 1;
        } else {
            nearest = mid;
            if mid == 0 {
                break;
            }
            high = mid - 1;
        }
    }
    nearest
}
