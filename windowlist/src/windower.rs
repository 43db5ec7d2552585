use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::Cell;
use core::cmp;

use crate::cache::SizeCache;
use crate::offsets::OffsetTable;
use crate::{Align, Measurement, ScrollDirection, Viewport, WindowerOptions};

/// A headless windowing engine for long scrollable lists of variable-height
/// items.
///
/// This type is intentionally UI-agnostic:
/// - It does not hold any UI objects; a host adapter feeds it viewport
///   geometry, scroll offsets and item measurements.
/// - Item sizes start as estimates and are refined as real rendered sizes
///   arrive via `measure`/`measure_many`.
/// - The materialized window is exposed via `virtual_items` /
///   `for_each_virtual_item`; when the engine is disabled (or has nothing to
///   window) the full run is returned so content is never missing.
///
/// For container discovery and event plumbing, see the `windowlist-adapter`
/// crate.
#[derive(Clone, Debug)]
pub struct Windower {
    options: WindowerOptions,
    viewport: Viewport,
    is_scrolling: bool,
    scroll_direction: Option<ScrollDirection>,
    last_scroll_event_ms: Option<u64>,

    cache: SizeCache,
    table: OffsetTable,

    notify_depth: Cell<usize>,
    notify_pending: Cell<bool>,
}

impl Windower {
    pub fn new(options: WindowerOptions) -> Self {
        wdebug!(
            count = options.count,
            enabled = options.enabled,
            overscan = options.overscan,
            "Windower::new"
        );
        let mut w = Self {
            viewport: Viewport::default(),
            is_scrolling: false,
            scroll_direction: None,
            last_scroll_event_ms: None,
            cache: SizeCache::new(),
            table: OffsetTable::default(),
            options,
            notify_depth: Cell::new(0),
            notify_pending: Cell::new(false),
        };
        w.rebuild_table();
        w
    }

    pub fn options(&self) -> &WindowerOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: WindowerOptions) {
        let prev_count = self.options.count;
        let was_enabled = self.options.enabled;
        let estimate_unchanged = Arc::ptr_eq(&self.options.estimate_size, &options.estimate_size);
        self.options = options;
        wtrace!(
            count = self.options.count,
            enabled = self.options.enabled,
            overscan = self.options.overscan,
            "Windower::set_options"
        );

        if was_enabled && !self.options.enabled {
            self.reset_on_disable();
        } else if self.options.count != prev_count || !estimate_unchanged {
            if self.options.count < prev_count {
                self.cache.prune_beyond(self.options.count);
            }
            self.rebuild_table();
        }

        self.notify();
    }

    /// Clones the current options, applies `f`, then delegates to
    /// `set_options`, letting the engine decide what needs rebuilding.
    pub fn update_options(&mut self, f: impl FnOnce(&mut WindowerOptions)) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next);
    }

    pub fn set_on_change(
        &mut self,
        on_change: Option<impl Fn(&Windower, bool) + Send + Sync + 'static>,
    ) {
        self.options.on_change = on_change.map(|f| Arc::new(f) as _);
        self.notify();
    }

    fn notify_now(&self) {
        if let Some(cb) = &self.options.on_change {
            cb(self, self.is_scrolling);
        }
    }

    fn notify(&self) {
        if self.notify_depth.get() > 0 {
            self.notify_pending.set(true);
            return;
        }
        self.notify_now();
    }

    /// Batches multiple updates into a single `on_change` notification.
    ///
    /// Recommended for adapters: a typical frame updates the viewport height,
    /// scroll offset and measurements together, and each setter would
    /// otherwise fire `on_change` separately.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        let depth = self.notify_depth.get();
        self.notify_depth.set(depth.saturating_add(1));

        f(self);

        let depth = self.notify_depth.get();
        debug_assert!(depth > 0, "notify_depth underflow");
        let next = depth.saturating_sub(1);
        self.notify_depth.set(next);

        if next == 0 && self.notify_pending.replace(false) {
            self.notify_now();
        }
    }

    pub fn count(&self) -> usize {
        self.options.count
    }

    pub fn set_count(&mut self, count: usize) {
        if self.options.count == count {
            return;
        }
        wdebug!(from = self.options.count, to = count, "Windower::set_count");
        if count < self.options.count {
            self.cache.prune_beyond(count);
        }
        self.options.count = count;
        self.rebuild_table();
        self.notify();
    }

    pub fn enabled(&self) -> bool {
        self.options.enabled
    }

    /// Enables or disables windowing.
    ///
    /// Disabling discards all measurements and the viewport sample, so a
    /// later re-enable starts from a clean estimate-only state; queries fall
    /// back to the full unwindowed run in the meantime.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.options.enabled == enabled {
            return;
        }
        self.options.enabled = enabled;
        if !enabled {
            self.reset_on_disable();
        }
        self.notify();
    }

    pub fn overscan(&self) -> usize {
        self.options.overscan
    }

    pub fn set_overscan(&mut self, overscan: usize) {
        if self.options.overscan == overscan {
            return;
        }
        self.options.overscan = overscan;
        self.notify();
    }

    pub fn set_estimate_size(&mut self, f: impl Fn(usize) -> u32 + Send + Sync + 'static) {
        self.options.estimate_size = Arc::new(f);
        self.rebuild_table();
        self.notify();
    }

    /// Drops all measurements, reverting every item to its estimate.
    pub fn reset_measurements(&mut self) {
        if self.cache.is_empty() {
            return;
        }
        self.cache.clear();
        self.rebuild_table();
        self.notify();
    }

    fn reset_on_disable(&mut self) {
        self.cache.clear();
        self.viewport = Viewport::default();
        self.is_scrolling = false;
        self.scroll_direction = None;
        self.last_scroll_event_ms = None;
        self.rebuild_table();
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scroll_offset(&self) -> u64 {
        self.viewport.scroll_offset
    }

    pub fn viewport_height(&self) -> u32 {
        self.viewport.height
    }

    pub fn set_scroll_offset(&mut self, offset: u64) {
        if self.viewport.scroll_offset == offset {
            return;
        }
        let prev = self.viewport.scroll_offset;
        self.viewport.scroll_offset = offset;
        self.scroll_direction = match offset.cmp(&prev) {
            cmp::Ordering::Greater => Some(ScrollDirection::Forward),
            cmp::Ordering::Less => Some(ScrollDirection::Backward),
            cmp::Ordering::Equal => self.scroll_direction,
        };
        self.notify();
    }

    pub fn set_viewport_height(&mut self, height: u32) {
        if self.viewport.height == height {
            return;
        }
        self.viewport.height = height;
        self.notify();
    }

    pub fn set_viewport_and_scroll(&mut self, height: u32, scroll_offset: u64) {
        self.batch_update(|w| {
            w.set_viewport_height(height);
            w.set_scroll_offset(scroll_offset);
        });
    }

    /// Applies a scroll offset update from the host (wheel/drag/momentum) and
    /// marks the engine as scrolling.
    pub fn apply_scroll_event(&mut self, offset: u64, now_ms: u64) {
        wtrace!(offset, now_ms, "apply_scroll_event");
        self.batch_update(|w| {
            w.set_scroll_offset(offset);
            w.notify_scroll_event(now_ms);
        });
    }

    /// Same as `apply_scroll_event`, but clamps the offset to the scrollable
    /// range.
    pub fn apply_scroll_event_clamped(&mut self, offset: u64, now_ms: u64) {
        let clamped = self.clamp_scroll_offset(offset);
        self.apply_scroll_event(clamped, now_ms);
    }

    pub fn notify_scroll_event(&mut self, now_ms: u64) {
        if !self.options.enabled {
            return;
        }
        self.last_scroll_event_ms = Some(now_ms);
        self.set_is_scrolling(true);
    }

    pub fn is_scrolling(&self) -> bool {
        self.is_scrolling
    }

    pub fn scroll_direction(&self) -> Option<ScrollDirection> {
        self.scroll_direction
    }

    pub fn set_is_scrolling(&mut self, is_scrolling: bool) {
        if self.is_scrolling == is_scrolling {
            return;
        }
        self.is_scrolling = is_scrolling;
        if !is_scrolling {
            self.scroll_direction = None;
            self.last_scroll_event_ms = None;
        }
        self.notify();
    }

    /// Resets `is_scrolling` once the reset delay has elapsed since the last
    /// scroll event. Drive this from the host's timer tick.
    pub fn update_scrolling(&mut self, now_ms: u64) {
        if !self.options.enabled || !self.is_scrolling {
            return;
        }
        let Some(last) = self.last_scroll_event_ms else {
            return;
        };
        if now_ms.saturating_sub(last) >= self.options.is_scrolling_reset_delay_ms {
            self.set_is_scrolling(false);
        }
    }

    /// Records the real rendered size for an item, overriding its estimate.
    ///
    /// Out-of-range indices are ignored; a write that does not change the
    /// stored (rounded) size triggers no rebuild and no notification.
    pub fn measure(&mut self, index: usize, measured_px: f64) {
        if index >= self.options.count {
            return;
        }
        if self.cache.record(index, measured_px) {
            wtrace!(index, measured_px, "measure");
            self.rebuild_table();
            self.notify();
        }
    }

    /// Records a batch of measurements with a single rebuild/notification.
    pub fn measure_many(&mut self, measurements: impl IntoIterator<Item = (usize, f64)>) {
        let mut changed = false;
        for (index, measured_px) in measurements {
            if index >= self.options.count {
                continue;
            }
            changed |= self.cache.record(index, measured_px);
        }
        if changed {
            self.rebuild_table();
            self.notify();
        }
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.cache.get(index).is_some()
    }

    /// Number of items with a recorded (non-estimate) size.
    pub fn measured_len(&self) -> usize {
        self.cache.len()
    }

    /// Combined extent of all items, measured or estimated. Reported even
    /// when disabled: the unvirtualized fallback still needs to size its
    /// container.
    pub fn total_size(&self) -> u64 {
        self.table.total_size()
    }

    pub fn item(&self, index: usize) -> Option<Measurement> {
        self.table.get(index)
    }

    /// Inclusive index bounds of the current window, or `None` when the
    /// engine is disabled or the list is empty (full-run fallback).
    pub fn window_range(&self) -> Option<(usize, usize)> {
        if !self.options.enabled || self.table.is_empty() {
            return None;
        }
        Some(self.table.window(self.viewport, self.options.overscan))
    }

    /// Visits the items to materialize: the resolved window when windowing is
    /// active, every item otherwise.
    pub fn for_each_virtual_item(&self, mut f: impl FnMut(Measurement)) {
        let items = self.table.items();
        match self.window_range() {
            Some((from, to)) => {
                for item in &items[from..=to] {
                    f(*item);
                }
            }
            None => {
                for item in items {
                    f(*item);
                }
            }
        }
    }

    /// Collects the items to materialize into `out` (clears `out` first).
    pub fn collect_virtual_items(&self, out: &mut Vec<Measurement>) {
        out.clear();
        self.for_each_virtual_item(|item| out.push(item));
    }

    /// Allocating convenience wrapper around [`Self::collect_virtual_items`].
    pub fn virtual_items(&self) -> Vec<Measurement> {
        let mut out = Vec::new();
        self.collect_virtual_items(&mut out);
        out
    }

    pub fn max_scroll_offset(&self) -> u64 {
        self.table
            .total_size()
            .saturating_sub(self.viewport.height as u64)
    }

    pub fn clamp_scroll_offset(&self, offset: u64) -> u64 {
        offset.min(self.max_scroll_offset())
    }

    /// Computes the (clamped) scroll offset that brings `index` into view.
    pub fn scroll_to_index_offset(&self, index: usize, align: Align) -> u64 {
        if self.table.is_empty() {
            return 0;
        }
        let index = index.min(self.table.len() - 1);
        let Some(item) = self.table.get(index) else {
            return 0;
        };
        let view = self.viewport.height as u64;

        let target = match align {
            Align::Start => item.start,
            Align::End => item.end().saturating_sub(view),
            Align::Center => {
                let center = item.start.saturating_add(item.size as u64 / 2);
                center.saturating_sub(view / 2)
            }
            Align::Auto => {
                let cur = self.viewport.scroll_offset;
                let cur_end = cur.saturating_add(view);
                if item.start >= cur && item.end() <= cur_end {
                    cur
                } else if item.start < cur {
                    item.start
                } else {
                    item.end().saturating_sub(view)
                }
            }
        };

        self.clamp_scroll_offset(target)
    }

    /// Programmatically scrolls to an index (no animation) and returns the
    /// applied offset. Does not mark the engine as scrolling.
    pub fn scroll_to_index(&mut self, index: usize, align: Align) -> u64 {
        let offset = self.scroll_to_index_offset(index, align);
        self.set_scroll_offset(offset);
        offset
    }

    fn rebuild_table(&mut self) {
        self.table = OffsetTable::build(
            self.options.count,
            &self.cache,
            self.options.estimate_size.as_ref(),
        );
    }
}
