use std::fmt;
use std::sync::Arc;

use windowlist::{Align, Measurement, Viewport, Windower, WindowerOptions};

use crate::attach::{AttachState, AttachmentResolver, DEFAULT_RETRY_DELAY_MS};
use crate::element::{ItemHandle, ScrollArea, ScrollProbe};
use crate::items::ItemObservers;
use crate::tracker::ViewportTracker;

/// Callback fired when the viewport crosses the end-reached threshold
/// (e.g. to page in older posts).
pub type EndReachedCallback = Arc<dyn Fn() + Send + Sync>;

/// Configuration for [`VirtualList`].
pub struct VirtualListOptions {
    pub count: usize,
    pub estimate_size: Arc<dyn Fn(usize) -> u32 + Send + Sync>,
    pub overscan: usize,
    pub enabled: bool,
    /// Locates the scroll container; `None` until it is mounted.
    pub probe: ScrollProbe,
    /// Re-probe interval while the container is missing.
    pub retry_delay_ms: u64,
    /// Minimum item count before windowing engages. Below it the list
    /// behaves exactly as if `enabled` were false. `None` leaves the
    /// decision entirely to `enabled`.
    pub virtualize_threshold: Option<usize>,
    /// Scrolled-ratio threshold for `on_end_reached`; clamped to
    /// `[0.5, 0.99]` when used.
    pub end_reached_threshold: f64,
    pub on_end_reached: Option<EndReachedCallback>,
}

impl VirtualListOptions {
    pub fn new(
        count: usize,
        estimate_size: impl Fn(usize) -> u32 + Send + Sync + 'static,
        probe: impl Fn() -> Option<Arc<dyn ScrollArea>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            count,
            estimate_size: Arc::new(estimate_size),
            overscan: 4,
            enabled: true,
            probe: Arc::new(probe),
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            virtualize_threshold: None,
            end_reached_threshold: 0.8,
            on_end_reached: None,
        }
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_retry_delay_ms(mut self, retry_delay_ms: u64) -> Self {
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    pub fn with_virtualize_threshold(mut self, threshold: Option<usize>) -> Self {
        self.virtualize_threshold = threshold;
        self
    }

    pub fn with_end_reached_threshold(mut self, threshold: f64) -> Self {
        self.end_reached_threshold = threshold;
        self
    }

    pub fn with_on_end_reached(
        mut self,
        on_end_reached: Option<impl Fn() + Send + Sync + 'static>,
    ) -> Self {
        self.on_end_reached = on_end_reached.map(|f| Arc::new(f) as _);
        self
    }
}

impl Clone for VirtualListOptions {
    fn clone(&self) -> Self {
        Self {
            count: self.count,
            estimate_size: Arc::clone(&self.estimate_size),
            overscan: self.overscan,
            enabled: self.enabled,
            probe: Arc::clone(&self.probe),
            retry_delay_ms: self.retry_delay_ms,
            virtualize_threshold: self.virtualize_threshold,
            end_reached_threshold: self.end_reached_threshold,
            on_end_reached: self.on_end_reached.clone(),
        }
    }
}

impl fmt::Debug for VirtualListOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualListOptions")
            .field("count", &self.count)
            .field("overscan", &self.overscan)
            .field("enabled", &self.enabled)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("virtualize_threshold", &self.virtualize_threshold)
            .field("end_reached_threshold", &self.end_reached_threshold)
            .finish_non_exhaustive()
    }
}

/// Framework-neutral controller that wires a [`Windower`] to a host UI:
/// container discovery, viewport tracking, and per-item size observation.
///
/// The host drives it with two things:
/// - `tick(now_ms)` on every frame/timer tick
/// - `attach_item`/`detach_item` as windowed items mount and unmount
///
/// and renders from `virtual_items()`, absolutely positioning each entry at
/// its `start` inside a container sized to `total_size()`. Until `is_ready()`
/// turns true the host must render the full list: content is never missing,
/// it is just not windowed yet.
pub struct VirtualList {
    windower: Windower,
    resolver: AttachmentResolver,
    tracker: Option<ViewportTracker>,
    observers: ItemObservers,
    enabled: bool,
    virtualize_threshold: Option<usize>,
    end_reached_threshold: f64,
    on_end_reached: Option<EndReachedCallback>,
    end_reached_fired: bool,
}

impl VirtualList {
    /// Creates the controller and, when enabled, probes for the container
    /// immediately.
    pub fn new(options: VirtualListOptions, now_ms: u64) -> Self {
        let VirtualListOptions {
            count,
            estimate_size,
            overscan,
            enabled,
            probe,
            retry_delay_ms,
            virtualize_threshold,
            end_reached_threshold,
            on_end_reached,
        } = options;

        let effective = enabled && meets_threshold(count, virtualize_threshold);
        let mut engine_opts = WindowerOptions::new(count, |_| 1);
        engine_opts.estimate_size = estimate_size;
        engine_opts.overscan = overscan;
        engine_opts.enabled = effective;

        let mut list = Self {
            windower: Windower::new(engine_opts),
            resolver: AttachmentResolver::new(probe, retry_delay_ms),
            tracker: None,
            observers: ItemObservers::new(),
            enabled,
            virtualize_threshold,
            end_reached_threshold,
            on_end_reached,
            end_reached_fired: false,
        };
        if effective {
            list.start_discovery(now_ms);
        }
        list
    }

    /// True only when windowing is on and a container is attached. While
    /// false, the host must render the full (non-windowed) list.
    pub fn is_ready(&self) -> bool {
        self.effective_enabled() && self.tracker.is_some()
    }

    pub fn attach_state(&self) -> AttachState {
        self.resolver.state()
    }

    pub fn count(&self) -> usize {
        self.windower.count()
    }

    pub fn is_scrolling(&self) -> bool {
        self.windower.is_scrolling()
    }

    /// Advances the controller: runs container discovery, folds pending
    /// viewport samples and item measurements into the engine, and debounces
    /// `is_scrolling`. Nothing here blocks; all waiting is re-polling on the
    /// host's timer.
    pub fn tick(&mut self, now_ms: u64) {
        if !self.effective_enabled() {
            return;
        }

        if self.tracker.is_none() {
            if let Some(element) = self.resolver.poll(now_ms) {
                self.attach_tracker(element);
            }
        }

        if let Some(viewport) = self.tracker.as_ref().and_then(|t| t.poll()) {
            self.windower.batch_update(|w| {
                w.set_viewport_height(viewport.height);
                if viewport.scroll_offset != w.scroll_offset() {
                    w.apply_scroll_event(viewport.scroll_offset, now_ms);
                }
            });
            self.update_end_reached(viewport);
        }

        let pending = self.observers.queue().drain();
        if !pending.is_empty() {
            self.windower.measure_many(pending);
        }

        self.windower.update_scrolling(now_ms);
    }

    /// The items to materialize: the resolved window when ready, the full
    /// run otherwise.
    pub fn virtual_items(&self) -> Vec<Measurement> {
        self.windower.virtual_items()
    }

    pub fn collect_virtual_items(&self, out: &mut Vec<Measurement>) {
        self.windower.collect_virtual_items(out);
    }

    pub fn total_size(&self) -> u64 {
        self.windower.total_size()
    }

    /// Registers the rendered element for a windowed item, measuring it once
    /// immediately and keeping a resize observer on it afterwards. The
    /// measureRef counterpart: call on mount, pair with `detach_item` on
    /// unmount.
    pub fn attach_item(&mut self, index: usize, handle: &Arc<dyn ItemHandle>) {
        if !self.effective_enabled() || index >= self.windower.count() {
            self.observers.detach(index);
            return;
        }
        let measured_px = self.observers.attach(index, handle);
        self.windower.measure(index, measured_px);
    }

    /// Disconnects one item's observer without affecting the others.
    pub fn detach_item(&mut self, index: usize) {
        self.observers.detach(index);
    }

    /// Explicit remeasurement fallback for hosts without resize observation:
    /// call after known layout-affecting events.
    pub fn remeasure_item(&mut self, index: usize, measured_px: f64) {
        self.windower.measure(index, measured_px);
    }

    pub fn set_count(&mut self, count: usize, now_ms: u64) {
        if count == self.windower.count() {
            return;
        }
        let was_effective = self.effective_enabled();
        if count < self.windower.count() {
            self.observers.prune_beyond(count);
        }
        self.windower.set_count(count);
        self.end_reached_fired = false;
        self.sync_effective(was_effective, now_ms);
    }

    /// Toggles windowing. Disabling tears everything down at once: the
    /// tracker's subscriptions, every item observer, pending retries and the
    /// measurement cache; `is_ready()` is false immediately. Re-enabling
    /// starts a fresh container search.
    pub fn set_enabled(&mut self, enabled: bool, now_ms: u64) {
        if enabled == self.enabled {
            return;
        }
        let was_effective = self.effective_enabled();
        self.enabled = enabled;
        self.sync_effective(was_effective, now_ms);
    }

    pub fn set_overscan(&mut self, overscan: usize) {
        self.windower.set_overscan(overscan);
    }

    /// Scrolls the engine to an index and returns the offset the host should
    /// apply to the real container.
    pub fn scroll_to_index(&mut self, index: usize, align: Align, now_ms: u64) -> u64 {
        let offset = self.windower.scroll_to_index_offset(index, align);
        self.windower.apply_scroll_event_clamped(offset, now_ms);
        self.windower.scroll_offset()
    }

    pub fn windower(&self) -> &Windower {
        &self.windower
    }

    pub fn windower_mut(&mut self) -> &mut Windower {
        &mut self.windower
    }

    fn effective_enabled(&self) -> bool {
        self.enabled && meets_threshold(self.windower.count(), self.virtualize_threshold)
    }

    fn start_discovery(&mut self, now_ms: u64) {
        if let Some(element) = self.resolver.enable(now_ms) {
            self.attach_tracker(element);
        }
    }

    fn attach_tracker(&mut self, element: Arc<dyn ScrollArea>) {
        let tracker = ViewportTracker::attach(element);
        // Fold the attach-time sample right away so the first resolved
        // window reflects the real viewport.
        if let Some(viewport) = tracker.poll() {
            self.windower
                .set_viewport_and_scroll(viewport.height, viewport.scroll_offset);
        }
        self.tracker = Some(tracker);
    }

    fn sync_effective(&mut self, was_effective: bool, now_ms: u64) {
        let effective = self.effective_enabled();
        if effective == was_effective {
            return;
        }
        if effective {
            self.windower.set_enabled(true);
            self.start_discovery(now_ms);
        } else {
            self.tracker = None;
            self.observers.clear();
            self.resolver.disable();
            self.windower.set_enabled(false);
        }
    }

    fn update_end_reached(&mut self, viewport: Viewport) {
        let Some(on_end_reached) = self.on_end_reached.clone() else {
            return;
        };
        let total = self.windower.total_size();
        if total == 0 {
            return;
        }
        let threshold = self.end_reached_threshold.clamp(0.5, 0.99);
        let ratio = viewport.end() as f64 / total as f64;
        if ratio >= threshold {
            if !self.end_reached_fired {
                self.end_reached_fired = true;
                on_end_reached();
            }
        } else if self.end_reached_fired {
            self.end_reached_fired = false;
        }
    }
}

impl fmt::Debug for VirtualList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualList")
            .field("ready", &self.is_ready())
            .field("attach_state", &self.attach_state())
            .field("count", &self.windower.count())
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

fn meets_threshold(count: usize, threshold: Option<usize>) -> bool {
    threshold.is_none_or(|t| count >= t)
}
