use std::fmt;
use std::sync::Arc;

/// Listener invoked whenever the container emits a scroll event. The payload
/// is intentionally empty: listeners re-read the handle at event time, so a
/// late delivery can never inject a stale value.
pub type ScrollListener = Arc<dyn Fn() + Send + Sync>;

/// Listener invoked with a newly observed main-axis size, in pixels.
pub type ResizeListener = Arc<dyn Fn(f64) + Send + Sync>;

/// Handle to the host's scrollable container element.
///
/// The host is free to back this with a real DOM node, a test double, or any
/// other scrollable surface; the engine only ever samples and subscribes.
pub trait ScrollArea: Send + Sync {
    /// Current scroll position in pixels (`scrollTop` for vertical lists).
    fn scroll_offset_px(&self) -> f64;

    /// Current visible main-axis size in pixels (`clientHeight`).
    fn viewport_px(&self) -> f64;

    /// Subscribes to the container's scroll events, at whatever cadence the
    /// host delivers them (no artificial debouncing on this side).
    fn subscribe_scroll(&self, listener: ScrollListener) -> Subscription;

    /// Starts resize observation of the container, or returns `None` when
    /// the host has no such primitive. Callers then fall back to a one-shot
    /// height read.
    fn observe_resize(&self, listener: ResizeListener) -> Option<Subscription>;
}

/// Handle to a single rendered item's root element.
pub trait ItemHandle: Send + Sync {
    /// The item's currently rendered main-axis size, in pixels.
    fn measured_px(&self) -> f64;

    /// Starts resize observation of the item, or `None` when unsupported.
    fn observe_resize(&self, listener: ResizeListener) -> Option<Subscription>;
}

/// Probe for the scroll container. Returns `None` until the container is
/// mounted; the attachment resolver keeps re-probing on an interval.
pub type ScrollProbe = Arc<dyn Fn() -> Option<Arc<dyn ScrollArea>> + Send + Sync>;

/// Guard for a host subscription; runs its teardown exactly once, either via
/// [`Subscription::disconnect`] or on drop.
pub struct Subscription(Option<Box<dyn FnOnce() + Send>>);

impl Subscription {
    pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
        Self(Some(Box::new(teardown)))
    }

    /// A subscription with no teardown work.
    pub fn noop() -> Self {
        Self(None)
    }

    /// Tears down now instead of at drop time.
    pub fn disconnect(mut self) {
        if let Some(teardown) = self.0.take() {
            teardown();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(teardown) = self.0.take() {
            teardown();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.0.is_some() {
            "Subscription(..)"
        } else {
            "Subscription(noop)"
        })
    }
}

/// Converts a raw pixel offset to engine units, clamping to >= 0.
pub(crate) fn px_to_offset(px: f64) -> u64 {
    if !px.is_finite() || px <= 0.0 {
        return 0;
    }
    (px + 0.5) as u64
}

/// Converts a raw pixel extent to engine units, clamping to >= 0.
pub(crate) fn px_to_extent(px: f64) -> u32 {
    if !px.is_finite() || px <= 0.0 {
        return 0;
    }
    ((px + 0.5) as u64).min(u32::MAX as u64) as u32
}
