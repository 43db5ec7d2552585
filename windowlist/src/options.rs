use alloc::sync::Arc;

use crate::windower::Windower;

/// A callback fired when the engine's observable state changes.
///
/// The second argument is `is_scrolling`.
pub type OnChangeCallback = Arc<dyn Fn(&Windower, bool) + Send + Sync>;

/// Configuration for [`crate::Windower`].
///
/// Cheap to clone: the estimate and callbacks are stored in `Arc`s, so a host
/// can tweak a few fields and call `Windower::set_options` without
/// reallocating closures.
pub struct WindowerOptions {
    pub count: usize,
    /// Estimated item size in the scroll axis, used until an item is
    /// measured. Values below 1 are treated as 1.
    pub estimate_size: Arc<dyn Fn(usize) -> u32 + Send + Sync>,
    /// Extra items materialized beyond each edge of the visible range.
    pub overscan: usize,
    /// When false, every query falls back to the full unwindowed run.
    pub enabled: bool,
    /// Optional callback fired when the engine's state changes.
    pub on_change: Option<OnChangeCallback>,
    /// How long after the last scroll event `is_scrolling` resets.
    pub is_scrolling_reset_delay_ms: u64,
}

impl WindowerOptions {
    pub fn new(count: usize, estimate_size: impl Fn(usize) -> u32 + Send + Sync + 'static) -> Self {
        Self {
            count,
            estimate_size: Arc::new(estimate_size),
            overscan: 4,
            enabled: true,
            on_change: None,
            is_scrolling_reset_delay_ms: 150,
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

    pub fn with_on_change(
        mut self,
        on_change: Option<impl Fn(&Windower, bool) + Send + Sync + 'static>,
    ) -> Self {
        self.on_change = on_change.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_is_scrolling_reset_delay_ms(mut self, delay_ms: u64) -> Self {
        self.is_scrolling_reset_delay_ms = delay_ms;
        self
    }
}

impl Clone for WindowerOptions {
    fn clone(&self) -> Self {
        Self {
            count: self.count,
            estimate_size: Arc::clone(&self.estimate_size),
            overscan: self.overscan,
            enabled: self.enabled,
            on_change: self.on_change.clone(),
            is_scrolling_reset_delay_ms: self.is_scrolling_reset_delay_ms,
        }
    }
}

impl core::fmt::Debug for WindowerOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WindowerOptions")
            .field("count", &self.count)
            .field("overscan", &self.overscan)
            .field("enabled", &self.enabled)
            .field(
                "is_scrolling_reset_delay_ms",
                &self.is_scrolling_reset_delay_ms,
            )
            .finish_non_exhaustive()
    }
}
