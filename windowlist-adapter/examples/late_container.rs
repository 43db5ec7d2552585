// Example: the scroll container mounts after the list initializes (tab
// panels and lazy routes do this), so discovery retries until it appears.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use windowlist_adapter::{
    ResizeListener, ScrollArea, ScrollListener, Subscription, VirtualList, VirtualListOptions,
};

struct SimArea {
    scroll_px: Mutex<f64>,
    viewport_px: f64,
}

impl ScrollArea for SimArea {
    fn scroll_offset_px(&self) -> f64 {
        *self.scroll_px.lock().unwrap()
    }

    fn viewport_px(&self) -> f64 {
        self.viewport_px
    }

    fn subscribe_scroll(&self, _listener: ScrollListener) -> Subscription {
        Subscription::noop()
    }

    fn observe_resize(&self, _listener: ResizeListener) -> Option<Subscription> {
        None
    }
}

fn main() {
    // The container appears on the fourth probe, ~300ms in.
    let probes = Arc::new(AtomicUsize::new(0));
    let area = Arc::new(SimArea {
        scroll_px: Mutex::new(0.0),
        viewport_px: 600.0,
    });

    let probe_area = Arc::clone(&area);
    let probe_count = Arc::clone(&probes);
    let opts = VirtualListOptions::new(500, |_| 320, move || {
        if probe_count.fetch_add(1, Ordering::Relaxed) < 3 {
            None
        } else {
            Some(Arc::clone(&probe_area) as Arc<dyn ScrollArea>)
        }
    })
    .with_overscan(4);

    let mut list = VirtualList::new(opts, 0);
    println!("t=0 state={:?} ready={}", list.attach_state(), list.is_ready());

    for now_ms in (100..=500).step_by(100) {
        list.tick(now_ms);
        // Until ready, the caller renders the full list (the not-ready
        // contract); afterwards only the window is materialized.
        let rendered = if list.is_ready() {
            list.virtual_items().len()
        } else {
            list.count()
        };
        println!(
            "t={now_ms} state={:?} ready={} rendered={rendered}",
            list.attach_state(),
            list.is_ready(),
        );
    }

    // Once ready, the host renders the window and reports real sizes back
    // via attach_item / remeasure_item; here we just nudge one in directly.
    list.remeasure_item(0, 480.0);
    println!("total_size={}", list.total_size());
}
