use windowlist::{Windower, WindowerOptions};

fn main() {
    // 10_000 feed cards, estimated at 320px each, in a 900px viewport.
    let mut w = Windower::new(WindowerOptions::new(10_000, |_| 320).with_overscan(4));
    w.set_viewport_and_scroll(900, 0);

    println!("total_size={}", w.total_size());

    let items = w.virtual_items();
    println!(
        "window={:?} materialized={} of {}",
        w.window_range(),
        items.len(),
        w.count()
    );

    // Scroll halfway down; only the window moves, the table is untouched.
    w.apply_scroll_event(w.max_scroll_offset() / 2, 0);
    let items = w.virtual_items();
    println!(
        "after scroll: window={:?} first={:?}",
        w.window_range(),
        items.first()
    );

    // Disabled engines fall back to the full run so nothing goes missing.
    w.set_enabled(false);
    println!("disabled: materialized={}", w.virtual_items().len());
}
