// Example: refining estimates with real rendered sizes.
use windowlist::{Align, Windower, WindowerOptions};

fn main() {
    let mut w = Windower::new(WindowerOptions::new(200, |_| 150).with_overscan(2));
    w.set_viewport_and_scroll(600, 0);

    println!("estimate-only total={}", w.total_size());

    // The host measures cards as they render; long posts come in taller.
    w.measure_many([(0, 180.0), (1, 412.5), (2, 96.0)]);
    println!("measured total={}", w.total_size());

    for item in w.virtual_items() {
        println!(
            "  index={} start={} size={} measured={}",
            item.index,
            item.start,
            item.size,
            w.is_measured(item.index)
        );
    }

    // Offsets derived from measurements feed scroll targeting too.
    let target = w.scroll_to_index_offset(1, Align::Start);
    w.apply_scroll_event_clamped(target, 0);
    println!("scrolled to index 1 at offset {}", w.scroll_offset());
}
