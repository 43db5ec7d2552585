use crate::*;

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        let span = end_exclusive - start;
        start + (self.next_u64() % span)
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        self.gen_range_u64(start as u64, end_exclusive as u64) as usize
    }

    fn gen_range_u32(&mut self, start: u32, end_exclusive: u32) -> u32 {
        self.gen_range_u64(start as u64, end_exclusive as u64) as u32
    }
}

fn expected_starts(sizes: &[u32]) -> Vec<u64> {
    let mut starts = Vec::with_capacity(sizes.len());
    let mut offset = 0u64;
    for &size in sizes {
        starts.push(offset);
        offset += size as u64;
    }
    starts
}

fn expected_total(sizes: &[u32]) -> u64 {
    sizes.iter().map(|&s| s as u64).sum()
}

fn expected_covering_index(sizes: &[u32], offset: u64) -> Option<usize> {
    let mut start = 0u64;
    for (i, &size) in sizes.iter().enumerate() {
        let end = start + size as u64;
        if offset >= start && offset < end {
            return Some(i);
        }
        start = end;
    }
    None
}

fn windower_with_sizes(sizes: &[u32]) -> Windower {
    let mut w = Windower::new(WindowerOptions::new(sizes.len(), |_| 1));
    w.measure_many(sizes.iter().enumerate().map(|(i, &s)| (i, s as f64)));
    w
}

#[test]
fn size_cache_rounds_and_clamps_raw_measurements() {
    use crate::cache::round_size;

    assert_eq!(round_size(119.4), 119);
    assert_eq!(round_size(119.5), 120);
    assert_eq!(round_size(420.0), 420);
    // Invalid inputs clamp to 1 rather than being rejected.
    assert_eq!(round_size(0.0), 1);
    assert_eq!(round_size(-37.5), 1);
    assert_eq!(round_size(f64::NAN), 1);
}

#[test]
fn size_cache_record_reports_changes_only() {
    let mut cache = SizeCache::new();
    assert!(cache.record(3, 120.0));
    assert!(!cache.record(3, 120.0));
    // Different raw input, same rounded value: still a no-op.
    assert!(!cache.record(3, 119.6));
    assert_eq!(cache.get(3), Some(120));
    assert_eq!(cache.len(), 1);
}

#[test]
fn size_cache_prune_drops_out_of_range_entries_only() {
    let mut cache = SizeCache::new();
    cache.record(0, 10.0);
    cache.record(4, 20.0);
    cache.record(9, 30.0);

    assert!(cache.prune_beyond(5));
    assert_eq!(cache.get(0), Some(10));
    assert_eq!(cache.get(4), Some(20));
    assert_eq!(cache.get(9), None);
    assert!(!cache.prune_beyond(5));
}

#[test]
fn prefix_sums_match_naive_accumulation() {
    let mut rng = Lcg::new(7);
    for _ in 0..50 {
        let count = rng.gen_range_usize(1, 80);
        let sizes: Vec<u32> = (0..count).map(|_| rng.gen_range_u32(1, 500)).collect();
        let w = windower_with_sizes(&sizes);

        let starts = expected_starts(&sizes);
        for i in 0..count {
            let item = w.item(i).unwrap();
            assert_eq!(item.start, starts[i]);
            assert_eq!(item.size, sizes[i]);
            assert_eq!(item.end(), starts[i] + sizes[i] as u64);
        }
        assert_eq!(w.total_size(), expected_total(&sizes));
    }
}

#[test]
fn consecutive_items_tile_without_gaps_or_overlap() {
    let mut rng = Lcg::new(21);
    let sizes: Vec<u32> = (0..60).map(|_| rng.gen_range_u32(1, 400)).collect();
    let w = windower_with_sizes(&sizes);

    let mut prev_end = 0u64;
    for i in 0..sizes.len() {
        let item = w.item(i).unwrap();
        assert_eq!(item.start, prev_end);
        prev_end = item.end();
    }
    assert_eq!(w.total_size(), prev_end);
}

#[test]
fn unmeasured_items_fall_back_to_estimate() {
    let mut w = Windower::new(WindowerOptions::new(4, |_| 100));
    w.measure(1, 250.0);

    assert_eq!(w.item(0).unwrap().size, 100);
    assert_eq!(w.item(1).unwrap().size, 250);
    assert_eq!(w.item(2).unwrap().start, 450);
    assert_eq!(w.total_size(), 550);
    assert!(w.is_measured(1));
    assert!(!w.is_measured(2));
}

#[test]
fn nearest_index_prefers_exact_end_match() {
    let w = windower_with_sizes(&[100, 100, 100]);
    let table: Vec<Measurement> = (0..3).map(|i| w.item(i).unwrap()).collect();
    // Ends are 100, 200, 300.
    assert_eq!(nearest_index(&table, 100), 0);
    assert_eq!(nearest_index(&table, 200), 1);
    assert_eq!(nearest_index(&table, 300), 2);
}

#[test]
fn nearest_index_bounds_and_empty_input() {
    let table: Vec<Measurement> = Vec::new();
    assert_eq!(nearest_index(&table, 0), 0);
    assert_eq!(nearest_index(&table, 1000), 0);

    let w = windower_with_sizes(&[10, 20, 30]);
    let table: Vec<Measurement> = (0..3).map(|i| w.item(i).unwrap()).collect();
    assert_eq!(nearest_index(&table, 0), 0);
    // Past the total extent the last index is the tightest bound.
    assert_eq!(nearest_index(&table, 10_000), 2);
}

#[test]
fn window_covers_the_scrolled_to_item() {
    // Viewport taller than any item, so the pre-overscan window always
    // reaches the item under the scroll offset.
    let mut rng = Lcg::new(33);
    for _ in 0..30 {
        let count = rng.gen_range_usize(5, 60);
        let sizes: Vec<u32> = (0..count).map(|_| rng.gen_range_u32(1, 300)).collect();
        let mut w = windower_with_sizes(&sizes);
        w.update_options(|o| o.overscan = 0);
        w.set_viewport_height(400);

        let total = w.total_size();
        for _ in 0..20 {
            let offset = rng.gen_range_u64(0, total);
            w.set_scroll_offset(offset);
            let covering = expected_covering_index(&sizes, offset).unwrap();
            let (from, to) = w.window_range().unwrap();
            assert!(
                from <= covering && covering <= to,
                "window {from}..={to} misses covering index {covering} at offset {offset}"
            );
        }
    }
}

#[test]
fn window_indices_stay_in_bounds_under_overscan() {
    let mut rng = Lcg::new(99);
    for _ in 0..30 {
        let count = rng.gen_range_usize(1, 40);
        let sizes: Vec<u32> = (0..count).map(|_| rng.gen_range_u32(1, 200)).collect();
        let mut w = windower_with_sizes(&sizes);
        let overscan = rng.gen_range_usize(0, 100);
        w.update_options(|o| o.overscan = overscan);
        w.set_viewport_height(rng.gen_range_u32(1, 500));

        let total = w.total_size();
        let offset = rng.gen_range_u64(0, total + 100);
        w.set_scroll_offset(offset);

        let (from, to) = w.window_range().unwrap();
        assert!(from <= to);
        assert!(to < count);
    }
}

#[test]
fn fixed_sizes_resolve_expected_window() {
    let mut w = Windower::new(WindowerOptions::new(100, |_| 1).with_overscan(2));
    w.set_viewport_and_scroll(10, 50);

    let items = w.virtual_items();
    // Ends are exact at 50 and 60, so the raw window is 49..=59.
    assert_eq!(items.first().map(|m| m.index), Some(47));
    assert_eq!(items.last().map(|m| m.index), Some(61));
    assert_eq!(items.len(), 15);
}

#[test]
fn windowing_materializes_fewer_items_than_the_full_list() {
    // Published-posts tab shape: 40 cards, ~420px each, 600px viewport.
    let mut w = Windower::new(WindowerOptions::new(40, |_| 420).with_overscan(8));
    w.set_viewport_and_scroll(600, 0);

    let items = w.virtual_items();
    assert!(items.len() < 40);
    assert_eq!(items.first().map(|m| m.index), Some(0));
    assert_eq!(w.total_size(), 40 * 420);
}

#[test]
fn measuring_early_items_grows_total_and_keeps_them_windowed() {
    let mut w = Windower::new(WindowerOptions::new(50, |_| 150));
    w.set_viewport_and_scroll(600, 0);
    let estimate_total = w.total_size();
    assert_eq!(estimate_total, 50 * 150);

    w.measure(0, 180.0);
    w.measure(1, 180.0);

    assert!(w.total_size() > estimate_total);
    assert_eq!(w.total_size(), 48 * 150 + 2 * 180);
    assert!(w.virtual_items().iter().any(|m| m.index == 0));
}

#[test]
fn disabled_engine_returns_the_full_run() {
    let mut w = Windower::new(WindowerOptions::new(5, |_| 100).with_enabled(false));
    w.set_viewport_and_scroll(120, 350);

    assert!(w.window_range().is_none());
    assert_eq!(w.virtual_items().len(), 5);
    // The fallback still needs a real extent to size its container.
    assert_eq!(w.total_size(), 500);
}

#[test]
fn empty_list_is_a_safe_noop() {
    let w = Windower::new(WindowerOptions::new(0, |_| 100));
    assert_eq!(w.total_size(), 0);
    assert!(w.window_range().is_none());
    assert!(w.virtual_items().is_empty());
}

#[test]
fn idempotent_measure_fires_no_change_notification() {
    let notifications = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&notifications);
    let opts = WindowerOptions::new(10, |_| 100)
        .with_on_change(Some(move |_: &Windower, _| {
            counter.fetch_add(1, Ordering::Relaxed);
        }));
    let mut w = Windower::new(opts);

    w.measure(3, 120.0);
    assert_eq!(notifications.load(Ordering::Relaxed), 1);

    // Same value again: no rebuild, no notification.
    w.measure(3, 120.0);
    assert_eq!(notifications.load(Ordering::Relaxed), 1);

    // Same rounded value: still a no-op.
    w.measure(3, 119.6);
    assert_eq!(notifications.load(Ordering::Relaxed), 1);

    // Out-of-range writes are ignored entirely.
    w.measure(10, 500.0);
    assert_eq!(notifications.load(Ordering::Relaxed), 1);
    assert_eq!(w.measured_len(), 1);
}

#[test]
fn invalid_measurements_clamp_to_one() {
    let mut w = Windower::new(WindowerOptions::new(3, |_| 100));
    w.measure(0, -45.0);
    w.measure(1, 0.0);

    assert_eq!(w.item(0).unwrap().size, 1);
    assert_eq!(w.item(1).unwrap().size, 1);
    // Ranges stay monotonic even with degenerate inputs.
    assert_eq!(w.item(2).unwrap().start, 2);
}

#[test]
fn measurements_round_to_whole_pixels() {
    let mut w = Windower::new(WindowerOptions::new(2, |_| 100));
    w.measure(0, 119.6);
    assert_eq!(w.item(0).unwrap().size, 120);
}

#[test]
fn batch_update_coalesces_notifications() {
    let notifications = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&notifications);
    let opts = WindowerOptions::new(100, |_| 10)
        .with_on_change(Some(move |_: &Windower, _| {
            counter.fetch_add(1, Ordering::Relaxed);
        }));
    let mut w = Windower::new(opts);

    w.batch_update(|w| {
        w.set_viewport_height(300);
        w.set_scroll_offset(50);
        w.notify_scroll_event(0);
    });
    assert_eq!(notifications.load(Ordering::Relaxed), 1);
}

#[test]
fn shrinking_count_prunes_stale_measurements() {
    let mut w = Windower::new(WindowerOptions::new(10, |_| 100));
    w.measure(2, 250.0);
    w.measure(8, 300.0);
    assert_eq!(w.measured_len(), 2);

    w.set_count(5);
    assert!(w.is_measured(2));
    assert!(!w.is_measured(8));
    assert_eq!(w.total_size(), 250 + 4 * 100);

    // Growing back re-estimates the pruned index; nothing stale survives.
    w.set_count(10);
    assert!(!w.is_measured(8));
    assert_eq!(w.item(8).unwrap().size, 100);
}

#[test]
fn growing_count_preserves_existing_measurements() {
    let mut w = Windower::new(WindowerOptions::new(2, |_| 100));
    w.measure(0, 180.0);

    w.set_count(4);
    assert_eq!(w.item(0).unwrap().size, 180);
    assert_eq!(w.total_size(), 180 + 3 * 100);
}

#[test]
fn disabling_discards_measurements_and_viewport() {
    let mut w = Windower::new(WindowerOptions::new(10, |_| 100));
    w.set_viewport_and_scroll(300, 150);
    w.measure(0, 999.0);

    w.set_enabled(false);
    assert_eq!(w.measured_len(), 0);
    assert_eq!(w.viewport(), Viewport::default());
    assert!(!w.is_scrolling());
    assert_eq!(w.total_size(), 1000);

    // Re-enabling starts from a clean estimate-only state.
    w.set_enabled(true);
    assert_eq!(w.item(0).unwrap().size, 100);
}

#[test]
fn estimate_change_rebuilds_the_table() {
    let mut w = Windower::new(WindowerOptions::new(10, |_| 100));
    w.measure(0, 180.0);

    w.set_estimate_size(|_| 50);
    // Measured sizes win; the rest re-estimate.
    assert_eq!(w.item(0).unwrap().size, 180);
    assert_eq!(w.total_size(), 180 + 9 * 50);
}

#[test]
fn reset_measurements_reverts_to_estimates() {
    let mut w = Windower::new(WindowerOptions::new(5, |_| 100));
    w.measure_many([(0, 200.0), (1, 200.0)]);
    assert_eq!(w.total_size(), 700);

    w.reset_measurements();
    assert_eq!(w.measured_len(), 0);
    assert_eq!(w.total_size(), 500);
}

#[test]
fn scroll_events_track_direction_and_debounce() {
    let mut w = Windower::new(WindowerOptions::new(100, |_| 10));
    w.set_viewport_height(50);

    w.apply_scroll_event(120, 0);
    assert!(w.is_scrolling());
    assert_eq!(w.scroll_direction(), Some(ScrollDirection::Forward));

    w.apply_scroll_event(60, 40);
    assert_eq!(w.scroll_direction(), Some(ScrollDirection::Backward));

    // Still within the 150ms reset delay.
    w.update_scrolling(100);
    assert!(w.is_scrolling());

    w.update_scrolling(190);
    assert!(!w.is_scrolling());
    assert_eq!(w.scroll_direction(), None);
}

#[test]
fn scroll_offsets_clamp_to_the_scrollable_range() {
    let mut w = Windower::new(WindowerOptions::new(10, |_| 10));
    w.set_viewport_height(30);

    assert_eq!(w.max_scroll_offset(), 70);
    w.apply_scroll_event_clamped(10_000, 0);
    assert_eq!(w.scroll_offset(), 70);
}

#[test]
fn scroll_to_index_aligns_within_the_viewport() {
    let mut w = Windower::new(WindowerOptions::new(10, |_| 10));
    w.set_viewport_height(30);

    assert_eq!(w.scroll_to_index_offset(5, Align::Start), 50);
    assert_eq!(w.scroll_to_index_offset(0, Align::End), 0);
    assert_eq!(w.scroll_to_index_offset(9, Align::End), 70);
    // Center: item 5 covers 50..60, so its midpoint 55 lands mid-viewport.
    assert_eq!(w.scroll_to_index_offset(5, Align::Center), 40);
    // Out-of-range indices clamp to the last item.
    assert_eq!(w.scroll_to_index_offset(99, Align::Start), 70);
}

#[test]
fn align_auto_keeps_fully_visible_items_in_place() {
    let mut w = Windower::new(WindowerOptions::new(10, |_| 10));
    w.set_viewport_and_scroll(30, 20);

    // Item 3 covers 30..40, fully inside the 20..50 viewport.
    assert_eq!(w.scroll_to_index_offset(3, Align::Auto), 20);
    // Item 0 is before the viewport: align to its start.
    assert_eq!(w.scroll_to_index_offset(0, Align::Auto), 0);
    // Item 9 is after: align to its end.
    assert_eq!(w.scroll_to_index_offset(9, Align::Auto), 70);

    let applied = w.scroll_to_index(9, Align::Auto);
    assert_eq!(applied, 70);
    assert_eq!(w.scroll_offset(), 70);
}
