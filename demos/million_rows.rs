// Example: a million rows of uneven height on a host that can only scroll 1_000_000 units.
use std::collections::BTreeMap;

use virtual_scroller::{
    Axis, ItemHost, ScrollViewport, Scheduling, ScrollerOptions, VirtualScroller,
};

/// A fake terminal: rows are strings, their height depends on their index.
#[derive(Default)]
struct Terminal {
    offset: f64,
    runway: f64,
    rows: BTreeMap<usize, f64>,
    pending_scroll: bool,
    next_subscription: u32,
}

impl Terminal {
    fn row_height(index: usize) -> f64 {
        1.0 + (index % 3) as f64
    }

    fn scroll_by(&mut self, delta: f64) {
        self.set_scroll_offset(Axis::Vertical, self.offset + delta);
    }
}

impl ScrollViewport for Terminal {
    type Subscription = u32;

    fn viewport_extent(&self, _axis: Axis) -> f64 {
        40.0
    }

    fn scroll_offset(&self, _axis: Axis) -> f64 {
        self.offset
    }

    fn set_scroll_offset(&mut self, _axis: Axis, offset: f64) {
        let offset = offset.clamp(0.0, (self.runway - 40.0).max(0.0));
        self.pending_scroll |= offset != self.offset;
        self.offset = offset;
    }

    fn max_scroll_extent(&self, _axis: Axis) -> f64 {
        1_000_000.0
    }

    fn set_scroll_extent(&mut self, _axis: Axis, extent: f64) {
        self.runway = extent;
    }

    fn subscribe_scroll(&mut self) -> u32 {
        self.next_subscription += 1;
        self.next_subscription
    }

    fn unsubscribe(&mut self, _subscription: u32) {}
}

impl ItemHost for Terminal {
    type Item = String;

    fn attach_item(&mut self, index: usize, _item: &String, _before: Option<&String>) {
        self.rows.insert(index, 0.0);
    }

    fn detach_item(&mut self, index: usize, _item: String) {
        self.rows.remove(&index);
    }

    fn position_item(&mut self, item: &String, _axis: Axis, offset: f64) {
        if let Some(index) = item.strip_prefix("row ").and_then(|s| s.parse().ok()) {
            self.rows.insert(index, offset);
        }
    }

    fn measure_item(&self, item: &String, _axis: Axis) -> f64 {
        item.strip_prefix("row ")
            .and_then(|s| s.parse().ok())
            .map_or(1.0, Self::row_height)
    }

    fn subscribe_resize(&mut self, _index: usize, _item: &String) -> u32 {
        self.subscribe_scroll()
    }
}

fn main() {
    let options = ScrollerOptions::new(1_000_000, |i| Some(format!("row {i}")))
        .with_item_size(2.0)
        .with_buffer_size(0.5)
        .with_scheduling(Scheduling::Immediate);
    let mut scroller = match VirtualScroller::new(Terminal::default(), options) {
        Ok(scroller) => scroller,
        Err(err) => {
            eprintln!("invalid options: {err}");
            return;
        }
    };

    println!(
        "total_size={} pages={} range={:?}",
        scroller.total_size(),
        scroller.scrollbar().page_count(),
        scroller.range()
    );

    // Wheel scrolling: small steps, page turns happen under the hood.
    for step in 0..5 {
        scroller.host_mut().scroll_by(30.0);
        while std::mem::take(&mut scroller.host_mut().pending_scroll) {
            scroller.on_scroll(step * 16);
        }
        println!(
            "wheel: position={} host={} page={} range={:?}",
            scroller.scroll_position(),
            scroller.host().offset,
            scroller.scrollbar().current_page(),
            scroller.range()
        );
    }

    // Programmatic jump deep into the list.
    scroller.scroll_to(1_500_000.0);
    println!(
        "scroll_to: position={} host={} page={} range={:?} anchor={:?}",
        scroller.scroll_position(),
        scroller.host().offset,
        scroller.scrollbar().current_page(),
        scroller.range(),
        scroller.anchor()
    );
    println!("materialized rows: {}", scroller.host().rows.len());
}
