use std::collections::BTreeMap;

use crate::options::{ItemBuilder, OnRemoveItem};
use crate::scheduler::{PendingSync, SyncReason, SyncScheduler};
use crate::{
    Anchor, Axis, ConfigError, ItemHost, ItemRange, ScrollMotion, ScrollerOptions,
    ScrollerSnapshot, SizeModel, VirtualScrollbar,
};

struct Materialized<T, S> {
    item: T,
    /// Logical offset along the scroll axis; `None` until the first layout.
    offset: Option<f64>,
    subscription: Option<S>,
}

/// A virtual scroller: keeps only the items near the viewport materialized while the viewport
/// behaves as if every item were present.
///
/// The scroller owns its host. The host forwards its events:
/// - `on_scroll` for host scroll events
/// - `on_item_resize` when a materialized item changed size
/// - `on_viewport_resize` when the viewport itself changed size
/// - `on_frame` once per rendering frame (not needed with [`crate::Scheduling::Immediate`])
///
/// Each reconciliation pass computes the index range to materialize, creates and evicts items,
/// measures new items, lays them out and corrects the scroll position and the logical content
/// size when estimates turn out wrong. If the corrected state asks for a different range,
/// another pass is scheduled.
pub struct VirtualScroller<H: ItemHost> {
    host: H,
    axis: Axis,
    item_count: usize,
    item_builder: ItemBuilder<H::Item>,
    on_remove_item: Option<OnRemoveItem>,
    buffer_size: f64,
    fast_scroll_threshold: f64,
    max_settle_passes: usize,

    sizes: SizeModel<usize>,
    scrollbar: VirtualScrollbar<H::Subscription>,
    scheduler: SyncScheduler,

    range: Option<ItemRange>,
    rendered: BTreeMap<usize, Materialized<H::Item, H::Subscription>>,
    anchor: Option<Anchor>,
    last_sync_position: f64,

    in_pass: bool,
    destroyed: bool,
}

impl<H: ItemHost> VirtualScroller<H> {
    /// Validates `options`, sizes the host runway and schedules the first pass.
    ///
    /// With [`crate::Scheduling::Immediate`] the first passes run before this returns.
    pub fn new(mut host: H, options: ScrollerOptions<H::Item>) -> Result<Self, ConfigError> {
        let options = options.validate()?;
        let total_size = options.item_count as f64 * options.item_size;
        let scrollbar = VirtualScrollbar::new(
            &mut host,
            options.axis,
            options.paging,
            total_size,
            options.scroll_position,
        );
        vdebug!(
            item_count = options.item_count,
            item_size = options.item_size,
            buffer_size = options.buffer_size,
            "VirtualScroller::new"
        );

        let mut scroller = Self {
            host,
            axis: options.axis,
            item_count: options.item_count,
            item_builder: options.item_builder,
            on_remove_item: options.on_remove_item,
            buffer_size: options.buffer_size,
            fast_scroll_threshold: options.fast_scroll_threshold,
            max_settle_passes: options.max_settle_passes,
            sizes: SizeModel::new(options.item_size),
            last_sync_position: scrollbar.scroll_position(),
            scrollbar,
            scheduler: SyncScheduler::new(options.scheduling, options.fast_scroll_delay_ms),
            range: None,
            rendered: BTreeMap::new(),
            anchor: None,
            in_pass: false,
            destroyed: false,
        };
        scroller.request_sync(SyncReason::Scroll, 0, false);
        Ok(scroller)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// The materialized index range, `None` when nothing is materialized.
    pub fn range(&self) -> Option<ItemRange> {
        self.range
    }

    pub fn anchor(&self) -> Option<Anchor> {
        self.anchor
    }

    /// Logical scroll position.
    pub fn scroll_position(&self) -> f64 {
        self.scrollbar.scroll_position()
    }

    /// Logical size of the whole content (estimated where items were never measured).
    pub fn total_size(&self) -> f64 {
        self.scrollbar.total_size()
    }

    pub fn viewport_extent(&self) -> f64 {
        self.scrollbar.viewport_extent()
    }

    pub fn average_size(&self) -> f64 {
        self.sizes.average_size()
    }

    pub fn scrollbar(&self) -> &VirtualScrollbar<H::Subscription> {
        &self.scrollbar
    }

    pub fn item(&self, index: usize) -> Option<&H::Item> {
        self.rendered.get(&index).map(|m| &m.item)
    }

    /// Logical offset of a materialized item.
    pub fn item_offset(&self, index: usize) -> Option<f64> {
        self.rendered.get(&index).and_then(|m| m.offset)
    }

    /// Materialized indexes, ascending.
    pub fn materialized_indexes(&self) -> impl Iterator<Item = usize> + '_ {
        self.rendered.keys().copied()
    }

    pub fn materialized_count(&self) -> usize {
        self.rendered.len()
    }

    pub fn has_pending_sync(&self) -> bool {
        self.scheduler.is_pending()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn snapshot(&self) -> ScrollerSnapshot {
        ScrollerSnapshot {
            scroll_position: self.scroll_position(),
            total_size: self.total_size(),
            item_count: self.item_count,
            range: self.range,
            anchor: self.anchor,
        }
    }

    /// Scrolls to a logical position and schedules a pass.
    pub fn scroll_to(&mut self, position: f64) {
        if self.destroyed {
            return;
        }
        self.scrollbar.scroll_to(&mut self.host, position);
        self.request_sync(SyncReason::Scroll, 0, false);
    }

    /// Changes the number of items. The logical size grows or shrinks by the average size per
    /// added or removed item.
    pub fn update_item_count(&mut self, item_count: usize) {
        if self.destroyed || item_count == self.item_count {
            return;
        }
        let total_size = if item_count == 0 {
            0.0
        } else {
            let delta = item_count as f64 - self.item_count as f64;
            (self.scrollbar.total_size() + delta * self.estimate()).max(0.0)
        };
        vdebug!(from = self.item_count, to = item_count, "update_item_count");
        self.item_count = item_count;
        self.scrollbar.update_total_size(&mut self.host, total_size);
        self.request_sync(SyncReason::Resize, 0, false);
    }

    /// Host scroll event.
    pub fn on_scroll(&mut self, now_ms: u64) {
        if self.destroyed {
            return;
        }
        let motion = self.scrollbar.on_scroll(&mut self.host);
        if motion.is_self_induced() {
            return;
        }
        match motion {
            ScrollMotion::Jump => {
                // The old anchor says nothing about where a jump landed.
                self.anchor = None;
                self.reposition();
            }
            ScrollMotion::PageTurn => self.reposition(),
            ScrollMotion::Smooth | ScrollMotion::SelfInduced => {}
        }

        let delta = (self.scrollbar.scroll_position() - self.last_sync_position).abs();
        let throttle = delta > self.scrollbar.viewport_extent() * self.fast_scroll_threshold;
        self.request_sync(SyncReason::Scroll, now_ms, throttle);
    }

    /// A materialized item changed size.
    pub fn on_item_resize(&mut self, index: usize, now_ms: u64) {
        if self.destroyed || !self.rendered.contains_key(&index) {
            return;
        }
        self.sizes.remove(&index);
        self.request_sync(SyncReason::Resize, now_ms, false);
    }

    /// The viewport changed size; every measurement is invalidated.
    pub fn on_viewport_resize(&mut self, now_ms: u64) {
        if self.destroyed {
            return;
        }
        self.scrollbar.refresh_viewport_extent(&mut self.host);
        self.sizes.reset();
        self.request_sync(SyncReason::Resize, now_ms, false);
    }

    /// Frame tick. Runs the pending pass if it is due; returns whether a pass ran.
    pub fn on_frame(&mut self, now_ms: u64) -> bool {
        if self.destroyed {
            return false;
        }
        match self.scheduler.take_due(now_ms) {
            Some(pending) => {
                self.sync(pending);
                true
            }
            None => false,
        }
    }

    /// Releases every host subscription and materialized item. Idempotent.
    ///
    /// `on_remove_item` is not called for items released here.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.scheduler.cancel();
        for (index, m) in std::mem::take(&mut self.rendered) {
            if let Some(subscription) = m.subscription {
                self.host.unsubscribe(subscription);
            }
            self.host.detach_item(index, m.item);
        }
        self.sizes.reset();
        self.range = None;
        self.anchor = None;
        self.scrollbar.destroy(&mut self.host);
        vdebug!("VirtualScroller::destroy");
    }

    fn request_sync(&mut self, reason: SyncReason, now_ms: u64, throttle: bool) {
        self.scheduler.request(reason, now_ms, throttle);
        if self.scheduler.is_immediate() && !self.in_pass {
            self.flush();
        }
    }

    fn flush(&mut self) {
        for _ in 0..self.max_settle_passes {
            let Some(pending) = self.scheduler.take() else {
                return;
            };
            self.sync(pending);
        }
        if self.scheduler.is_pending() {
            vwarn!(
                passes = self.max_settle_passes,
                "layout did not settle; leaving the next pass pending"
            );
        }
    }

    fn sync(&mut self, pending: PendingSync) {
        self.in_pass = true;
        let range = self.compute_range();
        vtrace!(
            range = ?range,
            scrolled = pending.scrolled,
            relayout = pending.relayout,
            "sync"
        );
        self.reconcile(range, pending);
        self.in_pass = false;
    }

    /// Positive average used to turn logical distances into item counts.
    fn estimate(&self) -> f64 {
        let average = self.sizes.average_size();
        if average > 0.0 && average.is_finite() {
            average
        } else {
            self.sizes.default_size()
        }
    }

    /// The index range that should be materialized for the current scroll position.
    pub(crate) fn compute_range(&self) -> Option<ItemRange> {
        if self.item_count == 0 {
            return None;
        }
        let position = self.scrollbar.scroll_position();
        let viewport = self.scrollbar.viewport_extent();
        let buffer = self.buffer_size * viewport;
        let low = (position - buffer).max(0.0);
        let high = position + viewport + buffer;
        let average = self.estimate();

        let mut start = (low / average).floor() as i64;
        let mut end = (high / average).ceil() as i64 - 1;

        // Real offsets beat the average-based guess.
        for (&index, m) in &self.rendered {
            let Some(offset) = m.offset else {
                continue;
            };
            if offset + self.sizes.hopeful_size(&index) > low {
                start = start.min(index as i64);
            }
            if offset < high {
                end = index as i64;
            }
        }

        if let Some(offset) = self.positioned_offset(start) {
            if offset > low {
                start -= ((offset - low) / average).ceil() as i64;
            }
        }
        if let Some(offset) = self.positioned_offset(end) {
            let bottom = offset + self.sizes.hopeful_size(&(end as usize));
            if bottom < high {
                end += ((high - bottom) / average).ceil() as i64;
            }
        }

        let max_index = self.item_count as i64 - 1;
        let start = start.clamp(0, max_index);
        let end = end.clamp(0, max_index).max(start);
        Some(ItemRange::new(start as usize, end as usize))
    }

    fn positioned_offset(&self, index: i64) -> Option<f64> {
        let index = usize::try_from(index).ok()?;
        self.rendered.get(&index).and_then(|m| m.offset)
    }

    fn reconcile(&mut self, range: Option<ItemRange>, pending: PendingSync) {
        // The average the range was computed with also places an unanchored window.
        let average = self.estimate();

        let Some(range) = range.and_then(|range| self.materialize(range)) else {
            self.clear();
            return;
        };
        self.evict_outside(range);
        self.measure_new();

        // Lay out backwards from the pivot to find where the range starts.
        let (pivot, pivot_offset) = self.layout_pivot(range, average);
        let mut start_offset = pivot_offset;
        for index in (range.start..pivot).rev() {
            start_offset -= self.sizes.hopeful_size(&index);
        }

        // Index 0 starts at 0, and nothing starts before 0. Anything else is accumulated
        // estimation error for items outside the range: purge it and move the scroll position
        // along so the content does not jump.
        let mut applied_shift = 0.0;
        if range.start == 0 || start_offset < 0.0 {
            let correction = -start_offset;
            if correction != 0.0 {
                applied_shift = self.shift_scroll(correction);
                vdebug!(correction, applied_shift, "purging estimation error");
            }
            start_offset = 0.0;
        }

        let mut offset = start_offset;
        for (&index, m) in self.rendered.range_mut(range.start..=range.end) {
            m.offset = Some(offset);
            self.host
                .position_item(&m.item, self.axis, self.scrollbar.calc(offset));
            offset += self.sizes.hopeful_size(&index);
        }
        let layout_end = offset;

        self.update_anchor(pending, applied_shift);
        self.correct_total_size(range, layout_end);

        self.range = Some(range);
        self.last_sync_position = self.scrollbar.scroll_position();

        let next = self.compute_range();
        if next != Some(range) {
            vtrace!(range = ?range, next = ?next, "range not settled; scheduling another pass");
            self.scheduler.request(SyncReason::Settle, 0, false);
        }
    }

    /// Creates the missing items of `range` in ascending order. Returns the range actually
    /// materialized, which is shorter when the item builder ended the list.
    fn materialize(&mut self, mut range: ItemRange) -> Option<ItemRange> {
        loop {
            let mut ended_at = None;
            for index in range.iter() {
                if self.rendered.contains_key(&index) {
                    continue;
                }
                let Some(item) = (self.item_builder)(index) else {
                    ended_at = Some(index);
                    break;
                };
                let before = self.rendered.range(index + 1..).next().map(|(_, m)| &m.item);
                self.host.attach_item(index, &item, before);
                let subscription = self.host.subscribe_resize(index, &item);
                self.rendered.insert(
                    index,
                    Materialized {
                        item,
                        offset: None,
                        subscription: Some(subscription),
                    },
                );
            }

            let Some(count) = ended_at else {
                return Some(range);
            };
            vdebug!(count, "item builder ended the list");
            self.item_count = count;
            let end = count.checked_sub(1)?;
            range = ItemRange::new(range.start.min(end), end);
        }
    }

    fn evict_outside(&mut self, range: ItemRange) {
        let tail = self.rendered.split_off(&(range.end + 1));
        let kept = self.rendered.split_off(&range.start);
        let head = std::mem::replace(&mut self.rendered, kept);
        for (index, m) in head.into_iter().chain(tail) {
            self.evict(index, m);
        }
    }

    fn evict(&mut self, index: usize, m: Materialized<H::Item, H::Subscription>) {
        if let Some(on_remove_item) = self.on_remove_item.as_mut() {
            on_remove_item(index);
        }
        self.sizes.remove(&index);
        if let Some(subscription) = m.subscription {
            self.host.unsubscribe(subscription);
        }
        self.host.detach_item(index, m.item);
    }

    /// Evicts everything (the list is empty).
    fn clear(&mut self) {
        for (index, m) in std::mem::take(&mut self.rendered) {
            self.evict(index, m);
        }
        self.range = None;
        self.anchor = None;
        self.scrollbar.update_total_size(&mut self.host, 0.0);
        self.last_sync_position = self.scrollbar.scroll_position();
    }

    fn measure_new(&mut self) {
        if self.rendered.keys().all(|index| self.sizes.has(index)) {
            return;
        }
        // Measuring needs the new items laid out by the host.
        self.host.flush_layout();
        for (&index, m) in &self.rendered {
            if !self.sizes.has(&index) {
                let size = self.host.measure_item(&m.item, self.axis);
                self.sizes.measure(index, size);
            }
        }
    }

    /// Where layout starts from: the anchor when it survived, otherwise the first item that
    /// already has an offset, otherwise an estimate for the first item.
    fn layout_pivot(&self, range: ItemRange, average: f64) -> (usize, f64) {
        if let Some(anchor) = self.anchor {
            if range.contains(anchor.index) {
                if let Some(offset) = self.positioned_offset(anchor.index as i64) {
                    return (anchor.index, offset);
                }
            }
        }
        self.rendered
            .range(range.start..=range.end)
            .find_map(|(&index, m)| m.offset.map(|offset| (index, offset)))
            .unwrap_or((range.start, range.start as f64 * average))
    }

    /// Shifts the logical scroll position; returns the shift the scrollbar actually applied.
    fn shift_scroll(&mut self, delta: f64) -> f64 {
        let before = self.scrollbar.scroll_position();
        self.scrollbar.scroll_by(&mut self.host, delta);
        let applied = self.scrollbar.scroll_position() - before;
        if applied != 0.0 {
            // Items were positioned for the old page offset.
            self.reposition();
        }
        applied
    }

    fn update_anchor(&mut self, pending: PendingSync, applied_shift: f64) {
        if let Some(anchor) = self.anchor {
            match self.positioned_offset(anchor.index as i64) {
                Some(offset) => {
                    if pending.relayout {
                        // Keep the anchor still on screen: whatever the corrections above did
                        // not already compensate is compensated now.
                        let residual = (offset - anchor.offset) - applied_shift;
                        if residual != 0.0 {
                            vdebug!(
                                index = anchor.index,
                                residual,
                                "compensating anchor movement"
                            );
                            self.shift_scroll(residual);
                        }
                    }
                    self.anchor = Some(Anchor {
                        index: anchor.index,
                        offset,
                    });
                }
                None => self.anchor = None,
            }
        }

        if pending.scrolled || self.anchor.is_none() {
            self.anchor = self.item_at(self.scrollbar.scroll_position());
        }
    }

    /// The materialized item whose span contains the logical `position`.
    fn item_at(&self, position: f64) -> Option<Anchor> {
        self.rendered.iter().find_map(|(&index, m)| {
            let offset = m.offset?;
            (offset <= position && position < offset + self.sizes.hopeful_size(&index))
                .then_some(Anchor { index, offset })
        })
    }

    /// Brings the logical content size in line with the layout once the layout reaches the
    /// end of the current estimate.
    fn correct_total_size(&mut self, range: ItemRange, layout_end: f64) {
        let total_size = self.scrollbar.total_size();
        let last = self.item_count - 1;
        let corrected = if range.end == last {
            layout_end
        } else if layout_end > total_size - self.scrollbar.viewport_extent() {
            layout_end + (last - range.end) as f64 * self.estimate()
        } else {
            return;
        };
        if corrected != total_size {
            vdebug!(from = total_size, to = corrected, "correcting total size");
            self.scrollbar.update_total_size(&mut self.host, corrected);
            // A smaller page overlap moves every item on screen.
            self.reposition();
        }
    }

    /// Re-applies host positions after the page offset changed.
    fn reposition(&mut self) {
        for m in self.rendered.values() {
            if let Some(offset) = m.offset {
                self.host
                    .position_item(&m.item, self.axis, self.scrollbar.calc(offset));
            }
        }
    }
}

impl<H: ItemHost> Drop for VirtualScroller<H> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<H: ItemHost> core::fmt::Debug for VirtualScroller<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualScroller")
            .field("axis", &self.axis)
            .field("item_count", &self.item_count)
            .field("scroll_position", &self.scroll_position())
            .field("total_size", &self.total_size())
            .field("range", &self.range)
            .field("anchor", &self.anchor)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}
