use crate::{Axis, PagingOptions, ScrollMotion, ScrollViewport};

/// Maps a logical scroll axis of any size onto the host's bounded scroll range.
///
/// Hosts cap how far they can scroll, and get slow well before the cap. The logical axis is
/// split into pages of `page_size` units; at any moment the host offset only covers
/// `max_scroll_extent`, and a per-page correction restores the logical position:
///
/// `scroll_position = host_offset + current_page_offset`
///
/// Small scroll movements that cross a page boundary turn the page and move the host offset by
/// the change in page offset, so the content under the viewport does not move. Large movements
/// (e.g. dragging the host's scrollbar thumb) are jumps: the page is recomputed from the host
/// offset's relative position and nothing is written back.
///
/// The scrollbar holds no host reference; every operation that needs one borrows it.
#[derive(Clone, Debug)]
pub struct VirtualScrollbar<S> {
    axis: Axis,
    paging: PagingOptions,

    scroll_position: f64,
    total_size: f64,
    viewport_extent: f64,
    max_scroll_extent: f64,
    host_scroll_extent: f64,

    page_size: f64,
    page_count: usize,
    overlap_size: f64,
    current_page: usize,
    current_page_offset: f64,

    prev_host_position: f64,
    self_induced: Option<f64>,
    subscription: Option<S>,
}

impl<S> VirtualScrollbar<S> {
    /// Sizes the host runway for `total_size`, subscribes to host scroll events and applies the
    /// initial `scroll_position` (if non-zero).
    pub fn new<V>(
        host: &mut V,
        axis: Axis,
        paging: PagingOptions,
        total_size: f64,
        scroll_position: f64,
    ) -> Self
    where
        V: ScrollViewport<Subscription = S>,
    {
        let max_scroll_extent = match host.max_scroll_extent(axis) {
            max if max > 0.0 => max,
            // No usable ceiling reported: never page.
            _ => f64::INFINITY,
        };
        let page_size = (max_scroll_extent / f64::from(paging.page_divisor.max(1)))
            .floor()
            .max(1.0);
        let host_position = host.scroll_offset(axis).max(0.0);

        let mut bar = Self {
            axis,
            paging,
            scroll_position: host_position,
            total_size: 0.0,
            viewport_extent: host.viewport_extent(axis).max(0.0),
            max_scroll_extent,
            host_scroll_extent: 0.0,
            page_size,
            page_count: 1,
            overlap_size: 1.0,
            current_page: 0,
            current_page_offset: 0.0,
            prev_host_position: host_position,
            self_induced: None,
            subscription: None,
        };
        bar.apply_total_size(host, total_size);
        bar.subscription = Some(host.subscribe_scroll());

        if scroll_position > 0.0 {
            bar.scroll_to(host, scroll_position);
        }
        vdebug!(
            total_size = bar.total_size,
            page_size = bar.page_size,
            page_count = bar.page_count,
            "VirtualScrollbar::new"
        );
        bar
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Current logical scroll position.
    pub fn scroll_position(&self) -> f64 {
        self.scroll_position
    }

    /// Logical size of the whole content.
    pub fn total_size(&self) -> f64 {
        self.total_size
    }

    pub fn viewport_extent(&self) -> f64 {
        self.viewport_extent
    }

    /// Re-reads the viewport extent after the host viewport changed size.
    pub fn refresh_viewport_extent<V>(&mut self, host: &mut V)
    where
        V: ScrollViewport<Subscription = S>,
    {
        self.viewport_extent = host.viewport_extent(self.axis).max(0.0);
        self.scroll_position = self.scroll_position.min(self.max_position());
        self.settle_host(host);
    }

    /// The platform ceiling captured at construction.
    pub fn max_scroll_extent(&self) -> f64 {
        self.max_scroll_extent
    }

    /// Extent of the host runway: `min(total_size, max_scroll_extent)`.
    pub fn host_scroll_extent(&self) -> f64 {
        self.host_scroll_extent
    }

    pub fn page_size(&self) -> f64 {
        self.page_size
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn overlap_size(&self) -> f64 {
        self.overlap_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn current_page_offset(&self) -> f64 {
        self.current_page_offset
    }

    /// Largest logical scroll position that still fills the viewport.
    pub fn max_position(&self) -> f64 {
        (self.total_size - self.viewport_extent).max(0.0)
    }

    /// Converts a logical offset into a host offset on the current page.
    pub fn calc(&self, logical_offset: f64) -> f64 {
        logical_offset - self.current_page_offset
    }

    /// Handles a host scroll event and returns how it was classified.
    pub fn on_scroll<V>(&mut self, host: &mut V) -> ScrollMotion
    where
        V: ScrollViewport<Subscription = S>,
    {
        let host_position = host.scroll_offset(self.axis).max(0.0);
        if self.self_induced.take() == Some(host_position) {
            self.prev_host_position = host_position;
            return ScrollMotion::SelfInduced;
        }

        let delta = host_position - self.prev_host_position;
        let motion = if delta.abs() > self.viewport_extent * self.paging.jump_threshold {
            self.on_jump(host_position);
            ScrollMotion::Jump
        } else if self.on_smooth_scroll(host, host_position) {
            ScrollMotion::PageTurn
        } else {
            ScrollMotion::Smooth
        };

        let host_position = host.scroll_offset(self.axis).max(0.0);
        self.prev_host_position = host_position;
        self.scroll_position = (host_position + self.current_page_offset).max(0.0);
        vtrace!(
            host_position,
            scroll_position = self.scroll_position,
            page = self.current_page,
            motion = ?motion,
            "VirtualScrollbar::on_scroll"
        );
        motion
    }

    fn on_jump(&mut self, host_position: f64) {
        let host_range = self.host_scroll_extent - self.viewport_extent;
        let ratio = if host_range > 0.0 {
            (self.total_size - self.viewport_extent).max(0.0) / host_range
        } else {
            1.0
        };
        let estimate = host_position * ratio;
        let page = self.page_for(estimate);
        vdebug!(host_position, estimate, page, "scroll jump");
        self.set_current_page(page);
    }

    /// Turns the page if the logical position left the current one. Returns `true` on a turn.
    fn on_smooth_scroll<V>(&mut self, host: &mut V, host_position: f64) -> bool
    where
        V: ScrollViewport<Subscription = S>,
    {
        let logical = host_position + self.current_page_offset;
        let mut page = self.current_page;
        while page + 1 < self.page_count && logical > (page + 1) as f64 * self.page_size {
            page += 1;
        }
        while page > 0 && logical < page as f64 * self.page_size {
            page -= 1;
        }
        if page == self.current_page {
            return false;
        }

        let prev_offset = self.current_page_offset;
        self.set_current_page(page);
        // Move the host by exactly what the page offset moved so the logical position holds.
        let target = host_position - (self.current_page_offset - prev_offset);
        vtrace!(page, target, "page turn");
        self.write_host(host, target);
        true
    }

    fn page_for(&self, logical: f64) -> usize {
        let page = (logical / self.page_size).floor();
        if page.is_nan() || page <= 0.0 {
            return 0;
        }
        (page as usize).min(self.page_count - 1)
    }

    fn page_offset(&self, page: usize) -> f64 {
        (page as f64 * self.overlap_size).round()
    }

    fn set_current_page(&mut self, page: usize) {
        let page = page.min(self.page_count - 1);
        if page != self.current_page {
            self.current_page = page;
            self.current_page_offset = self.page_offset(page);
        }
    }

    fn write_host<V>(&mut self, host: &mut V, target: f64)
    where
        V: ScrollViewport<Subscription = S>,
    {
        let before = host.scroll_offset(self.axis);
        host.set_scroll_offset(self.axis, target.max(0.0));
        let actual = host.scroll_offset(self.axis).max(0.0);
        self.prev_host_position = actual;
        // Only a real change makes the host echo a scroll event back at us.
        self.self_induced = (actual != before).then_some(actual);
    }

    /// Moves the host so that it shows the current logical position.
    fn settle_host<V>(&mut self, host: &mut V)
    where
        V: ScrollViewport<Subscription = S>,
    {
        let target = self.calc(self.scroll_position).max(0.0);
        if host.scroll_offset(self.axis) != target {
            self.write_host(host, target);
        } else {
            // The host may have clamped on its own (e.g. after a runway change).
            self.prev_host_position = target;
        }
    }

    /// Scrolls to a logical position, clamped to `[0, max_position()]`.
    pub fn scroll_to<V>(&mut self, host: &mut V, position: f64)
    where
        V: ScrollViewport<Subscription = S>,
    {
        if !position.is_finite() {
            vwarn!(position, "VirtualScrollbar::scroll_to: ignoring non-finite position");
            return;
        }
        self.scroll_position = position.clamp(0.0, self.max_position());
        let page = self.page_for(self.scroll_position);
        self.set_current_page(page);
        self.settle_host(host);
    }

    /// Scrolls by a logical delta.
    pub fn scroll_by<V>(&mut self, host: &mut V, delta: f64)
    where
        V: ScrollViewport<Subscription = S>,
    {
        self.scroll_to(host, self.scroll_position + delta);
    }

    /// Replaces the logical content size.
    ///
    /// Recomputes the paging. The logical scroll position is kept (clamped to the new end); in
    /// particular, when the overlap grows while on the last page, the host offset is pulled back
    /// so the true logical end stays reachable.
    pub fn update_total_size<V>(&mut self, host: &mut V, total_size: f64)
    where
        V: ScrollViewport<Subscription = S>,
    {
        if total_size == self.total_size {
            return;
        }
        self.apply_total_size(host, total_size);
    }

    fn apply_total_size<V>(&mut self, host: &mut V, total_size: f64)
    where
        V: ScrollViewport<Subscription = S>,
    {
        let total_size = if total_size.is_finite() {
            total_size.max(0.0)
        } else {
            0.0
        };
        self.total_size = total_size;
        self.host_scroll_extent = total_size.min(self.max_scroll_extent);

        if total_size > self.max_scroll_extent {
            self.page_count = ((total_size / self.page_size).ceil() as usize).max(2);
            self.overlap_size =
                (total_size - self.max_scroll_extent) / (self.page_count - 1) as f64;
        } else {
            self.page_count = 1;
            self.overlap_size = 1.0;
        }
        self.current_page = self.current_page.min(self.page_count - 1);
        self.current_page_offset = self.page_offset(self.current_page);

        host.set_scroll_extent(self.axis, self.host_scroll_extent);
        self.scroll_position = self.scroll_position.min(self.max_position());
        self.settle_host(host);
        vtrace!(
            total_size,
            page_count = self.page_count,
            overlap_size = self.overlap_size,
            "VirtualScrollbar::update_total_size"
        );
    }

    /// Releases the scroll subscription and the host runway. Idempotent.
    pub fn destroy<V>(&mut self, host: &mut V)
    where
        V: ScrollViewport<Subscription = S>,
    {
        if let Some(subscription) = self.subscription.take() {
            host.unsubscribe(subscription);
            host.set_scroll_extent(self.axis, 0.0);
        }
    }
}
