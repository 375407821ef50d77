//! Collaborator traits implemented by the rendering host.
//!
//! The scroller never touches a UI toolkit directly. A host (DOM binding, TUI, retained-mode
//! GUI, test double) implements these traits and forwards its events to
//! [`crate::VirtualScroller`].

use crate::Axis;

/// The scrollable viewport: the part of the host the [`crate::VirtualScrollbar`] drives.
pub trait ScrollViewport {
    /// Returned by the `subscribe_*` methods and handed back through [`Self::unsubscribe`].
    type Subscription;

    /// Visible extent of the viewport along `axis`.
    fn viewport_extent(&self, axis: Axis) -> f64;

    /// Current host scroll offset along `axis`.
    fn scroll_offset(&self, axis: Axis) -> f64;

    /// Writes the host scroll offset. The host may clamp it; the scrollbar reads it back.
    fn set_scroll_offset(&mut self, axis: Axis, offset: f64);

    /// The largest scroll extent the platform supports along `axis`. Read once.
    fn max_scroll_extent(&self, axis: Axis) -> f64;

    /// Sizes the host's scrollable runway.
    fn set_scroll_extent(&mut self, axis: Axis, extent: f64);

    /// Starts delivering scroll events (the host forwards them to `on_scroll`).
    fn subscribe_scroll(&mut self) -> Self::Subscription;

    fn unsubscribe(&mut self, subscription: Self::Subscription);
}

/// A viewport that can also host materialized items.
pub trait ItemHost: ScrollViewport {
    /// Opaque handle to a materialized visual element.
    type Item;

    /// Attaches `item` to the render tree immediately before `before`, or at the end when
    /// `before` is `None`.
    fn attach_item(&mut self, index: usize, item: &Self::Item, before: Option<&Self::Item>);

    /// Detaches and releases `item`.
    fn detach_item(&mut self, index: usize, item: Self::Item);

    /// Places `item` at `offset` along `axis`, in host coordinates.
    fn position_item(&mut self, item: &Self::Item, axis: Axis, offset: f64);

    /// Rendered extent of an attached item along `axis`.
    fn measure_item(&self, item: &Self::Item, axis: Axis) -> f64;

    /// Starts delivering size changes of `item` (the host forwards them to `on_item_resize`).
    fn subscribe_resize(&mut self, index: usize, item: &Self::Item) -> Self::Subscription;

    /// Completes any pending host layout so freshly attached items can be measured.
    fn flush_layout(&mut self) {}
}
