//! A host-agnostic virtual scroller for lists far too large to materialize.
//!
//! Only the items near the viewport exist at any time, while the viewport scrolls as if every
//! item were present. Three pieces do the work:
//! - [`SizeModel`]: measured item extents and the running average used for everything else
//! - [`VirtualScrollbar`]: maps a logical axis of any size onto the host's bounded scroll range
//!   (paged remapping)
//! - [`VirtualScroller`]: reconciles the materialized range with the scroll position, measures
//!   new items and corrects estimation error without visible jumps
//!
//! It is UI-agnostic. A host implements [`ScrollViewport`] and [`ItemHost`] and forwards its
//! scroll, resize and frame events to the scroller.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod error;
mod host;
mod key;
mod options;
mod scheduler;
mod scrollbar;
mod scroller;
mod size_model;
mod state;
mod types;


pub use error::ConfigError;
pub use host::{ItemHost, ScrollViewport};
pub use options::{
    DEFAULT_ITEM_SIZE, ItemBuilder, OnRemoveItem, PagingOptions, Scheduling, ScrollerOptions,
};
pub use scrollbar::VirtualScrollbar;
pub use scroller::VirtualScroller;
pub use size_model::SizeModel;
pub use state::ScrollerSnapshot;
pub use types::{Anchor, Axis, ItemRange, ScrollMotion};

#[doc(hidden)]
pub use key::MeasureKey;
