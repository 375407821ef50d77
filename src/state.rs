use crate::{Anchor, ItemRange};

/// A lightweight, serializable snapshot of a scroller's logical state.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`. Restore it by
/// seeding [`crate::ScrollerOptions::scroll_position`] with `scroll_position`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollerSnapshot {
    pub scroll_position: f64,
    pub total_size: f64,
    pub item_count: usize,
    pub range: Option<ItemRange>,
    pub anchor: Option<Anchor>,
}
