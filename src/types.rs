/// The scroll axis a scroller virtualizes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    #[default]
    Vertical,
    Horizontal,
}

impl Axis {
    pub fn from_horizontal(horizontal: bool) -> Self {
        if horizontal {
            Self::Horizontal
        } else {
            Self::Vertical
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Horizontal)
    }
}

/// An inclusive interval of item indexes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemRange {
    pub start: usize,
    pub end: usize, // inclusive
}

impl ItemRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "ItemRange: start must not exceed end");
        Self { start, end }
    }

    /// Number of indexes in the range (never zero).
    pub fn count(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }

    pub fn iter(&self) -> core::ops::RangeInclusive<usize> {
        self.start..=self.end
    }
}

/// The materialized item whose on-screen position is preserved across re-layouts that were not
/// caused by scrolling.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Anchor {
    pub index: usize,
    /// Logical offset recorded for the item when the anchor was last confirmed.
    pub offset: f64,
}

/// How the scrollbar classified a host scroll event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollMotion {
    /// A small movement within the current page.
    Smooth,
    /// A small movement that crossed a page boundary; the host offset was rewritten.
    PageTurn,
    /// A host-driven repositioning larger than the jump threshold (e.g. thumb drag).
    Jump,
    /// The event echoes a scroll offset the scrollbar wrote itself.
    SelfInduced,
}

impl ScrollMotion {
    pub fn is_self_induced(self) -> bool {
        matches!(self, Self::SelfInduced)
    }
}
