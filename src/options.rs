use crate::{Axis, ConfigError};

/// Builds the item handle for an index.
///
/// Returning `None` ends the list early: the scroller truncates its item count to that index.
pub type ItemBuilder<T> = Box<dyn FnMut(usize) -> Option<T>>;

/// Notified with the index of every item evicted from the materialized range.
pub type OnRemoveItem = Box<dyn FnMut(usize)>;

/// Average item extent assumed before anything was measured and no `item_size` was given.
pub const DEFAULT_ITEM_SIZE: f64 = 50.0;

/// How reconciliation passes are scheduled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Scheduling {
    /// Passes are coalesced and run from [`crate::VirtualScroller::on_frame`], at most one per
    /// frame.
    #[default]
    Frame,
    /// The host has no frame primitive: passes run synchronously when they are requested.
    Immediate,
}

/// Tuning for the scrollbar's paged remapping.
///
/// Both values are empirical. They work well for browser-like hosts but are not invariants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PagingOptions {
    /// `page_size = floor(max_scroll_extent / page_divisor)`.
    pub page_divisor: u32,
    /// Host scroll deltas larger than `jump_threshold * viewport_extent` are treated as jumps.
    pub jump_threshold: f64,
}

impl Default for PagingOptions {
    fn default() -> Self {
        Self {
            page_divisor: 100,
            jump_threshold: 1.0,
        }
    }
}

/// Configuration for [`crate::VirtualScroller`].
///
/// `item_count` and `item_builder` are required; everything else has a documented default.
/// The options are validated once, by [`crate::VirtualScroller::new`].
pub struct ScrollerOptions<T> {
    pub item_count: Option<usize>,
    pub item_builder: Option<ItemBuilder<T>>,
    /// Seed for the average item size until the first measurement. Defaults to
    /// [`DEFAULT_ITEM_SIZE`].
    pub item_size: Option<f64>,
    /// Extra content materialized before and after the viewport, in viewport extents.
    pub buffer_size: f64,
    /// Initial logical scroll position.
    pub scroll_position: f64,
    pub horizontal: bool,
    pub on_remove_item: Option<OnRemoveItem>,
    pub paging: PagingOptions,
    pub scheduling: Scheduling,
    /// Scroll deltas (in viewport extents) since the last pass that defer the next pass.
    pub fast_scroll_threshold: f64,
    pub fast_scroll_delay_ms: u64,
    /// Upper bound on back-to-back passes flushed synchronously in [`Scheduling::Immediate`].
    pub max_settle_passes: usize,
}

impl<T> Default for ScrollerOptions<T> {
    fn default() -> Self {
        Self {
            item_count: None,
            item_builder: None,
            item_size: None,
            buffer_size: 1.0,
            scroll_position: 0.0,
            horizontal: false,
            on_remove_item: None,
            paging: PagingOptions::default(),
            scheduling: Scheduling::default(),
            fast_scroll_threshold: 1.0,
            fast_scroll_delay_ms: 50,
            max_settle_passes: 32,
        }
    }
}

impl<T> ScrollerOptions<T> {
    /// Creates options with both required fields set.
    pub fn new(item_count: usize, item_builder: impl FnMut(usize) -> Option<T> + 'static) -> Self {
        Self::default()
            .with_item_count(item_count)
            .with_item_builder(item_builder)
    }

    pub fn with_item_count(mut self, item_count: usize) -> Self {
        self.item_count = Some(item_count);
        self
    }

    pub fn with_item_builder(
        mut self,
        item_builder: impl FnMut(usize) -> Option<T> + 'static,
    ) -> Self {
        self.item_builder = Some(Box::new(item_builder));
        self
    }

    pub fn with_item_size(mut self, item_size: f64) -> Self {
        self.item_size = Some(item_size);
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: f64) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_scroll_position(mut self, scroll_position: f64) -> Self {
        self.scroll_position = scroll_position;
        self
    }

    pub fn with_horizontal(mut self, horizontal: bool) -> Self {
        self.horizontal = horizontal;
        self
    }

    pub fn with_on_remove_item(mut self, on_remove_item: impl FnMut(usize) + 'static) -> Self {
        self.on_remove_item = Some(Box::new(on_remove_item));
        self
    }

    pub fn with_paging(mut self, paging: PagingOptions) -> Self {
        self.paging = paging;
        self
    }

    pub fn with_scheduling(mut self, scheduling: Scheduling) -> Self {
        self.scheduling = scheduling;
        self
    }

    pub fn with_fast_scroll(mut self, threshold: f64, delay_ms: u64) -> Self {
        self.fast_scroll_threshold = threshold;
        self.fast_scroll_delay_ms = delay_ms;
        self
    }

    pub fn with_max_settle_passes(mut self, max_settle_passes: usize) -> Self {
        self.max_settle_passes = max_settle_passes;
        self
    }

    pub fn axis(&self) -> Axis {
        Axis::from_horizontal(self.horizontal)
    }

    pub(crate) fn validate(self) -> Result<ValidOptions<T>, ConfigError> {
        let item_count = self.item_count.ok_or(ConfigError::MissingItemCount)?;
        let item_builder = self.item_builder.ok_or(ConfigError::MissingItemBuilder)?;

        let item_size = match self.item_size {
            Some(size) if !(size.is_finite() && size > 0.0) => {
                return Err(ConfigError::InvalidItemSize(size));
            }
            Some(size) => size,
            None => DEFAULT_ITEM_SIZE,
        };
        if !(self.buffer_size.is_finite() && self.buffer_size >= 0.0) {
            return Err(ConfigError::InvalidBufferSize(self.buffer_size));
        }
        if !(self.scroll_position.is_finite() && self.scroll_position >= 0.0) {
            return Err(ConfigError::InvalidScrollPosition(self.scroll_position));
        }
        if self.paging.page_divisor == 0 {
            return Err(ConfigError::InvalidPageDivisor);
        }
        let jump = self.paging.jump_threshold;
        if !(jump.is_finite() && jump > 0.0) {
            return Err(ConfigError::InvalidJumpThreshold(jump));
        }
        // Infinity is allowed and disables throttling.
        if self.fast_scroll_threshold.is_nan() || self.fast_scroll_threshold <= 0.0 {
            return Err(ConfigError::InvalidFastScrollThreshold(
                self.fast_scroll_threshold,
            ));
        }

        Ok(ValidOptions {
            axis: Axis::from_horizontal(self.horizontal),
            item_count,
            item_builder,
            item_size,
            buffer_size: self.buffer_size,
            scroll_position: self.scroll_position,
            on_remove_item: self.on_remove_item,
            paging: self.paging,
            scheduling: self.scheduling,
            fast_scroll_threshold: self.fast_scroll_threshold,
            fast_scroll_delay_ms: self.fast_scroll_delay_ms,
            max_settle_passes: self.max_settle_passes.max(1),
        })
    }
}

impl<T> core::fmt::Debug for ScrollerOptions<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScrollerOptions")
            .field("item_count", &self.item_count)
            .field("item_size", &self.item_size)
            .field("buffer_size", &self.buffer_size)
            .field("scroll_position", &self.scroll_position)
            .field("horizontal", &self.horizontal)
            .field("paging", &self.paging)
            .field("scheduling", &self.scheduling)
            .field("fast_scroll_threshold", &self.fast_scroll_threshold)
            .field("fast_scroll_delay_ms", &self.fast_scroll_delay_ms)
            .field("max_settle_passes", &self.max_settle_passes)
            .finish_non_exhaustive()
    }
}

pub(crate) struct ValidOptions<T> {
    pub(crate) axis: Axis,
    pub(crate) item_count: usize,
    pub(crate) item_builder: ItemBuilder<T>,
    pub(crate) item_size: f64,
    pub(crate) buffer_size: f64,
    pub(crate) scroll_position: f64,
    pub(crate) on_remove_item: Option<OnRemoveItem>,
    pub(crate) paging: PagingOptions,
    pub(crate) scheduling: Scheduling,
    pub(crate) fast_scroll_threshold: f64,
    pub(crate) fast_scroll_delay_ms: u64,
    pub(crate) max_settle_passes: usize,
}
