use thiserror::Error;

/// Rejected scroller configuration.
///
/// Returned by [`crate::VirtualScroller::new`]; the scroller is never constructed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("item_count is required")]
    MissingItemCount,

    #[error("item_builder is required")]
    MissingItemBuilder,

    #[error("item_size must be positive and finite, got {0}")]
    InvalidItemSize(f64),

    #[error("buffer_size must be non-negative and finite, got {0}")]
    InvalidBufferSize(f64),

    #[error("scroll_position must be non-negative and finite, got {0}")]
    InvalidScrollPosition(f64),

    #[error("page_divisor must be at least 1")]
    InvalidPageDivisor,

    #[error("jump_threshold must be positive and finite, got {0}")]
    InvalidJumpThreshold(f64),

    #[error("fast_scroll_threshold must be positive, got {0}")]
    InvalidFastScrollThreshold(f64),
}
