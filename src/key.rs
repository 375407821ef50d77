use std::collections::HashMap;

pub(crate) type SizeMap<K> = HashMap<K, f64>;

/// Identity used by [`crate::SizeModel`] to remember a measurement.
///
/// The scroller keys measurements by item index, which is stable for as long as an item stays
/// materialized.
#[doc(hidden)]
pub trait MeasureKey: core::hash::Hash + Eq {}
impl<K: core::hash::Hash + Eq> MeasureKey for K {}
