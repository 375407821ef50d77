use crate::DEFAULT_ITEM_SIZE;
use crate::key::{MeasureKey, SizeMap};

/// Running estimate of item extents.
///
/// Keeps the measured extent of every materialized item plus their running total. Items that
/// were never measured are assumed to have the average size.
#[derive(Clone, Debug)]
pub struct SizeModel<K = usize> {
    sizes: SizeMap<K>,
    total_measured_size: f64,
    default_size: f64,
}

impl<K: MeasureKey> Default for SizeModel<K> {
    fn default() -> Self {
        Self::new(DEFAULT_ITEM_SIZE)
    }
}

impl<K: MeasureKey> SizeModel<K> {
    /// Creates an empty model whose average is `default_size` until something is measured.
    pub fn new(default_size: f64) -> Self {
        Self {
            sizes: SizeMap::default(),
            total_measured_size: 0.0,
            default_size,
        }
    }

    pub fn has(&self, key: &K) -> bool {
        self.sizes.contains_key(key)
    }

    /// Records `size` for `key`, replacing any previous measurement.
    pub fn measure(&mut self, key: K, size: f64) {
        let size = if size.is_finite() { size.max(0.0) } else { 0.0 };
        let old = self.sizes.insert(key, size).unwrap_or(0.0);
        self.total_measured_size += size - old;
    }

    /// The measured size of `key`, or the average estimate.
    pub fn hopeful_size(&self, key: &K) -> f64 {
        self.sizes
            .get(key)
            .copied()
            .unwrap_or_else(|| self.average_size())
    }

    pub fn average_size(&self) -> f64 {
        match self.sizes.len() {
            0 => self.default_size,
            n => self.total_measured_size / n as f64,
        }
    }

    pub fn remove(&mut self, key: &K) {
        if let Some(old) = self.sizes.remove(key) {
            self.total_measured_size -= old;
            if self.sizes.is_empty() {
                // Drop accumulated float error once nothing is left.
                self.total_measured_size = 0.0;
            }
        }
    }

    /// Forgets every measurement (e.g. after a global resize).
    pub fn reset(&mut self) {
        self.sizes.clear();
        self.total_measured_size = 0.0;
    }

    pub fn measured_count(&self) -> usize {
        self.sizes.len()
    }

    pub fn total_measured_size(&self) -> f64 {
        self.total_measured_size
    }

    pub fn default_size(&self) -> f64 {
        self.default_size
    }
}
