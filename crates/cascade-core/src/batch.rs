//! Batch valuation settings and conditional parallel iteration.

use serde::{Deserialize, Serialize};

use crate::types::{Date, OwnerId};

/// One `(owner, date)` valuation request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValuationQuery {
    /// Owner to value.
    pub owner: OwnerId,
    /// As-of date.
    pub date: Date,
}

impl ValuationQuery {
    /// Creates a query.
    pub fn new(owner: impl Into<String>, date: Date) -> Self {
        Self {
            owner: OwnerId::new(owner),
            date,
        }
    }
}

/// Controls how batches of queries are evaluated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Enable parallel processing (requires 'parallel' feature).
    pub parallel: bool,

    /// Minimum batch size to trigger parallel processing.
    /// Below this threshold, sequential is faster due to thread overhead.
    pub parallel_threshold: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_threshold: 64,
        }
    }
}

impl BatchConfig {
    /// Creates a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config that always evaluates sequentially.
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    /// Sets whether to use parallel processing.
    #[must_use]
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Sets the batch size above which processing goes parallel.
    #[must_use]
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Returns true if a batch of `len` items should be processed in parallel.
    pub fn should_parallelize(&self, len: usize) -> bool {
        self.parallel && len > self.parallel_threshold
    }
}

/// Maps a function over items, in parallel when the `parallel` feature is
/// enabled and `config` says the batch is large enough.
#[allow(unused_variables)]
pub(crate) fn maybe_parallel_map<T, U, F>(items: &[T], config: &BatchConfig, f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        if config.should_parallelize(items.len()) {
            return items.par_iter().map(f).collect();
        }
    }

    items.iter().map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_parallelize() {
        let config = BatchConfig::new().with_parallel_threshold(10);
        assert!(!config.should_parallelize(10));
        assert!(config.should_parallelize(11));
        assert!(!BatchConfig::sequential().should_parallelize(1_000));
    }

    #[test]
    fn test_maybe_parallel_map_keeps_order() {
        let items: Vec<u32> = (0..200).collect();
        let config = BatchConfig::new().with_parallel_threshold(0);
        let doubled = maybe_parallel_map(&items, &config, |x| x * 2);
        assert_eq!(doubled, (0..200).map(|x| x * 2).collect::<Vec<_>>());
    }
}
