use dashmap::DashMap;

use crate::classifier::ValidationResult;

/// Memo of classification verdicts keyed by the trimmed candidate.
///
/// Bulk uploads repeat the same numbers over and over, and classification is
/// a pure function of the input for a fixed default region, so a cache hit is
/// indistinguishable from a fresh classification. Inserts stop once
/// `capacity` entries are held; nothing is ever evicted.
pub struct ResultCache {
    cache: DashMap<String, ValidationResult>,
    capacity: usize,
}

impl ResultCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cache: DashMap::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    pub fn get_or_insert_with<F>(&self, key: &str, classify: F) -> ValidationResult
    where
        F: FnOnce() -> ValidationResult,
    {
        if let Some(hit) = self.cache.get(key) {
            return hit.value().clone();
        }
        let result = classify();
        if self.cache.len() < self.capacity {
            self.cache.insert(key.to_owned(), result.clone());
        }
        result
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::ResultCache;
    use crate::classifier::ValidationResult;

    #[test]
    fn second_lookup_is_served_from_cache() {
        let cache = ResultCache::with_capacity(8);
        let calls = Cell::new(0);
        let classify = || {
            calls.set(calls.get() + 1);
            ValidationResult::invalid("12345")
        };

        let first = cache.get_or_insert_with("12345", classify);
        let second = cache.get_or_insert_with("12345", || unreachable!());
        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn stops_growing_at_capacity() {
        let cache = ResultCache::with_capacity(2);
        for key in ["a", "b", "c", "d"] {
            let result = cache.get_or_insert_with(key, || ValidationResult::invalid(key));
            assert_eq!(result.input, key);
        }
        assert_eq!(cache.len(), 2);
    }
}
