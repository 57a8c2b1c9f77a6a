//! Bucket-keyed record storage.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::AggregationRecord;

/// Mapping from bucket start to that bucket's record.
///
/// Keys are unique and ordered by time. Nothing is evicted unless
/// [`AggregationStore::evict_before`] is called.
#[derive(Debug, Clone, Default)]
pub struct AggregationStore {
    records: BTreeMap<DateTime<Utc>, AggregationRecord>,
}

impl AggregationStore {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }

    /// Returns the record for `bucket_start`, inserting an empty one if absent.
    pub fn get_or_create(
        &mut self,
        bucket_start: DateTime<Utc>,
        symbol: &str,
    ) -> &mut AggregationRecord {
        self.records
            .entry(bucket_start)
            .or_insert_with(|| AggregationRecord::empty(symbol, bucket_start))
    }

    /// Returns the record for `bucket_start`, if any tick landed there.
    #[must_use]
    pub fn get(&self, bucket_start: DateTime<Utc>) -> Option<&AggregationRecord> {
        self.records.get(&bucket_start)
    }

    /// Stores `record` under its bucket start, returning the record it replaced.
    pub fn put(&mut self, record: AggregationRecord) -> Option<AggregationRecord> {
        self.records.insert(record.bucket_start, record)
    }

    /// Removes every bucket starting before `cutoff`, returning how many were removed.
    pub fn evict_before(&mut self, cutoff: DateTime<Utc>) -> usize {
        let kept = self.records.split_off(&cutoff);
        let evicted = self.records.len();
        self.records = kept;
        evicted
    }

    /// Returns the number of stored buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no bucket is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over stored records in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = &AggregationRecord> {
        self.records.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bucket(minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 10, minute, second).unwrap()
    }

    #[test]
    fn test_get_or_create_inserts_once() {
        let mut store = AggregationStore::new();
        store.get_or_create(bucket(1, 0), "AAPL").volume = 3;
        let again = store.get_or_create(bucket(1, 0), "AAPL");

        assert_eq!(again.volume, 3);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_has_no_side_effect() {
        let store = AggregationStore::new();
        assert!(store.get(bucket(1, 0)).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_put_replaces() {
        let mut store = AggregationStore::new();
        store.get_or_create(bucket(1, 0), "AAPL");

        let mut replacement = AggregationRecord::empty("AAPL", bucket(1, 0));
        replacement.volume = 7;
        let previous = store.put(replacement).unwrap();

        assert_eq!(previous.volume, 0);
        assert_eq!(store.get(bucket(1, 0)).unwrap().volume, 7);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_evict_before() {
        let mut store = AggregationStore::new();
        for minute in 0..4 {
            store.get_or_create(bucket(minute, 0), "AAPL");
            store.get_or_create(bucket(minute, 30), "AAPL");
        }

        assert_eq!(store.evict_before(bucket(2, 0)), 4);
        assert_eq!(store.len(), 4);
        assert!(store.get(bucket(1, 30)).is_none());
        assert!(store.get(bucket(2, 0)).is_some());
        assert_eq!(store.evict_before(bucket(0, 0)), 0);
    }

    #[test]
    fn test_iteration_is_ordered() {
        let mut store = AggregationStore::new();
        store.get_or_create(bucket(3, 0), "AAPL");
        store.get_or_create(bucket(1, 0), "AAPL");
        store.get_or_create(bucket(2, 30), "AAPL");

        let starts: Vec<_> = store.iter().map(|r| r.bucket_start).collect();
        assert_eq!(starts, vec![bucket(1, 0), bucket(2, 30), bucket(3, 0)]);
    }
}
