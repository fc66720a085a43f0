//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store against a naive reference model.

use proptest::prelude::*;
use std::collections::HashSet;
use std::thread::sleep;
use std::time::Duration;

use crate::cache::{CacheStore, Fingerprint};

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 100;
const TEST_DEFAULT_TTL: Duration = Duration::from_secs(300);

// == Strategies ==
/// Generates keys from a small alphabet so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-f]{1,2}"
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,32}"
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Touch { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        3 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        3 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => key_strategy().prop_map(|key| CacheOp::Touch { key }),
        1 => key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

/// Recency-ordered reference model: index 0 is least recently used.
#[derive(Default)]
struct Model {
    order: Vec<(String, String)>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl Model {
    fn position(&self, key: &str) -> Option<usize> {
        self.order.iter().position(|(k, _)| k == key)
    }

    fn promote(&mut self, idx: usize) {
        let item = self.order.remove(idx);
        self.order.push(item);
    }

    fn apply(&mut self, op: &CacheOp, capacity: usize) -> Option<String> {
        match op {
            CacheOp::Set { key, value } => {
                if let Some(idx) = self.position(key) {
                    self.order.remove(idx);
                }
                self.order.push((key.clone(), value.clone()));
                while self.order.len() > capacity {
                    self.order.remove(0);
                    self.evictions += 1;
                }
                None
            }
            CacheOp::Get { key } => match self.position(key) {
                Some(idx) => {
                    self.hits += 1;
                    self.promote(idx);
                    self.order.last().map(|(_, v)| v.clone())
                }
                None => {
                    self.misses += 1;
                    None
                }
            },
            CacheOp::Touch { key } => {
                if let Some(idx) = self.position(key) {
                    self.promote(idx);
                }
                None
            }
            CacheOp::Delete { key } => {
                if let Some(idx) = self.position(key) {
                    self.order.remove(idx);
                }
                None
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Any interleaving of set/get/touch/delete behaves like a recency list
    // truncated at capacity, with matching counters.
    #[test]
    fn prop_matches_reference_model(
        capacity in 1usize..6,
        ops in prop::collection::vec(cache_op_strategy(), 1..80)
    ) {
        let mut store: CacheStore<String> = CacheStore::new(capacity, TEST_DEFAULT_TTL);
        let mut model = Model::default();

        for op in &ops {
            let expected = model.apply(op, capacity);
            match op {
                CacheOp::Set { key, value } => store.set(key.clone(), value.clone(), None),
                CacheOp::Get { key } => prop_assert_eq!(store.get(key), expected),
                CacheOp::Touch { key } => {
                    let present = model.position(key).is_some();
                    prop_assert_eq!(store.touch(key), present);
                }
                CacheOp::Delete { key } => store.delete(key),
            }
            prop_assert!(store.len() <= capacity);
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, model.hits);
        prop_assert_eq!(stats.misses, model.misses);
        prop_assert_eq!(stats.evictions, model.evictions);
        prop_assert_eq!(stats.size, model.order.len());
    }

    #[test]
    fn prop_roundtrip_storage(key in key_strategy(), value in value_strategy()) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_DEFAULT_TTL);

        store.set(key.clone(), value.clone(), None);

        prop_assert_eq!(store.get(&key), Some(value));
        prop_assert_eq!(store.stats().hits, 1);
    }

    #[test]
    fn prop_delete_removes_entry(key in key_strategy(), value in value_strategy()) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_DEFAULT_TTL);

        store.set(key.clone(), value, None);
        store.delete(&key);
        store.delete(&key);

        prop_assert!(store.get(&key).is_none());
    }

    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec(("[a-z]{1,8}", value_strategy()), 1..200)
    ) {
        let max_entries = 50;
        let mut store = CacheStore::new(max_entries, TEST_DEFAULT_TTL);
        let mut distinct = HashSet::new();

        for (key, value) in entries {
            distinct.insert(key.clone());
            store.set(key, value, None);
            prop_assert!(store.len() <= max_entries);
        }

        // Without deletes the store only shrinks below capacity if it never filled up.
        prop_assert_eq!(store.size(), distinct.len().min(max_entries));
    }

    #[test]
    fn prop_fingerprint_ignores_keyword_order(
        name in "[a-z_]{1,16}",
        kwargs in prop::collection::btree_map("[a-z]{1,6}", "[a-z0-9]{0,6}", 1..6)
    ) {
        let forward = kwargs
            .iter()
            .fold(Fingerprint::new(name.clone()), |fp, (k, v)| fp.kwarg(k.clone(), v.clone()));
        let backward = kwargs
            .iter()
            .rev()
            .fold(Fingerprint::new(name), |fp, (k, v)| fp.kwarg(k.clone(), v.clone()));

        prop_assert_eq!(forward.key(), backward.key());
    }
}

// Separate proptest block with fewer cases for time-sensitive TTL tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    #[test]
    fn prop_ttl_expiration_behavior(key in key_strategy(), value in value_strategy()) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_DEFAULT_TTL);

        store.set(key.clone(), value.clone(), Some(Duration::from_millis(30)));
        prop_assert_eq!(store.get(&key), Some(value));

        sleep(Duration::from_millis(50));

        prop_assert!(store.get(&key).is_none());
        let stats = store.stats();
        prop_assert_eq!(stats.expired, 1);
        prop_assert_eq!(stats.misses, 1);
    }
}
