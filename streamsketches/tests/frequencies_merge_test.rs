// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use streamsketches::error::ErrorKind;
use streamsketches::frequencies::FrequentItemsSketch;
use streamsketches::frequencies::I64Hasher;
use streamsketches::frequencies::ItemsSketchHasher;
use streamsketches::frequencies::StringHasher;
use streamsketches::frequencies::LG_MIN_MAP_SIZE;

#[test]
fn test_merge_combines_counts() {
    let mut a = FrequentItemsSketch::new(6, StringHasher).unwrap();
    a.update_many("x".to_string(), 5).unwrap();
    a.update_many("y".to_string(), 2).unwrap();

    let mut b = FrequentItemsSketch::new(6, StringHasher).unwrap();
    b.update_many("x".to_string(), 3).unwrap();
    b.update_many("z".to_string(), 4).unwrap();

    a.merge(&b).unwrap();
    assert_eq!(a.get_stream_length(), 14);
    assert_eq!(a.get_num_active_items(), 3);
    assert_eq!(a.get_maximum_error(), 0);
    assert_eq!(a.get_estimate(&"x".to_string()), 8);
    assert_eq!(a.get_estimate(&"y".to_string()), 2);
    assert_eq!(a.get_estimate(&"z".to_string()), 4);
}

#[test]
fn test_merge_adds_offsets() {
    fn saturated_sketch() -> FrequentItemsSketch<i64, I64Hasher> {
        let mut sketch = FrequentItemsSketch::new(LG_MIN_MAP_SIZE, I64Hasher).unwrap();
        sketch.update_many(1, 10).unwrap();
        for item in 2..=6 {
            sketch.update(item).unwrap();
        }
        sketch.update_many(7, 15).unwrap();
        assert_eq!(sketch.get_maximum_error(), 1);
        sketch
    }

    let mut a = saturated_sketch();
    let b = saturated_sketch();
    a.merge(&b).unwrap();

    assert_eq!(a.get_stream_length(), 60);
    assert_eq!(a.get_maximum_error(), 2);
    assert_eq!(a.get_num_active_items(), 2);
    assert_eq!(a.get_estimate(&1), 18);
    assert_eq!(a.get_upper_bound(&1), 20);
    assert_eq!(a.get_estimate(&7), 28);
}

#[test]
fn test_merge_empty_other_is_noop() {
    let mut a = FrequentItemsSketch::new(6, I64Hasher).unwrap();
    a.update_many(42, 3).unwrap();
    let b = FrequentItemsSketch::new(6, I64Hasher).unwrap();
    a.merge(&b).unwrap();
    assert_eq!(a.get_stream_length(), 3);
    assert_eq!(a.get_estimate(&42), 3);
}

#[test]
fn test_merge_into_empty() {
    let mut a = FrequentItemsSketch::new(6, I64Hasher).unwrap();
    let mut b = FrequentItemsSketch::new(6, I64Hasher).unwrap();
    b.update_many(7, 9).unwrap();
    a.merge(&b).unwrap();
    assert_eq!(a.get_stream_length(), 9);
    assert_eq!(a.get_estimate(&7), 9);
}

#[test]
fn test_merge_rejects_mismatched_sizing() {
    let mut a = FrequentItemsSketch::<i64, _>::new(4, I64Hasher).unwrap();
    let b = FrequentItemsSketch::<i64, _>::new(5, I64Hasher).unwrap();
    let err = a.merge(&b).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IncompatibleSketch);
}

#[test]
fn test_merge_bounds_stay_valid_under_purging() {
    // A hasher with a custom item type keeps the capability seam honest.
    #[derive(Debug, Clone, Copy)]
    struct PairHasher;
    impl ItemsSketchHasher<(u32, u32)> for PairHasher {
        fn hash(&self, item: &(u32, u32)) -> u64 {
            let mut bytes = [0u8; 8];
            bytes[..4].copy_from_slice(&item.0.to_le_bytes());
            bytes[4..].copy_from_slice(&item.1.to_le_bytes());
            streamsketches::hash::hash_bytes(&bytes, streamsketches::hash::DEFAULT_UPDATE_SEED)
        }
    }

    let mut truth = std::collections::HashMap::new();
    let mut a = FrequentItemsSketch::new(LG_MIN_MAP_SIZE, PairHasher).unwrap();
    let mut b = FrequentItemsSketch::new(LG_MIN_MAP_SIZE, PairHasher).unwrap();
    for i in 0..40u32 {
        let (item_a, weight_a) = ((i % 11, 0), (i as i64 % 3) + 1);
        let (item_b, weight_b) = ((i % 13, 0), (i as i64 % 4) + 1);
        a.update_many(item_a, weight_a).unwrap();
        b.update_many(item_b, weight_b).unwrap();
        *truth.entry(item_a).or_insert(0i64) += weight_a;
        *truth.entry(item_b).or_insert(0i64) += weight_b;
    }
    a.merge(&b).unwrap();
    assert_eq!(a.get_stream_length(), truth.values().sum::<i64>());

    // every item of the combined stream stays bracketed after the merge
    for (item, frequency) in &truth {
        assert!(a.get_lower_bound(item) <= *frequency);
        assert!(a.get_upper_bound(item) >= *frequency);
    }
    assert!(a.get_num_active_items() <= 7);
}
