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

//! Frequent items sketch implementation.

use crate::error::Error;
use crate::frequencies::hasher::ItemsSketchHasher;
use crate::frequencies::reverse_purge_item_hash_map::ReversePurgeItemHashMap;

/// Minimum log2 size of the counter table.
pub const LG_MIN_MAP_SIZE: u8 = 3;

const EPSILON_FACTOR: f64 = 3.5;
const LOAD_FACTOR_NUMERATOR: usize = 3;
const LOAD_FACTOR_DENOMINATOR: usize = 4;

/// Error guarantees for frequent item queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    /// Include items if upper bound meets the threshold (no false negatives).
    NoFalseNegatives,
    /// Include items if lower bound meets the threshold (no false positives).
    NoFalsePositives,
}

/// Result row for frequent item queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row<T> {
    item: T,
    estimate: i64,
    upper_bound: i64,
    lower_bound: i64,
}

impl<T> Row<T> {
    /// Returns the item value.
    pub fn item(&self) -> &T {
        &self.item
    }

    /// Returns the estimated frequency.
    pub fn estimate(&self) -> i64 {
        self.estimate
    }

    /// Returns the upper bound for the frequency.
    pub fn upper_bound(&self) -> i64 {
        self.upper_bound
    }

    /// Returns the lower bound for the frequency.
    pub fn lower_bound(&self) -> i64 {
        self.lower_bound
    }
}

/// Returns epsilon for a sketch configured with `lg_max_map_size`.
pub fn epsilon_for_lg_max_map_size(lg_max_map_size: u8) -> f64 {
    EPSILON_FACTOR / (1u64 << lg_max_map_size) as f64
}

/// Returns the a priori error estimate for a planned stream weight.
pub fn apriori_error(lg_max_map_size: u8, estimated_total_weight: i64) -> f64 {
    epsilon_for_lg_max_map_size(lg_max_map_size) * estimated_total_weight as f64
}

/// Frequent items sketch for generic item types.
///
/// Items are hashed through the [`ItemsSketchHasher`] capability supplied at
/// construction. The counter table starts at `1 << LG_MIN_MAP_SIZE` slots
/// and doubles up to `1 << lg_max_map_size`; once at maximum size, further
/// growth pressure is absorbed by subtracting the median count from every
/// entry and discarding the entries that reach zero. The subtracted weight
/// accumulates in an offset that bounds the estimation error.
#[derive(Debug, Clone)]
pub struct FrequentItemsSketch<T, H> {
    lg_max_map_size: u8,
    cur_map_cap: usize,
    offset: i64,
    stream_length: i64,
    hasher: H,
    hash_map: ReversePurgeItemHashMap<T>,
}

impl<T: Eq, H: ItemsSketchHasher<T>> FrequentItemsSketch<T, H> {
    /// Creates an empty sketch whose table may grow to `1 << lg_max_map_size`
    /// slots.
    pub fn new(lg_max_map_size: u8, hasher: H) -> Result<Self, Error> {
        if lg_max_map_size < LG_MIN_MAP_SIZE {
            return Err(Error::invalid_argument(format!(
                "lg_max_map_size must be at least {LG_MIN_MAP_SIZE}; got {lg_max_map_size}"
            )));
        }
        let map = ReversePurgeItemHashMap::new(1usize << LG_MIN_MAP_SIZE);
        let cur_map_cap = map.get_capacity();
        Ok(Self {
            lg_max_map_size,
            cur_map_cap,
            offset: 0,
            stream_length: 0,
            hasher,
            hash_map: map,
        })
    }

    /// Creates an empty sketch from the maximum table size directly, which
    /// must be a power of two of at least `1 << LG_MIN_MAP_SIZE` slots.
    pub fn with_max_map_size(max_map_size: usize, hasher: H) -> Result<Self, Error> {
        if !max_map_size.is_power_of_two() {
            return Err(Error::invalid_argument(format!(
                "max_map_size must be a power of 2; got {max_map_size}"
            )));
        }
        Self::new(max_map_size.trailing_zeros() as u8, hasher)
    }

    /// Returns true if the sketch is empty.
    pub fn is_empty(&self) -> bool {
        self.hash_map.get_num_active() == 0
    }

    /// Returns the number of active items being tracked.
    pub fn get_num_active_items(&self) -> usize {
        self.hash_map.get_num_active()
    }

    /// Returns the total weight of the stream.
    pub fn get_stream_length(&self) -> i64 {
        self.stream_length
    }

    /// Returns the estimated frequency for an item, 0 if it is not tracked.
    pub fn get_estimate(&self, item: &T) -> i64 {
        self.hash_map.get(item, self.hasher.hash(item))
    }

    /// Returns the lower bound for an item's frequency.
    pub fn get_lower_bound(&self, item: &T) -> i64 {
        self.hash_map.get(item, self.hasher.hash(item))
    }

    /// Returns the upper bound for an item's frequency.
    pub fn get_upper_bound(&self, item: &T) -> i64 {
        self.hash_map.get(item, self.hasher.hash(item)) + self.offset
    }

    /// Returns the maximum error across all items.
    ///
    /// The true frequency of any item lies within `get_maximum_error` of its
    /// estimate.
    pub fn get_maximum_error(&self) -> i64 {
        self.offset
    }

    /// Returns epsilon for this sketch.
    pub fn get_epsilon(&self) -> f64 {
        epsilon_for_lg_max_map_size(self.lg_max_map_size)
    }

    /// Returns the maximum number of items the table tracks at full size.
    pub fn get_maximum_map_capacity(&self) -> usize {
        (1usize << self.lg_max_map_size) * LOAD_FACTOR_NUMERATOR / LOAD_FACTOR_DENOMINATOR
    }

    /// Returns the current map capacity.
    pub fn get_current_map_capacity(&self) -> usize {
        self.cur_map_cap
    }

    /// Returns the configured lg_max_map_size.
    pub fn get_lg_max_map_size(&self) -> u8 {
        self.lg_max_map_size
    }

    /// Returns the current map size in log2.
    pub fn get_lg_cur_map_size(&self) -> u8 {
        self.hash_map.get_lg_length()
    }

    /// Updates the sketch with a weight of one.
    pub fn update(&mut self, item: T) -> Result<(), Error> {
        self.update_many(item, 1)
    }

    /// Updates the sketch with an item and a positive weight.
    ///
    /// Absent-sentinel items (as reported by the hasher) are accepted and
    /// ignored; the stream length and the table are unchanged.
    pub fn update_many(&mut self, item: T, weight: i64) -> Result<(), Error> {
        if self.hasher.is_absent(&item) {
            return Ok(());
        }
        if weight < 1 {
            return Err(Error::invalid_argument(format!(
                "update weight must be at least 1; got {weight}"
            )));
        }
        let hash = self.hasher.hash(&item);
        self.stream_length += weight;
        self.hash_map.adjust_or_put_value(item, hash, weight);
        self.grow_or_purge();
        Ok(())
    }

    /// Merges another sketch built with the same configuration into this one.
    ///
    /// The hashers must agree; they are trusted and not cross-checked.
    pub fn merge(&mut self, other: &Self) -> Result<(), Error>
    where
        T: Clone,
    {
        if self.lg_max_map_size != other.lg_max_map_size {
            return Err(Error::incompatible_sketch(format!(
                "lg_max_map_size mismatch: {} vs {}",
                self.lg_max_map_size, other.lg_max_map_size
            )));
        }
        if other.is_empty() {
            return Ok(());
        }
        self.stream_length += other.stream_length;
        self.offset += other.offset;
        for entry in other.hash_map.iter() {
            self.hash_map
                .adjust_or_put_value(entry.key.clone(), entry.hash, entry.count);
            self.grow_during_merge();
        }
        if self.hash_map.get_num_active() > self.cur_map_cap {
            self.offset += self.hash_map.purge();
        }
        Ok(())
    }

    /// Resets the sketch to the empty state at the minimum table size.
    pub fn reset(&mut self) {
        self.hash_map = ReversePurgeItemHashMap::new(1usize << LG_MIN_MAP_SIZE);
        self.cur_map_cap = self.hash_map.get_capacity();
        self.offset = 0;
        self.stream_length = 0;
    }

    /// Returns frequent items using the sketch maximum error as threshold.
    pub fn get_frequent_items(&self, error_type: ErrorType) -> Vec<Row<T>>
    where
        T: Clone,
    {
        self.sort_items(self.offset, error_type)
    }

    /// Returns frequent items whose chosen bound also meets `min_count`.
    pub fn get_frequent_items_with_threshold(
        &self,
        min_count: i64,
        error_type: ErrorType,
    ) -> Result<Vec<Row<T>>, Error>
    where
        T: Clone,
    {
        if min_count < 0 {
            return Err(Error::invalid_argument(format!(
                "threshold must not be negative; got {min_count}"
            )));
        }
        Ok(self.sort_items(min_count.max(self.offset), error_type))
    }

    fn sort_items(&self, threshold: i64, error_type: ErrorType) -> Vec<Row<T>>
    where
        T: Clone,
    {
        let mut rows: Vec<(Row<T>, u64)> = Vec::new();
        for entry in self.hash_map.iter() {
            let lower = entry.count;
            let upper = entry.count + self.offset;
            let include = match error_type {
                ErrorType::NoFalseNegatives => upper >= threshold,
                ErrorType::NoFalsePositives => lower >= threshold,
            };
            if include {
                rows.push((
                    Row {
                        item: entry.key.clone(),
                        estimate: lower,
                        upper_bound: upper,
                        lower_bound: lower,
                    },
                    entry.seq,
                ));
            }
        }
        rows.sort_by(|a, b| b.0.estimate.cmp(&a.0.estimate).then(a.1.cmp(&b.1)));
        rows.into_iter().map(|(row, _)| row).collect()
    }

    fn grow_or_purge(&mut self) {
        if self.hash_map.get_num_active() > self.cur_map_cap {
            if self.hash_map.get_lg_length() < self.lg_max_map_size {
                self.hash_map.resize(self.hash_map.get_length() * 2);
                self.cur_map_cap = self.hash_map.get_capacity();
            } else {
                self.offset += self.hash_map.purge();
            }
        }
    }

    fn grow_during_merge(&mut self) {
        if self.hash_map.get_num_active() > self.cur_map_cap
            && self.hash_map.get_lg_length() < self.lg_max_map_size
        {
            self.hash_map.resize(self.hash_map.get_length() * 2);
            self.cur_map_cap = self.hash_map.get_capacity();
        }
        // Linear probing needs an empty slot to terminate; purge before the
        // table can fill completely during the copy-in pass.
        if self.hash_map.get_num_active() + 1 >= self.hash_map.get_length() {
            self.offset += self.hash_map.purge();
        }
    }
}
