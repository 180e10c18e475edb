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

//! Reverse purge hash map for generic items.
//!
//! Open addressing with linear probing and backward-shift deletion. Each
//! slot caches the item's 64-bit hash (hashing happens in the sketch, via
//! its hasher capability) and an insertion sequence number used to break
//! ties in frequent item queries.

const LOAD_FACTOR: f64 = 0.75;
const DRIFT_LIMIT: usize = 1024;

#[derive(Debug, Clone)]
pub(super) struct ReversePurgeItemHashMap<T> {
    lg_length: u8,
    load_threshold: usize,
    keys: Vec<Option<T>>,
    hashes: Vec<u64>,
    values: Vec<i64>,
    states: Vec<u16>,
    seqs: Vec<u64>,
    next_seq: u64,
    num_active: usize,
}

/// An occupied slot, as seen by iteration.
#[derive(Debug, Clone, Copy)]
pub(super) struct ActiveItem<'a, T> {
    pub key: &'a T,
    pub hash: u64,
    pub count: i64,
    pub seq: u64,
}

impl<T: Eq> ReversePurgeItemHashMap<T> {
    pub fn new(map_size: usize) -> Self {
        assert!(map_size.is_power_of_two(), "map_size must be power of 2");
        let lg_length = map_size.trailing_zeros() as u8;
        let load_threshold = (map_size as f64 * LOAD_FACTOR) as usize;
        Self {
            lg_length,
            load_threshold,
            keys: (0..map_size).map(|_| None).collect(),
            hashes: vec![0; map_size],
            values: vec![0; map_size],
            states: vec![0; map_size],
            seqs: vec![0; map_size],
            next_seq: 0,
            num_active: 0,
        }
    }

    /// Returns the stored count for a key, or 0 if it is not tracked.
    pub fn get(&self, key: &T, hash: u64) -> i64 {
        let mask = self.keys.len() - 1;
        let mut probe = (hash as usize) & mask;
        while self.states[probe] != 0 {
            if self.slot_matches(probe, key, hash) {
                return self.values[probe];
            }
            probe = (probe + 1) & mask;
        }
        0
    }

    /// Adds `adjust_amount` to the key's count, inserting it if new.
    pub fn adjust_or_put_value(&mut self, key: T, hash: u64, adjust_amount: i64) {
        let mask = self.keys.len() - 1;
        let mut probe = (hash as usize) & mask;
        let mut drift: usize = 1;
        while self.states[probe] != 0 {
            if self.slot_matches(probe, &key, hash) {
                self.values[probe] += adjust_amount;
                return;
            }
            probe = (probe + 1) & mask;
            drift += 1;
            debug_assert!(drift < DRIFT_LIMIT, "drift limit exceeded");
        }
        self.keys[probe] = Some(key);
        self.hashes[probe] = hash;
        self.values[probe] = adjust_amount;
        self.states[probe] = drift as u16;
        self.seqs[probe] = self.next_seq;
        self.next_seq += 1;
        self.num_active += 1;
    }

    /// Subtracts the median of all stored counts from every entry, drops the
    /// entries that become non-positive, and returns the median.
    pub fn purge(&mut self) -> i64 {
        if self.num_active == 0 {
            return 0;
        }
        let mut counts = self.get_active_values();
        let mid = counts.len() / 2;
        counts.select_nth_unstable(mid);
        let median = counts[mid];
        self.adjust_all_values_by(-median);
        self.keep_only_positive_counts();
        median
    }

    pub fn resize(&mut self, new_size: usize) {
        assert!(new_size.is_power_of_two(), "new_size must be power of 2");
        let mut old_keys = std::mem::take(&mut self.keys);
        let old_hashes = std::mem::take(&mut self.hashes);
        let old_values = std::mem::take(&mut self.values);
        let old_states = std::mem::take(&mut self.states);
        let old_seqs = std::mem::take(&mut self.seqs);
        self.keys = (0..new_size).map(|_| None).collect();
        self.hashes = vec![0; new_size];
        self.values = vec![0; new_size];
        self.states = vec![0; new_size];
        self.seqs = vec![0; new_size];
        self.lg_length = new_size.trailing_zeros() as u8;
        self.load_threshold = (new_size as f64 * LOAD_FACTOR) as usize;
        self.num_active = 0;
        for i in 0..old_keys.len() {
            if old_states[i] > 0 {
                if let Some(key) = old_keys[i].take() {
                    self.put_slot(key, old_hashes[i], old_values[i], old_seqs[i]);
                }
            }
        }
    }

    pub fn get_length(&self) -> usize {
        self.keys.len()
    }

    pub fn get_lg_length(&self) -> u8 {
        self.lg_length
    }

    pub fn get_capacity(&self) -> usize {
        self.load_threshold
    }

    pub fn get_num_active(&self) -> usize {
        self.num_active
    }

    pub fn iter(&self) -> ActiveItemsIter<'_, T> {
        ActiveItemsIter {
            map: self,
            index: 0,
        }
    }

    fn get_active_values(&self) -> Vec<i64> {
        let mut values = Vec::with_capacity(self.num_active);
        for i in 0..self.values.len() {
            if self.states[i] > 0 {
                values.push(self.values[i]);
            }
        }
        values
    }

    fn adjust_all_values_by(&mut self, adjust_amount: i64) {
        for value in &mut self.values {
            *value += adjust_amount;
        }
    }

    fn keep_only_positive_counts(&mut self) {
        // Start the backward sweep at an empty slot so backward-shift
        // deletion never crosses the wrap-around boundary mid-cluster.
        let len = self.keys.len();
        let mut first_probe = len - 1;
        while self.states[first_probe] > 0 {
            first_probe -= 1;
        }
        for probe in (0..first_probe).rev() {
            if self.states[probe] > 0 && self.values[probe] <= 0 {
                self.hash_delete(probe);
                self.num_active -= 1;
            }
        }
        for probe in (first_probe..len).rev() {
            if self.states[probe] > 0 && self.values[probe] <= 0 {
                self.hash_delete(probe);
                self.num_active -= 1;
            }
        }
    }

    /// Inserts a key known to be absent, preserving its sequence number.
    fn put_slot(&mut self, key: T, hash: u64, value: i64, seq: u64) {
        let mask = self.keys.len() - 1;
        let mut probe = (hash as usize) & mask;
        let mut drift: usize = 1;
        while self.states[probe] != 0 {
            probe = (probe + 1) & mask;
            drift += 1;
            debug_assert!(drift < DRIFT_LIMIT, "drift limit exceeded");
        }
        self.keys[probe] = Some(key);
        self.hashes[probe] = hash;
        self.values[probe] = value;
        self.states[probe] = drift as u16;
        self.seqs[probe] = seq;
        self.num_active += 1;
    }

    fn slot_matches(&self, probe: usize, key: &T, hash: u64) -> bool {
        self.hashes[probe] == hash
            && self.keys[probe]
                .as_ref()
                .map(|existing| existing == key)
                .unwrap_or(false)
    }

    fn hash_delete(&mut self, mut delete_probe: usize) {
        self.states[delete_probe] = 0;
        self.keys[delete_probe] = None;
        let mut drift: usize = 1;
        let mask = self.keys.len() - 1;
        let mut probe = (delete_probe + drift) & mask;
        while self.states[probe] != 0 {
            if self.states[probe] as usize > drift {
                self.keys[delete_probe] = self.keys[probe].take();
                self.hashes[delete_probe] = self.hashes[probe];
                self.values[delete_probe] = self.values[probe];
                self.seqs[delete_probe] = self.seqs[probe];
                self.states[delete_probe] = self.states[probe] - drift as u16;
                self.states[probe] = 0;
                drift = 0;
                delete_probe = probe;
            }
            probe = (probe + 1) & mask;
            drift += 1;
            debug_assert!(drift < DRIFT_LIMIT, "drift limit exceeded");
        }
    }
}

pub(super) struct ActiveItemsIter<'a, T> {
    map: &'a ReversePurgeItemHashMap<T>,
    index: usize,
}

impl<'a, T> Iterator for ActiveItemsIter<'a, T> {
    type Item = ActiveItem<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.map.keys.len() {
            let probe = self.index;
            self.index += 1;
            if self.map.states[probe] > 0 {
                let key = self.map.keys[probe].as_ref().expect("active key missing");
                return Some(ActiveItem {
                    key,
                    hash: self.map.hashes[probe],
                    count: self.map.values[probe],
                    seq: self.map.seqs[probe],
                });
            }
        }
        None
    }
}
