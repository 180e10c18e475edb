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

//! Item hashing capability for frequent items sketches.

use crate::hash::hash_bytes;
use crate::hash::DEFAULT_UPDATE_SEED;

/// Hashing capability supplied to a frequent items sketch at construction.
///
/// Implementations must be deterministic and statistically collision
/// resistant; 64-bit murmur style hashes are the reference. The sketch
/// imposes no constraint on the item type beyond what the hasher accepts.
pub trait ItemsSketchHasher<T> {
    /// Hashes an item to a 64-bit value.
    fn hash(&self, item: &T) -> u64;

    /// Returns true when the item stands in for "no value".
    ///
    /// Updates with an absent item succeed as no-ops. Only meaningful for
    /// item types that can represent absence.
    fn is_absent(&self, _item: &T) -> bool {
        false
    }
}

/// Murmur-based hasher for string items.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringHasher;

impl ItemsSketchHasher<String> for StringHasher {
    fn hash(&self, item: &String) -> u64 {
        hash_bytes(item.as_bytes(), DEFAULT_UPDATE_SEED)
    }
}

impl ItemsSketchHasher<&str> for StringHasher {
    fn hash(&self, item: &&str) -> u64 {
        hash_bytes(item.as_bytes(), DEFAULT_UPDATE_SEED)
    }
}

/// Murmur-based hasher for `i64` items.
#[derive(Debug, Default, Clone, Copy)]
pub struct I64Hasher;

impl ItemsSketchHasher<i64> for I64Hasher {
    fn hash(&self, item: &i64) -> u64 {
        hash_bytes(&item.to_le_bytes(), DEFAULT_UPDATE_SEED)
    }
}

/// Adapts an item hasher to optional items; `None` is the absent sentinel.
#[derive(Debug, Default, Clone, Copy)]
pub struct OptionHasher<H>(pub H);

impl<T, H: ItemsSketchHasher<T>> ItemsSketchHasher<Option<T>> for OptionHasher<H> {
    fn hash(&self, item: &Option<T>) -> u64 {
        match item {
            Some(value) => self.0.hash(value),
            None => 0,
        }
    }

    fn is_absent(&self, item: &Option<T>) -> bool {
        match item {
            Some(value) => self.0.is_absent(value),
            None => true,
        }
    }
}
