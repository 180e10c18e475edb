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

//! Frequency sketches for finding heavy hitters in data streams.
//!
//! This module implements a Misra-Gries style Frequent Items sketch. It
//! tracks approximate frequencies in a stream with a bounded counter table
//! and can report heavy hitters with explicit error guarantees (no false
//! negatives or no false positives).
//!
//! Items are arbitrary: the sketch is generic over the item type and hashes
//! through an [`ItemsSketchHasher`] capability supplied at construction.
//! For any item, the true frequency `f` satisfies
//! `lower_bound <= f <= upper_bound`, where the two bounds differ by at
//! most the accumulated purge weight ([`FrequentItemsSketch::get_maximum_error`]).
//!
//! # Usage
//!
//! ```rust
//! # use streamsketches::frequencies::ErrorType;
//! # use streamsketches::frequencies::FrequentItemsSketch;
//! # use streamsketches::frequencies::StringHasher;
//! let mut sketch = FrequentItemsSketch::new(6, StringHasher).unwrap();
//! sketch.update_many("a".to_string(), 3).unwrap();
//! sketch.update("b".to_string()).unwrap();
//! let rows = sketch.get_frequent_items(ErrorType::NoFalseNegatives);
//! assert_eq!(rows[0].item(), "a");
//! assert_eq!(rows[0].estimate(), 3);
//! ```

mod hasher;
mod reverse_purge_item_hash_map;
mod sketch;

pub use self::hasher::I64Hasher;
pub use self::hasher::ItemsSketchHasher;
pub use self::hasher::OptionHasher;
pub use self::hasher::StringHasher;
pub use self::sketch::apriori_error;
pub use self::sketch::epsilon_for_lg_max_map_size;
pub use self::sketch::ErrorType;
pub use self::sketch::FrequentItemsSketch;
pub use self::sketch::Row;
pub use self::sketch::LG_MIN_MAP_SIZE;
