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

use crate::cpc::util::check_lg_k;
use crate::error::Error;
use crate::hash::DEFAULT_UPDATE_SEED;

/// A Compressed Probabilistic Counting sketch.
///
/// This crate reconstructs sketches from their compressed serialized state;
/// the update and merge engine lives outside it. A sketch produced by
/// [`CpcCompressedState::uncompress`](crate::cpc::CpcCompressedState::uncompress)
/// carries the estimator state, while [`CpcSketch::sliding_window`] and
/// [`CpcSketch::pair_table`] stay unpopulated until the decompression engine
/// fills them.
#[derive(Debug, Clone)]
pub struct CpcSketch {
    // immutable config variables
    lg_k: u8,
    seed: u64,

    // sketch state
    /// Part of a speed optimization.
    pub(super) first_interesting_column: u8,
    /// The number of coupons collected so far.
    pub(super) num_coupons: u64,
    /// Derivable from num_coupons, but made explicit for speed.
    pub(super) window_offset: u64,
    /// Size K bytes in dense mode.
    pub(super) sliding_window: Option<Vec<u8>>,
    /// Surprising row/column pairs in sparse mode.
    pub(super) pair_table: Option<Vec<u32>>,

    // estimator state
    /// Whether the sketch is a result of merging.
    ///
    /// If `false`, the HIP (Historical Inverse Probability) estimator state
    /// is valid.
    pub(super) merge_flag: bool,
    /// A pre-calculated probability factor (`k * p`) used by the HIP estimator.
    pub(super) kxp: f64,
    /// The accumulated cardinality estimate.
    pub(super) hip_est_accum: f64,
}

impl CpcSketch {
    /// Creates a new `CpcSketch` with the given `lg_k` and default seed.
    pub fn new(lg_k: u8) -> Result<Self, Error> {
        Self::with_seed(lg_k, DEFAULT_UPDATE_SEED)
    }

    /// Creates a new `CpcSketch` with the given `lg_k` and `seed`.
    pub fn with_seed(lg_k: u8, seed: u64) -> Result<Self, Error> {
        check_lg_k(lg_k)?;
        Ok(Self {
            lg_k,
            seed,
            first_interesting_column: 0,
            num_coupons: 0,
            window_offset: 0,
            sliding_window: None,
            pair_table: None,
            merge_flag: false,
            kxp: (1u64 << lg_k) as f64,
            hip_est_accum: 0.0,
        })
    }

    /// Return the parameter lg_k.
    pub fn lg_k(&self) -> u8 {
        self.lg_k
    }

    /// Returns the construction seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns true if the sketch is empty.
    pub fn is_empty(&self) -> bool {
        self.num_coupons == 0
    }

    /// Returns the number of coupons collected so far.
    pub fn num_coupons(&self) -> u64 {
        self.num_coupons
    }

    /// Returns the first interesting column index.
    pub fn first_interesting_column(&self) -> u8 {
        self.first_interesting_column
    }

    /// Returns the sliding window offset.
    pub fn window_offset(&self) -> u64 {
        self.window_offset
    }

    /// Returns true if the sketch is a result of merging.
    pub fn merge_flag(&self) -> bool {
        self.merge_flag
    }

    /// Returns the HIP probability factor.
    pub fn kxp(&self) -> f64 {
        self.kxp
    }

    /// Returns the accumulated HIP cardinality estimate.
    pub fn hip_est_accum(&self) -> f64 {
        self.hip_est_accum
    }

    /// Returns the sliding window bytes, if populated.
    pub fn sliding_window(&self) -> Option<&[u8]> {
        self.sliding_window.as_deref()
    }

    /// Returns the surprising value pairs, if populated.
    pub fn pair_table(&self) -> Option<&[u32]> {
        self.pair_table.as_deref()
    }
}
