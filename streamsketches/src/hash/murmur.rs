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

//! MurmurHash3 x64-128 helpers.

/// The seed used by the reference item hashers.
pub const DEFAULT_UPDATE_SEED: u64 = 9001;

/// Hashes `bytes` with MurmurHash3 x64-128 and returns the first 64-bit lane.
///
/// The underlying implementation takes a 32-bit seed; larger seeds are truncated.
pub fn hash_bytes(bytes: &[u8], seed: u64) -> u64 {
    mur3::murmurhash3_x64_128(bytes, seed as u32).0
}

/// Folds a 64-bit seed into the 16-bit hash stored in serialized images.
pub fn compute_seed_hash(seed: u64) -> u16 {
    let (h1, _) = mur3::murmurhash3_x64_128(&seed.to_le_bytes(), 0);
    (h1 & 0xffff) as u16
}
