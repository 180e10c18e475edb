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

use crate::error::Error;

/// Min log2 of K.
pub const MIN_LG_K: u8 = 4;
/// Max log2 of K.
pub const MAX_LG_K: u8 = 26;

pub(super) fn check_lg_k(lg_k: u8) -> Result<(), Error> {
    if (MIN_LG_K..=MAX_LG_K).contains(&lg_k) {
        Ok(())
    } else {
        Err(Error::invalid_argument(format!(
            "lg_k must be in [{MIN_LG_K}, {MAX_LG_K}]; got {lg_k}"
        )))
    }
}

/// Returns the sliding window offset implied by `lg_k` and the coupon count.
///
/// The offset is `(8C - 19K) / 8K`, floored at zero, with `K = 1 << lg_k`.
/// Valid coupon counts yield offsets in `0..=56`.
pub fn determine_correct_offset(lg_k: u8, num_coupons: u64) -> u64 {
    let k = 1u64 << lg_k;
    let tmp = (num_coupons << 3) as i64 - (19 * k) as i64; // 8C - 19K
    if tmp < 0 {
        return 0;
    }
    (tmp as u64) >> (lg_k + 3) // tmp / 8K
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_boundaries() {
        // K = 16: the window first moves at C = 54 and again at C = 70.
        assert_eq!(determine_correct_offset(4, 0), 0);
        assert_eq!(determine_correct_offset(4, 38), 0);
        assert_eq!(determine_correct_offset(4, 53), 0);
        assert_eq!(determine_correct_offset(4, 54), 1);
        assert_eq!(determine_correct_offset(4, 69), 1);
        assert_eq!(determine_correct_offset(4, 70), 2);
    }
}
