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

/// The preamble space required by each format, in units of 4-byte integers.
const PRE_INTS_DEFS: [u8; 8] = [2, 2, 4, 8, 4, 8, 6, 10];

/// The eight serialized formats of a compressed CPC image.
///
/// The 3-bit ordinal packs three flags: bit 2 is set when a window stream is
/// present, bit 1 when a surprising values stream is present, and bit 0 is
/// the HIP bit. The HIP bit is the complement of the merge flag; the
/// conversion lives in [`CpcFormat::from_state`] and [`CpcFormat::merge_flag`]
/// and must not be re-derived elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpcFormat {
    /// No coupons, merged (ICON) estimator.
    EmptyMerged = 0,
    /// No coupons, HIP estimator state retained.
    EmptyHip = 1,
    /// Sparse or hybrid flavor, merged.
    SparseHybridMerged = 2,
    /// Sparse or hybrid flavor with HIP state.
    SparseHybridHip = 3,
    /// Pinned or sliding flavor, merged, no surprising values.
    PinnedSlidingMergedNosv = 4,
    /// Pinned or sliding flavor with HIP state, no surprising values.
    PinnedSlidingHipNosv = 5,
    /// Pinned or sliding flavor, merged, with surprising values.
    PinnedSlidingMerged = 6,
    /// Pinned or sliding flavor with HIP state and surprising values.
    PinnedSlidingHip = 7,
}

impl CpcFormat {
    /// Maps a 3-bit ordinal back to its format.
    pub fn from_ordinal(ordinal: u8) -> Self {
        match ordinal & 7 {
            0 => CpcFormat::EmptyMerged,
            1 => CpcFormat::EmptyHip,
            2 => CpcFormat::SparseHybridMerged,
            3 => CpcFormat::SparseHybridHip,
            4 => CpcFormat::PinnedSlidingMergedNosv,
            5 => CpcFormat::PinnedSlidingHipNosv,
            6 => CpcFormat::PinnedSlidingMerged,
            _ => CpcFormat::PinnedSlidingHip,
        }
    }

    /// Derives the format from the state triple.
    pub fn from_state(window_present: bool, csv_present: bool, merge_flag: bool) -> Self {
        let mut ordinal = 0u8;
        if window_present {
            ordinal |= 4;
        }
        if csv_present {
            ordinal |= 2;
        }
        if !merge_flag {
            // the stored bit is the HIP bit
            ordinal |= 1;
        }
        Self::from_ordinal(ordinal)
    }

    /// Returns the 3-bit ordinal of this format.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Returns the preamble size of this format in 4-byte integers.
    pub fn preamble_ints(self) -> u8 {
        PRE_INTS_DEFS[self as usize]
    }

    /// Returns true when images of this format were produced by a merge.
    pub fn merge_flag(self) -> bool {
        (self.ordinal() & 1) == 0
    }

    /// Returns true when images of this format carry a surprising values stream.
    pub fn csv_is_valid(self) -> bool {
        (self.ordinal() & 2) != 0
    }

    /// Returns true when images of this format carry a window stream.
    pub fn window_is_valid(self) -> bool {
        (self.ordinal() & 4) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinal_round_trip() {
        for ordinal in 0..8u8 {
            let format = CpcFormat::from_ordinal(ordinal);
            assert_eq!(format.ordinal(), ordinal);
            assert_eq!(
                CpcFormat::from_state(
                    format.window_is_valid(),
                    format.csv_is_valid(),
                    format.merge_flag()
                ),
                format
            );
        }
    }

    #[test]
    fn test_preamble_ints() {
        assert_eq!(CpcFormat::EmptyMerged.preamble_ints(), 2);
        assert_eq!(CpcFormat::EmptyHip.preamble_ints(), 2);
        assert_eq!(CpcFormat::SparseHybridMerged.preamble_ints(), 4);
        assert_eq!(CpcFormat::SparseHybridHip.preamble_ints(), 8);
        assert_eq!(CpcFormat::PinnedSlidingMergedNosv.preamble_ints(), 4);
        assert_eq!(CpcFormat::PinnedSlidingHipNosv.preamble_ints(), 8);
        assert_eq!(CpcFormat::PinnedSlidingMerged.preamble_ints(), 6);
        assert_eq!(CpcFormat::PinnedSlidingHip.preamble_ints(), 10);
    }

    #[test]
    fn test_merge_flag_is_complement_of_hip_bit() {
        assert!(CpcFormat::EmptyMerged.merge_flag());
        assert!(!CpcFormat::EmptyHip.merge_flag());
        assert!(CpcFormat::PinnedSlidingMerged.merge_flag());
        assert!(!CpcFormat::PinnedSlidingHip.merge_flag());
    }
}
