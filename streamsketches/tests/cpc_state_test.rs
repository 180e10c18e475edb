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

use googletest::assert_that;
use googletest::prelude::contains_substring;
use googletest::prelude::eq;
use streamsketches::cpc::determine_correct_offset;
use streamsketches::cpc::CpcCompressedState;
use streamsketches::cpc::CpcFormat;
use streamsketches::error::ErrorKind;
use streamsketches::hash::compute_seed_hash;
use streamsketches::hash::DEFAULT_UPDATE_SEED;

fn empty_merged_state() -> CpcCompressedState {
    let mut state = CpcCompressedState::new(11, 0x93cc).unwrap();
    state.merge_flag = true;
    state
}

fn sparse_hybrid_hip_state() -> CpcCompressedState {
    let mut state = CpcCompressedState::new(10, 0x7a21).unwrap();
    state.num_coupons = 3;
    state.num_csv = 3;
    state.csv_length_ints = 2;
    state.csv_stream = vec![0xdead_beef, 0x0102_0304];
    state.csv_is_valid = true;
    state.kxp = 987.5;
    state.hip_est_accum = 3.25;
    state
}

fn pinned_sliding_hip_state() -> CpcCompressedState {
    let mut state = CpcCompressedState::new(12, 0x1c0f).unwrap();
    state.fi_col = 6;
    state.num_coupons = 20_000;
    state.num_csv = 17;
    state.csv_length_ints = 3;
    state.csv_stream = vec![1, 2, 3];
    state.csv_is_valid = true;
    state.cw_length_ints = 4;
    state.cw_stream = vec![10, 20, 30, 40];
    state.window_is_valid = true;
    state.kxp = 1724.0;
    state.hip_est_accum = 19_874.25;
    state
}

#[test]
fn test_format_derivation() {
    let state = empty_merged_state();
    assert_that!(state.get_format(), eq(CpcFormat::EmptyMerged));

    let mut state = CpcCompressedState::new(11, 0x93cc).unwrap();
    state.num_csv = 5;
    state.merge_flag = false;
    assert_that!(state.get_format(), eq(CpcFormat::SparseHybridHip));

    state.merge_flag = true;
    assert_that!(state.get_format(), eq(CpcFormat::SparseHybridMerged));

    state.num_csv = 0;
    state.cw_length_ints = 7;
    assert_that!(state.get_format(), eq(CpcFormat::PinnedSlidingMergedNosv));

    state.num_csv = 2;
    state.merge_flag = false;
    assert_that!(state.get_format(), eq(CpcFormat::PinnedSlidingHip));
}

#[test]
fn test_required_serialized_bytes() {
    let mut state = CpcCompressedState::new(11, 0x93cc).unwrap();
    assert_that!(state.get_required_serialized_bytes(), eq(8));

    state.num_csv = 4;
    state.csv_length_ints = 4;
    state.merge_flag = false;
    // SPARSE_HYBRID_HIP: 4 * (8 + 4 + 0)
    assert_that!(state.get_required_serialized_bytes(), eq(48));
}

#[test]
fn test_round_trip_all_formats() {
    let mut states = Vec::new();

    states.push(empty_merged_state());

    // EMPTY_HIP
    states.push(CpcCompressedState::new(11, 0x93cc).unwrap());

    // SPARSE_HYBRID_MERGED
    let mut state = sparse_hybrid_hip_state();
    state.merge_flag = true;
    state.kxp = (1u64 << state.lg_k) as f64;
    state.hip_est_accum = 0.0;
    states.push(state);

    states.push(sparse_hybrid_hip_state());

    // PINNED_SLIDING_MERGED_NOSV
    let mut state = pinned_sliding_hip_state();
    state.merge_flag = true;
    state.num_csv = 0;
    state.csv_length_ints = 0;
    state.csv_stream = Vec::new();
    state.csv_is_valid = false;
    state.kxp = (1u64 << state.lg_k) as f64;
    state.hip_est_accum = 0.0;
    states.push(state);

    // PINNED_SLIDING_HIP_NOSV
    let mut state = pinned_sliding_hip_state();
    state.num_csv = 0;
    state.csv_length_ints = 0;
    state.csv_stream = Vec::new();
    state.csv_is_valid = false;
    states.push(state);

    // PINNED_SLIDING_MERGED
    let mut state = pinned_sliding_hip_state();
    state.merge_flag = true;
    state.kxp = (1u64 << state.lg_k) as f64;
    state.hip_est_accum = 0.0;
    states.push(state);

    states.push(pinned_sliding_hip_state());

    let expected_formats = [
        CpcFormat::EmptyMerged,
        CpcFormat::EmptyHip,
        CpcFormat::SparseHybridMerged,
        CpcFormat::SparseHybridHip,
        CpcFormat::PinnedSlidingMergedNosv,
        CpcFormat::PinnedSlidingHipNosv,
        CpcFormat::PinnedSlidingMerged,
        CpcFormat::PinnedSlidingHip,
    ];
    for (state, expected_format) in states.iter().zip(expected_formats) {
        assert_that!(state.get_format(), eq(expected_format));
        let bytes = state.export_to_bytes().unwrap();
        assert_that!(bytes.len(), eq(state.get_required_serialized_bytes()));
        let restored = CpcCompressedState::import_from_bytes(&bytes).unwrap();
        assert_that!(&restored, eq(state));
        let bytes_again = restored.export_to_bytes().unwrap();
        assert_that!(&bytes_again, eq(&bytes));
    }
}

#[test]
fn test_streams_may_be_longer_than_declared() {
    let mut state = sparse_hybrid_hip_state();
    state.csv_stream.extend_from_slice(&[7, 8, 9]);
    let bytes = state.export_to_bytes().unwrap();
    assert_that!(bytes.len(), eq(state.get_required_serialized_bytes()));
    let restored = CpcCompressedState::import_from_bytes(&bytes).unwrap();
    assert_that!(
        &restored.csv_stream,
        eq(&state.csv_stream[..state.csv_length_ints as usize])
    );
}

#[test]
fn test_stream_shorter_than_declared_rejected() {
    let mut state = sparse_hybrid_hip_state();
    state.csv_length_ints = 9;
    let err = state.export_to_bytes().unwrap_err();
    assert_that!(err.kind(), eq(ErrorKind::InvalidArgument));
}

#[test]
fn test_import_rejects_short_buffer() {
    let err = CpcCompressedState::import_from_bytes(&[]).unwrap_err();
    assert_that!(err.kind(), eq(ErrorKind::CapacityShort));

    let bytes = sparse_hybrid_hip_state().export_to_bytes().unwrap();
    let err = CpcCompressedState::import_from_bytes(&bytes[..bytes.len() - 4]).unwrap_err();
    assert_that!(err.kind(), eq(ErrorKind::CapacityShort));

    // a truncated preamble must be caught before any field is read
    let err = CpcCompressedState::import_from_bytes(&bytes[..12]).unwrap_err();
    assert_that!(err.kind(), eq(ErrorKind::CapacityShort));
}

#[test]
fn test_import_rejects_uncompressed_image() {
    let mut bytes = empty_merged_state().export_to_bytes().unwrap();
    bytes[5] &= !0x02; // clear the compressed flag
    let err = CpcCompressedState::import_from_bytes(&bytes).unwrap_err();
    assert_that!(err.kind(), eq(ErrorKind::NotCompressed));
    assert_that!(err.message(), contains_substring("compressed"));
}

#[test]
fn test_import_rejects_malformed_preamble() {
    let good = empty_merged_state().export_to_bytes().unwrap();

    let mut bytes = good.clone();
    bytes[1] = 9; // serial version
    let err = CpcCompressedState::import_from_bytes(&bytes).unwrap_err();
    assert_that!(err.kind(), eq(ErrorKind::MalformedImage));

    let mut bytes = good.clone();
    bytes[2] = 7; // family
    let err = CpcCompressedState::import_from_bytes(&bytes).unwrap_err();
    assert_that!(err.kind(), eq(ErrorKind::MalformedImage));

    let mut bytes = good.clone();
    bytes[0] = 4; // preamble ints disagree with the format
    let err = CpcCompressedState::import_from_bytes(&bytes).unwrap_err();
    assert_that!(err.kind(), eq(ErrorKind::MalformedImage));

    let mut bytes = good.clone();
    bytes[3] = 30; // lg_k out of range
    let err = CpcCompressedState::import_from_bytes(&bytes).unwrap_err();
    assert_that!(err.kind(), eq(ErrorKind::MalformedImage));

    let mut bytes = good;
    bytes[4] = 64; // fi_col out of range
    let err = CpcCompressedState::import_from_bytes(&bytes).unwrap_err();
    assert_that!(err.kind(), eq(ErrorKind::MalformedImage));
}

#[test]
fn test_uncompress_populates_skeleton() {
    let seed = DEFAULT_UPDATE_SEED;
    let mut state = pinned_sliding_hip_state();
    state.seed_hash = compute_seed_hash(seed);

    let sketch = state.uncompress(seed).unwrap();
    assert_that!(sketch.lg_k(), eq(state.lg_k));
    assert_that!(sketch.num_coupons(), eq(state.num_coupons));
    assert_that!(sketch.first_interesting_column(), eq(state.fi_col));
    assert_that!(sketch.merge_flag(), eq(state.merge_flag));
    assert_that!(sketch.kxp(), eq(state.kxp));
    assert_that!(sketch.hip_est_accum(), eq(state.hip_est_accum));
    assert_that!(
        sketch.window_offset(),
        eq(determine_correct_offset(state.lg_k, state.num_coupons))
    );
    assert!(sketch.sliding_window().is_none());
    assert!(sketch.pair_table().is_none());
}

#[test]
fn test_uncompress_rejects_wrong_seed() {
    let seed = DEFAULT_UPDATE_SEED;
    let mut state = empty_merged_state();
    state.seed_hash = compute_seed_hash(seed) ^ 1;
    let err = state.uncompress(seed).unwrap_err();
    assert_that!(err.kind(), eq(ErrorKind::SeedMismatch));
}

#[test]
fn test_window_offset_tracks_coupon_count() {
    let mut state = CpcCompressedState::new(4, 0x93cc).unwrap();
    assert_that!(state.get_window_offset(), eq(0));
    state.num_coupons = 54;
    assert_that!(state.get_window_offset(), eq(1));
    state.num_coupons = 70;
    assert_that!(state.get_window_offset(), eq(2));
}
