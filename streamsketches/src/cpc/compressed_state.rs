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

use crate::codec::Family;
use crate::codec::SketchBytes;
use crate::cpc::format::CpcFormat;
use crate::cpc::preamble;
use crate::cpc::sketch::CpcSketch;
use crate::cpc::util::check_lg_k;
use crate::cpc::util::determine_correct_offset;
use crate::error::Error;
use crate::hash::compute_seed_hash;

/// The compressed serialized state of a CPC sketch.
///
/// The fields mirror the serialized preamble one-to-one, so the state is a
/// plain record: an external compressor fills it before
/// [`export_to_bytes`](Self::export_to_bytes), and
/// [`import_from_bytes`](Self::import_from_bytes) fills it from an image.
#[derive(Debug, Clone, PartialEq)]
pub struct CpcCompressedState {
    /// Log2 of the configuration parameter K.
    pub lg_k: u8,
    /// 16-bit hash of the construction seed.
    pub seed_hash: u16,
    /// First interesting column index.
    pub fi_col: u8,
    /// True if the image was in merged (non-HIP) mode. Stored as the
    /// complement of the HIP bit.
    pub merge_flag: bool,
    /// The number of coupons collected.
    pub num_coupons: u64,

    /// HIP estimator probability factor.
    pub kxp: f64,
    /// HIP estimator accumulated estimate.
    pub hip_est_accum: f64,

    /// The number of surprising values in the compressed sparse stream.
    pub num_csv: u32,
    /// Compressed surprising values stream; may be longer than required.
    pub csv_stream: Vec<u32>,
    /// The number of 32-bit words of `csv_stream` that are meaningful.
    pub csv_length_ints: u32,
    /// Compressed sliding window stream; may be longer than required.
    pub cw_stream: Vec<u32>,
    /// The number of 32-bit words of `cw_stream` that are meaningful.
    pub cw_length_ints: u32,

    /// True when the format carries a surprising values stream.
    pub csv_is_valid: bool,
    /// True when the format carries a window stream.
    pub window_is_valid: bool,
}

impl CpcCompressedState {
    /// Creates a skeletal state with `kxp = 2^lg_k` and empty streams.
    pub fn new(lg_k: u8, seed_hash: u16) -> Result<Self, Error> {
        check_lg_k(lg_k)?;
        Ok(Self {
            lg_k,
            seed_hash,
            fi_col: 0,
            merge_flag: false,
            num_coupons: 0,
            kxp: (1u64 << lg_k) as f64,
            hip_est_accum: 0.0,
            num_csv: 0,
            csv_stream: Vec::new(),
            csv_length_ints: 0,
            cw_stream: Vec::new(),
            cw_length_ints: 0,
            csv_is_valid: false,
            window_is_valid: false,
        })
    }

    /// Derives the serialized format of this state.
    pub fn get_format(&self) -> CpcFormat {
        CpcFormat::from_state(self.cw_length_ints > 0, self.num_csv > 0, self.merge_flag)
    }

    /// Returns the byte size an image of this state requires.
    pub fn get_required_serialized_bytes(&self) -> usize {
        required_image_bytes(self.get_format(), self.csv_length_ints, self.cw_length_ints) as usize
    }

    /// Returns the sliding window offset implied by the coupon count.
    pub fn get_window_offset(&self) -> u64 {
        determine_correct_offset(self.lg_k, self.num_coupons)
    }

    /// Reads a compressed image, validating the preamble and every length
    /// field against the buffer before extracting the streams.
    pub fn import_from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        preamble::check_lo_preamble(bytes)?;
        if !preamble::is_compressed(bytes) {
            return Err(Error::not_compressed(
                "only compressed sketch images are supported",
            ));
        }
        let lg_k = preamble::get_lg_k(bytes);
        let seed_hash = preamble::get_seed_hash(bytes);
        let mut state = Self::new(lg_k, seed_hash)?;
        let ordinal = preamble::get_format_ordinal(bytes);
        let format = CpcFormat::from_ordinal(ordinal);
        state.merge_flag = (ordinal & 1) == 0; // the stored bit is the HIP bit
        state.csv_is_valid = (ordinal & 2) != 0;
        state.window_is_valid = (ordinal & 4) != 0;

        preamble::check_capacity(bytes.len(), format.preamble_ints() as u64 * 4)?;
        match format {
            CpcFormat::EmptyMerged | CpcFormat::EmptyHip => {
                preamble::check_capacity(bytes.len(), preamble::LO_PREAMBLE_BYTES as u64)?;
            }
            CpcFormat::SparseHybridMerged => {
                state.num_coupons = preamble::get_num_coupons(bytes, format);
                // in the sparse and hybrid flavors every coupon is surprising
                state.num_csv = state.num_coupons as u32;
                state.csv_length_ints = preamble::get_sv_length_ints(bytes, format);
                state.check_import_capacity(bytes.len(), format)?;
                state.csv_stream = preamble::get_sv_stream(bytes, format, state.csv_length_ints);
            }
            CpcFormat::SparseHybridHip => {
                state.num_coupons = preamble::get_num_coupons(bytes, format);
                state.num_csv = state.num_coupons as u32;
                state.csv_length_ints = preamble::get_sv_length_ints(bytes, format);
                state.kxp = preamble::get_kxp(bytes, format);
                state.hip_est_accum = preamble::get_hip_accum(bytes, format);
                state.check_import_capacity(bytes.len(), format)?;
                state.csv_stream = preamble::get_sv_stream(bytes, format, state.csv_length_ints);
            }
            CpcFormat::PinnedSlidingMergedNosv => {
                state.fi_col = preamble::get_fi_col(bytes);
                state.num_coupons = preamble::get_num_coupons(bytes, format);
                state.cw_length_ints = preamble::get_w_length_ints(bytes, format);
                state.check_import_capacity(bytes.len(), format)?;
                state.cw_stream = preamble::get_w_stream(bytes, format, 0, state.cw_length_ints);
            }
            CpcFormat::PinnedSlidingHipNosv => {
                state.fi_col = preamble::get_fi_col(bytes);
                state.num_coupons = preamble::get_num_coupons(bytes, format);
                state.cw_length_ints = preamble::get_w_length_ints(bytes, format);
                state.kxp = preamble::get_kxp(bytes, format);
                state.hip_est_accum = preamble::get_hip_accum(bytes, format);
                state.check_import_capacity(bytes.len(), format)?;
                state.cw_stream = preamble::get_w_stream(bytes, format, 0, state.cw_length_ints);
            }
            CpcFormat::PinnedSlidingMerged => {
                state.fi_col = preamble::get_fi_col(bytes);
                state.num_coupons = preamble::get_num_coupons(bytes, format);
                state.num_csv = preamble::get_num_sv(bytes, format);
                state.csv_length_ints = preamble::get_sv_length_ints(bytes, format);
                state.cw_length_ints = preamble::get_w_length_ints(bytes, format);
                state.check_import_capacity(bytes.len(), format)?;
                state.csv_stream = preamble::get_sv_stream(bytes, format, state.csv_length_ints);
                state.cw_stream = preamble::get_w_stream(
                    bytes,
                    format,
                    state.csv_length_ints,
                    state.cw_length_ints,
                );
            }
            CpcFormat::PinnedSlidingHip => {
                state.fi_col = preamble::get_fi_col(bytes);
                state.num_coupons = preamble::get_num_coupons(bytes, format);
                state.num_csv = preamble::get_num_sv(bytes, format);
                state.csv_length_ints = preamble::get_sv_length_ints(bytes, format);
                state.cw_length_ints = preamble::get_w_length_ints(bytes, format);
                state.kxp = preamble::get_kxp(bytes, format);
                state.hip_est_accum = preamble::get_hip_accum(bytes, format);
                state.check_import_capacity(bytes.len(), format)?;
                state.csv_stream = preamble::get_sv_stream(bytes, format, state.csv_length_ints);
                state.cw_stream = preamble::get_w_stream(
                    bytes,
                    format,
                    state.csv_length_ints,
                    state.cw_length_ints,
                );
            }
        }
        preamble::check_capacity(
            bytes.len(),
            required_image_bytes(format, state.csv_length_ints, state.cw_length_ints),
        )?;
        Ok(state)
    }

    /// Writes this state as a compressed image, the exact inverse of
    /// [`import_from_bytes`](Self::import_from_bytes).
    pub fn export_to_bytes(&self) -> Result<Vec<u8>, Error> {
        let format = self.get_format();
        if self.csv_stream.len() < self.csv_length_ints as usize {
            return Err(Error::invalid_argument(format!(
                "csv stream holds {} ints but {} are declared",
                self.csv_stream.len(),
                self.csv_length_ints
            )));
        }
        if self.cw_stream.len() < self.cw_length_ints as usize {
            return Err(Error::invalid_argument(format!(
                "cw stream holds {} ints but {} are declared",
                self.cw_stream.len(),
                self.cw_length_ints
            )));
        }

        let required = required_image_bytes(format, self.csv_length_ints, self.cw_length_ints);
        let mut out = SketchBytes::with_capacity(required as usize);
        out.write_u8(format.preamble_ints());
        out.write_u8(preamble::SERIAL_VERSION);
        out.write_u8(Family::CPC.id);
        out.write_u8(self.lg_k);
        out.write_u8(self.fi_col);
        out.write_u8(preamble::make_flags(format));
        out.write_u16_le(self.seed_hash);
        match format {
            CpcFormat::EmptyMerged | CpcFormat::EmptyHip => {}
            CpcFormat::SparseHybridMerged => {
                out.write_u32_le(self.num_coupons as u32);
                out.write_u32_le(self.csv_length_ints);
            }
            CpcFormat::SparseHybridHip => {
                out.write_u32_le(self.num_coupons as u32);
                out.write_u32_le(self.csv_length_ints);
                out.write_f64_le(self.kxp);
                out.write_f64_le(self.hip_est_accum);
            }
            CpcFormat::PinnedSlidingMergedNosv => {
                out.write_u32_le(self.num_coupons as u32);
                out.write_u32_le(self.cw_length_ints);
            }
            CpcFormat::PinnedSlidingHipNosv => {
                out.write_u32_le(self.num_coupons as u32);
                out.write_u32_le(self.cw_length_ints);
                out.write_f64_le(self.kxp);
                out.write_f64_le(self.hip_est_accum);
            }
            CpcFormat::PinnedSlidingMerged => {
                out.write_u32_le(self.num_coupons as u32);
                out.write_u32_le(self.num_csv);
                out.write_u32_le(self.csv_length_ints);
                out.write_u32_le(self.cw_length_ints);
            }
            CpcFormat::PinnedSlidingHip => {
                out.write_u32_le(self.num_coupons as u32);
                out.write_u32_le(self.num_csv);
                out.write_u32_le(self.csv_length_ints);
                out.write_u32_le(self.cw_length_ints);
                out.write_f64_le(self.kxp);
                out.write_f64_le(self.hip_est_accum);
            }
        }
        for &word in &self.csv_stream[..self.csv_length_ints as usize] {
            out.write_u32_le(word);
        }
        for &word in &self.cw_stream[..self.cw_length_ints as usize] {
            out.write_u32_le(word);
        }
        Ok(out.into_bytes())
    }

    /// Reconstructs a sketch skeleton from this state.
    ///
    /// The estimator fields are populated; the sliding window and pair table
    /// stay unpopulated for the external decompression engine to fill.
    pub fn uncompress(&self, seed: u64) -> Result<CpcSketch, Error> {
        let seed_hash = compute_seed_hash(seed);
        if seed_hash != self.seed_hash {
            return Err(Error::seed_mismatch("seed does not match the image")
                .with_context("image_seed_hash", self.seed_hash)
                .with_context("computed_seed_hash", seed_hash));
        }
        let mut sketch = CpcSketch::with_seed(self.lg_k, seed)?;
        sketch.num_coupons = self.num_coupons;
        sketch.window_offset = self.get_window_offset();
        sketch.first_interesting_column = self.fi_col;
        sketch.merge_flag = self.merge_flag;
        sketch.kxp = self.kxp;
        sketch.hip_est_accum = self.hip_est_accum;
        sketch.sliding_window = None;
        sketch.pair_table = None;
        Ok(sketch)
    }

    fn check_import_capacity(&self, actual_bytes: usize, format: CpcFormat) -> Result<(), Error> {
        preamble::check_capacity(
            actual_bytes,
            required_image_bytes(format, self.csv_length_ints, self.cw_length_ints),
        )
    }
}

fn required_image_bytes(format: CpcFormat, csv_length_ints: u32, cw_length_ints: u32) -> u64 {
    4 * (format.preamble_ints() as u64 + csv_length_ints as u64 + cw_length_ints as u64)
}
