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

//! Field access for the preamble of a serialized CPC image.
//!
//! The low preamble is the fixed first 8 bytes of every image. The hi
//! fields that follow sit at fixed byte offsets that depend only on the
//! format. All getters assume capacity has been checked by the caller;
//! [`check_lo_preamble`] and [`check_capacity`] are those checks.

use crate::codec::read_f64_le;
use crate::codec::read_u16_le;
use crate::codec::read_u32_le;
use crate::codec::Family;
use crate::cpc::format::CpcFormat;
use crate::cpc::util::MAX_LG_K;
use crate::cpc::util::MIN_LG_K;
use crate::error::Error;

pub(super) const SERIAL_VERSION: u8 = 1;
pub(super) const LO_PREAMBLE_BYTES: usize = 8;

const PRE_INTS_BYTE: usize = 0;
const SER_VER_BYTE: usize = 1;
const FAMILY_BYTE: usize = 2;
const LG_K_BYTE: usize = 3;
const FI_COL_BYTE: usize = 4;
const FLAGS_BYTE: usize = 5;
const SEED_HASH_SHORT: usize = 6;

const COMPRESSED_FLAG_MASK: u8 = 0x02;

/// Byte offset of each hi field, indexed by format ordinal.
/// Columns: num_coupons, num_sv, sv_length_ints, w_length_ints, kxp, hip_accum.
/// Zero marks a field the format does not carry.
const HI_FIELD_OFFSET: [[usize; 6]; 8] = [
    [0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0],
    [8, 0, 12, 0, 0, 0],
    [8, 0, 12, 0, 16, 24],
    [8, 0, 0, 12, 0, 0],
    [8, 0, 0, 12, 16, 24],
    [8, 12, 16, 20, 0, 0],
    [8, 12, 16, 20, 24, 32],
];

#[derive(Clone, Copy)]
enum HiField {
    NumCoupons = 0,
    NumSv = 1,
    SvLengthInts = 2,
    WLengthInts = 3,
    Kxp = 4,
    HipAccum = 5,
}

fn hi_field_offset(format: CpcFormat, field: HiField) -> usize {
    let offset = HI_FIELD_OFFSET[format.ordinal() as usize][field as usize];
    debug_assert!(offset > 0, "hi field not present in this format");
    offset
}

pub(super) fn get_pre_ints(bytes: &[u8]) -> u8 {
    bytes[PRE_INTS_BYTE]
}

pub(super) fn get_ser_ver(bytes: &[u8]) -> u8 {
    bytes[SER_VER_BYTE]
}

pub(super) fn get_family_id(bytes: &[u8]) -> u8 {
    bytes[FAMILY_BYTE]
}

pub(super) fn get_lg_k(bytes: &[u8]) -> u8 {
    bytes[LG_K_BYTE]
}

pub(super) fn get_fi_col(bytes: &[u8]) -> u8 {
    bytes[FI_COL_BYTE]
}

pub(super) fn get_seed_hash(bytes: &[u8]) -> u16 {
    read_u16_le(bytes, SEED_HASH_SHORT)
}

pub(super) fn get_format_ordinal(bytes: &[u8]) -> u8 {
    (bytes[FLAGS_BYTE] >> 2) & 0x7
}

pub(super) fn is_compressed(bytes: &[u8]) -> bool {
    (bytes[FLAGS_BYTE] & COMPRESSED_FLAG_MASK) != 0
}

/// The flags byte an export writes: the compressed bit plus the format
/// ordinal in bits 2 through 4.
pub(super) fn make_flags(format: CpcFormat) -> u8 {
    COMPRESSED_FLAG_MASK | (format.ordinal() << 2)
}

pub(super) fn get_num_coupons(bytes: &[u8], format: CpcFormat) -> u64 {
    read_u32_le(bytes, hi_field_offset(format, HiField::NumCoupons)) as u64
}

pub(super) fn get_num_sv(bytes: &[u8], format: CpcFormat) -> u32 {
    read_u32_le(bytes, hi_field_offset(format, HiField::NumSv))
}

pub(super) fn get_sv_length_ints(bytes: &[u8], format: CpcFormat) -> u32 {
    read_u32_le(bytes, hi_field_offset(format, HiField::SvLengthInts))
}

pub(super) fn get_w_length_ints(bytes: &[u8], format: CpcFormat) -> u32 {
    read_u32_le(bytes, hi_field_offset(format, HiField::WLengthInts))
}

pub(super) fn get_kxp(bytes: &[u8], format: CpcFormat) -> f64 {
    read_f64_le(bytes, hi_field_offset(format, HiField::Kxp))
}

pub(super) fn get_hip_accum(bytes: &[u8], format: CpcFormat) -> f64 {
    read_f64_le(bytes, hi_field_offset(format, HiField::HipAccum))
}

/// Extracts the surprising values stream, which directly follows the preamble.
pub(super) fn get_sv_stream(bytes: &[u8], format: CpcFormat, sv_length_ints: u32) -> Vec<u32> {
    let start = format.preamble_ints() as usize * 4;
    read_words(bytes, start, sv_length_ints)
}

/// Extracts the window stream, which follows the surprising values stream.
pub(super) fn get_w_stream(
    bytes: &[u8],
    format: CpcFormat,
    sv_length_ints: u32,
    w_length_ints: u32,
) -> Vec<u32> {
    let start = (format.preamble_ints() as usize + sv_length_ints as usize) * 4;
    read_words(bytes, start, w_length_ints)
}

fn read_words(bytes: &[u8], start: usize, length_ints: u32) -> Vec<u32> {
    let mut words = Vec::with_capacity(length_ints as usize);
    for i in 0..length_ints as usize {
        words.push(read_u32_le(bytes, start + i * 4));
    }
    words
}

/// Validates the fixed low-preamble bytes of an image.
pub(super) fn check_lo_preamble(bytes: &[u8]) -> Result<(), Error> {
    check_capacity(bytes.len(), LO_PREAMBLE_BYTES as u64)?;
    let ser_ver = get_ser_ver(bytes);
    if ser_ver != SERIAL_VERSION {
        return Err(Error::malformed_image(format!(
            "unsupported serial version: expected {SERIAL_VERSION}, got {ser_ver}"
        )));
    }
    Family::CPC.validate_id(get_family_id(bytes))?;
    let format = CpcFormat::from_ordinal(get_format_ordinal(bytes));
    let pre_ints = get_pre_ints(bytes);
    if pre_ints != format.preamble_ints() {
        return Err(Error::malformed_image(format!(
            "preamble ints {} do not match format {:?}",
            pre_ints, format
        )));
    }
    let lg_k = get_lg_k(bytes);
    if !(MIN_LG_K..=MAX_LG_K).contains(&lg_k) {
        return Err(Error::malformed_image(format!(
            "lg_k out of range; got {lg_k}"
        )));
    }
    let fi_col = get_fi_col(bytes);
    if fi_col > 63 {
        return Err(Error::malformed_image(format!(
            "first interesting column out of range; got {fi_col}"
        )));
    }
    Ok(())
}

pub(super) fn check_capacity(actual_bytes: usize, required_bytes: u64) -> Result<(), Error> {
    if (actual_bytes as u64) < required_bytes {
        return Err(Error::capacity_short(required_bytes, actual_bytes));
    }
    Ok(())
}
