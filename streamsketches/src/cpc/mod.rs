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

//! The compressed serialized state of a CPC distinct-count sketch.
//!
//! A serialized CPC image is a little-endian sequence of 32-bit words: a
//! preamble of 2 to 10 words whose layout depends on one of eight formats,
//! followed by up to two packed integer streams (compressed surprising
//! values, then the compressed sliding window). [`CpcCompressedState`]
//! decodes such an image, re-encodes it byte for byte, and reconstructs a
//! [`CpcSketch`] skeleton whose window and pair table are filled in by an
//! external decompression engine.
//!
//! ```rust
//! # use streamsketches::cpc::CpcCompressedState;
//! # use streamsketches::cpc::CpcFormat;
//! let state = CpcCompressedState::new(11, 0x93cc).unwrap();
//! let bytes = state.export_to_bytes().unwrap();
//! let restored = CpcCompressedState::import_from_bytes(&bytes).unwrap();
//! assert_eq!(restored.get_format(), CpcFormat::EmptyHip);
//! assert_eq!(restored.get_required_serialized_bytes(), bytes.len());
//! ```

mod compressed_state;
mod format;
mod preamble;
mod sketch;
mod util;

pub use self::compressed_state::CpcCompressedState;
pub use self::format::CpcFormat;
pub use self::sketch::CpcSketch;
pub use self::util::determine_correct_offset;
pub use self::util::MAX_LG_K;
pub use self::util::MIN_LG_K;
