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

//! Streaming sketch data structures with bounded memory and probabilistic
//! guarantees.
//!
//! Two families are provided:
//!
//! - [`frequencies`] — a Misra-Gries style frequent items sketch that
//!   estimates per-item frequency in a stream and reports heavy hitters
//!   with explicit error guarantees.
//! - [`cpc`] — the compressed serialized state of a CPC (Compressed
//!   Probabilistic Counting) distinct-count sketch: importing a byte image,
//!   exporting one, and reconstructing a sketch skeleton from it.
//!
//! Both families share a philosophy: bounded memory, probabilistic error
//! bounds, deterministic reconstruction from bytes.

mod codec;
pub mod cpc;
pub mod error;
pub mod frequencies;
pub mod hash;
