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

//! # bloomset
//!
//! A salted Bloom filter: approximate set membership with no false negatives, an estimate of
//! the number of distinct elements added, and union and intersection of filters built
//! independently with the same parameters.
//!
//! ```rust
//! use bloomset::bloom::BloomFilterBuilder;
//!
//! let mut filter = BloomFilterBuilder::with_size(20, 2).build().unwrap();
//! filter.add("Iced Coffee");
//! assert!(filter.lookup("Iced Coffee"));
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

pub mod bloom;
pub mod error;

mod hash;
