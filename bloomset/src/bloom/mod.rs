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

//! Salted Bloom filter for probabilistic set membership testing.
//!
//! A Bloom filter is a space-efficient probabilistic data structure used to test whether
//! an element is a member of a set. False positive matches are possible, but false negatives
//! are not. In other words, a query returns either "possibly in set" or "definitely not in set".
//!
//! # Properties
//!
//! - **No false negatives**: If an element was added, `lookup()` will always return `true`
//! - **Possible false positives**: `lookup()` may return `true` for elements never added
//! - **Fixed size**: filters never resize
//! - **Monotonic**: bits only go from 0 to 1; elements cannot be removed
//!
//! # Usage
//!
//! ```rust
//! use bloomset::bloom::BloomFilterBuilder;
//!
//! let mut filter = BloomFilterBuilder::with_size(1024, 3).build().unwrap();
//!
//! filter.add("Espresso");
//! filter.add("Cappuccino");
//!
//! assert!(filter.lookup("Espresso")); // true - definitely added
//! assert!(!filter.lookup("Americano")); // false - never added (probably)
//!
//! println!("Size: {} bits", filter.size());
//! println!("Bits used: {}", filter.bits_used());
//! println!("Est. distinct elements: {:.2}", filter.estimate_cardinality());
//! ```
//!
//! # Set Operations
//!
//! Filters with the same size and number of hashes can be combined into a new filter:
//!
//! ```rust
//! # use bloomset::bloom::BloomFilterBuilder;
//! let mut filter1 = BloomFilterBuilder::with_size(1024, 3).build().unwrap();
//! let mut filter2 = BloomFilterBuilder::with_size(1024, 3).build().unwrap();
//!
//! filter1.add("a");
//! filter2.add("b");
//!
//! // Union: recognizes elements from either filter
//! let union = filter1.union(&filter2).unwrap();
//! assert!(union.lookup("a"));
//! assert!(union.lookup("b"));
//!
//! // Intersection: approximates elements in both filters
//! let intersection = filter1.intersection(&filter2).unwrap();
//! assert!(intersection.bits_used() <= filter1.bits_used());
//! ```
//!
//! # Implementation Details
//!
//! - Probe `i` of an element hashes `salt + element + i` with SHA-1 and reduces the digest,
//!   read as a big-endian integer, modulo the filter size
//! - Bits packed in `u64` words
//! - Cardinality estimate: `n = -(m / k) * ln(1 - X / m)` (Swamidass and Baldi)
//!
//! # References
//!
//! - Bloom, Burton H. (1970). "Space/time trade-offs in hash coding with allowable errors"
//! - Swamidass and Baldi (2007). "Mathematical correction for fingerprint similarity measures
//!   to improve chemical retrieval"

mod bits;
mod builder;
mod shared;
mod sketch;

pub use self::bits::BitOp;
pub use self::bits::BitStore;
pub use self::builder::BloomFilterBuilder;
pub use self::shared::SharedBloomFilter;
pub use self::sketch::BloomFilter;
