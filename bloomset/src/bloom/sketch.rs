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

use crate::bloom::BitOp;
use crate::bloom::BitStore;
use crate::error::Error;
use crate::hash::ProbeHasher;

/// A salted Bloom filter for probabilistic set membership testing.
///
/// Provides membership queries with:
/// - No false negatives (added elements always return `true`)
/// - Tunable false positive rate
/// - Constant space usage
///
/// Bits only ever go from 0 to 1; there is no removal.
///
/// Use [`BloomFilterBuilder`](crate::bloom::BloomFilterBuilder) to construct instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloomFilter {
    /// Prepended to every hashed element
    salt: String,
    /// Number of hash functions to use (k)
    num_hashes: u16,
    /// Bit array, its length is the filter size (m)
    bits: BitStore,
}

impl BloomFilter {
    /// Creates an all-zero filter. Parameters have been validated by the builder.
    pub(super) fn new(size: u64, num_hashes: u16, salt: String) -> Self {
        Self::from_bits(BitStore::new(size), num_hashes, salt)
    }

    /// Creates a filter around existing bit contents; the size is the store's length.
    fn from_bits(bits: BitStore, num_hashes: u16, salt: String) -> Self {
        BloomFilter {
            salt,
            num_hashes,
            bits,
        }
    }

    // ========================================================================
    // Update Operations
    // ========================================================================

    /// Adds an element to the filter.
    ///
    /// After adding, `lookup(element)` will always return `true`. Adding the same element again
    /// leaves the filter unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomset::bloom::BloomFilterBuilder;
    /// let mut filter = BloomFilterBuilder::with_size(20, 2).build().unwrap();
    /// filter.add("Iced Coffee");
    /// assert!(filter.lookup("Iced Coffee"));
    /// ```
    pub fn add(&mut self, element: &str) {
        let hasher = ProbeHasher::new(&self.salt, self.bits.len());
        for index in hasher.indices(element, self.num_hashes) {
            self.bits.insert(index);
        }
    }

    /// Tests and adds an element in a single operation.
    ///
    /// Returns whether the element was possibly already in the set before it was added.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomset::bloom::BloomFilterBuilder;
    /// let mut filter = BloomFilterBuilder::with_size(1024, 3).build().unwrap();
    ///
    /// assert!(!filter.contains_and_add("Mocha")); // first insertion
    /// assert!(filter.contains_and_add("Mocha")); // now it's in the set
    /// ```
    pub fn contains_and_add(&mut self, element: &str) -> bool {
        let hasher = ProbeHasher::new(&self.salt, self.bits.len());
        let mut was_present = true;
        for index in hasher.indices(element, self.num_hashes) {
            was_present &= self.bits.contains(index);
            self.bits.insert(index);
        }
        was_present
    }

    // ========================================================================
    // Query Operations
    // ========================================================================

    /// Tests whether an element is possibly in the set.
    ///
    /// Returns:
    /// - `true`: the element was **possibly** added (or is a false positive)
    /// - `false`: the element was **definitely not** added
    ///
    /// Stops probing at the first unset bit.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomset::bloom::BloomFilterBuilder;
    /// let mut filter = BloomFilterBuilder::with_size(1024, 3).build().unwrap();
    /// filter.add("Flat White");
    ///
    /// assert!(filter.lookup("Flat White"));
    /// assert!(!filter.lookup("Americano"));
    /// ```
    pub fn lookup(&self, element: &str) -> bool {
        let hasher = ProbeHasher::new(&self.salt, self.bits.len());
        hasher
            .indices(element, self.num_hashes)
            .all(|index| self.bits.contains(index))
    }

    /// Estimates the number of distinct elements added.
    ///
    /// Uses `n = -(m / k) * ln(1 - X / m)` where `m` is the size, `k` the number of hashes and
    /// `X` the number of set bits. Returns `0.0` for an empty filter and [`f64::INFINITY`] once
    /// every bit is set, where the estimator saturates.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomset::bloom::BloomFilterBuilder;
    /// let mut filter = BloomFilterBuilder::with_size(20, 2).build().unwrap();
    /// assert_eq!(filter.estimate_cardinality(), 0.0);
    ///
    /// filter.add("Iced Coffee");
    /// assert!(filter.estimate_cardinality() > 0.0);
    /// ```
    pub fn estimate_cardinality(&self) -> f64 {
        let m = self.bits.len() as f64;
        let k = f64::from(self.num_hashes);
        let x = self.bits.popcount() as f64;

        if x >= m {
            return f64::INFINITY;
        }
        // ln_1p keeps precision for sparse filters; the result is never below zero
        (-(m / k) * (-x / m).ln_1p()).max(0.0)
    }

    // ========================================================================
    // Set Operations
    // ========================================================================

    /// Returns a new filter holding the bitwise OR of both filters.
    ///
    /// The result recognizes every element added to either filter (plus the false positives of
    /// both). Neither input is modified. The result keeps this filter's salt.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::IncompatibleFilters`](crate::error::ErrorKind::IncompatibleFilters)
    /// if the filters differ in size or number of hashes.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomset::bloom::BloomFilterBuilder;
    /// let mut f1 = BloomFilterBuilder::with_size(1024, 3).build().unwrap();
    /// let mut f2 = BloomFilterBuilder::with_size(1024, 3).build().unwrap();
    /// f1.add("a");
    /// f2.add("b");
    ///
    /// let both = f1.union(&f2).unwrap();
    /// assert!(both.lookup("a"));
    /// assert!(both.lookup("b"));
    /// ```
    pub fn union(&self, other: &BloomFilter) -> Result<BloomFilter, Error> {
        self.combine(other, BitOp::Or)
    }

    /// Returns a new filter holding the bitwise AND of both filters.
    ///
    /// This approximates set intersection and is lossy: a bit set in both filters does not mean
    /// the elements that set it coincide, so the result may report elements that were added to
    /// only one of the inputs. Neither input is modified. The result keeps this filter's salt.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::IncompatibleFilters`](crate::error::ErrorKind::IncompatibleFilters)
    /// if the filters differ in size or number of hashes.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomset::bloom::BloomFilterBuilder;
    /// let mut f1 = BloomFilterBuilder::with_size(1024, 3).build().unwrap();
    /// let mut f2 = BloomFilterBuilder::with_size(1024, 3).build().unwrap();
    /// f1.add("a");
    /// f1.add("b");
    /// f2.add("b");
    /// f2.add("c");
    ///
    /// let common = f1.intersection(&f2).unwrap();
    /// assert!(common.lookup("b")); // in both
    /// // "a" and "c" likely return false now
    /// ```
    pub fn intersection(&self, other: &BloomFilter) -> Result<BloomFilter, Error> {
        self.combine(other, BitOp::And)
    }

    fn combine(&self, other: &BloomFilter, op: BitOp) -> Result<BloomFilter, Error> {
        if !self.is_compatible(other) {
            return Err(Error::incompatible_filters(
                (self.size(), self.num_hashes),
                (other.size(), other.num_hashes),
            ));
        }

        let bits = self.bits.combine(&other.bits, op)?;
        Ok(BloomFilter::from_bits(
            bits,
            self.num_hashes,
            self.salt.clone(),
        ))
    }

    // ========================================================================
    // Statistics and Properties
    // ========================================================================

    /// Returns whether no bit is set, i.e. nothing has been added.
    ///
    /// Unlike [`BitStore::is_empty`], which is about length, this looks at the bit contents.
    pub fn is_empty(&self) -> bool {
        self.bits_used() == 0
    }

    /// Returns the number of bits set to 1.
    pub fn bits_used(&self) -> u64 {
        self.bits.popcount()
    }

    /// Returns the total number of bits in the filter.
    pub fn size(&self) -> u64 {
        self.bits.len()
    }

    /// Returns the number of hash functions used.
    pub fn num_hashes(&self) -> u16 {
        self.num_hashes
    }

    /// Returns the salt prepended to every hashed element.
    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// Returns the underlying bit array.
    pub fn bits(&self) -> &BitStore {
        &self.bits
    }

    /// Returns the fraction of bits set.
    pub fn load_factor(&self) -> f64 {
        self.bits_used() as f64 / self.size() as f64
    }

    /// Estimates the current false positive probability.
    ///
    /// A non-added element is reported present when all of its `k` probes hit set bits, so the
    /// estimate is `load^k`, assuming uniform bit distribution.
    pub fn estimated_fpp(&self) -> f64 {
        self.load_factor().powi(i32::from(self.num_hashes))
    }

    /// Checks if two filters can be combined.
    ///
    /// Filters are compatible if they have the same size and number of hash functions. The salt
    /// is not compared.
    pub fn is_compatible(&self, other: &BloomFilter) -> bool {
        self.size() == other.size() && self.num_hashes == other.num_hashes
    }
}
