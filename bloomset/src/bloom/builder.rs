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

use crate::bloom::BloomFilter;
use crate::error::Error;

const MIN_SUGGESTED_BITS: u64 = 64;
const MAX_NUM_BITS: u64 = (1u64 << 35) - 64; // ~4 GiB of bits
const MAX_SUGGESTED_HASHES: u16 = 100;

/// Builder for creating [`BloomFilter`] instances.
///
/// Provides two construction modes:
/// - [`with_size()`](Self::with_size): Specify exact bit count and hash functions
/// - [`with_accuracy()`](Self::with_accuracy): Specify target items and false positive rate
///
/// The salt defaults to the empty string.
#[derive(Debug, Clone, Default)]
pub struct BloomFilterBuilder {
    size: Option<u64>,
    num_hashes: Option<u16>,
    salt: String,
}

impl BloomFilterBuilder {
    /// Creates a builder with manual size specification.
    ///
    /// # Arguments
    ///
    /// - `size`: Total number of bits in the filter
    /// - `num_hashes`: Number of hash functions to use
    ///
    /// Both must be positive; this is checked by [`build()`](Self::build).
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomset::bloom::BloomFilterBuilder;
    /// let filter = BloomFilterBuilder::with_size(20, 2).build().unwrap();
    /// assert_eq!(filter.size(), 20);
    /// ```
    pub fn with_size(size: u64, num_hashes: u16) -> Self {
        BloomFilterBuilder {
            size: Some(size),
            num_hashes: Some(num_hashes),
            salt: String::new(),
        }
    }

    /// Creates a builder with optimal parameters for a target accuracy.
    ///
    /// Calculates the number of bits and hash functions that achieve the desired false positive
    /// probability for a given number of distinct items.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument) if
    /// `max_items` is 0, `fpp` is not in (0.0, 1.0), or the target needs more bits than a
    /// filter can hold.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomset::bloom::BloomFilterBuilder;
    /// // Optimal for 10,000 items with 1% FPP
    /// let filter = BloomFilterBuilder::with_accuracy(10_000, 0.01)
    ///     .unwrap()
    ///     .salt("users")
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(filter.num_hashes(), 7);
    /// ```
    pub fn with_accuracy(max_items: u64, fpp: f64) -> Result<Self, Error> {
        if max_items == 0 {
            return Err(Error::invalid_argument("max_items must be greater than 0"));
        }
        if !(fpp > 0.0 && fpp < 1.0) {
            return Err(
                Error::invalid_argument("fpp must be between 0.0 and 1.0 (exclusive)")
                    .with_context("fpp", fpp),
            );
        }

        let required = required_bits(max_items, fpp);
        if required > MAX_NUM_BITS as f64 {
            return Err(Error::invalid_argument(format!(
                "target accuracy needs more than {MAX_NUM_BITS} bits"
            ))
            .with_context("max_items", max_items)
            .with_context("fpp", fpp));
        }

        let size = Self::suggest_num_bits(max_items, fpp);
        let num_hashes = Self::suggest_num_hashes_from_accuracy(max_items, size);
        Ok(Self::with_size(size, num_hashes))
    }

    /// Sets the salt prepended to every element before hashing (default: empty).
    ///
    /// Filters with different salts map the same element to different bits. They can still be
    /// combined, but the result only answers correctly for elements hashed with its own salt.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomset::bloom::BloomFilterBuilder;
    /// let filter = BloomFilterBuilder::with_size(20, 2)
    ///     .salt("tenant-a")
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(filter.salt(), "tenant-a");
    /// ```
    pub fn salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = salt.into();
        self
    }

    /// Builds an empty Bloom filter.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument) if
    /// neither `with_size()` nor `with_accuracy()` was used, or the parameters are out of range.
    pub fn build(self) -> Result<BloomFilter, Error> {
        let (Some(size), Some(num_hashes)) = (self.size, self.num_hashes) else {
            return Err(Error::invalid_argument(
                "must call with_size() or with_accuracy() before build()",
            ));
        };
        Self::validate_params(size, num_hashes)?;

        Ok(BloomFilter::new(size, num_hashes, self.salt))
    }

    // ========================================================================
    // Static Suggestion Methods
    // ========================================================================

    /// Suggests optimal number of bits given max items and target FPP.
    ///
    /// Formula: `m = -n * ln(p) / (ln(2)^2)`, rounded up to a multiple of 64 and clamped to the
    /// supported filter sizes.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomset::bloom::BloomFilterBuilder;
    /// let bits = BloomFilterBuilder::suggest_num_bits(1000, 0.01);
    /// assert!(bits > 9000 && bits < 10000); // ~9585 bits
    /// ```
    pub fn suggest_num_bits(max_items: u64, fpp: f64) -> u64 {
        // MAX_NUM_BITS is a multiple of 64, so rounding up after the clamp cannot overflow
        let bits = required_bits(max_items, fpp).min(MAX_NUM_BITS as f64) as u64;
        let bits = bits.div_ceil(64) * 64;

        bits.clamp(MIN_SUGGESTED_BITS, MAX_NUM_BITS)
    }

    /// Suggests optimal number of hash functions given max items and bit count.
    ///
    /// Formula: `k = (m/n) * ln(2)`
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomset::bloom::BloomFilterBuilder;
    /// let hashes = BloomFilterBuilder::suggest_num_hashes_from_accuracy(1000, 10000);
    /// assert_eq!(hashes, 7); // optimal k ≈ 6.93
    /// ```
    pub fn suggest_num_hashes_from_accuracy(max_items: u64, num_bits: u64) -> u16 {
        let m = num_bits as f64;
        let n = max_items as f64;

        let k = (m / n * std::f64::consts::LN_2).round();
        (k as u16).clamp(1, MAX_SUGGESTED_HASHES)
    }

    fn validate_params(size: u64, num_hashes: u16) -> Result<(), Error> {
        if size == 0 || size > MAX_NUM_BITS {
            return Err(Error::invalid_argument(format!(
                "size must be in [1, {MAX_NUM_BITS}]"
            ))
            .with_context("size", size));
        }
        if num_hashes == 0 {
            return Err(Error::invalid_argument("num_hashes must be at least 1")
                .with_context("num_hashes", num_hashes));
        }
        Ok(())
    }
}

/// Unrounded `-n * ln(p) / (ln(2)^2)`.
fn required_bits(max_items: u64, fpp: f64) -> f64 {
    let n = max_items as f64;
    let ln2_squared = std::f64::consts::LN_2 * std::f64::consts::LN_2;
    (-n * fpp.ln() / ln2_squared).ceil()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_builder_with_size() {
        let filter = BloomFilterBuilder::with_size(20, 2).build().unwrap();
        assert_eq!(filter.size(), 20);
        assert_eq!(filter.num_hashes(), 2);
        assert_eq!(filter.salt(), "");
        assert!(filter.is_empty());
        assert_eq!(filter.bits().to_vec(), vec![0; 20]);
    }

    #[test]
    fn test_builder_with_accuracy() {
        let filter = BloomFilterBuilder::with_accuracy(1000, 0.01)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(filter.size(), 9600);
        assert_eq!(filter.num_hashes(), 7);
    }

    #[test]
    fn test_builder_default_requires_size() {
        let err = BloomFilterBuilder::default().build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_builder_rejects_zero_parameters() {
        let err = BloomFilterBuilder::with_size(0, 2).build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.context("size"), Some("0"));

        let err = BloomFilterBuilder::with_size(20, 0).build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.context("num_hashes"), Some("0"));

        let err = BloomFilterBuilder::with_size(MAX_NUM_BITS + 1, 1)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_builder_rejects_bad_accuracy() {
        for (max_items, fpp) in [(0, 0.01), (10, 0.0), (10, 1.0), (10, -0.5), (10, f64::NAN)] {
            let err = BloomFilterBuilder::with_accuracy(max_items, fpp).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
    }

    #[test]
    fn test_builder_rejects_accuracy_beyond_max_size() {
        for (max_items, fpp) in [(u64::MAX, 0.5), (1_000_000_000_000_000_000, 1e-10)] {
            let err = BloomFilterBuilder::with_accuracy(max_items, fpp).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
            assert_eq!(err.context("max_items"), Some(max_items.to_string().as_str()));
        }

        // near the limit the target is still accepted
        assert!(BloomFilterBuilder::with_accuracy(3_000_000_000, 0.01).is_ok());
        let bits = BloomFilterBuilder::suggest_num_bits(3_000_000_000, 0.01);
        assert!(bits < MAX_NUM_BITS);
        assert_eq!(bits % 64, 0);
    }

    #[test]
    fn test_suggest_num_bits_saturates() {
        assert_eq!(BloomFilterBuilder::suggest_num_bits(u64::MAX, 0.5), MAX_NUM_BITS);
        assert_eq!(
            BloomFilterBuilder::suggest_num_bits(1_000_000_000_000_000_000, 1e-10),
            MAX_NUM_BITS
        );
    }

    #[test]
    fn test_suggestions_are_clamped() {
        assert_eq!(BloomFilterBuilder::suggest_num_bits(1, 0.5), 64);
        assert_eq!(BloomFilterBuilder::suggest_num_hashes_from_accuracy(1_000_000, 64), 1);
        assert_eq!(
            BloomFilterBuilder::suggest_num_hashes_from_accuracy(1, 1 << 20),
            MAX_SUGGESTED_HASHES
        );
    }
}
