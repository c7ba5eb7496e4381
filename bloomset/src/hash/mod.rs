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

//! Salted SHA-1 probe hashing.
//!
//! Every probe `i` of an element hashes the string `salt + element + i` (with `i` written in
//! decimal) with SHA-1, reads the 160-bit digest as an unsigned big-endian integer and reduces
//! it modulo the number of bits in the filter.
//!
//! Filters that are meant to be combined must use the same probe hashing, otherwise the same
//! element would map to different bits in each of them.

use sha1::Digest;
use sha1::Sha1;

/// Derives the bit indices probed for an element.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ProbeHasher<'a> {
    salt: &'a str,
    modulus: u64,
}

impl<'a> ProbeHasher<'a> {
    /// # Panics
    ///
    /// Panics if `modulus` is 0.
    pub(crate) fn new(salt: &'a str, modulus: u64) -> Self {
        assert!(modulus > 0, "modulus must be greater than 0");
        ProbeHasher { salt, modulus }
    }

    /// Returns the bit index for probe number `probe` of `element`, in `[0, modulus)`.
    pub(crate) fn index(&self, element: &str, probe: u16) -> u64 {
        let mut hasher = Sha1::new();
        hasher.update(self.salt.as_bytes());
        hasher.update(element.as_bytes());
        hasher.update(probe.to_string().as_bytes());
        reduce_be(&hasher.finalize(), self.modulus)
    }

    /// Returns the bit indices of probes `0..num_hashes` for `element`, lazily.
    pub(crate) fn indices<'e>(
        &self,
        element: &'e str,
        num_hashes: u16,
    ) -> impl Iterator<Item = u64> + use<'a, 'e> {
        let hasher = *self;
        (0..num_hashes).map(move |probe| hasher.index(element, probe))
    }
}

/// Reduces a big-endian unsigned integer modulo `modulus`.
///
/// Folds one byte at a time; the accumulator stays below `modulus`, so `acc * 256 + 255` always
/// fits in a `u128`.
fn reduce_be(bytes: &[u8], modulus: u64) -> u64 {
    let modulus = u128::from(modulus);
    let rem = bytes
        .iter()
        .fold(0u128, |acc, &byte| ((acc << 8) | u128::from(byte)) % modulus);
    rem as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_be() {
        assert_eq!(reduce_be(&[], 7), 0);
        assert_eq!(reduce_be(&[0x01, 0x00], 7), 256 % 7);
        assert_eq!(reduce_be(&[0xff; 8], u64::MAX), 0);
        assert_eq!(reduce_be(&[0x12, 0x34, 0x56], 1), 0);

        let n: u128 = 0x0123_4567_89ab_cdef_0011_2233;
        let bytes = &n.to_be_bytes()[4..];
        assert_eq!(reduce_be(bytes, 1_000_003), (n % 1_000_003) as u64);
    }

    #[test]
    fn test_full_digest_reduction() {
        // sha1("Iced Coffee0") = e5b5a92990848be8672fb927bb470533f8ba1e7f
        let digest = Sha1::digest(b"Iced Coffee0");
        assert_eq!(digest[0], 0xe5);
        assert_eq!(digest[19], 0x7f);
        assert_eq!(reduce_be(&digest, 20), 11);
        assert_eq!(reduce_be(&digest, u64::MAX - 58), 707997489841766611);
    }

    #[test]
    fn test_known_indices() {
        let hasher = ProbeHasher::new("", 20);
        assert_eq!(hasher.index("Iced Coffee", 0), 11);
        assert_eq!(hasher.index("Iced Coffee", 1), 8);
        assert_eq!(hasher.index("Iced Coffee", 2), 0);
        assert_eq!(hasher.indices("", 3).collect::<Vec<_>>(), vec![8, 3, 16]);
        assert_eq!(hasher.indices("Americano", 3).collect::<Vec<_>>(), vec![11, 16, 18]);

        let hasher = ProbeHasher::new("", 1000);
        assert_eq!(hasher.indices("Iced Coffee", 2).collect::<Vec<_>>(), vec![231, 108]);
    }

    #[test]
    fn test_salt_is_prepended() {
        let salted = ProbeHasher::new("pepper", 20);
        assert_eq!(salted.indices("Iced Coffee", 3).collect::<Vec<_>>(), vec![6, 15, 2]);
        assert_eq!(salted.indices("", 3).collect::<Vec<_>>(), vec![5, 0, 6]);

        // "pepper" + "Iced Coffee" is the same input as "" + "pepperIced Coffee"
        let unsalted = ProbeHasher::new("", 20);
        assert_eq!(
            salted.index("Iced Coffee", 1),
            unsalted.index("pepperIced Coffee", 1)
        );
    }

    #[test]
    fn test_deterministic() {
        let hasher = ProbeHasher::new("ns", 97);
        for element in ["", "a", "Flat White", "日本語"] {
            let first: Vec<u64> = hasher.indices(element, 8).collect();
            let second: Vec<u64> = hasher.indices(element, 8).collect();
            assert_eq!(first, second);
            assert!(first.iter().all(|&index| index < 97));
        }
    }

    #[test]
    #[should_panic(expected = "modulus must be greater than 0")]
    fn test_zero_modulus_panics() {
        let _ = ProbeHasher::new("", 0);
    }
}
