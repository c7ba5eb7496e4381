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

use crate::error::Error;

/// Binary operator applied cell by cell when combining two [`BitStore`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOp {
    /// Bitwise OR, used for union.
    Or,
    /// Bitwise AND, used for intersection.
    And,
}

impl BitOp {
    fn apply(self, lhs: u64, rhs: u64) -> u64 {
        match self {
            BitOp::Or => lhs | rhs,
            BitOp::And => lhs & rhs,
        }
    }
}

/// A fixed-length array of single-bit cells.
///
/// Cells are packed into `u64` words; bits of the last word past `len` are always zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitStore {
    /// Number of cells
    len: u64,
    /// Length = ceil(len / 64)
    words: Vec<u64>,
}

impl BitStore {
    /// Creates a store of `len` cells, all zero.
    pub fn new(len: u64) -> Self {
        BitStore {
            len,
            words: vec![0u64; len.div_ceil(64) as usize],
        }
    }

    /// Returns the number of cells.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns whether the store has no cells at all.
    ///
    /// This is about length, not content: a store of zero-valued cells is not empty. Use
    /// [`popcount()`](Self::popcount) to test for set cells.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Sets the cell at `index` to 1. Setting an already set cell is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::IndexOutOfRange`](crate::error::ErrorKind::IndexOutOfRange) if
    /// `index >= len`.
    pub fn set(&mut self, index: u64) -> Result<(), Error> {
        self.check_index(index)?;
        self.insert(index);
        Ok(())
    }

    /// Returns the value of the cell at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::IndexOutOfRange`](crate::error::ErrorKind::IndexOutOfRange) if
    /// `index >= len`.
    pub fn get(&self, index: u64) -> Result<bool, Error> {
        self.check_index(index)?;
        Ok(self.contains(index))
    }

    /// Returns the number of cells set to 1.
    pub fn popcount(&self) -> u64 {
        self.words.iter().map(|word| u64::from(word.count_ones())).sum()
    }

    /// Returns a new store whose cell `i` is `op(self[i], other[i])`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::SizeMismatch`](crate::error::ErrorKind::SizeMismatch) if the
    /// stores have different lengths.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomset::bloom::{BitOp, BitStore};
    /// let mut a = BitStore::new(8);
    /// let mut b = BitStore::new(8);
    /// a.set(1).unwrap();
    /// b.set(1).unwrap();
    /// b.set(5).unwrap();
    ///
    /// assert_eq!(a.combine(&b, BitOp::Or).unwrap().to_vec(), [0, 1, 0, 0, 0, 1, 0, 0]);
    /// assert_eq!(a.combine(&b, BitOp::And).unwrap().to_vec(), [0, 1, 0, 0, 0, 0, 0, 0]);
    /// ```
    pub fn combine(&self, other: &BitStore, op: BitOp) -> Result<BitStore, Error> {
        if self.len != other.len {
            return Err(Error::size_mismatch(self.len, other.len));
        }

        let words = self
            .words
            .iter()
            .zip(&other.words)
            .map(|(&lhs, &rhs)| op.apply(lhs, rhs))
            .collect();
        Ok(BitStore {
            len: self.len,
            words,
        })
    }

    /// Iterates over the cells in index order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(|index| self.contains(index))
    }

    /// Returns the cells as a vector of 0 and 1.
    pub fn to_vec(&self) -> Vec<u8> {
        self.iter().map(u8::from).collect()
    }

    /// Sets a cell without the range check. Panics on an out-of-range word.
    pub(crate) fn insert(&mut self, index: u64) {
        let (word_index, mask) = locate(index);
        self.words[word_index] |= mask;
    }

    /// Reads a cell without the range check. Panics on an out-of-range word.
    pub(crate) fn contains(&self, index: u64) -> bool {
        let (word_index, mask) = locate(index);
        (self.words[word_index] & mask) != 0
    }

    fn check_index(&self, index: u64) -> Result<(), Error> {
        if index < self.len {
            Ok(())
        } else {
            Err(Error::index_out_of_range(index, self.len))
        }
    }
}

fn locate(index: u64) -> (usize, u64) {
    let word_index = (index / 64) as usize;
    let bit_offset = index % 64;
    (word_index, 1u64 << bit_offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_new_is_all_zero() {
        let store = BitStore::new(130);
        assert_eq!(store.len(), 130);
        assert_eq!(store.words.len(), 3);
        assert_eq!(store.popcount(), 0);
        assert!(store.iter().all(|cell| !cell));
    }

    #[test]
    fn test_set_and_get() {
        let mut store = BitStore::new(70);
        store.set(0).unwrap();
        store.set(63).unwrap();
        store.set(64).unwrap();
        store.set(69).unwrap();
        store.set(69).unwrap();

        assert!(store.get(0).unwrap());
        assert!(!store.get(1).unwrap());
        assert!(store.get(63).unwrap());
        assert!(store.get(64).unwrap());
        assert!(store.get(69).unwrap());
        assert_eq!(store.popcount(), 4);
    }

    #[test]
    fn test_out_of_range() {
        let mut store = BitStore::new(20);
        let err = store.set(20).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexOutOfRange);
        assert_eq!(err.context("index"), Some("20"));

        let err = store.get(64).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexOutOfRange);
        assert_eq!(store.popcount(), 0);
    }

    #[test]
    fn test_combine_or_and() {
        let mut a = BitStore::new(100);
        let mut b = BitStore::new(100);
        for index in [1, 3, 64, 99] {
            a.set(index).unwrap();
        }
        for index in [3, 50, 99] {
            b.set(index).unwrap();
        }

        let or = a.combine(&b, BitOp::Or).unwrap();
        let and = a.combine(&b, BitOp::And).unwrap();
        assert_eq!(or.popcount(), 5);
        assert_eq!(and.popcount(), 2);
        for index in 0..100 {
            let (x, y) = (a.get(index).unwrap(), b.get(index).unwrap());
            assert_eq!(or.get(index).unwrap(), x || y);
            assert_eq!(and.get(index).unwrap(), x && y);
        }

        // inputs are untouched
        assert_eq!(a.popcount(), 4);
        assert_eq!(b.popcount(), 3);
    }

    #[test]
    fn test_combine_size_mismatch() {
        let a = BitStore::new(20);
        let b = BitStore::new(21);
        let err = a.combine(&b, BitOp::Or).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SizeMismatch);
    }

    #[test]
    fn test_is_empty_is_about_length() {
        assert!(BitStore::new(0).is_empty());
        let store = BitStore::new(8);
        assert!(!store.is_empty());
        assert_eq!(store.popcount(), 0);
    }

    #[test]
    fn test_to_vec() {
        let mut store = BitStore::new(5);
        store.set(1).unwrap();
        store.set(4).unwrap();
        assert_eq!(store.to_vec(), vec![0, 1, 0, 0, 1]);
    }
}
