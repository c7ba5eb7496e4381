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

use std::sync::PoisonError;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use crate::bloom::BloomFilter;
use crate::error::Error;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// A [`BloomFilter`] guarded by a read-write lock, for use from several threads.
///
/// `add` takes the write lock; every other operation takes the read lock. Union and
/// intersection lock both operands in ascending [`id()`](Self::id) order, so two threads
/// combining the same pair of filters in opposite directions cannot deadlock.
///
/// A poisoned lock is recovered: every operation leaves the bit array in a valid state.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
///
/// use bloomset::bloom::BloomFilterBuilder;
/// use bloomset::bloom::SharedBloomFilter;
///
/// let filter = Arc::new(SharedBloomFilter::new(
///     BloomFilterBuilder::with_size(1024, 3).build().unwrap(),
/// ));
///
/// let handles: Vec<_> = (0..4)
///     .map(|t| {
///         let filter = Arc::clone(&filter);
///         thread::spawn(move || filter.add(&format!("item-{t}")))
///     })
///     .collect();
/// for handle in handles {
///     handle.join().unwrap();
/// }
///
/// assert!((0..4).all(|t| filter.lookup(&format!("item-{t}"))));
/// ```
#[derive(Debug)]
pub struct SharedBloomFilter {
    id: u64,
    inner: RwLock<BloomFilter>,
}

impl SharedBloomFilter {
    /// Wraps a filter for shared use.
    pub fn new(filter: BloomFilter) -> Self {
        SharedBloomFilter {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            inner: RwLock::new(filter),
        }
    }

    /// Returns the identity used to order lock acquisition.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Adds an element under the write lock.
    pub fn add(&self, element: &str) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add(element);
    }

    /// Tests and adds an element under a single write lock.
    pub fn contains_and_add(&self, element: &str) -> bool {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_and_add(element)
    }

    /// Tests whether an element is possibly in the set, under the read lock.
    pub fn lookup(&self, element: &str) -> bool {
        self.read().lookup(element)
    }

    /// Estimates the number of distinct elements added, under the read lock.
    pub fn estimate_cardinality(&self) -> f64 {
        self.read().estimate_cardinality()
    }

    /// Returns a copy of the current filter.
    pub fn snapshot(&self) -> BloomFilter {
        self.read().clone()
    }

    /// Unwraps the filter.
    pub fn into_inner(self) -> BloomFilter {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the union of both filters as a new, unshared filter.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::IncompatibleFilters`](crate::error::ErrorKind::IncompatibleFilters)
    /// if the filters differ in size or number of hashes.
    pub fn union(&self, other: &SharedBloomFilter) -> Result<BloomFilter, Error> {
        self.with_both(other, BloomFilter::union)
    }

    /// Returns the intersection of both filters as a new, unshared filter.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::IncompatibleFilters`](crate::error::ErrorKind::IncompatibleFilters)
    /// if the filters differ in size or number of hashes.
    pub fn intersection(&self, other: &SharedBloomFilter) -> Result<BloomFilter, Error> {
        self.with_both(other, BloomFilter::intersection)
    }

    fn read(&self) -> RwLockReadGuard<'_, BloomFilter> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f(self, other)` holding read locks on both, acquired in ascending id order.
    fn with_both<R>(
        &self,
        other: &SharedBloomFilter,
        f: impl FnOnce(&BloomFilter, &BloomFilter) -> R,
    ) -> R {
        if self.id == other.id {
            let guard = self.read();
            return f(&*guard, &*guard);
        }

        let (mine, theirs) = if self.id < other.id {
            let mine = self.read();
            (mine, other.read())
        } else {
            let theirs = other.read();
            (self.read(), theirs)
        };
        f(&*mine, &*theirs)
    }
}

impl From<BloomFilter> for SharedBloomFilter {
    fn from(filter: BloomFilter) -> Self {
        SharedBloomFilter::new(filter)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::bloom::BloomFilterBuilder;

    fn shared(size: u64, num_hashes: u16) -> SharedBloomFilter {
        BloomFilterBuilder::with_size(size, num_hashes)
            .build()
            .unwrap()
            .into()
    }

    #[test]
    fn test_ids_are_unique() {
        let a = shared(20, 2);
        let b = shared(20, 2);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_self_union() {
        let a = shared(64, 2);
        a.add("x");
        let union = a.union(&a).unwrap();
        assert_eq!(union, a.snapshot());
    }

    #[test]
    fn test_opposite_order_combines_do_not_deadlock() {
        let a = Arc::new(shared(256, 3));
        let b = Arc::new(shared(256, 3));
        a.add("a");
        b.add("b");

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let (a, b) = (Arc::clone(&a), Arc::clone(&b));
                thread::spawn(move || {
                    for i in 0..200 {
                        let union = if t % 2 == 0 { a.union(&b) } else { b.union(&a) };
                        assert!(union.unwrap().lookup("b"));
                        if i % 10 == 0 {
                            a.add(&format!("a-{t}-{i}"));
                            b.add(&format!("b-{t}-{i}"));
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(a.lookup("a-7-190"));
        assert!(b.lookup("b-0-0"));
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let filter = Arc::new(shared(64, 2));
        filter.add("before");

        let poisoner = Arc::clone(&filter);
        let _ = thread::spawn(move || {
            let _guard = poisoner.inner.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(filter.inner.is_poisoned());
        filter.add("after");
        assert!(filter.lookup("before"));
        assert!(filter.lookup("after"));
    }
}
