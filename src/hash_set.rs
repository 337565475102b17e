use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::iter::FusedIterator;

use crate::DefaultHashBuilder;
use crate::callbacks::SharedCallbacks;
use crate::config::TableConfig;
use crate::error::Result;
use crate::error::Status;
use crate::hash_table;
use crate::hash_table::Cursor;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;

/// A hash set implemented using the Robin Hood [`HashTable`] as the
/// underlying storage.
///
/// `HashSet<T, S>` stores values of type `T` where `T` implements
/// `Hash + Eq` and uses a configurable hasher builder `S` to hash values.
#[derive(Clone)]
pub struct HashSet<T, S = DefaultHashBuilder> {
    table: HashTable<T>,
    hash_builder: S,
}

impl<T, S> PartialEq for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.table.equals(
            &other.table,
            |v| self.hash_builder.hash_one(v),
            |v| other.hash_builder.hash_one(v),
            |a, b| a == b,
            |_, _| true,
        )
    }
}

impl<T, S> Eq for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
}

impl<T, S> Debug for HashSet<T, S>
where
    T: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.table.iter()).finish()
    }
}

impl<T, S> Default for HashSet<T, S>
where
    S: Default,
{
    fn default() -> Self {
        Self {
            table: HashTable::default(),
            hash_builder: S::default(),
        }
    }
}

impl<T, S> HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates an empty set able to hold `capacity` values at `load` before
    /// growing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_hash::HashSet;
    ///
    /// let set: HashSet<i32> = HashSet::new(53, 0.8).unwrap();
    /// assert_eq!(set.capacity(), 97);
    /// assert!(HashSet::<i32>::new(53, 1.2).is_err());
    /// # }
    /// ```
    pub fn new(capacity: usize, load: f64) -> Result<Self> {
        Self::with_config(TableConfig::new().with_capacity(capacity).with_load(load))
    }

    /// Creates an empty set from a [`TableConfig`].
    pub fn with_config(config: TableConfig) -> Result<Self> {
        Self::with_config_and_hasher(config, S::default())
    }
}

impl<T, S> HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty set with the default configuration and the given
    /// hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(feature = "std")]
    /// # {
    /// use std::collections::hash_map::RandomState;
    ///
    /// use robin_hash::HashSet;
    ///
    /// let set: HashSet<i32, _> = HashSet::with_hasher(RandomState::new());
    /// assert!(set.is_empty());
    /// # }
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: HashTable::default(),
            hash_builder,
        }
    }

    /// Creates an empty set from a [`TableConfig`] and a hasher builder.
    pub fn with_config_and_hasher(config: TableConfig, hash_builder: S) -> Result<Self> {
        Ok(Self {
            table: HashTable::with_config(config)?,
            hash_builder,
        })
    }

    /// Returns the number of values in the set.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no values.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns `true` if inserting one more value would grow the set.
    pub fn is_full(&self) -> bool {
        self.table.is_full()
    }

    /// Returns the number of slots in the backing table.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the load factor.
    pub fn load(&self) -> f64 {
        self.table.load()
    }

    /// Returns the status recorded by the most recent operation.
    pub fn flag(&self) -> Status {
        self.table.flag()
    }

    /// Returns a reference to the set's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Replaces the hooks notified after successful operations.
    pub fn customize(&mut self, callbacks: Option<SharedCallbacks>) {
        self.table.customize(callbacks);
    }

    /// Removes every value, keeping the capacity.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Adds a value to the set.
    ///
    /// Returns `Ok(false)`, recording [`Status::Duplicate`], if an equal value
    /// is already present; the stored value is left untouched.
    ///
    /// # Errors
    ///
    /// Fails only if the set had to grow and could not.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_hash::HashSet;
    /// use robin_hash::Status;
    ///
    /// let mut set: HashSet<i32> = HashSet::default();
    /// assert_eq!(set.insert(1), Ok(true));
    /// assert_eq!(set.insert(1), Ok(false));
    /// assert_eq!(set.flag(), Status::Duplicate);
    /// assert_eq!(set.len(), 1);
    /// # }
    /// ```
    pub fn insert(&mut self, value: T) -> Result<bool> {
        let hash = self.hash_builder.hash_one(&value);
        let hash_builder = &self.hash_builder;
        match self
            .table
            .entry(hash, |v| v == &value, |v| hash_builder.hash_one(v))?
        {
            TableEntry::Occupied(_) => {
                self.table.set_flag(Status::Duplicate);
                Ok(false)
            }
            TableEntry::Vacant(entry) => {
                entry.insert(value);
                Ok(true)
            }
        }
    }

    /// Inserts every value from `iter`, stopping at the first failed
    /// insertion. Values already present are skipped.
    ///
    /// Values inserted before the failure stay in the set.
    pub fn try_extend<I: IntoIterator<Item = T>>(&mut self, iter: I) -> Result<()> {
        for value in iter {
            self.insert(value)?;
        }
        Ok(())
    }

    /// Returns `true` if the set contains the value.
    pub fn contains(&self, value: &T) -> bool {
        let hash = self.hash_builder.hash_one(value);
        self.table.contains(hash, |v| v == value)
    }

    /// Returns a reference to the stored value equal to `value`.
    pub fn get(&self, value: &T) -> Option<&T> {
        let hash = self.hash_builder.hash_one(value);
        self.table.find(hash, |v| v == value)
    }

    /// Removes the value equal to `value` and returns it.
    ///
    /// # Errors
    ///
    /// [`TableError::Empty`](crate::TableError::Empty) on an empty set,
    /// [`TableError::NotFound`](crate::TableError::NotFound) if the
    /// value is absent.
    pub fn remove(&mut self, value: &T) -> Result<T> {
        let hash = self.hash_builder.hash_one(value);
        self.table.remove(hash, |v| v == value)
    }

    /// Keeps only the values for which `f` returns `true`.
    pub fn retain(&mut self, f: impl FnMut(&T) -> bool) {
        self.table.retain(f);
    }

    /// Grows the backing table so that it can hold `capacity` values.
    ///
    /// See [`HashTable::resize`].
    pub fn resize(&mut self, capacity: usize) -> Result<()> {
        let hash_builder = &self.hash_builder;
        self.table.resize(capacity, |v| hash_builder.hash_one(v))
    }

    /// Builds an independent copy with a freshly laid out table.
    pub fn copy_of(&self) -> Result<Self>
    where
        T: Clone,
        S: Clone,
    {
        Ok(Self {
            table: self.table.copy_of(|v| self.hash_builder.hash_one(v))?,
            hash_builder: self.hash_builder.clone(),
        })
    }

    /// Returns the greatest value.
    ///
    /// # Errors
    ///
    /// [`TableError::Empty`](crate::TableError::Empty) on an empty set.
    pub fn max(&self) -> Result<&T>
    where
        T: Ord,
    {
        self.table.max_by(T::cmp)
    }

    /// Returns the least value.
    ///
    /// # Errors
    ///
    /// [`TableError::Empty`](crate::TableError::Empty) on an empty set.
    pub fn min(&self) -> Result<&T>
    where
        T: Ord,
    {
        self.table.min_by(T::cmp)
    }

    /// Returns an iterator over the values in slot order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns a bidirectional cursor positioned at the first value.
    pub fn cursor(&self) -> Cursor<'_, T> {
        self.table.cursor()
    }

    /// Returns a bidirectional cursor positioned at the last value.
    pub fn cursor_end(&self) -> Cursor<'_, T> {
        self.table.cursor_end()
    }

    /// Returns probe-distance statistics for the backing table.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_stats(&self) -> hash_table::ProbeStats {
        self.table.probe_stats()
    }

    fn holds(&self, value: &T) -> bool {
        let hash = self.hash_builder.hash_one(value);
        self.table.peek(hash, |v| v == value).is_some()
    }

    /// Returns `true` if the sets have no values in common.
    pub fn is_disjoint(&self, other: &HashSet<T, S>) -> bool {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.iter().all(|v| !large.holds(v))
    }

    /// Returns `true` if every value of `self` is in `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_hash::HashSet;
    ///
    /// let sup: HashSet<i32> = [1, 2, 3].into_iter().collect();
    /// let sub: HashSet<i32> = [2, 3].into_iter().collect();
    /// assert!(sub.is_subset(&sup));
    /// assert!(sup.is_superset(&sub));
    /// assert!(!sup.is_subset(&sub));
    /// # }
    /// ```
    pub fn is_subset(&self, other: &HashSet<T, S>) -> bool {
        if self.len() > other.len() {
            return false;
        }
        self.iter().all(|v| other.holds(v))
    }

    /// Returns `true` if every value of `other` is in `self`.
    pub fn is_superset(&self, other: &HashSet<T, S>) -> bool {
        other.is_subset(self)
    }

    /// Visits the values in `self` or `other`, without duplicates.
    pub fn union<'a>(&'a self, other: &'a HashSet<T, S>) -> Union<'a, T, S> {
        Union {
            iter: self.iter(),
            other_iter: other.iter(),
            set: self,
        }
    }

    /// Visits the values in both `self` and `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_hash::HashSet;
    ///
    /// let a: HashSet<i32> = [1, 2, 3].into_iter().collect();
    /// let b: HashSet<i32> = [2, 3, 4].into_iter().collect();
    /// let mut common: Vec<_> = a.intersection(&b).copied().collect();
    /// common.sort();
    /// assert_eq!(common, vec![2, 3]);
    /// # }
    /// ```
    pub fn intersection<'a>(&'a self, other: &'a HashSet<T, S>) -> Intersection<'a, T, S> {
        Intersection {
            iter: self.iter(),
            other,
        }
    }

    /// Visits the values in `self` but not in `other`.
    pub fn difference<'a>(&'a self, other: &'a HashSet<T, S>) -> Difference<'a, T, S> {
        Difference {
            iter: self.iter(),
            other,
        }
    }

    /// Visits the values in exactly one of `self` and `other`.
    pub fn symmetric_difference<'a>(
        &'a self,
        other: &'a HashSet<T, S>,
    ) -> SymmetricDifference<'a, T, S> {
        SymmetricDifference {
            left: self.difference(other),
            right: other.difference(self),
        }
    }
}

/// An iterator over the values of a [`HashSet`].
pub struct Iter<'a, T> {
    inner: hash_table::Iter<'a, T>,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

/// An owning iterator over the values of a [`HashSet`].
pub struct IntoIter<T> {
    inner: hash_table::IntoIter<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

/// An iterator over the union of two sets.
pub struct Union<'a, T, S> {
    iter: Iter<'a, T>,
    other_iter: Iter<'a, T>,
    set: &'a HashSet<T, S>,
}

impl<'a, T, S> Iterator for Union<'a, T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(v) = self.iter.next() {
            return Some(v);
        }
        loop {
            let v = self.other_iter.next()?;
            if !self.set.holds(v) {
                return Some(v);
            }
        }
    }
}

/// An iterator over the intersection of two sets.
pub struct Intersection<'a, T, S> {
    iter: Iter<'a, T>,
    other: &'a HashSet<T, S>,
}

impl<'a, T, S> Iterator for Intersection<'a, T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let v = self.iter.next()?;
            if self.other.holds(v) {
                return Some(v);
            }
        }
    }
}

/// An iterator over the difference of two sets.
pub struct Difference<'a, T, S> {
    iter: Iter<'a, T>,
    other: &'a HashSet<T, S>,
}

impl<'a, T, S> Iterator for Difference<'a, T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let v = self.iter.next()?;
            if !self.other.holds(v) {
                return Some(v);
            }
        }
    }
}

/// An iterator over the symmetric difference of two sets.
pub struct SymmetricDifference<'a, T, S> {
    left: Difference<'a, T, S>,
    right: Difference<'a, T, S>,
}

impl<'a, T, S> Iterator for SymmetricDifference<'a, T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.left.next().or_else(|| self.right.next())
    }
}

impl<T, S> IntoIterator for HashSet<T, S> {
    type IntoIter = IntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, T, S> IntoIterator for &'a HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, S> FromIterator<T> for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = HashSet::default();
        set.extend(iter);
        set
    }
}

impl<T, S> Extend<T> for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// # Panics
    ///
    /// Panics if the set cannot grow to hold the new values. Use
    /// [`HashSet::try_extend`] to handle the error instead.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        if let Err(err) = self.try_extend(iter) {
            panic!("failed to extend set: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::hash::BuildHasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;
    use crate::callbacks::recorder::Recorder;
    use crate::error::TableError;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k1: rng.try_next_u64().unwrap_or(0),
                k2: rng.try_next_u64().unwrap_or(0),
            }
        }
    }

    type TestSet<T> = HashSet<T, SipHashBuilder>;

    fn sorted(iter: impl IntoIterator<Item = i32>) -> Vec<i32> {
        let mut v: Vec<i32> = iter.into_iter().collect();
        v.sort_unstable();
        v
    }

    #[test]
    fn test_new_rejects_bad_config() {
        assert!(matches!(TestSet::<i32>::new(0, 0.5), Err(TableError::Invalid(_))));
        assert!(matches!(TestSet::<i32>::new(10, 0.0), Err(TableError::Invalid(_))));
        assert!(TestSet::<i32>::new(10, 0.99).is_ok());
    }

    #[test]
    fn test_insert_contains_remove() {
        let mut set = TestSet::new(53, 0.8).unwrap();
        for i in 1..=42 {
            assert_eq!(set.insert(i), Ok(true));
        }
        assert_eq!(set.capacity(), 97);
        assert_eq!(set.len(), 42);
        assert!(set.contains(&1));
        assert!(!set.contains(&43));
        assert_eq!(set.flag(), Status::NotFound);

        assert_eq!(set.remove(&7), Ok(7));
        assert_eq!(set.remove(&7), Err(TableError::NotFound));
        assert_eq!(set.len(), 41);
        assert_eq!(set.get(&8), Some(&8));
    }

    #[test]
    fn test_reinsert_after_remove_keeps_capacity() {
        let mut set = TestSet::new(13, 0.75).unwrap();
        for i in 1..=10 {
            set.insert(i).unwrap();
        }
        let capacity = set.capacity();
        set.remove(&5).unwrap();
        assert_eq!(set.len(), 9);
        assert_eq!(set.insert(5), Ok(true));
        assert_eq!(set.len(), 10);
        assert_eq!(set.capacity(), capacity);
    }

    #[test]
    fn test_duplicate_insert() {
        let mut set: TestSet<&str> = TestSet::default();
        assert_eq!(set.insert("a"), Ok(true));
        assert_eq!(set.insert("a"), Ok(false));
        assert_eq!(set.flag(), Status::Duplicate);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_growth_keeps_every_value() {
        let mut set: TestSet<i32> = TestSet::default();
        for i in 0..5_000 {
            set.insert(i).unwrap();
        }
        assert_eq!(set.len(), 5_000);
        assert!(set.len() as f64 <= set.capacity() as f64 * set.load());
        assert!((0..5_000).all(|i| set.contains(&i)));
        set.table
            .assert_layout(|v| set.hash_builder.hash_one(v));
    }

    #[test]
    fn test_max_min() {
        let mut set: TestSet<i32> = TestSet::default();
        assert_eq!(set.max(), Err(TableError::Empty));
        set.extend([4, -2, 9, 0]);
        assert_eq!(set.max(), Ok(&9));
        assert_eq!(set.min(), Ok(&-2));
    }

    #[test]
    fn test_equality() {
        let a: TestSet<i32> = (0..100).collect();
        let mut b = TestSet::with_config(TableConfig::new().with_capacity(1_000)).unwrap();
        b.extend((0..100).rev());
        assert_eq!(a, b);
        assert_eq!(b, a);

        b.remove(&50).unwrap();
        assert_ne!(a, b);
        b.insert(500).unwrap();
        assert_ne!(a, b);
    }

    #[cfg(any(feature = "std", feature = "foldhash"))]
    #[test]
    fn test_equality_with_default_hash_builders() {
        let a: HashSet<u64> = (0..100).collect();
        let mut b: HashSet<u64> = HashSet::new(500, 0.5).unwrap();
        b.extend((0..100).rev());
        assert_eq!(a, b);
        assert_eq!(b, a);

        b.remove(&0).unwrap();
        b.insert(100).unwrap();
        assert_ne!(a, b);
        assert_ne!(b, a);
    }

    #[test]
    fn test_try_extend() {
        let mut set: TestSet<i32> = TestSet::new(1, 0.5).unwrap();
        assert_eq!(set.try_extend([3, 1, 3, 2]), Ok(()));
        assert_eq!(set.len(), 3);

        set.try_extend(0..500).unwrap();
        assert_eq!(set.len(), 500);
        assert!((0..500).all(|v| set.contains(&v)));
    }

    #[test]
    fn test_copy_of() {
        let mut set: TestSet<i32> = (0..30).collect();
        set.remove(&3).unwrap();
        let copy = set.copy_of().unwrap();
        assert_eq!(copy, set);
        assert_eq!(copy.capacity(), set.capacity());
        assert_eq!(copy.table.tombstones(), 0);
    }

    #[test]
    fn test_resize() {
        let mut set: TestSet<i32> = (0..10).collect();
        set.resize(1_000).unwrap();
        assert_eq!(set.capacity(), 1_531);
        assert!((0..10).all(|i| set.contains(&i)));
        assert_eq!(set.resize(usize::MAX), Err(TableError::Overflow(usize::MAX)));
    }

    #[test]
    fn test_set_algebra() {
        let a: TestSet<i32> = [1, 2, 3, 4].into_iter().collect();
        let b: TestSet<i32> = [3, 4, 5].into_iter().collect();

        assert_eq!(sorted(a.union(&b).copied()), vec![1, 2, 3, 4, 5]);
        assert_eq!(sorted(a.intersection(&b).copied()), vec![3, 4]);
        assert_eq!(sorted(a.difference(&b).copied()), vec![1, 2]);
        assert_eq!(sorted(b.difference(&a).copied()), vec![5]);
        assert_eq!(sorted(a.symmetric_difference(&b).copied()), vec![1, 2, 5]);
    }

    #[test]
    fn test_set_predicates() {
        let a: TestSet<i32> = [1, 2, 3].into_iter().collect();
        let b: TestSet<i32> = [1, 2].into_iter().collect();
        let c: TestSet<i32> = [7, 8].into_iter().collect();

        assert!(b.is_subset(&a));
        assert!(!a.is_subset(&b));
        assert!(a.is_superset(&b));
        assert!(a.is_disjoint(&c));
        assert!(!a.is_disjoint(&b));
        assert!(TestSet::<i32>::default().is_subset(&c));
    }

    #[test]
    fn test_retain_and_clear() {
        let mut set: TestSet<i32> = (0..50).collect();
        set.retain(|v| v % 5 == 0);
        assert_eq!(sorted(set.iter().copied()), vec![0, 5, 10, 15, 20, 25, 30, 35, 40, 45]);
        let capacity = set.capacity();
        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.capacity(), capacity);
    }

    #[test]
    fn test_iteration_and_cursor_agree() {
        let set: TestSet<i32> = (0..40).collect();
        let from_iter: Vec<i32> = set.iter().copied().collect();

        let mut from_cursor = vec![];
        let mut cursor = set.cursor();
        while !cursor.at_end() {
            from_cursor.push(*cursor.get().unwrap());
            cursor.move_next();
        }
        assert_eq!(from_iter, from_cursor);
        assert_eq!(sorted(set.into_iter()), (0..40).collect::<Vec<_>>());
    }

    #[test]
    fn test_callbacks() {
        let recorder = Arc::new(Recorder::default());
        let mut set: TestSet<i32> = TestSet::default();
        set.customize(Some(recorder.clone()));
        set.insert(1).unwrap();
        set.insert(1).unwrap();
        assert!(set.contains(&1));
        set.remove(&1).unwrap();
        assert_eq!(recorder.counts(), [1, 1, 0, 1, 0]);
    }
}
