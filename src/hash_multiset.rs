use core::cmp::max;
use core::cmp::min;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::iter::FusedIterator;
use core::mem;

use crate::DefaultHashBuilder;
use crate::callbacks::SharedCallbacks;
use crate::config::TableConfig;
use crate::error::Result;
use crate::error::Status;
use crate::error::TableError;
use crate::hash_table;
use crate::hash_table::Cursor;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;

/// A hash multiset implemented using the Robin Hood [`HashTable`] as the
/// underlying storage.
///
/// Each distinct value occupies one slot together with its multiplicity.
/// [`HashMultiset::len`] counts distinct values while
/// [`HashMultiset::cardinality`] counts every occurrence.
///
/// # Examples
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use robin_hash::HashMultiset;
///
/// let mut bag: HashMultiset<&str> = HashMultiset::default();
/// bag.insert("apple").unwrap();
/// bag.insert_many("pear", 3).unwrap();
/// bag.insert("apple").unwrap();
///
/// assert_eq!(bag.len(), 2);
/// assert_eq!(bag.cardinality(), 5);
/// assert_eq!(bag.multiplicity_of(&"pear"), 3);
///
/// assert_eq!(bag.remove(&"pear"), Ok(2));
/// assert_eq!(bag.remove_all(&"apple"), 2);
/// assert_eq!(bag.cardinality(), 2);
/// # }
/// ```
#[derive(Clone)]
pub struct HashMultiset<T, S = DefaultHashBuilder> {
    table: HashTable<(T, usize)>,
    cardinality: usize,
    hash_builder: S,
}

impl<T, S> Debug for HashMultiset<T, S>
where
    T: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (value, multiplicity) in self.table.iter() {
            map.entry(value, multiplicity);
        }
        map.finish()
    }
}

impl<T, S> PartialEq for HashMultiset<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.cardinality == other.cardinality
            && self.table.equals(
                &other.table,
                |(v, _)| self.hash_builder.hash_one(v),
                |(v, _)| other.hash_builder.hash_one(v),
                |(a, _), (b, _)| a == b,
                |(_, a), (_, b)| a == b,
            )
    }
}

impl<T, S> Eq for HashMultiset<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
}

impl<T, S> Default for HashMultiset<T, S>
where
    S: Default,
{
    fn default() -> Self {
        Self {
            table: HashTable::default(),
            cardinality: 0,
            hash_builder: S::default(),
        }
    }
}

impl<T, S> HashMultiset<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates an empty multiset able to hold `capacity` distinct values at
    /// `load` before growing.
    pub fn new(capacity: usize, load: f64) -> Result<Self> {
        Self::with_config(TableConfig::new().with_capacity(capacity).with_load(load))
    }

    /// Creates an empty multiset from a [`TableConfig`].
    pub fn with_config(config: TableConfig) -> Result<Self> {
        Self::with_config_and_hasher(config, S::default())
    }
}

impl<T, S> HashMultiset<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty multiset with the default configuration and the given
    /// hasher builder.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: HashTable::default(),
            cardinality: 0,
            hash_builder,
        }
    }

    /// Creates an empty multiset from a [`TableConfig`] and a hasher builder.
    pub fn with_config_and_hasher(config: TableConfig, hash_builder: S) -> Result<Self> {
        Ok(Self {
            table: HashTable::with_config(config)?,
            cardinality: 0,
            hash_builder,
        })
    }

    /// Returns the number of distinct values.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns the total number of occurrences of all values.
    pub fn cardinality(&self) -> usize {
        self.cardinality
    }

    /// Returns `true` if the multiset contains no values.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns `true` if inserting one more distinct value would grow the
    /// multiset.
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

    /// Replaces the hooks notified after successful operations.
    pub fn customize(&mut self, callbacks: Option<SharedCallbacks>) {
        self.table.customize(callbacks);
    }

    /// Removes every value, keeping the capacity.
    pub fn clear(&mut self) {
        self.table.clear();
        self.cardinality = 0;
    }

    fn overflow(&self, count: usize) -> TableError {
        self.table.set_flag(Status::Error);
        TableError::Overflow(count)
    }

    /// Multiplicity lookup that leaves the flag alone and fires no hooks.
    fn count_of(&self, value: &T) -> usize {
        let hash = self.hash_builder.hash_one(value);
        self.table
            .peek(hash, |(v, _)| v == value)
            .map_or(0, |(_, m)| *m)
    }

    /// Adds one occurrence of `value`.
    pub fn insert(&mut self, value: T) -> Result<()> {
        self.insert_many(value, 1)
    }

    /// Adds one occurrence of every value in `iter`, stopping at the first
    /// failed insertion.
    ///
    /// Values added before the failure stay in the multiset.
    pub fn try_extend<I: IntoIterator<Item = T>>(&mut self, iter: I) -> Result<()> {
        for value in iter {
            self.insert(value)?;
        }
        Ok(())
    }

    /// Adds `count` occurrences of `value`. Adding zero occurrences succeeds
    /// without touching the multiset.
    ///
    /// A new value fires the `create` hook, an existing one `update`.
    ///
    /// # Errors
    ///
    /// [`TableError::Overflow`] if the cardinality would overflow, or an error
    /// from growing the table.
    pub fn insert_many(&mut self, value: T, count: usize) -> Result<()> {
        if count == 0 {
            self.table.set_flag(Status::Ok);
            return Ok(());
        }
        let Some(cardinality) = self.cardinality.checked_add(count) else {
            return Err(self.overflow(count));
        };

        let hash = self.hash_builder.hash_one(&value);
        let hash_builder = &self.hash_builder;
        match self
            .table
            .entry(hash, |(v, _)| v == &value, |(v, _)| hash_builder.hash_one(v))?
        {
            TableEntry::Occupied(mut entry) => entry.update(|(_, m)| *m += count),
            TableEntry::Vacant(entry) => {
                entry.insert((value, count));
            }
        }
        self.cardinality = cardinality;
        Ok(())
    }

    /// Sets the multiplicity of `value`, returning the previous one (zero if
    /// it was absent). A multiplicity of zero removes the value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_hash::HashMultiset;
    ///
    /// let mut bag: HashMultiset<char> = HashMultiset::default();
    /// assert_eq!(bag.update('x', 4), Ok(0));
    /// assert_eq!(bag.update('x', 2), Ok(4));
    /// assert_eq!(bag.cardinality(), 2);
    /// assert_eq!(bag.update('x', 0), Ok(2));
    /// assert!(bag.is_empty());
    /// # }
    /// ```
    pub fn update(&mut self, value: T, multiplicity: usize) -> Result<usize> {
        if multiplicity == 0 {
            return Ok(self.remove_all(&value));
        }
        let current = self.count_of(&value);
        let Some(cardinality) = (self.cardinality - current).checked_add(multiplicity) else {
            return Err(self.overflow(multiplicity));
        };

        let hash = self.hash_builder.hash_one(&value);
        let hash_builder = &self.hash_builder;
        let previous = match self
            .table
            .entry(hash, |(v, _)| v == &value, |(v, _)| hash_builder.hash_one(v))?
        {
            TableEntry::Occupied(mut entry) => {
                entry.update(|(_, m)| mem::replace(m, multiplicity))
            }
            TableEntry::Vacant(entry) => {
                entry.insert((value, multiplicity));
                0
            }
        };
        self.cardinality = cardinality;
        Ok(previous)
    }

    /// Removes one occurrence of `value`, returning how many remain. The value
    /// leaves the table when its last occurrence is removed.
    ///
    /// # Errors
    ///
    /// [`TableError::Empty`] on an empty multiset, [`TableError::NotFound`]
    /// if the value is absent.
    pub fn remove(&mut self, value: &T) -> Result<usize> {
        let hash = self.hash_builder.hash_one(value);
        let mut entry = self.table.find_entry(hash, |(v, _)| v == value)?;
        let remaining = if entry.get().1 > 1 {
            entry.update(|(_, m)| {
                *m -= 1;
                *m
            })
        } else {
            entry.remove();
            0
        };
        self.cardinality -= 1;
        Ok(remaining)
    }

    /// Removes every occurrence of `value`, returning how many were removed.
    ///
    /// Returns zero, recording [`Status::Empty`] or [`Status::NotFound`], if
    /// the value is absent.
    pub fn remove_all(&mut self, value: &T) -> usize {
        let hash = self.hash_builder.hash_one(value);
        match self.table.remove(hash, |(v, _)| v == value) {
            Ok((_, removed)) => {
                self.cardinality -= removed;
                removed
            }
            Err(_) => 0,
        }
    }

    /// Returns how many times `value` occurs, zero if absent.
    pub fn multiplicity_of(&self, value: &T) -> usize {
        let hash = self.hash_builder.hash_one(value);
        self.table
            .find(hash, |(v, _)| v == value)
            .map_or(0, |(_, m)| *m)
    }

    /// Returns `true` if `value` occurs at least once.
    pub fn contains(&self, value: &T) -> bool {
        self.multiplicity_of(value) > 0
    }

    /// Returns the greatest value.
    ///
    /// # Errors
    ///
    /// [`TableError::Empty`] on an empty multiset.
    pub fn max(&self) -> Result<&T>
    where
        T: Ord,
    {
        self.table
            .max_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(v, _)| v)
    }

    /// Returns the least value.
    ///
    /// # Errors
    ///
    /// [`TableError::Empty`] on an empty multiset.
    pub fn min(&self) -> Result<&T>
    where
        T: Ord,
    {
        self.table
            .min_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(v, _)| v)
    }

    /// Grows the backing table so that it can hold `capacity` distinct
    /// values.
    ///
    /// See [`HashTable::resize`].
    pub fn resize(&mut self, capacity: usize) -> Result<()> {
        let hash_builder = &self.hash_builder;
        self.table
            .resize(capacity, |(v, _)| hash_builder.hash_one(v))
    }

    /// Builds an independent copy with a freshly laid out table.
    pub fn copy_of(&self) -> Result<Self>
    where
        T: Clone,
        S: Clone,
    {
        Ok(Self {
            table: self
                .table
                .copy_of(|(v, _)| self.hash_builder.hash_one(v))?,
            cardinality: self.cardinality,
            hash_builder: self.hash_builder.clone(),
        })
    }

    /// Returns an iterator over distinct values and their multiplicities in
    /// slot order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns a bidirectional cursor positioned at the first value.
    pub fn cursor(&self) -> Cursor<'_, (T, usize)> {
        self.table.cursor()
    }

    /// Returns a bidirectional cursor positioned at the last value.
    pub fn cursor_end(&self) -> Cursor<'_, (T, usize)> {
        self.table.cursor_end()
    }

    /// Returns probe-distance statistics for the backing table.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_stats(&self) -> hash_table::ProbeStats {
        self.table.probe_stats()
    }

    /// An empty multiset shaped like `self`. Hooks are attached by
    /// [`HashMultiset::finish`] once the result is built.
    fn empty_like(&self) -> Result<Self>
    where
        S: Clone,
    {
        let config = TableConfig::new()
            .with_capacity(((self.capacity() as f64 * self.load()) as usize).max(1))
            .with_load(self.load())
            .with_deletion_mode(self.table.deletion_mode());
        Self::with_config_and_hasher(config, self.hash_builder.clone())
    }

    fn finish(mut self, source: &Self) -> Self {
        self.table.customize(source.table.callbacks().cloned());
        source.table.set_flag(Status::Ok);
        self
    }

    /// Multiset union: every value with the larger of its two
    /// multiplicities.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_hash::HashMultiset;
    ///
    /// let a: HashMultiset<char> = "aab".chars().collect();
    /// let b: HashMultiset<char> = "abbbc".chars().collect();
    ///
    /// let u = a.union(&b).unwrap();
    /// assert_eq!(u.multiplicity_of(&'a'), 2);
    /// assert_eq!(u.multiplicity_of(&'b'), 3);
    /// assert_eq!(u.multiplicity_of(&'c'), 1);
    ///
    /// let s = a.summation(&b).unwrap();
    /// assert_eq!(s.cardinality(), 8);
    /// # }
    /// ```
    pub fn union(&self, other: &Self) -> Result<Self>
    where
        T: Clone,
        S: Clone,
    {
        let mut result = self.empty_like()?;
        for (value, m1) in self.iter() {
            result.update(value.clone(), max(m1, other.count_of(value)))?;
        }
        for (value, m2) in other.iter() {
            if self.count_of(value) == 0 {
                result.update(value.clone(), m2)?;
            }
        }
        Ok(result.finish(self))
    }

    /// Multiset intersection: every common value with the smaller of its two
    /// multiplicities.
    pub fn intersection(&self, other: &Self) -> Result<Self>
    where
        T: Clone,
        S: Clone,
    {
        let (small, large) = if self.len() < other.len() {
            (self, other)
        } else {
            (other, self)
        };
        let mut result = self.empty_like()?;
        for (value, m1) in small.iter() {
            let common = min(m1, large.count_of(value));
            if common > 0 {
                result.update(value.clone(), common)?;
            }
        }
        Ok(result.finish(self))
    }

    /// Multiset difference: every value of `self` whose multiplicity exceeds
    /// the one in `other`, with the excess as multiplicity.
    pub fn difference(&self, other: &Self) -> Result<Self>
    where
        T: Clone,
        S: Clone,
    {
        let mut result = self.empty_like()?;
        for (value, m1) in self.iter() {
            let m2 = other.count_of(value);
            if m1 > m2 {
                result.update(value.clone(), m1 - m2)?;
            }
        }
        Ok(result.finish(self))
    }

    /// Multiset sum: every value with the sum of its two multiplicities.
    pub fn summation(&self, other: &Self) -> Result<Self>
    where
        T: Clone,
        S: Clone,
    {
        let mut result = self.empty_like()?;
        for (value, m) in self.iter().chain(other.iter()) {
            result.insert_many(value.clone(), m)?;
        }
        Ok(result.finish(self))
    }

    /// Multiset symmetric difference: every value whose multiplicities
    /// differ, with the absolute difference as multiplicity.
    pub fn symmetric_difference(&self, other: &Self) -> Result<Self>
    where
        T: Clone,
        S: Clone,
    {
        let mut result = self.empty_like()?;
        for (value, m1) in self.iter() {
            let m2 = other.count_of(value);
            if m1 != m2 {
                result.update(value.clone(), m1.abs_diff(m2))?;
            }
        }
        for (value, m2) in other.iter() {
            if self.count_of(value) == 0 {
                result.update(value.clone(), m2)?;
            }
        }
        Ok(result.finish(self))
    }

    /// Returns `true` if no value of `self` occurs more often than in
    /// `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        if self.len() > other.len() {
            return false;
        }
        self.iter().all(|(value, m)| m <= other.count_of(value))
    }

    /// Returns `true` if `other` is a subset of `self`.
    pub fn is_superset(&self, other: &Self) -> bool {
        other.is_subset(self)
    }

    /// Returns `true` if `self` is a subset of `other` and `other` holds at
    /// least one more occurrence.
    pub fn is_proper_subset(&self, other: &Self) -> bool {
        self.cardinality < other.cardinality && self.is_subset(other)
    }

    /// Returns `true` if `other` is a proper subset of `self`.
    pub fn is_proper_superset(&self, other: &Self) -> bool {
        other.is_proper_subset(self)
    }

    /// Returns `true` if no value occurs in both multisets.
    pub fn is_disjoint(&self, other: &Self) -> bool {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.iter().all(|(value, _)| large.count_of(value) == 0)
    }
}

/// An iterator over the distinct values of a [`HashMultiset`] and their
/// multiplicities.
pub struct Iter<'a, T> {
    inner: hash_table::Iter<'a, (T, usize)>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (&'a T, usize);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(v, m)| (v, *m))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(v, m)| (v, *m))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<'a, T, S> IntoIterator for &'a HashMultiset<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type IntoIter = Iter<'a, T>;
    type Item = (&'a T, usize);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, S> FromIterator<T> for HashMultiset<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = HashMultiset::default();
        set.extend(iter);
        set
    }
}

impl<T, S> Extend<T> for HashMultiset<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// # Panics
    ///
    /// Panics if the multiset cannot hold the new values. Use
    /// [`HashMultiset::try_extend`] to handle the error instead.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        if let Err(err) = self.try_extend(iter) {
            panic!("failed to extend multiset: {err}");
        }
    }
}
