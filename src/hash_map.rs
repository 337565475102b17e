use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::iter::FusedIterator;

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

/// A hash map implemented using the Robin Hood [`HashTable`] as the
/// underlying storage.
///
/// `HashMap<K, V, S>` stores key-value pairs where keys implement
/// `Hash + Eq` and uses a configurable hasher builder `S` to hash keys.
///
/// Every operation records its outcome in [`HashMap::flag`]; fallible ones
/// also return it as a [`TableError`].
#[derive(Clone)]
pub struct HashMap<K, V, S = DefaultHashBuilder> {
    table: HashTable<(K, V)>,
    hash_builder: S,
}

impl<K, V, S> Debug for HashMap<K, V, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in self.table.iter() {
            map.entry(k, v);
        }
        map.finish()
    }
}

impl<K, V, S> PartialEq for HashMap<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.table.equals(
            &other.table,
            |(k, _)| self.hash_builder.hash_one(k),
            |(k, _)| other.hash_builder.hash_one(k),
            |(a, _), (b, _)| a == b,
            |(_, a), (_, b)| a == b,
        )
    }
}

impl<K, V, S> Eq for HashMap<K, V, S>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> Default for HashMap<K, V, S>
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

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates an empty map able to hold `capacity` pairs at `load` before
    /// growing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_hash::HashMap;
    ///
    /// let map: HashMap<i32, String> = HashMap::new(100, 0.5).unwrap();
    /// assert_eq!(map.capacity(), 383);
    /// assert!(map.is_empty());
    /// # }
    /// ```
    pub fn new(capacity: usize, load: f64) -> Result<Self> {
        Self::with_config(TableConfig::new().with_capacity(capacity).with_load(load))
    }

    /// Creates an empty map from a [`TableConfig`].
    pub fn with_config(config: TableConfig) -> Result<Self> {
        Self::with_config_and_hasher(config, S::default())
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty map with the default configuration and the given
    /// hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use robin_hash::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let map: HashMap<i32, String, _> = HashMap::with_hasher(SimpleHasher);
    /// assert!(map.is_empty());
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: HashTable::default(),
            hash_builder,
        }
    }

    /// Creates an empty map from a [`TableConfig`] and a hasher builder.
    pub fn with_config_and_hasher(config: TableConfig, hash_builder: S) -> Result<Self> {
        Ok(Self {
            table: HashTable::with_config(config)?,
            hash_builder,
        })
    }

    /// Returns the number of pairs in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no pairs.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns `true` if inserting one more key would grow the map.
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

    /// Returns a reference to the map's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Replaces the hooks notified after successful operations.
    pub fn customize(&mut self, callbacks: Option<SharedCallbacks>) {
        self.table.customize(callbacks);
    }

    /// Removes every pair, keeping the capacity.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the key was already present its value is replaced (firing the
    /// `update` hook) and the old value is returned; otherwise `None` is
    /// returned.
    ///
    /// # Errors
    ///
    /// Fails only if the map had to grow and could not.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_hash::HashMap;
    ///
    /// let mut map: HashMap<i32, &str> = HashMap::default();
    /// assert_eq!(map.insert(37, "a"), Ok(None));
    /// assert_eq!(map.insert(37, "b"), Ok(Some("a")));
    /// assert_eq!(map.get(&37), Some(&"b"));
    /// # }
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>> {
        Ok(match self.entry(key)? {
            Entry::Occupied(mut entry) => Some(entry.insert(value)),
            Entry::Vacant(entry) => {
                entry.insert(value);
                None
            }
        })
    }

    /// Inserts every pair from `iter`, stopping at the first failed
    /// insertion. Later pairs overwrite earlier ones with the same key.
    ///
    /// Pairs inserted before the failure stay in the map.
    pub fn try_extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) -> Result<()> {
        for (k, v) in iter {
            self.insert(k, v)?;
        }
        Ok(())
    }

    /// Inserts a key-value pair only if the key is absent, returning a
    /// reference to the stored value.
    ///
    /// # Errors
    ///
    /// [`TableError::Duplicate`] if the key is present; the existing value is
    /// left untouched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_hash::HashMap;
    /// use robin_hash::TableError;
    ///
    /// let mut map: HashMap<&str, u32> = HashMap::default();
    /// assert_eq!(map.try_insert("k", 1).copied(), Ok(1));
    /// assert_eq!(map.try_insert("k", 2), Err(TableError::Duplicate));
    /// assert_eq!(map.get(&"k"), Some(&1));
    /// # }
    /// ```
    pub fn try_insert(&mut self, key: K, value: V) -> Result<&mut V> {
        match self.entry(key)? {
            Entry::Occupied(entry) => {
                entry.entry.set_flag(Status::Duplicate);
                Err(TableError::Duplicate)
            }
            Entry::Vacant(entry) => Ok(entry.insert(value)),
        }
    }

    /// Replaces the value stored under an existing key and returns the old
    /// value. Fires the `update` hook.
    ///
    /// # Errors
    ///
    /// [`TableError::Empty`] on an empty map, [`TableError::NotFound`] if the
    /// key is absent. Nothing is inserted in either case.
    pub fn update(&mut self, key: &K, value: V) -> Result<V> {
        let hash = self.hash_builder.hash_one(key);
        let mut entry = self.table.find_entry(hash, |(k, _)| k == key)?;
        Ok(entry.update(|(_, v)| core::mem::replace(v, value)))
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get(&self, key: &K) -> Option<&V> {
        let hash = self.hash_builder.hash_one(key);
        self.table.find(hash, |(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns the stored key and value for `key`.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let hash = self.hash_builder.hash_one(key);
        self.table.find(hash, |(k, _)| k == key).map(|(k, v)| (k, v))
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let hash = self.hash_builder.hash_one(key);
        self.table
            .find_mut(hash, |(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Returns `true` if the map contains a value for the key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Removes a key from the map, returning its value.
    ///
    /// # Errors
    ///
    /// [`TableError::Empty`] on an empty map, [`TableError::NotFound`] if the
    /// key is absent.
    pub fn remove(&mut self, key: &K) -> Result<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the stored key and value.
    pub fn remove_entry(&mut self, key: &K) -> Result<(K, V)> {
        let hash = self.hash_builder.hash_one(key);
        self.table.remove(hash, |(k, _)| k == key)
    }

    /// Gets the given key's corresponding entry in the map for in-place
    /// manipulation.
    ///
    /// # Errors
    ///
    /// Fails only if the key is absent and the map had to grow and could not.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_hash::HashMap;
    ///
    /// let mut counts: HashMap<&str, u32> = HashMap::default();
    /// for word in ["a", "b", "a"] {
    ///     *counts.entry(word).unwrap().or_insert(0) += 1;
    /// }
    /// assert_eq!(counts.get(&"a"), Some(&2));
    /// assert_eq!(counts.get(&"b"), Some(&1));
    /// # }
    /// ```
    pub fn entry(&mut self, key: K) -> Result<Entry<'_, K, V>> {
        let hash = self.hash_builder.hash_one(&key);
        let hash_builder = &self.hash_builder;
        Ok(
            match self
                .table
                .entry(hash, |(k, _)| k == &key, |(k, _)| hash_builder.hash_one(k))?
            {
                TableEntry::Occupied(entry) => Entry::Occupied(OccupiedEntry { entry }),
                TableEntry::Vacant(entry) => Entry::Vacant(VacantEntry { entry, key }),
            },
        )
    }

    /// Keeps only the pairs for which `f` returns `true`.
    pub fn retain(&mut self, mut f: impl FnMut(&K, &V) -> bool) {
        self.table.retain(|(k, v)| f(k, v));
    }

    /// Grows the backing table so that it can hold `capacity` pairs.
    ///
    /// See [`HashTable::resize`].
    pub fn resize(&mut self, capacity: usize) -> Result<()> {
        let hash_builder = &self.hash_builder;
        self.table
            .resize(capacity, |(k, _)| hash_builder.hash_one(k))
    }

    /// Builds an independent copy with a freshly laid out table.
    pub fn copy_of(&self) -> Result<Self>
    where
        K: Clone,
        V: Clone,
        S: Clone,
    {
        Ok(Self {
            table: self
                .table
                .copy_of(|(k, _)| self.hash_builder.hash_one(k))?,
            hash_builder: self.hash_builder.clone(),
        })
    }

    /// Returns the pair with the greatest key.
    ///
    /// # Errors
    ///
    /// [`TableError::Empty`] on an empty map.
    pub fn max(&self) -> Result<(&K, &V)>
    where
        K: Ord,
    {
        self.table
            .max_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(k, v)| (k, v))
    }

    /// Returns the pair with the least key.
    ///
    /// # Errors
    ///
    /// [`TableError::Empty`] on an empty map.
    pub fn min(&self) -> Result<(&K, &V)>
    where
        K: Ord,
    {
        self.table
            .min_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(k, v)| (k, v))
    }

    /// Returns an iterator over the pairs in slot order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_hash::HashMap;
    ///
    /// let mut map: HashMap<i32, char> = HashMap::default();
    /// map.insert(1, 'a').unwrap();
    /// map.insert(2, 'b').unwrap();
    ///
    /// let mut pairs: Vec<_> = map.iter().collect();
    /// pairs.sort();
    /// assert_eq!(pairs, vec![(&1, &'a'), (&2, &'b')]);
    /// # }
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the pairs with mutable values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.table.iter_mut(),
        }
    }

    /// Returns an iterator over the keys of the map.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values of the map.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable references to the values.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Returns a bidirectional cursor positioned at the first pair.
    pub fn cursor(&self) -> Cursor<'_, (K, V)> {
        self.table.cursor()
    }

    /// Returns a bidirectional cursor positioned at the last pair.
    pub fn cursor_end(&self) -> Cursor<'_, (K, V)> {
        self.table.cursor_end()
    }

    /// Returns probe-distance statistics for the backing table.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_stats(&self) -> hash_table::ProbeStats {
        self.table.probe_stats()
    }
}

/// A view into a single entry in a map, which may be vacant or occupied.
pub enum Entry<'a, K, V> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V>),
}

impl<'a, K, V> Entry<'a, K, V> {
    /// Ensures a value is in the entry by inserting the default if empty, and
    /// returns a mutable reference to the value in the entry.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Ensures a value is in the entry by inserting the result of the default
    /// function if empty.
    pub fn or_insert_with<F: FnOnce() -> V>(self, default: F) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts into the map.
    pub fn and_modify<F: FnOnce(&mut V)>(self, f: F) -> Self {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            vacant => vacant,
        }
    }

    /// Ensures a value is in the entry by inserting the default value if
    /// empty.
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(V::default)
    }

    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

/// A view into a vacant entry in the map.
pub struct VacantEntry<'a, K, V> {
    entry: hash_table::VacantEntry<'a, (K, V)>,
    key: K,
}

impl<'a, K, V> VacantEntry<'a, K, V> {
    /// Gets a reference to the key that would be used when inserting.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Sets the value of the entry with the vacant entry's key, and returns a
    /// mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        &mut self.entry.insert((self.key, value)).1
    }
}

/// A view into an occupied entry in the map.
pub struct OccupiedEntry<'a, K, V> {
    entry: hash_table::OccupiedEntry<'a, (K, V)>,
}

impl<'a, K, V> OccupiedEntry<'a, K, V> {
    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> &K {
        &self.entry.get().0
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        &self.entry.get().1
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.entry.get_mut().1
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.entry.into_mut().1
    }

    /// Sets the value of the entry, returning the old value. Fires the
    /// `update` hook.
    pub fn insert(&mut self, value: V) -> V {
        self.entry.update(|(_, v)| core::mem::replace(v, value))
    }

    /// Removes the entry from the map and returns the value.
    pub fn remove(self) -> V {
        self.entry.remove().1
    }
}

/// An iterator over the pairs of a [`HashMap`].
pub struct Iter<'a, K, V> {
    inner: hash_table::Iter<'a, (K, V)>,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, v)| (k, v))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// An iterator over the pairs of a [`HashMap`] with mutable values.
pub struct IterMut<'a, K, V> {
    inner: hash_table::IterMut<'a, (K, V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (&*k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

/// An iterator over the keys of a [`HashMap`].
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

/// An iterator over the values of a [`HashMap`].
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

/// An iterator over mutable references to the values of a [`HashMap`].
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// An owning iterator over the pairs of a [`HashMap`].
pub struct IntoIter<K, V> {
    inner: hash_table::IntoIter<(K, V)>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V, S> IntoIterator for HashMap<K, V, S> {
    type IntoIter = IntoIter<K, V>;
    type Item = (K, V);

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S> FromIterator<(K, V)> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = HashMap::default();
        map.extend(iter);
        map
    }
}

impl<K, V, S> Extend<(K, V)> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// # Panics
    ///
    /// Panics if the map cannot grow to hold the new pairs. Use
    /// [`HashMap::try_extend`] to handle the error instead.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        if let Err(err) = self.try_extend(iter) {
            panic!("failed to extend map: {err}");
        }
    }
}
