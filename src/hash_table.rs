use alloc::vec::Vec;
use core::cell::Cell;
use core::cmp::Ordering;
use core::fmt::Debug;
use core::iter::FusedIterator;
use core::mem;

use tracing::debug;
use tracing::trace;
use tracing::warn;

use crate::callbacks::Event;
use crate::callbacks::SharedCallbacks;
use crate::callbacks::dispatch;
use crate::capacity;
use crate::config::DeletionMode;
use crate::config::TableConfig;
use crate::error::Result;
use crate::error::Status;
use crate::error::TableError;

/// State of a single slot in the backing array.
///
/// `dist` is the probe distance of the stored value: how many slots past its
/// home position (`hash % capacity`) it sits, wrapping around the end of the
/// array.
#[derive(Clone)]
enum Slot<V> {
    Empty,
    Filled { value: V, dist: usize },
    Deleted,
}

impl<V> Slot<V> {
    #[inline(always)]
    fn is_filled(&self) -> bool {
        matches!(self, Slot::Filled { .. })
    }
}

/// Probe-distance statistics for a table.
///
/// Available in tests and with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct ProbeStats {
    /// Number of live entries.
    pub count: usize,
    /// Number of slots.
    pub capacity: usize,
    /// Number of deleted slots awaiting a rehash.
    pub tombstones: usize,
    /// Largest probe distance of any live entry.
    pub max_probe: usize,
    /// Mean probe distance over live entries.
    pub mean_probe: f64,
    /// `histogram[d]` is the number of entries with probe distance `d`.
    pub histogram: Vec<usize>,
}

#[cfg(any(test, feature = "stats"))]
impl ProbeStats {
    /// Pretty-print the statistics, including a horizontal histogram.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Robin Hood Table Statistics ===");
        println!(
            "Population: {}/{} slots ({:.2}% occupied)",
            self.count,
            self.capacity,
            if self.capacity == 0 {
                0.0
            } else {
                self.count as f64 / self.capacity as f64 * 100.0
            }
        );
        println!("Tombstones: {}", self.tombstones);
        println!(
            "Probe distance: max {}, mean {:.3}",
            self.max_probe, self.mean_probe
        );

        let peak = self.histogram.iter().copied().max().unwrap_or(0);
        if peak == 0 {
            println!("probe histogram: empty");
            return;
        }
        let max_bar = 60usize;
        for (dist, &n) in self.histogram.iter().enumerate() {
            let width = (n * max_bar).div_ceil(peak);
            println!("{:>3} | {} ({})", dist, "█".repeat(width), n);
        }
    }
}

/// An open-addressing hash table using Robin Hood linear probing.
///
/// `HashTable<V>` stores values of type `V` in a prime-sized slot array.
/// Like the containers built on it, it does not know how to hash or compare
/// its values: each operation takes the hash of the value it is looking for
/// and an equality predicate, and operations that may rehash take a function
/// that recomputes the hash of a stored value.
///
/// On insertion, an incoming value that has probed further than the occupant
/// of a slot takes that slot, and the occupant continues probing in its place.
/// Removal leaves a tombstone (or, with [`DeletionMode::BackwardShift`],
/// shifts the following run back by one slot). The table grows to the next
/// suitable prime before an insertion that would push `len()` past
/// `capacity() * load()`.
///
/// The outcome of the most recent operation is recorded and available via
/// [`HashTable::flag`].
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use robin_hash::hash_table::HashTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # #[derive(Debug, PartialEq)]
/// # struct Person {
/// #     id: u64,
/// #     name: String,
/// # }
/// #
/// # fn hash_id(id: u64) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     id.hash(&mut hasher);
/// #     hasher.finish()
/// # }
///
/// let mut table = HashTable::new(100, 0.75).unwrap();
/// let rehash = |p: &Person| hash_id(p.id);
///
/// table
///     .insert(
///         hash_id(123),
///         Person {
///             id: 123,
///             name: "Alice".to_string(),
///         },
///         |p| p.id == 123,
///         rehash,
///     )
///     .unwrap();
///
/// assert_eq!(table.find(hash_id(123), |p| p.id == 123).unwrap().name, "Alice");
/// assert!(table.find(hash_id(7), |p| p.id == 7).is_none());
/// ```
#[derive(Clone)]
pub struct HashTable<V> {
    slots: Vec<Slot<V>>,
    count: usize,
    tombstones: usize,
    load: f64,
    deletion: DeletionMode,
    flag: Cell<Status>,
    callbacks: Option<SharedCallbacks>,
}

impl<V> Debug for HashTable<V>
where
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        struct Slots<'a, V>(&'a [Slot<V>]);

        impl<V: Debug> Debug for Slots<'_, V> {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let mut map = f.debug_map();
                for (idx, slot) in self.0.iter().enumerate() {
                    match slot {
                        Slot::Filled { value, dist } => {
                            map.entry(&idx, &(dist, value));
                        }
                        Slot::Deleted => {
                            map.entry(&idx, &"<deleted>");
                        }
                        Slot::Empty => {}
                    }
                }
                map.finish()
            }
        }

        f.debug_struct("HashTable")
            .field("count", &self.count)
            .field("capacity", &self.capacity())
            .field("tombstones", &self.tombstones)
            .field("load", &self.load)
            .field("flag", &self.flag.get())
            .field("slots", &Slots(&self.slots))
            .finish()
    }
}

impl<V> Default for HashTable<V> {
    /// An empty table with the default configuration.
    fn default() -> Self {
        let config = TableConfig::default();
        let capacity = config
            .planned_capacity()
            .unwrap_or_else(|_| capacity::calculate_size(0));
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || Slot::Empty);
        Self::from_parts(slots, config)
    }
}

impl<V> HashTable<V> {
    /// Creates an empty table able to hold `capacity` values before its
    /// first resize, at the given load factor.
    ///
    /// The slot count is the smallest tabulated prime that is at least
    /// `capacity / load`.
    ///
    /// # Errors
    ///
    /// [`TableError::Invalid`] for a zero capacity or a load outside `(0, 1)`,
    /// [`TableError::Overflow`] if the slot count is not addressable and
    /// [`TableError::Alloc`] if the slot array cannot be allocated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::hash_table::HashTable;
    ///
    /// let table: HashTable<u64> = HashTable::new(53, 0.8).unwrap();
    /// assert_eq!(table.capacity(), 97);
    /// assert!(HashTable::<u64>::new(0, 0.8).is_err());
    /// assert!(HashTable::<u64>::new(10, 1.0).is_err());
    /// ```
    pub fn new(capacity: usize, load: f64) -> Result<Self> {
        Self::with_config(
            TableConfig::new()
                .with_capacity(capacity)
                .with_load(load),
        )
    }

    /// Creates an empty table from a [`TableConfig`].
    pub fn with_config(config: TableConfig) -> Result<Self> {
        let capacity = config.planned_capacity().inspect_err(|err| {
            warn!(
                capacity = config.capacity,
                load = config.load,
                %err,
                "rejected table configuration"
            );
        })?;
        let slots = Self::allocate(capacity)?;
        Ok(Self::from_parts(slots, config))
    }

    fn from_parts(slots: Vec<Slot<V>>, config: TableConfig) -> Self {
        Self {
            slots,
            count: 0,
            tombstones: 0,
            load: config.load,
            deletion: config.deletion,
            flag: Cell::new(Status::Ok),
            callbacks: None,
        }
    }

    fn allocate(capacity: usize) -> Result<Vec<Slot<V>>> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| TableError::Alloc(capacity))?;
        slots.resize_with(capacity, || Slot::Empty);
        Ok(slots)
    }

    /// Returns the number of values in the table.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if the table holds no values.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns `true` once the next insertion of a new value would trigger a
    /// resize, that is when one more value would push the table past its load
    /// factor.
    pub fn is_full(&self) -> bool {
        (self.count + 1) as f64 > self.capacity() as f64 * self.load
    }

    /// Returns the number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the load factor.
    pub fn load(&self) -> f64 {
        self.load
    }

    /// Returns the deletion strategy.
    pub fn deletion_mode(&self) -> DeletionMode {
        self.deletion
    }

    /// Returns the number of deleted slots not yet reclaimed by a rehash.
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    /// Returns the status recorded by the most recent operation.
    pub fn flag(&self) -> Status {
        self.flag.get()
    }

    /// Replaces the hooks notified after successful operations.
    pub fn customize(&mut self, callbacks: Option<SharedCallbacks>) {
        self.callbacks = callbacks;
        self.flag.set(Status::Ok);
    }

    /// Returns the installed hooks, if any.
    pub fn callbacks(&self) -> Option<&SharedCallbacks> {
        self.callbacks.as_ref()
    }

    #[inline(always)]
    pub(crate) fn set_flag(&self, status: Status) {
        self.flag.set(status);
    }

    #[inline(always)]
    pub(crate) fn notify(&self, event: Event) {
        dispatch(self.callbacks.as_ref(), event);
    }

    #[inline(always)]
    fn fail<T>(&self, err: TableError) -> Result<T> {
        self.flag.set(err.status());
        Err(err)
    }

    #[inline(always)]
    fn home(&self, hash: u64) -> usize {
        (hash % self.slots.len() as u64) as usize
    }

    #[inline(always)]
    fn next_pos(&self, pos: usize) -> usize {
        if pos + 1 == self.slots.len() { 0 } else { pos + 1 }
    }

    /// Index of the filled slot matching `eq`.
    ///
    /// Walks at most one full wrap, so a table whose free slots are all
    /// tombstones still terminates.
    fn find_index(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<usize> {
        let mut pos = self.home(hash);
        for _ in 0..self.slots.len() {
            match &self.slots[pos] {
                Slot::Empty => return None,
                Slot::Filled { value, .. } if eq(value) => return Some(pos),
                _ => {}
            }
            pos = self.next_pos(pos);
        }
        None
    }

    /// Robin Hood placement of a value known to be absent. Returns the index
    /// `value` ends up in.
    ///
    /// The caller guarantees at least one empty or deleted slot.
    fn place(&mut self, hash: u64, value: V) -> usize {
        let mut pos = self.home(hash);
        let mut carried = value;
        let mut dist = 0usize;
        let mut landed = None;

        loop {
            match &mut self.slots[pos] {
                Slot::Filled {
                    value: occupant,
                    dist: occupant_dist,
                } => {
                    if *occupant_dist < dist {
                        mem::swap(occupant, &mut carried);
                        mem::swap(occupant_dist, &mut dist);
                        landed.get_or_insert(pos);
                    }
                }
                vacant => {
                    if matches!(vacant, Slot::Deleted) {
                        self.tombstones -= 1;
                    }
                    *vacant = Slot::Filled {
                        value: carried,
                        dist,
                    };
                    return landed.unwrap_or(pos);
                }
            }

            pos = self.next_pos(pos);
            dist += 1;
        }
    }

    fn value_at(&self, idx: usize) -> &V {
        match &self.slots[idx] {
            Slot::Filled { value, .. } => value,
            _ => unreachable!("slot {idx} is not filled"),
        }
    }

    fn value_at_mut(&mut self, idx: usize) -> &mut V {
        match &mut self.slots[idx] {
            Slot::Filled { value, .. } => value,
            _ => unreachable!("slot {idx} is not filled"),
        }
    }

    /// Removes the value at `idx` according to the deletion mode.
    fn vacate(&mut self, idx: usize) -> V {
        let replacement = match self.deletion {
            DeletionMode::Tombstone => Slot::Deleted,
            DeletionMode::BackwardShift => Slot::Empty,
        };
        let Slot::Filled { value, .. } = mem::replace(&mut self.slots[idx], replacement) else {
            unreachable!("slot {idx} is not filled");
        };

        match self.deletion {
            DeletionMode::Tombstone => self.tombstones += 1,
            DeletionMode::BackwardShift => self.shift_back(idx),
        }
        self.count -= 1;
        value
    }

    /// Pulls every displaced entry following the hole at `hole` back by one
    /// slot, stopping at an empty slot or an entry already at home.
    fn shift_back(&mut self, mut hole: usize) {
        let mut pos = self.next_pos(hole);
        loop {
            match &mut self.slots[pos] {
                Slot::Filled { dist, .. } if *dist > 0 => *dist -= 1,
                _ => return,
            }
            self.slots.swap(hole, pos);
            hole = pos;
            pos = self.next_pos(pos);
        }
    }

    /// Grows to the next prime if the table is full.
    fn grow_if_full(&mut self, hasher: impl Fn(&V) -> u64) -> Result<()> {
        if self.is_full() {
            trace!(
                count = self.count,
                capacity = self.capacity(),
                "table full, growing before insert"
            );
            self.resize(self.capacity() + 1, hasher)?;
        }
        Ok(())
    }

    /// Finds a value by hash and equality predicate.
    ///
    /// Records [`Status::Empty`] on an empty table and [`Status::NotFound`]
    /// on a miss. A hit fires the `read` hook.
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        if self.count == 0 {
            self.set_flag(Status::Empty);
            return None;
        }
        match self.find_index(hash, eq) {
            Some(idx) => {
                self.set_flag(Status::Ok);
                self.notify(Event::Read);
                Some(self.value_at(idx))
            }
            None => {
                self.set_flag(Status::NotFound);
                None
            }
        }
    }

    /// Finds a value by hash and equality predicate, returning a mutable
    /// reference.
    ///
    /// The caller must not change the parts of the value that determine its
    /// hash or equality.
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        if self.count == 0 {
            self.set_flag(Status::Empty);
            return None;
        }
        match self.find_index(hash, eq) {
            Some(idx) => {
                self.set_flag(Status::Ok);
                self.notify(Event::Read);
                Some(self.value_at_mut(idx))
            }
            None => {
                self.set_flag(Status::NotFound);
                None
            }
        }
    }

    /// Returns `true` if a value matching `eq` is present.
    pub fn contains(&self, hash: u64, eq: impl Fn(&V) -> bool) -> bool {
        self.find(hash, eq).is_some()
    }

    /// Lookup that leaves the flag alone and fires no hooks.
    pub(crate) fn peek(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        self.find_index(hash, eq).map(|idx| self.value_at(idx))
    }

    /// Inserts a value that must not already be present.
    ///
    /// If the table is full it is first grown to the next prime, using
    /// `hasher` to recompute the hash of every stored value.
    ///
    /// # Errors
    ///
    /// [`TableError::Duplicate`] if a value matching `eq` is present, or any
    /// error from the growth step. No value is added or lost on error, though
    /// a full table may already have grown when the duplicate is detected.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::TableError;
    /// use robin_hash::hash_table::HashTable;
    ///
    /// let mut table = HashTable::new(8, 0.5).unwrap();
    /// let ident = |v: &u64| *v;
    ///
    /// table.insert(7, 7u64, |v| *v == 7, ident).unwrap();
    /// assert_eq!(
    ///     table.insert(7, 7u64, |v| *v == 7, ident),
    ///     Err(TableError::Duplicate)
    /// );
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn insert(
        &mut self,
        hash: u64,
        value: V,
        eq: impl Fn(&V) -> bool,
        hasher: impl Fn(&V) -> u64,
    ) -> Result<&mut V> {
        self.grow_if_full(hasher)?;

        if self.find_index(hash, eq).is_some() {
            return self.fail(TableError::Duplicate);
        }

        let idx = self.place(hash, value);
        self.count += 1;
        self.set_flag(Status::Ok);
        self.notify(Event::Create);
        Ok(self.value_at_mut(idx))
    }

    /// Gets the entry for a value matching `eq`.
    ///
    /// When the value is absent and the table is full, the table grows before
    /// the vacant entry is returned, so inserting through it never rehashes.
    pub fn entry(
        &mut self,
        hash: u64,
        eq: impl Fn(&V) -> bool,
        hasher: impl Fn(&V) -> u64,
    ) -> Result<Entry<'_, V>> {
        if let Some(index) = self.find_index(hash, &eq) {
            self.set_flag(Status::Ok);
            return Ok(Entry::Occupied(OccupiedEntry { table: self, index }));
        }

        self.grow_if_full(hasher)?;
        self.set_flag(Status::Ok);
        Ok(Entry::Vacant(VacantEntry { table: self, hash }))
    }

    /// Gets the occupied entry for a value matching `eq` without inserting.
    ///
    /// # Errors
    ///
    /// [`TableError::Empty`] on an empty table and [`TableError::NotFound`]
    /// when no value matches.
    pub fn find_entry(
        &mut self,
        hash: u64,
        eq: impl Fn(&V) -> bool,
    ) -> Result<OccupiedEntry<'_, V>> {
        if self.count == 0 {
            return self.fail(TableError::Empty);
        }
        match self.find_index(hash, eq) {
            Some(index) => {
                self.set_flag(Status::Ok);
                Ok(OccupiedEntry { table: self, index })
            }
            None => self.fail(TableError::NotFound),
        }
    }

    /// Removes and returns the value matching `eq`.
    ///
    /// # Errors
    ///
    /// [`TableError::Empty`] on an empty table and [`TableError::NotFound`]
    /// when no value matches; the table is unchanged in both cases.
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Result<V> {
        if self.count == 0 {
            return self.fail(TableError::Empty);
        }
        let Some(idx) = self.find_index(hash, eq) else {
            return self.fail(TableError::NotFound);
        };

        let value = self.vacate(idx);
        self.set_flag(Status::Ok);
        self.notify(Event::Delete);
        Ok(value)
    }

    /// Rebuilds the slot array so that it can hold `capacity` values.
    ///
    /// Requests the current slot array already satisfies succeed without
    /// rehashing; the table never shrinks below `capacity()` through this
    /// method. Otherwise a new array of `calculate_size(capacity / load)` slots
    /// is allocated, every live value is moved into it (rehashed with
    /// `hasher`), and the arrays are swapped. Tombstones are purged. The
    /// `resize` hook fires on success.
    ///
    /// # Errors
    ///
    /// - [`TableError::Overflow`] if `capacity / load` is not addressable.
    /// - [`TableError::Invalid`] if the requested capacity cannot hold the
    ///   current values at this load factor.
    /// - [`TableError::Alloc`] if the new array cannot be allocated.
    ///
    /// On error the table is left untouched.
    pub fn resize(&mut self, capacity: usize, hasher: impl Fn(&V) -> u64) -> Result<()> {
        self.set_flag(Status::Ok);

        let current = self.capacity();
        if capacity == current || current as f64 > capacity as f64 / self.load {
            self.notify(Event::Resize);
            return Ok(());
        }

        if capacity::overflows(capacity, self.load) {
            warn!(capacity, load = self.load, "resize request overflows");
            return self.fail(TableError::Overflow(capacity));
        }

        let theoretical = capacity::calculate_size(capacity);
        if (theoretical as f64) < self.count as f64 / self.load {
            warn!(
                capacity,
                count = self.count,
                load = self.load,
                "resize request cannot hold current entries"
            );
            return self.fail(TableError::Invalid(
                "requested capacity cannot hold the current entries",
            ));
        }

        let target = match capacity::plan(capacity, self.load).and_then(Self::allocate) {
            Ok(slots) => slots,
            Err(err) => return self.fail(err),
        };
        let new_capacity = target.len();

        let old = mem::replace(&mut self.slots, target);
        let purged = mem::take(&mut self.tombstones);
        let mut moved = 0usize;
        for slot in old {
            if let Slot::Filled { value, .. } = slot {
                let hash = hasher(&value);
                self.place(hash, value);
                moved += 1;
            }
        }
        debug_assert_eq!(moved, self.count, "rehash lost entries");

        debug!(
            old_capacity = current,
            new_capacity,
            count = self.count,
            purged,
            "rehashed table"
        );
        self.notify(Event::Resize);
        Ok(())
    }

    /// Keeps only the values for which `f` returns `true`.
    ///
    /// `f` is called exactly once per value. Each removal fires the `delete`
    /// hook.
    pub fn retain(&mut self, mut f: impl FnMut(&V) -> bool) {
        let cap = self.slots.len();
        // Backward shifts stop at an empty slot, so no value crosses `start`.
        let start = match self.deletion {
            DeletionMode::Tombstone => 0,
            DeletionMode::BackwardShift => self
                .slots
                .iter()
                .position(|slot| matches!(slot, Slot::Empty))
                .unwrap_or(0),
        };

        let mut step = 0;
        while step < cap {
            let idx = (start + step) % cap;
            let discard = matches!(&self.slots[idx], Slot::Filled { value, .. } if !f(value));
            if discard {
                self.vacate(idx);
                self.notify(Event::Delete);
                if self.deletion == DeletionMode::BackwardShift {
                    // A shifted entry now occupies `idx`.
                    continue;
                }
            }
            step += 1;
        }
        self.set_flag(Status::Ok);
    }

    /// Removes every value, keeping the slot array.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = Slot::Empty;
        }
        self.count = 0;
        self.tombstones = 0;
        self.set_flag(Status::Ok);
    }

    /// Builds an independent table holding a clone of every value.
    ///
    /// Unlike [`Clone`], the copy is rebuilt from scratch: it is sized for
    /// `capacity() * load()` values, its values are rehashed with `hasher` and
    /// it carries no tombstones. Load factor, deletion mode and hooks are
    /// carried over.
    pub fn copy_of(&self, hasher: impl Fn(&V) -> u64) -> Result<Self>
    where
        V: Clone,
    {
        let config = TableConfig::new()
            .with_capacity(((self.capacity() as f64 * self.load) as usize).max(1))
            .with_load(self.load)
            .with_deletion_mode(self.deletion);

        let mut copy = match Self::with_config(config) {
            Ok(copy) => copy,
            Err(err) => return self.fail(err),
        };
        for value in self.iter() {
            copy.place(hasher(value), value.clone());
            copy.count += 1;
        }
        copy.callbacks = self.callbacks.clone();

        self.set_flag(Status::Ok);
        Ok(copy)
    }

    /// Returns `true` if both tables hold the same values.
    ///
    /// Tables with different lengths are never equal. Otherwise every value of
    /// the table with fewer slots is looked up in the other with `same_key`,
    /// and the pair must satisfy `same_value`. Lookups in a table use that
    /// table's hash function: `hash_self` for `self`, `hash_other` for `other`.
    pub fn equals(
        &self,
        other: &Self,
        hash_self: impl Fn(&V) -> u64,
        hash_other: impl Fn(&V) -> u64,
        same_key: impl Fn(&V, &V) -> bool,
        same_value: impl Fn(&V, &V) -> bool,
    ) -> bool {
        self.set_flag(Status::Ok);
        other.set_flag(Status::Ok);

        if self.count != other.count {
            return false;
        }

        if self.capacity() <= other.capacity() {
            other.covers(self, &hash_other, &same_key, &same_value)
        } else {
            self.covers(other, &hash_self, &same_key, &same_value)
        }
    }

    /// Every value of `small` has a match in `self`, looked up with `hash`.
    fn covers(
        &self,
        small: &Self,
        hash: &impl Fn(&V) -> u64,
        same_key: &impl Fn(&V, &V) -> bool,
        same_value: &impl Fn(&V, &V) -> bool,
    ) -> bool {
        small.iter().all(|value| {
            self.find_index(hash(value), |candidate| same_key(value, candidate))
                .is_some_and(|idx| same_value(value, self.value_at(idx)))
        })
    }

    /// Returns the greatest value under `cmp`.
    ///
    /// # Errors
    ///
    /// [`TableError::Empty`] on an empty table.
    pub fn max_by(&self, cmp: impl Fn(&V, &V) -> Ordering) -> Result<&V> {
        match self.iter().max_by(|a, b| cmp(*a, *b)) {
            Some(value) => {
                self.set_flag(Status::Ok);
                self.notify(Event::Read);
                Ok(value)
            }
            None => self.fail(TableError::Empty),
        }
    }

    /// Returns the least value under `cmp`.
    ///
    /// # Errors
    ///
    /// [`TableError::Empty`] on an empty table.
    pub fn min_by(&self, cmp: impl Fn(&V, &V) -> Ordering) -> Result<&V> {
        match self.iter().min_by(|a, b| cmp(*a, *b)) {
            Some(value) => {
                self.set_flag(Status::Ok);
                self.notify(Event::Read);
                Ok(value)
            }
            None => self.fail(TableError::Empty),
        }
    }

    /// Returns an iterator over the values in ascending slot order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::hash_table::HashTable;
    ///
    /// let mut table = HashTable::new(16, 0.5).unwrap();
    /// let ident = |v: &u64| *v;
    /// for v in [5u64, 1, 3] {
    ///     table.insert(v, v, |x| *x == v, ident).unwrap();
    /// }
    ///
    /// // Hashes are the values themselves and every value sits at its home
    /// // slot, so slot order is numeric order here.
    /// let values: Vec<u64> = table.iter().copied().collect();
    /// assert_eq!(values, vec![1, 3, 5]);
    /// assert_eq!(table.iter().rev().next(), Some(&5));
    /// ```
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            slots: self.slots.iter(),
            remaining: self.count,
        }
    }

    /// Returns an iterator yielding mutable references in ascending slot
    /// order.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            slots: self.slots.iter_mut(),
            remaining: self.count,
        }
    }

    /// Returns a bidirectional cursor positioned at the first value.
    pub fn cursor(&self) -> Cursor<'_, V> {
        let mut cursor = Cursor::new(self);
        cursor.to_start();
        cursor
    }

    /// Returns a bidirectional cursor positioned at the last value.
    pub fn cursor_end(&self) -> Cursor<'_, V> {
        let mut cursor = Cursor::new(self);
        cursor.to_end();
        cursor
    }

    /// Probe distance of the value matching `eq`, if present.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_distance(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<usize> {
        let idx = self.find_index(hash, eq)?;
        match &self.slots[idx] {
            Slot::Filled { dist, .. } => Some(*dist),
            _ => None,
        }
    }

    /// Returns probe-distance statistics.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_stats(&self) -> ProbeStats {
        let mut histogram = Vec::new();
        let mut total = 0usize;
        for slot in &self.slots {
            if let Slot::Filled { dist, .. } = slot {
                if histogram.len() <= *dist {
                    histogram.resize(*dist + 1, 0);
                }
                histogram[*dist] += 1;
                total += *dist;
            }
        }

        ProbeStats {
            count: self.count,
            capacity: self.capacity(),
            tombstones: self.tombstones,
            max_probe: histogram.len().saturating_sub(1),
            mean_probe: if self.count == 0 {
                0.0
            } else {
                total as f64 / self.count as f64
            },
            histogram,
        }
    }

    /// Checks the stored probe distance of every value against `hasher`.
    #[cfg(test)]
    pub(crate) fn assert_layout(&self, hasher: impl Fn(&V) -> u64) {
        let cap = self.capacity();
        let mut filled = 0;
        let mut deleted = 0;
        for (pos, slot) in self.slots.iter().enumerate() {
            match slot {
                Slot::Filled { value, dist } => {
                    let home = self.home(hasher(value));
                    assert_eq!((pos + cap - home) % cap, *dist, "bad probe distance at {pos}");
                    assert!(*dist < cap);
                    filled += 1;
                }
                Slot::Deleted => deleted += 1,
                Slot::Empty => {}
            }
        }
        assert_eq!(filled, self.count);
        assert_eq!(deleted, self.tombstones);
        assert!(self.count as f64 <= cap as f64 * self.load);
    }
}

/// A view into a single entry in the table, which may be vacant or occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
///
/// # Examples
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use robin_hash::hash_table::Entry;
/// # use robin_hash::hash_table::HashTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # fn hash_str(s: &str) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     s.hash(&mut hasher);
/// #     hasher.finish()
/// # }
///
/// let mut table = HashTable::new(10, 0.75).unwrap();
/// let hash = hash_str("key");
///
/// match table
///     .entry(hash, |s: &String| s == "key", |s| hash_str(s))
///     .unwrap()
/// {
///     Entry::Vacant(entry) => {
///         entry.insert("key".to_string());
///     }
///     Entry::Occupied(entry) => {
///         println!("Key already exists: {}", entry.get());
///     }
/// }
/// assert_eq!(table.len(), 1);
/// ```
pub enum Entry<'a, V> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, V>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Ensures a value is in the entry by inserting `default` if vacant, and
    /// returns a mutable reference to the value.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Vacant(entry) => entry.insert(default),
            Entry::Occupied(entry) => entry.into_mut(),
        }
    }

    /// Like [`Entry::or_insert`], computing the value only when vacant.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Vacant(entry) => entry.insert(default()),
            Entry::Occupied(entry) => entry.into_mut(),
        }
    }

    /// Modifies an occupied entry in place before any potential insert.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Self {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            vacant => vacant,
        }
    }

    /// Inserts `V::default()` if vacant.
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(V::default)
    }
}

/// A view into a vacant entry in a [`HashTable`].
pub struct VacantEntry<'a, V> {
    table: &'a mut HashTable<V>,
    hash: u64,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Inserts a value and returns a mutable reference to it.
    ///
    /// The caller must ensure `value` matches the hash and predicate the entry
    /// was looked up with.
    pub fn insert(self, value: V) -> &'a mut V {
        let idx = self.table.place(self.hash, value);
        self.table.count += 1;
        self.table.set_flag(Status::Ok);
        self.table.notify(Event::Create);
        self.table.value_at_mut(idx)
    }
}

/// A view into an occupied entry in a [`HashTable`].
pub struct OccupiedEntry<'a, V> {
    table: &'a mut HashTable<V>,
    index: usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Gets a reference to the value.
    pub fn get(&self) -> &V {
        self.table.value_at(self.index)
    }

    /// Gets a mutable reference to the value.
    pub fn get_mut(&mut self) -> &mut V {
        self.table.value_at_mut(self.index)
    }

    /// Converts the entry into a mutable reference bound to the table.
    pub fn into_mut(self) -> &'a mut V {
        self.table.value_at_mut(self.index)
    }

    /// Replaces the value, returning the previous one. Fires the `update`
    /// hook.
    pub fn insert(&mut self, value: V) -> V {
        self.update(|v| mem::replace(v, value))
    }

    /// Modifies the value in place through `f`, firing the `update` hook.
    ///
    /// `f` must not change the parts of the value that determine its hash or
    /// equality.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut V) -> R) -> R {
        let out = f(self.table.value_at_mut(self.index));
        self.table.set_flag(Status::Ok);
        self.table.notify(Event::Update);
        out
    }

    #[inline(always)]
    pub(crate) fn set_flag(&self, status: Status) {
        self.table.set_flag(status);
    }

    /// Removes the value from the table and returns it.
    pub fn remove(self) -> V {
        let value = self.table.vacate(self.index);
        self.table.set_flag(Status::Ok);
        self.table.notify(Event::Delete);
        value
    }
}

/// An iterator over the values of a [`HashTable`] in slot order.
pub struct Iter<'a, V> {
    slots: core::slice::Iter<'a, Slot<V>>,
    remaining: usize,
}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        for slot in self.slots.by_ref() {
            if let Slot::Filled { value, .. } = slot {
                self.remaining -= 1;
                return Some(value);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> DoubleEndedIterator for Iter<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        while let Some(slot) = self.slots.next_back() {
            if let Slot::Filled { value, .. } = slot {
                self.remaining -= 1;
                return Some(value);
            }
        }
        None
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

/// A mutable iterator over the values of a [`HashTable`] in slot order.
pub struct IterMut<'a, V> {
    slots: core::slice::IterMut<'a, Slot<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        for slot in self.slots.by_ref() {
            if let Slot::Filled { value, .. } = slot {
                self.remaining -= 1;
                return Some(value);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> DoubleEndedIterator for IterMut<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        while let Some(slot) = self.slots.next_back() {
            if let Slot::Filled { value, .. } = slot {
                self.remaining -= 1;
                return Some(value);
            }
        }
        None
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

impl<V> FusedIterator for IterMut<'_, V> {}

/// An owning iterator over the values of a [`HashTable`] in slot order.
pub struct IntoIter<V> {
    slots: alloc::vec::IntoIter<Slot<V>>,
    remaining: usize,
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        for slot in self.slots.by_ref() {
            if let Slot::Filled { value, .. } = slot {
                self.remaining -= 1;
                return Some(value);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}

impl<V> FusedIterator for IntoIter<V> {}

impl<V> IntoIterator for HashTable<V> {
    type IntoIter = IntoIter<V>;
    type Item = V;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            remaining: self.count,
            slots: self.slots.into_iter(),
        }
    }
}

impl<'a, V> IntoIterator for &'a HashTable<V> {
    type IntoIter = Iter<'a, V>;
    type Item = &'a V;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A bidirectional cursor over the live values of a [`HashTable`].
///
/// The cursor always rests on a live value (unless the table is empty) and
/// tracks that value's logical index in `0..len()`. Moving past either end
/// does not move the cursor; it sets the corresponding boundary flag instead,
/// so a "visit, then `move_next`" loop that stops once [`Cursor::at_end`]
/// holds visits every value exactly once.
///
/// The cursor borrows the table, so the table cannot be modified while a
/// cursor over it is alive.
///
/// ```rust
/// use robin_hash::hash_table::HashTable;
///
/// let mut table = HashTable::new(16, 0.5).unwrap();
/// let ident = |v: &u64| *v;
/// for v in [2u64, 4, 6] {
///     table.insert(v, v, |x| *x == v, ident).unwrap();
/// }
///
/// let mut seen = Vec::new();
/// let mut cursor = table.cursor();
/// while !cursor.at_end() {
///     seen.push(*cursor.get().unwrap());
///     cursor.move_next();
/// }
/// assert_eq!(seen, vec![2, 4, 6]);
///
/// assert!(cursor.go_to(1));
/// assert_eq!(cursor.get(), Some(&4));
/// assert!(cursor.move_prev());
/// assert_eq!((cursor.index(), cursor.get()), (0, Some(&2)));
/// ```
pub struct Cursor<'a, V> {
    table: &'a HashTable<V>,
    slot: usize,
    index: usize,
    first: usize,
    last: usize,
    start: bool,
    end: bool,
}

impl<V> Clone for Cursor<'_, V> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<'a, V> Cursor<'a, V> {
    fn new(table: &'a HashTable<V>) -> Self {
        let first = table.slots.iter().position(Slot::is_filled).unwrap_or(0);
        let last = table.slots.iter().rposition(Slot::is_filled).unwrap_or(0);
        Self {
            table,
            slot: first,
            index: 0,
            first,
            last,
            start: true,
            end: true,
        }
    }

    fn len(&self) -> usize {
        self.table.count
    }

    /// Moves to the first value.
    pub fn to_start(&mut self) {
        self.slot = self.first;
        self.index = 0;
        self.start = true;
        self.end = self.len() == 0;
    }

    /// Moves to the last value.
    pub fn to_end(&mut self) {
        self.slot = self.last;
        self.index = self.len().saturating_sub(1);
        self.start = self.len() == 0;
        self.end = true;
    }

    /// Returns `true` if the table is empty or the cursor has tried to move
    /// before the first value.
    pub fn at_start(&self) -> bool {
        self.len() == 0 || self.start
    }

    /// Returns `true` if the table is empty or the cursor has tried to move
    /// past the last value.
    pub fn at_end(&self) -> bool {
        self.len() == 0 || self.end
    }

    /// Moves to the next value. Returns `false`, setting the end flag, if the
    /// cursor is on the last value.
    pub fn move_next(&mut self) -> bool {
        if self.end {
            return false;
        }
        if self.index + 1 == self.len() {
            self.end = true;
            return false;
        }

        self.start = false;
        self.index += 1;
        let slots = &self.table.slots;
        self.slot += 1;
        while !slots[self.slot].is_filled() {
            self.slot += 1;
        }
        true
    }

    /// Moves to the previous value. Returns `false`, setting the start flag,
    /// if the cursor is on the first value.
    pub fn move_prev(&mut self) -> bool {
        if self.start {
            return false;
        }
        if self.index == 0 {
            self.start = true;
            return false;
        }

        self.end = false;
        self.index -= 1;
        let slots = &self.table.slots;
        self.slot -= 1;
        while !slots[self.slot].is_filled() {
            self.slot -= 1;
        }
        true
    }

    /// Moves forward by `steps` values.
    ///
    /// Returns `false` without moving if `steps` is zero or would pass the
    /// last value.
    pub fn advance(&mut self, steps: usize) -> bool {
        if self.end {
            return false;
        }
        if self.index + 1 == self.len() {
            self.end = true;
            return false;
        }
        if steps == 0 || self.index + steps >= self.len() {
            return false;
        }

        for _ in 0..steps {
            self.move_next();
        }
        true
    }

    /// Moves backward by `steps` values.
    ///
    /// Returns `false` without moving if `steps` is zero or would pass the
    /// first value.
    pub fn rewind(&mut self, steps: usize) -> bool {
        if self.start {
            return false;
        }
        if self.index == 0 {
            self.start = true;
            return false;
        }
        if steps == 0 || self.index < steps {
            return false;
        }

        for _ in 0..steps {
            self.move_prev();
        }
        true
    }

    /// Moves to the value with logical index `index`.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index >= self.len() {
            return false;
        }
        match self.index.cmp(&index) {
            Ordering::Greater => self.rewind(self.index - index),
            Ordering::Less => self.advance(index - self.index),
            Ordering::Equal => true,
        }
    }

    /// Logical index of the current value.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The current value, or `None` on an empty table.
    pub fn get(&self) -> Option<&'a V> {
        if self.len() == 0 {
            return None;
        }
        Some(self.table.value_at(self.slot))
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::sync::Arc;
    use alloc::vec;
    use core::hash::Hasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;
    use crate::callbacks::recorder::Recorder;

    struct HashState {
        k0: u64,
        k1: u64,
    }

    impl HashState {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k0: rng.try_next_u64().unwrap(),
                k1: rng.try_next_u64().unwrap(),
            }
        }

        fn build_hasher(&self) -> SipHasher {
            SipHasher::new_with_keys(self.k0, self.k1)
        }
    }

    #[derive(Debug, PartialEq, Eq, Clone)]
    struct Item {
        key: u64,
        value: i32,
    }

    fn hash_key(state: &HashState, key: u64) -> u64 {
        let mut h = state.build_hasher();
        h.write_u64(key);
        h.finish()
    }

    fn ident(v: &u64) -> u64 {
        *v
    }

    fn insert_ident(table: &mut HashTable<u64>, v: u64) {
        table.insert(v, v, |x| *x == v, ident).unwrap();
    }

    #[test]
    fn insert_and_find() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new(8, 0.75).unwrap();
        let rehash = |v: &Item| hash_key(&state, v.key);
        for k in 0..200u64 {
            let hash = hash_key(&state, k);
            table
                .insert(
                    hash,
                    Item {
                        key: k,
                        value: (k as i32) * 2,
                    },
                    |v| v.key == k,
                    rehash,
                )
                .unwrap();
            assert_eq!(
                table.find(hash, |v| v.key == k),
                Some(&Item {
                    key: k,
                    value: (k as i32) * 2
                }),
                "{:#?}",
                table
            );
        }
        assert_eq!(table.len(), 200);
        table.assert_layout(rehash);

        let miss_hash = hash_key(&state, 999);
        assert!(table.find(miss_hash, |v| v.key == 999).is_none());
        assert_eq!(table.flag(), Status::NotFound);
    }

    #[test]
    fn find_on_empty_table_sets_empty_flag() {
        let table: HashTable<u64> = HashTable::default();
        assert!(table.find(1, |v| *v == 1).is_none());
        assert_eq!(table.flag(), Status::Empty);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut table = HashTable::new(8, 0.5).unwrap();
        insert_ident(&mut table, 42);
        assert_eq!(table.insert(42, 42, |x| *x == 42, ident), Err(TableError::Duplicate));
        assert_eq!(table.flag(), Status::Duplicate);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn duplicate_entry_is_occupied() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::default();
        let rehash = |v: &Item| hash_key(&state, v.key);
        let k = 42u64;
        let hash = hash_key(&state, k);

        match table.entry(hash, |v| v.key == k, rehash).unwrap() {
            Entry::Vacant(v) => {
                v.insert(Item { key: k, value: 7 });
            }
            Entry::Occupied(_) => panic!("should be vacant first time"),
        }

        match table.entry(hash, |v| v.key == k, rehash).unwrap() {
            Entry::Occupied(mut occ) => {
                let prev = occ.insert(Item { key: k, value: 11 });
                assert_eq!(prev.value, 7);
            }
            Entry::Vacant(_) => panic!("should be occupied: {}#{:02X} in {:#?}", k, hash, table),
        }
        assert_eq!(table.find(hash, |v| v.key == k).unwrap().value, 11);
    }

    #[test]
    fn entry_helpers() {
        let mut table: HashTable<(u64, u32)> = HashTable::default();
        let rehash = |v: &(u64, u32)| v.0;

        *table
            .entry(3, |v| v.0 == 3, rehash)
            .unwrap()
            .or_insert((3, 0)) = (3, 1);
        table
            .entry(3, |v| v.0 == 3, rehash)
            .unwrap()
            .and_modify(|v| v.1 += 10)
            .or_insert((3, 100));
        assert_eq!(table.find(3, |v| v.0 == 3), Some(&(3, 11)));

        let removed = match table.entry(3, |v| v.0 == 3, rehash).unwrap() {
            Entry::Occupied(occ) => occ.remove(),
            Entry::Vacant(_) => panic!("expected occupied"),
        };
        assert_eq!(removed, (3, 11));
        assert!(table.is_empty());
    }

    #[test]
    fn find_mut_and_modify() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::default();
        let rehash = |v: &Item| hash_key(&state, v.key);
        for k in 0..5u64 {
            let hash = hash_key(&state, k);
            table
                .insert(hash, Item { key: k, value: 1 }, |v| v.key == k, rehash)
                .unwrap();
        }

        for k in 0..5u64 {
            let hash = hash_key(&state, k);
            if let Some(v) = table.find_mut(hash, |v| v.key == k) {
                v.value += 9;
            }
        }
        for k in 0..5u64 {
            let hash = hash_key(&state, k);
            assert_eq!(table.find(hash, |v| v.key == k).unwrap().value, 10);
        }
    }

    #[test]
    fn robin_hood_displacement() {
        // 53 slots. Keys 0 and 53 share home 0, key 1 has home 1.
        let mut table = HashTable::new(10, 0.5).unwrap();
        assert_eq!(table.capacity(), 53);

        insert_ident(&mut table, 0);
        insert_ident(&mut table, 1);
        // 53 probes past 0 (dist 1) and evicts 1 (dist 0) from slot 1.
        insert_ident(&mut table, 53);

        assert_eq!(table.probe_distance(0, |v| *v == 0), Some(0));
        assert_eq!(table.probe_distance(53, |v| *v == 53), Some(1));
        assert_eq!(table.probe_distance(1, |v| *v == 1), Some(1));
        assert_eq!(table.iter().copied().collect::<Vec<_>>(), vec![0, 53, 1]);
        table.assert_layout(ident);
    }

    #[test]
    fn probing_wraps_around() {
        let mut table = HashTable::new(10, 0.5).unwrap();
        insert_ident(&mut table, 52);
        insert_ident(&mut table, 105);

        assert_eq!(table.probe_distance(105, |v| *v == 105), Some(1));
        assert_eq!(table.iter().copied().collect::<Vec<_>>(), vec![105, 52]);
        assert!(table.contains(105, |v| *v == 105));
        table.assert_layout(ident);
    }

    #[test]
    fn remove_items() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::default();
        let rehash = |v: &Item| hash_key(&state, v.key);
        for k in 0..100u64 {
            let hash = hash_key(&state, k);
            table
                .insert(hash, Item { key: k, value: k as i32 }, |v| v.key == k, rehash)
                .unwrap();
        }

        for k in (0..100u64).step_by(2) {
            let hash = hash_key(&state, k);
            let removed = table.remove(hash, |v| v.key == k).unwrap();
            assert_eq!(removed.key, k);
        }
        assert_eq!(table.len(), 50);
        assert_eq!(table.tombstones(), 50);
        table.assert_layout(rehash);

        for k in 0..100u64 {
            let hash = hash_key(&state, k);
            assert_eq!(table.find(hash, |v| v.key == k).is_some(), k % 2 == 1);
        }

        let hash = hash_key(&state, 0);
        assert_eq!(table.remove(hash, |v| v.key == 0), Err(TableError::NotFound));
        assert_eq!(table.flag(), Status::NotFound);
        assert_eq!(table.len(), 50);
    }

    #[test]
    fn remove_from_empty_table() {
        let mut table: HashTable<u64> = HashTable::default();
        assert_eq!(table.remove(3, |v| *v == 3), Err(TableError::Empty));
        assert_eq!(table.flag(), Status::Empty);
    }

    #[test]
    fn tombstones_are_reused_and_probed_past() {
        let mut table = HashTable::new(10, 0.5).unwrap();
        insert_ident(&mut table, 0);
        insert_ident(&mut table, 53);
        insert_ident(&mut table, 106);

        table.remove(53, |v| *v == 53).unwrap();
        assert_eq!(table.tombstones(), 1);
        // 106 sits past the tombstone and is still reachable.
        assert!(table.contains(106, |v| *v == 106));

        insert_ident(&mut table, 159);
        assert_eq!(table.tombstones(), 0);
        assert_eq!(table.probe_distance(159, |v| *v == 159), Some(1));
        table.assert_layout(ident);
    }

    #[test]
    fn lookup_terminates_when_no_empty_slot_remains() {
        let mut table = HashTable::new(10, 0.5).unwrap();
        let cap = table.capacity() as u64;
        // Fill and drain repeatedly, leaving every slot deleted or filled.
        for round in 0..cap {
            let v = round;
            insert_ident(&mut table, v);
            if round + 1 < cap {
                table.remove(v, |x| *x == v).unwrap();
            }
        }
        assert_eq!(table.len(), 1);
        assert!(table.find(cap * 7 + 3, |x| *x == cap * 7 + 3).is_none());
    }

    #[test]
    fn backward_shift_leaves_no_tombstones() {
        let config = TableConfig::new()
            .with_capacity(10)
            .with_load(0.5)
            .with_deletion_mode(DeletionMode::BackwardShift);
        let mut table = HashTable::with_config(config).unwrap();
        for v in [0u64, 53, 106, 1, 2] {
            insert_ident(&mut table, v);
        }
        table.assert_layout(ident);

        table.remove(0, |v| *v == 0).unwrap();
        assert_eq!(table.tombstones(), 0);
        table.assert_layout(ident);
        assert_eq!(table.probe_distance(53, |v| *v == 53), Some(0));
        assert_eq!(table.probe_distance(106, |v| *v == 106), Some(1));
        for v in [53u64, 106, 1, 2] {
            assert!(table.contains(v, |x| *x == v));
        }
        assert!(!table.contains(0, |x| *x == 0));
    }

    #[test]
    fn capacity_unchanged_below_load_limit() {
        let mut table = HashTable::new(53, 0.8).unwrap();
        assert_eq!(table.capacity(), 97);
        for v in 1..=42u64 {
            insert_ident(&mut table, v);
        }
        assert_eq!(table.capacity(), 97);
        assert_eq!(table.len(), 42);
        assert!(table.contains(1, |v| *v == 1));
        assert!(!table.contains(43, |v| *v == 43));
    }

    #[test]
    fn grows_to_next_prime_when_full() {
        let mut table = HashTable::new(10, 0.5).unwrap();
        assert_eq!(table.capacity(), 53);
        // 53 * 0.5 = 26.5, so a 27th value does not fit.
        for v in 0..26u64 {
            insert_ident(&mut table, v);
        }
        assert!(table.is_full());
        assert_eq!(table.capacity(), 53);
        insert_ident(&mut table, 26);
        // resize(54) plans 54 / 0.5 = 108 -> 191
        assert_eq!(table.capacity(), 191);
        assert_eq!(table.len(), 27);
        table.assert_layout(ident);
        for v in 0..27u64 {
            assert!(table.contains(v, |x| *x == v));
        }
    }

    #[test]
    fn resize_noop_and_errors() {
        let mut table = HashTable::new(10, 0.5).unwrap();
        for v in 0..10u64 {
            insert_ident(&mut table, v);
        }
        assert_eq!(table.resize(53, ident), Ok(()));
        assert_eq!(table.resize(5, ident), Ok(()));
        assert_eq!(table.capacity(), 53);

        assert_eq!(table.resize(usize::MAX, ident), Err(TableError::Overflow(usize::MAX)));
        assert_eq!(table.flag(), Status::Error);
        assert_eq!(table.capacity(), 53);
        assert_eq!(table.len(), 10);
    }

    #[test]
    fn resize_rejects_shrink_below_contents() {
        let mut table = HashTable::new(40, 0.5).unwrap();
        assert_eq!(table.capacity(), 97);
        for v in 0..45u64 {
            insert_ident(&mut table, v);
        }
        // 49 / 0.5 = 98 exceeds 97 slots, but 53 slots cannot hold 45 / 0.5.
        assert!(matches!(table.resize(49, ident), Err(TableError::Invalid(_))));
        assert_eq!(table.flag(), Status::Invalid);
        assert_eq!(table.capacity(), 97);
        assert_eq!(table.len(), 45);
    }

    #[test]
    fn resize_purges_tombstones() {
        let mut table = HashTable::new(10, 0.5).unwrap();
        for v in 0..20u64 {
            insert_ident(&mut table, v);
        }
        for v in 0..10u64 {
            table.remove(v, |x| *x == v).unwrap();
        }
        assert_eq!(table.tombstones(), 10);

        table.resize(200, ident).unwrap();
        assert_eq!(table.capacity(), 769);
        assert_eq!(table.tombstones(), 0);
        assert_eq!(table.len(), 10);
        table.assert_layout(ident);
    }

    #[test]
    fn retain_in_both_deletion_modes() {
        for mode in [DeletionMode::Tombstone, DeletionMode::BackwardShift] {
            let config = TableConfig::new()
                .with_capacity(100)
                .with_deletion_mode(mode);
            let mut table = HashTable::with_config(config).unwrap();
            for v in 0..100u64 {
                // Crowd the values into a few home slots.
                table.insert(v % 7, v, |x| *x == v, |x| *x % 7).unwrap();
            }
            table.retain(|v| v % 3 == 0);
            assert_eq!(table.len(), 34);
            table.assert_layout(|x| *x % 7);
            for v in 0..100u64 {
                assert_eq!(table.peek(v % 7, |x| *x == v).is_some(), v % 3 == 0);
            }
        }
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut table = HashTable::new(10, 0.5).unwrap();
        for v in 0..40u64 {
            insert_ident(&mut table, v);
        }
        let capacity = table.capacity();
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.capacity(), capacity);
        assert_eq!(table.iter().count(), 0);
    }

    #[test]
    fn test_clone() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::default();
        let rehash = |v: &Item| hash_key(&state, v.key);
        for k in 0..50u64 {
            let hash = hash_key(&state, k);
            table
                .insert(hash, Item { key: k, value: k as i32 }, |v| v.key == k, rehash)
                .unwrap();
        }
        table.remove(hash_key(&state, 3), |v| v.key == 3).unwrap();

        let cloned = table.clone();
        assert_eq!(cloned.len(), table.len());
        assert_eq!(cloned.capacity(), table.capacity());
        assert_eq!(cloned.tombstones(), 1);
        assert!(
            cloned
                .iter()
                .zip(table.iter())
                .all(|(a, b)| a == b)
        );
    }

    #[test]
    fn copy_of_rebuilds_without_tombstones() {
        let recorder = Arc::new(Recorder::default());
        let mut table = HashTable::new(10, 0.5).unwrap();
        table.customize(Some(recorder.clone()));
        for v in 0..20u64 {
            insert_ident(&mut table, v);
        }
        table.remove(4, |x| *x == 4).unwrap();

        let copy = table.copy_of(ident).unwrap();
        assert_eq!(copy.len(), 19);
        assert_eq!(copy.capacity(), table.capacity());
        assert_eq!(copy.tombstones(), 0);
        assert!(copy.callbacks().is_some());
        assert!(copy.equals(&table, ident, ident, |a, b| a == b, |a, b| a == b));
        copy.assert_layout(ident);
    }

    #[test]
    fn equals_ignores_layout() {
        let mut a = HashTable::new(10, 0.5).unwrap();
        let mut b = HashTable::new(500, 0.9).unwrap();
        for v in 0..30u64 {
            insert_ident(&mut a, v);
            insert_ident(&mut b, 29 - v);
        }
        assert!(a.equals(&b, ident, ident, |x, y| x == y, |x, y| x == y));
        assert!(b.equals(&a, ident, ident, |x, y| x == y, |x, y| x == y));

        b.remove(7, |x| *x == 7).unwrap();
        assert!(!a.equals(&b, ident, ident, |x, y| x == y, |x, y| x == y));
        insert_ident(&mut b, 700);
        assert!(!a.equals(&b, ident, ident, |x, y| x == y, |x, y| x == y));
    }

    #[test]
    fn default_table_uses_planned_capacity() {
        let table: HashTable<u64> = HashTable::default();
        let config = TableConfig::default();
        assert_eq!(Ok(table.capacity()), config.planned_capacity());
        assert_eq!(table.load(), config.load);
        assert!(table.is_empty());
        assert_eq!(table.tombstones(), 0);
    }

    #[test]
    fn equals_uses_each_tables_own_hash() {
        let scrambled = |v: &u64| v.wrapping_mul(0x9E37_79B9_7F4A_7C15) >> 7;
        let mut a = HashTable::new(10, 0.5).unwrap();
        let mut b = HashTable::new(300, 0.5).unwrap();
        for v in 0..25u64 {
            insert_ident(&mut a, v);
            b.insert(scrambled(&v), v, |x| *x == v, scrambled).unwrap();
        }
        b.assert_layout(scrambled);

        assert!(a.equals(&b, ident, scrambled, |x, y| x == y, |x, y| x == y));
        assert!(b.equals(&a, scrambled, ident, |x, y| x == y, |x, y| x == y));

        // Looking up `b` with `a`'s hash misses values it holds.
        assert!(!a.equals(&b, ident, ident, |x, y| x == y, |x, y| x == y));

        b.remove(scrambled(&24), |x| *x == 24).unwrap();
        b.insert(scrambled(&99), 99, |x| *x == 99, scrambled).unwrap();
        assert!(!a.equals(&b, ident, scrambled, |x, y| x == y, |x, y| x == y));
        assert!(!b.equals(&a, scrambled, ident, |x, y| x == y, |x, y| x == y));
    }

    #[test]
    fn max_and_min() {
        let mut table = HashTable::new(10, 0.5).unwrap();
        assert_eq!(table.max_by(|a: &u64, b| a.cmp(b)), Err(TableError::Empty));
        assert_eq!(table.flag(), Status::Empty);
        for v in [17u64, 3, 99, 42] {
            insert_ident(&mut table, v);
        }
        assert_eq!(table.max_by(|a, b| a.cmp(b)), Ok(&99));
        assert_eq!(table.min_by(|a, b| a.cmp(b)), Ok(&3));
        assert_eq!(table.flag(), Status::Ok);
    }

    #[test]
    fn iterators_visit_every_value_in_slot_order() {
        let state = HashState::default();
        let mut table: HashTable<u64> = HashTable::default();
        let rehash = |v: &u64| hash_key(&state, *v);
        for k in 0..300u64 {
            table.insert(hash_key(&state, k), k, |v| *v == k, rehash).unwrap();
        }
        for k in (0..300u64).step_by(3) {
            table.remove(hash_key(&state, k), |v| *v == k).unwrap();
        }

        let forward: Vec<u64> = table.iter().copied().collect();
        let mut backward: Vec<u64> = table.iter().rev().copied().collect();
        backward.reverse();
        assert_eq!(forward.len(), table.len());
        assert_eq!(forward, backward);
        assert_eq!(table.iter().len(), 200);

        let mut sorted = forward.clone();
        sorted.sort_unstable();
        let expected: Vec<u64> = (0..300).filter(|k| k % 3 != 0).collect();
        assert_eq!(sorted, expected);

        assert_eq!(table.iter_mut().count(), 200);
        let owned: Vec<u64> = table.into_iter().collect();
        assert_eq!(owned, forward);
    }

    #[test]
    fn cursor_walks_both_directions() {
        let mut table = HashTable::new(10, 0.5).unwrap();
        for v in [5u64, 10, 15, 20] {
            insert_ident(&mut table, v);
        }
        table.remove(10, |x| *x == 10).unwrap();

        let mut cursor = table.cursor();
        assert!(cursor.at_start());
        assert!(!cursor.at_end());
        let mut forward = vec![];
        while !cursor.at_end() {
            forward.push((cursor.index(), *cursor.get().unwrap()));
            cursor.move_next();
        }
        assert_eq!(forward, vec![(0, 5), (1, 15), (2, 20)]);
        assert!(!cursor.move_next());

        let mut cursor = table.cursor_end();
        assert!(cursor.at_end());
        let mut backward = vec![];
        while !cursor.at_start() {
            backward.push(*cursor.get().unwrap());
            cursor.move_prev();
        }
        assert_eq!(backward, vec![20, 15, 5]);
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn cursor_jumps() {
        let mut table = HashTable::new(10, 0.5).unwrap();
        for v in 0..8u64 {
            insert_ident(&mut table, v);
        }

        let mut cursor = table.cursor();
        assert!(!cursor.advance(0));
        assert!(!cursor.advance(8));
        assert!(cursor.advance(3));
        assert_eq!(cursor.get(), Some(&3));
        assert!(!cursor.rewind(4));
        assert!(cursor.rewind(2));
        assert_eq!(cursor.get(), Some(&1));

        assert!(cursor.go_to(7));
        assert_eq!((cursor.index(), cursor.get()), (7, Some(&7)));
        assert!(cursor.go_to(7));
        assert!(!cursor.go_to(8));
        assert!(cursor.go_to(2));
        assert_eq!(cursor.get(), Some(&2));

        cursor.to_end();
        assert_eq!(cursor.get(), Some(&7));
        cursor.to_start();
        assert_eq!(cursor.get(), Some(&0));
    }

    #[test]
    fn cursor_on_empty_table() {
        let table: HashTable<u64> = HashTable::default();
        let mut cursor = table.cursor();
        assert!(cursor.at_start());
        assert!(cursor.at_end());
        assert!(!cursor.move_next());
        assert!(!cursor.move_prev());
        assert!(!cursor.go_to(0));
        assert_eq!(cursor.get(), None);
        let cursor = table.cursor_end();
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn callbacks_fire_on_success_only() {
        let recorder = Arc::new(Recorder::default());
        let mut table = HashTable::new(10, 0.5).unwrap();
        table.customize(Some(recorder.clone()));

        insert_ident(&mut table, 1);
        insert_ident(&mut table, 2);
        let _ = table.insert(2, 2, |x| *x == 2, ident);
        assert!(table.find(1, |x| *x == 1).is_some());
        assert!(table.find(9, |x| *x == 9).is_none());
        table.remove(1, |x| *x == 1).unwrap();
        let _ = table.remove(1, |x| *x == 1);
        table.resize(100, ident).unwrap();
        let _ = table.max_by(|a, b| a.cmp(b));

        // [create, read, update, delete, resize]
        assert_eq!(recorder.counts(), [2, 2, 0, 1, 1]);
    }

    #[test]
    fn probe_stats_histogram() {
        let mut table = HashTable::new(10, 0.5).unwrap();
        for v in [0u64, 53, 106, 1] {
            insert_ident(&mut table, v);
        }
        let stats = table.probe_stats();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.capacity, 53);
        // 0@0, 53@1, 106@2, 1@3 (dist 2)
        assert_eq!(stats.histogram, vec![1, 1, 2]);
        assert_eq!(stats.max_probe, 2);
        assert!((stats.mean_probe - 1.25).abs() < 1e-9);
    }

    #[test]
    fn debug_output_lists_slots() {
        let mut table = HashTable::new(10, 0.5).unwrap();
        insert_ident(&mut table, 3);
        let rendered = format!("{:?}", table);
        assert!(rendered.contains("count: 1"));
        assert!(rendered.contains("3: (0, 3)"));
        assert!(rendered.starts_with("HashTable"));
    }
}
