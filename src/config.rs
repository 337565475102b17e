//! Construction parameters shared by every container.

use crate::capacity;
use crate::error::Result;

/// Number of entries a default-constructed container holds before growing.
pub const DEFAULT_CAPACITY: usize = 32;

/// Load factor used when none is given.
pub const DEFAULT_LOAD: f64 = 0.75;

/// How a removal vacates its slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeletionMode {
    /// Mark the slot deleted. Lookups probe past it and inserts may reuse it.
    /// Tombstones are only purged by a rehash.
    #[default]
    Tombstone,
    /// Shift the following run of displaced entries back by one slot, leaving
    /// no tombstone behind.
    BackwardShift,
}

/// Parameters for building a table.
///
/// ```rust
/// use robin_hash::DeletionMode;
/// use robin_hash::TableConfig;
///
/// let config = TableConfig::new()
///     .with_capacity(1_000)
///     .with_load(0.6)
///     .with_deletion_mode(DeletionMode::BackwardShift);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.planned_capacity(), Ok(3_067));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableConfig {
    /// Number of entries the table should hold before its first resize.
    pub capacity: usize,
    /// Maximum ratio of live entries to slots, strictly between 0 and 1.
    pub load: f64,
    /// Deletion strategy.
    pub deletion: DeletionMode,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            load: DEFAULT_LOAD,
            deletion: DeletionMode::Tombstone,
        }
    }
}

impl TableConfig {
    /// Creates a configuration with the default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of entries to hold before the first resize.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the load factor.
    ///
    /// Out-of-range values are not clamped; they are reported by
    /// [`TableConfig::validate`] and by container construction.
    pub fn with_load(mut self, load: f64) -> Self {
        self.load = load;
        self
    }

    /// Sets the deletion strategy.
    pub fn with_deletion_mode(mut self, deletion: DeletionMode) -> Self {
        self.deletion = deletion;
        self
    }

    /// Checks the configuration without allocating.
    pub fn validate(&self) -> Result<()> {
        self.planned_capacity().map(|_| ())
    }

    /// The slot count a table built from this configuration starts with.
    pub fn planned_capacity(&self) -> Result<usize> {
        capacity::plan(self.capacity, self.load)
    }
}
