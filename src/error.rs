use core::fmt;

/// The outcome of the most recent operation on a container.
///
/// Every container records one of these after each operation and exposes it
/// through `flag()`. Fallible operations additionally return a [`TableError`]
/// whose [`TableError::status`] is the same value, so callers can use either
/// `?`-style propagation or inspect the flag after the fact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Status {
    /// The operation succeeded.
    #[default]
    Ok,
    /// An argument was rejected (zero capacity, load out of range, shrinking
    /// below the current contents).
    Invalid,
    /// The operation needs at least one entry but the container is empty.
    Empty,
    /// The requested key is not present.
    NotFound,
    /// The allocator could not provide the slot array.
    Alloc,
    /// The key is already present.
    Duplicate,
    /// An arithmetic overflow or internal inconsistency was detected.
    Error,
}

impl Status {
    /// Returns the canonical upper-case name of the status.
    ///
    /// ```rust
    /// use robin_hash::Status;
    ///
    /// assert_eq!(Status::NotFound.as_str(), "NOT_FOUND");
    /// ```
    pub const fn as_str(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Invalid => "INVALID",
            Status::Empty => "EMPTY",
            Status::NotFound => "NOT_FOUND",
            Status::Alloc => "ALLOC",
            Status::Duplicate => "DUPLICATE",
            Status::Error => "ERROR",
        }
    }

    /// Returns `true` for [`Status::Ok`].
    pub const fn is_ok(self) -> bool {
        matches!(self, Status::Ok)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by table and container operations.
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
pub enum TableError {
    /// An argument was rejected.
    #[error("invalid argument: {0}")]
    Invalid(&'static str),

    /// The container has no entries.
    #[error("container is empty")]
    Empty,

    /// The key is not present in the container.
    #[error("key not found")]
    NotFound,

    /// Allocating the slot array failed.
    #[error("failed to allocate {0} slots")]
    Alloc(usize),

    /// The key is already present in the container.
    #[error("key already present")]
    Duplicate,

    /// The requested capacity overflows the addressable slot count.
    #[error("capacity {0} overflows at the configured load factor")]
    Overflow(usize),
}

impl TableError {
    /// Maps the error to the status flag recorded on the container.
    pub const fn status(&self) -> Status {
        match self {
            TableError::Invalid(_) => Status::Invalid,
            TableError::Empty => Status::Empty,
            TableError::NotFound => Status::NotFound,
            TableError::Alloc(_) => Status::Alloc,
            TableError::Duplicate => Status::Duplicate,
            TableError::Overflow(_) => Status::Error,
        }
    }
}

impl From<TableError> for Status {
    fn from(err: TableError) -> Self {
        err.status()
    }
}

/// Result type for table and container operations.
pub type Result<T> = core::result::Result<T, TableError>;
