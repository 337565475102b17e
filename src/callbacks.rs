//! Hooks invoked after successful container operations.

use alloc::sync::Arc;

/// Observer notified after a container operation succeeds.
///
/// Every method has an empty default, so implementors only override the
/// events they care about. Hooks run inline on the calling thread, after the
/// container has finished updating itself.
///
/// | hook     | fired by                                          |
/// |----------|---------------------------------------------------|
/// | `create` | an entry was added                                |
/// | `read`   | a lookup found its key, or `max`/`min` succeeded  |
/// | `update` | an existing value or multiplicity was replaced    |
/// | `delete` | an entry was removed                              |
/// | `resize` | the slot array was rebuilt (or already large enough) |
///
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::AtomicUsize;
/// use std::sync::atomic::Ordering;
///
/// use robin_hash::Callbacks;
/// use robin_hash::HashSet;
///
/// #[derive(Default)]
/// struct Creates(AtomicUsize);
///
/// impl Callbacks for Creates {
///     fn create(&self) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
/// }
///
/// let hooks = Arc::new(Creates::default());
/// let mut set: HashSet<u32> = HashSet::default();
/// set.customize(Some(hooks.clone()));
/// set.insert(1).unwrap();
/// set.insert(2).unwrap();
/// assert_eq!(hooks.0.load(Ordering::Relaxed), 2);
/// ```
pub trait Callbacks {
    /// An entry was added.
    fn create(&self) {}
    /// A lookup succeeded.
    fn read(&self) {}
    /// An existing entry was modified in place.
    fn update(&self) {}
    /// An entry was removed.
    fn delete(&self) {}
    /// The slot array was rebuilt.
    fn resize(&self) {}
}

/// Shared handle to a set of hooks.
pub type SharedCallbacks = Arc<dyn Callbacks + Send + Sync>;

#[derive(Clone, Copy)]
pub(crate) enum Event {
    Create,
    Read,
    Update,
    Delete,
    Resize,
}

#[inline]
pub(crate) fn dispatch(callbacks: Option<&SharedCallbacks>, event: Event) {
    let Some(cb) = callbacks else {
        return;
    };
    match event {
        Event::Create => cb.create(),
        Event::Read => cb.read(),
        Event::Update => cb.update(),
        Event::Delete => cb.delete(),
        Event::Resize => cb.resize(),
    }
}
