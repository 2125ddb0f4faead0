//! Construct-once cache slots backing the shared scopes.

use std::any::Any;
use std::sync::{Arc, Weak};

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::error::DiResult;
use crate::scope::ScopeKind;

/// Type-erased handle to a constructed object.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Scope policy state for one definition.
///
/// Each [`ObjectDefinition`](crate::ObjectDefinition) owns exactly one slot,
/// so the cache is keyed by definition identity without a separate map.
/// Callers for different definitions never contend on the same slot.
///
/// # Examples
///
/// ```rust
/// use carbon_di::{ScopeKind, ScopeSlot, Instance};
/// use std::sync::Arc;
///
/// let slot = ScopeSlot::new(ScopeKind::Singleton);
///
/// let a = slot.resolve(|| Ok(Arc::new(1u32) as Instance)).unwrap();
/// let b = slot.resolve(|| Ok(Arc::new(2u32) as Instance)).unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// assert_eq!(*a.downcast_ref::<u32>().unwrap(), 1);
/// ```
pub enum ScopeSlot {
    Prototype,
    /// Initialised at most once; a failed initialisation leaves it empty
    Singleton(OnceCell<Instance>),
    /// Non-owning handle; the mutex is the construct-once barrier for this definition
    WeakSingleton(Mutex<Option<Weak<dyn Any + Send + Sync>>>),
}

impl ScopeSlot {
    pub fn new(kind: ScopeKind) -> Self {
        match kind {
            ScopeKind::Prototype => ScopeSlot::Prototype,
            ScopeKind::Singleton => ScopeSlot::Singleton(OnceCell::new()),
            ScopeKind::WeakSingleton => ScopeSlot::WeakSingleton(Mutex::new(None)),
        }
    }

    pub fn kind(&self) -> ScopeKind {
        match self {
            ScopeSlot::Prototype => ScopeKind::Prototype,
            ScopeSlot::Singleton(_) => ScopeKind::Singleton,
            ScopeSlot::WeakSingleton(_) => ScopeKind::WeakSingleton,
        }
    }

    /// Returns the instance for this scope, calling `construct` only when needed.
    ///
    /// Concurrent first-time callers for the same slot block until the first
    /// construction completes and then all observe the same instance. If
    /// `construct` fails the error is returned and nothing is cached.
    pub fn resolve<F>(&self, construct: F) -> DiResult<Instance>
    where
        F: FnOnce() -> DiResult<Instance>,
    {
        match self {
            ScopeSlot::Prototype => construct(),
            ScopeSlot::Singleton(cell) => {
                if let Some(value) = cell.get() {
                    return Ok(value.clone());
                }
                cell.get_or_try_init(construct).cloned()
            }
            ScopeSlot::WeakSingleton(handle) => {
                let mut guard = handle.lock();
                if let Some(live) = guard.as_ref().and_then(Weak::upgrade) {
                    return Ok(live);
                }
                let value = construct()?;
                *guard = Some(Arc::downgrade(&value));
                Ok(value)
            }
        }
    }

    /// The currently cached instance, without constructing.
    ///
    /// Always `None` for prototypes, and for weak singletons whose last
    /// external holder has gone.
    pub fn cached(&self) -> Option<Instance> {
        match self {
            ScopeSlot::Prototype => None,
            ScopeSlot::Singleton(cell) => cell.get().cloned(),
            ScopeSlot::WeakSingleton(handle) => handle.lock().as_ref().and_then(Weak::upgrade),
        }
    }
}

impl std::fmt::Debug for ScopeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeSlot")
            .field("kind", &self.kind())
            .field("cached", &self.cached().is_some())
            .finish()
    }
}
