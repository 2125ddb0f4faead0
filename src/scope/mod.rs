//! Scope kinds and the per-definition scope policy.

mod slot;

pub use slot::{Instance, ScopeSlot};

use std::fmt;

/// Scope controlling how instances of a definition are shared
///
/// # Scope Characteristics
///
/// - **Prototype**: a fresh instance for every resolution, nothing cached
/// - **Singleton**: constructed once, cached for the registry's lifetime
/// - **WeakSingleton**: shared while someone outside the registry holds it,
///   rebuilt on the next resolution once the last holder drops it
///
/// # Examples
///
/// ```rust
/// use carbon_di::{Class, Key, Registry, Resolver};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Session;
///
/// let registry = Registry::new();
/// registry.define(|b| b.class(Class::of::<Session>()).singleton_weak()).unwrap();
///
/// let key = Key::class::<Session>();
/// let first = registry.get::<Session>(&key).unwrap();
/// let again = registry.get::<Session>(&key).unwrap();
/// assert!(Arc::ptr_eq(&first, &again));
///
/// drop(first);
/// drop(again);
/// // Nobody holds the session any more, so the next resolution rebuilds it.
/// let fresh = registry.get::<Session>(&key).unwrap();
/// assert_eq!(Arc::strong_count(&fresh), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ScopeKind {
    /// New instance per resolution, never cached
    #[default]
    Prototype,
    /// Single instance per definition, cached forever
    Singleton,
    /// Single instance per definition while externally owned
    ///
    /// The cache only keeps a weak handle. Once every strong handle handed
    /// out by the registry is dropped, the next resolution constructs again.
    WeakSingleton,
}

impl ScopeKind {
    /// Returns `true` for scopes that share one instance between resolutions.
    #[inline]
    pub fn is_shared(&self) -> bool {
        !matches!(self, ScopeKind::Prototype)
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKind::Prototype => write!(f, "Prototype"),
            ScopeKind::Singleton => write!(f, "Singleton"),
            ScopeKind::WeakSingleton => write!(f, "WeakSingleton"),
        }
    }
}
