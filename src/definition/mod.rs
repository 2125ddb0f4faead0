//! Finalized object definitions.
//!
//! An [`ObjectDefinition`] is produced only by a completed builder chain
//! (see [`builder`]) and is immutable from then on. The scope slot it carries
//! is the only interior state, and it is touched only through resolution.

pub mod builder;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use smallvec::SmallVec;

use crate::class::Class;
use crate::error::DiResult;
use crate::key::Key;
use crate::provider::ObjectContext;
use crate::scope::{Instance, ScopeKind, ScopeSlot};

/// Factory producing an instance from the resolution context.
pub type FactoryFn = Arc<dyn for<'a> Fn(&ObjectContext<'a>, &Key) -> DiResult<Instance> + Send + Sync>;

/// Callback run once per construction, after autowiring.
pub type CompletionHook = Arc<dyn for<'a> Fn(&ObjectContext<'a>, &Instance) + Send + Sync>;

/// Alias keys; most definitions carry a handful at most.
pub type AliasKeys = SmallVec<[Key; 4]>;

static NEXT_DEFINITION_ID: AtomicU64 = AtomicU64::new(1);

/// How instances of a definition are produced.
#[derive(Clone)]
pub enum Construction {
    /// Class constructor followed by property autowiring
    ByClass(Class),
    /// Caller-supplied factory
    ByFactory(FactoryFn),
}

impl Construction {
    pub fn is_factory(&self) -> bool {
        matches!(self, Construction::ByFactory(_))
    }

    /// The class for class-based construction.
    pub fn class(&self) -> Option<&Class> {
        match self {
            Construction::ByClass(class) => Some(class),
            Construction::ByFactory(_) => None,
        }
    }
}

impl fmt::Debug for Construction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Construction::ByClass(class) => f.debug_tuple("ByClass").field(class).finish(),
            Construction::ByFactory(_) => f.write_str("ByFactory(..)"),
        }
    }
}

/// Immutable record describing how to construct and share one object.
///
/// # Examples
///
/// ```rust
/// use carbon_di::{define, Class, Key, ScopeKind};
///
/// trait Cache: Send + Sync {}
/// trait Store: Send + Sync {}
///
/// #[derive(Default)]
/// struct MemoryCache;
///
/// let definition = define(|b| {
///     b.protocol(Key::protocol::<dyn Cache>())
///         .alias_protocol(Key::protocol::<dyn Store>())
///         .class(Class::of::<MemoryCache>())
///         .singleton()
/// })
/// .finalize()
/// .unwrap();
///
/// assert_eq!(definition.primary_key(), &Key::protocol::<dyn Cache>());
/// assert_eq!(definition.alias_keys(), &[Key::protocol::<dyn Store>()]);
/// assert_eq!(definition.scope(), ScopeKind::Singleton);
/// ```
pub struct ObjectDefinition {
    pub(crate) id: u64,
    pub(crate) primary_key: Key,
    pub(crate) alias_keys: AliasKeys,
    pub(crate) construction: Construction,
    pub(crate) autowired_properties: Vec<String>,
    pub(crate) on_completed: Option<CompletionHook>,
    pub(crate) slot: ScopeSlot,
}

impl ObjectDefinition {
    pub(crate) fn new(
        primary_key: Key,
        alias_keys: AliasKeys,
        construction: Construction,
        scope: ScopeKind,
        autowired_properties: Vec<String>,
        on_completed: Option<CompletionHook>,
    ) -> Self {
        Self {
            id: NEXT_DEFINITION_ID.fetch_add(1, Ordering::Relaxed),
            primary_key,
            alias_keys,
            construction,
            autowired_properties,
            on_completed,
            slot: ScopeSlot::new(scope),
        }
    }

    /// Process-unique identity of this definition.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn primary_key(&self) -> &Key {
        &self.primary_key
    }

    /// Alias keys in declaration order, never containing the primary key.
    pub fn alias_keys(&self) -> &[Key] {
        &self.alias_keys
    }

    /// Primary key followed by every alias.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        std::iter::once(&self.primary_key).chain(self.alias_keys.iter())
    }

    pub fn construction(&self) -> &Construction {
        &self.construction
    }

    pub fn scope(&self) -> ScopeKind {
        self.slot.kind()
    }

    pub fn autowired_properties(&self) -> &[String] {
        &self.autowired_properties
    }

    pub fn has_completion_hook(&self) -> bool {
        self.on_completed.is_some()
    }

    /// The scope policy state of this definition.
    pub fn scope_slot(&self) -> &ScopeSlot {
        &self.slot
    }
}

impl fmt::Debug for ObjectDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectDefinition")
            .field("id", &self.id)
            .field("primary_key", &self.primary_key)
            .field("alias_keys", &self.alias_keys)
            .field("construction", &self.construction)
            .field("scope", &self.scope())
            .field("autowired_properties", &self.autowired_properties)
            .field("has_completion_hook", &self.on_completed.is_some())
            .finish()
    }
}
