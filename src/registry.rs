//! The definition registry.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use ahash::RandomState;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::config::RegistryOptions;
use crate::definition::builder::{define, define_named, DefinitionStage, KeyBuilder};
use crate::definition::ObjectDefinition;
use crate::descriptors::DefinitionDescriptor;
use crate::error::{DiError, DiResult};
use crate::key::Key;
use crate::observer::Observers;
use crate::scope::Instance;
use crate::traits::ResolverCore;

static GLOBAL: Lazy<Registry> = Lazy::new(Registry::new);

/// Table mapping keys to object definitions.
///
/// A definition is reachable under its primary key and every alias key.
/// Registering replaces whatever each of those keys pointed to before; the
/// replacement is applied under one write lock, so a concurrent lookup sees
/// either the previous definition or the new one for every key.
///
/// Lookups hold the lock only long enough to clone an `Arc`; no lock is held
/// while an instance is constructed.
///
/// # Examples
///
/// ```rust
/// use carbon_di::{Class, DiError, Key, Registry, Resolver};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// #[derive(Default)]
/// struct English;
///
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         "hello".to_string()
///     }
/// }
///
/// let registry = Registry::new();
/// registry
///     .define(|b| {
///         b.protocol(Key::protocol::<dyn Greeter>())
///             .factory(|_| Arc::new(English) as Arc<dyn Greeter>)
///             .singleton()
///     })
///     .unwrap();
///
/// let greeter = registry.get_protocol::<dyn Greeter>(&Key::protocol::<dyn Greeter>()).unwrap();
/// assert_eq!(greeter.greet(), "hello");
///
/// assert!(matches!(registry.lookup(&Key::named("nope")), Err(DiError::NotFound(_))));
/// ```
pub struct Registry {
    definitions: RwLock<HashMap<Key, Arc<ObjectDefinition>, RandomState>>,
    max_depth: usize,
    observers: Observers,
}

impl Registry {
    /// Creates an empty registry with default options.
    pub fn new() -> Self {
        Self::with_options(RegistryOptions::default())
    }

    pub fn with_options(options: RegistryOptions) -> Self {
        Self {
            definitions: RwLock::new(HashMap::default()),
            max_depth: options.max_depth,
            observers: options.observers,
        }
    }

    /// The process-wide registry, empty until something registers into it.
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    /// Inserts `definition` under its primary key and every alias key.
    ///
    /// A later definition sharing a key with an earlier one silently takes
    /// that key over; keys of the earlier definition that the new one does
    /// not claim keep pointing to it.
    pub fn register(&self, definition: ObjectDefinition) -> Arc<ObjectDefinition> {
        let definition = Arc::new(definition);
        let mut shadowed = Vec::new();
        {
            let mut definitions = self.definitions.write();
            for key in definition.keys() {
                if let Some(previous) = definitions.insert(key.clone(), definition.clone()) {
                    if previous.id != definition.id {
                        shadowed.push((key.clone(), previous));
                    }
                }
            }
        }

        tracing::debug!(
            target: "carbon_di",
            key = %definition.primary_key(),
            aliases = definition.alias_keys().len(),
            scope = %definition.scope(),
            replaced = shadowed.len(),
            "registered definition"
        );
        if self.observers.has_observers() {
            for (key, previous) in &shadowed {
                self.observers.shadowed(key, previous);
            }
            self.observers.registered(&definition);
        }
        definition
    }

    /// Builds a definition with [`define`] and registers it.
    ///
    /// Returns the primary key of the new definition. Nothing is registered
    /// when the builder reports [`DiError::InvalidDefinition`].
    pub fn define<F, S>(&self, build: F) -> DiResult<Key>
    where
        F: FnOnce(KeyBuilder) -> S,
        S: DefinitionStage,
    {
        define(build).register(self)
    }

    /// Builds a definition keyed by `name` with [`define_named`] and registers it.
    pub fn define_named<F, S>(&self, name: impl Into<String>, build: F) -> DiResult<Key>
    where
        F: FnOnce(KeyBuilder) -> S,
        S: DefinitionStage,
    {
        define_named(name, build).register(self)
    }

    /// The definition registered under `key`.
    pub fn lookup(&self, key: &Key) -> DiResult<Arc<ObjectDefinition>> {
        self.get_definition(key).ok_or_else(|| DiError::NotFound(key.clone()))
    }

    /// Looks up every key in `keys` under one read lock.
    ///
    /// The result is a consistent snapshot: a registration running
    /// concurrently is either fully visible or not visible at all.
    pub fn lookup_all(&self, keys: &[Key]) -> DiResult<Vec<Arc<ObjectDefinition>>> {
        let definitions = self.definitions.read();
        keys.iter()
            .map(|key| definitions.get(key).cloned().ok_or_else(|| DiError::NotFound(key.clone())))
            .collect()
    }

    /// The definition registered under `key`, if any.
    pub fn get_definition(&self, key: &Key) -> Option<Arc<ObjectDefinition>> {
        self.definitions.read().get(key).cloned()
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.definitions.read().contains_key(key)
    }

    /// Number of registered keys, aliases included.
    pub fn len(&self) -> usize {
        self.definitions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.read().is_empty()
    }

    /// Every registered key, in no particular order.
    pub fn keys(&self) -> Vec<Key> {
        self.definitions.read().keys().cloned().collect()
    }

    /// Distinct definitions still reachable through at least one key.
    pub fn definitions(&self) -> Vec<Arc<ObjectDefinition>> {
        let definitions = self.definitions.read();
        let mut seen: HashSet<u64, RandomState> = HashSet::with_capacity_and_hasher(definitions.len(), RandomState::new());
        let mut out: Vec<Arc<ObjectDefinition>> = Vec::with_capacity(definitions.len());
        for definition in definitions.values() {
            if seen.insert(definition.id) {
                out.push(definition.clone());
            }
        }
        out.sort_by_key(|definition| definition.id);
        out
    }

    /// Introspection snapshots, one per distinct definition, oldest first.
    pub fn descriptors(&self) -> Vec<DefinitionDescriptor> {
        self.definitions().iter().map(|d| DefinitionDescriptor::from_definition(d)).collect()
    }

    /// Resolves `key` through its definition's scope.
    pub fn resolve(&self, key: &Key) -> DiResult<Instance> {
        crate::provider::resolve_key(self, key)
    }

    pub(crate) fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub(crate) fn observers(&self) -> &Observers {
        &self.observers
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Registry Debug ===\n");
        for definition in self.definitions() {
            s.push_str(&format!(
                "  {} [{}] aliases={:?} cached={}\n",
                definition.primary_key(),
                definition.scope(),
                definition.alias_keys().iter().map(|k| k.to_string()).collect::<Vec<_>>(),
                definition.scope_slot().cached().is_some(),
            ));
        }
        s
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolverCore for Registry {
    fn resolve_any(&self, key: &Key) -> DiResult<Instance> {
        self.resolve(key)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("keys", &self.len())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}
