//! Definition descriptors for introspection and diagnostics.

use crate::definition::{Construction, ObjectDefinition};
use crate::scope::ScopeKind;

/// Snapshot of a registered definition
///
/// Descriptors are plain data: keys are rendered to strings, and the
/// `instantiated` flag reflects the scope cache at the moment the snapshot
/// was taken.
///
/// # Examples
///
/// ```rust
/// use carbon_di::{Class, Key, Registry, Resolver, ScopeKind};
///
/// trait Clock: Send + Sync {}
///
/// #[derive(Default)]
/// struct SystemClock;
///
/// let registry = Registry::new();
/// registry
///     .define(|b| b.protocol(Key::protocol::<dyn Clock>()).class(Class::of::<SystemClock>()).singleton())
///     .unwrap();
///
/// let descriptor = &registry.descriptors()[0];
/// assert_eq!(descriptor.scope, ScopeKind::Singleton);
/// assert!(descriptor.class_name.as_deref().unwrap().ends_with("SystemClock"));
/// assert!(!descriptor.instantiated);
///
/// registry.resolve(&Key::protocol::<dyn Clock>()).unwrap();
/// assert!(registry.descriptors()[0].instantiated);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DefinitionDescriptor {
    /// Primary key, rendered
    pub primary_key: String,
    /// Alias keys in declaration order, rendered
    pub alias_keys: Vec<String>,
    pub scope: ScopeKind,
    /// `true` for factory-based definitions
    pub factory: bool,
    /// Class name for class-based definitions
    pub class_name: Option<&'static str>,
    pub autowired_properties: Vec<String>,
    pub has_completion_hook: bool,
    /// Whether the scope cache currently holds a live instance
    pub instantiated: bool,
}

impl DefinitionDescriptor {
    pub fn from_definition(definition: &ObjectDefinition) -> Self {
        let (factory, class_name) = match definition.construction() {
            Construction::ByClass(class) => (false, Some(class.name())),
            Construction::ByFactory(_) => (true, None),
        };
        Self {
            primary_key: definition.primary_key().to_string(),
            alias_keys: definition.alias_keys().iter().map(|k| k.to_string()).collect(),
            scope: definition.scope(),
            factory,
            class_name,
            autowired_properties: definition.autowired_properties().to_vec(),
            has_completion_hook: definition.has_completion_hook(),
            instantiated: definition.scope_slot().cached().is_some(),
        }
    }

    /// Number of keys the definition is reachable under.
    pub fn key_count(&self) -> usize {
        1 + self.alias_keys.len()
    }
}
