//! Observation hooks for registration and resolution events.
//!
//! Observers are attached through [`RegistryOptions`](crate::RegistryOptions)
//! and are called synchronously, so implementations should stay cheap. When
//! no observer is attached, resolution skips the timing work entirely.

use std::sync::Arc;
use std::time::Duration;

use crate::definition::ObjectDefinition;
use crate::error::DiError;
use crate::key::Key;

/// Observer for definition registration and resolution events.
///
/// Every method has an empty default, so an observer implements only the
/// events it cares about.
///
/// # Examples
///
/// ```
/// use carbon_di::{Class, DefinitionObserver, Key, Registry, RegistryOptions, Resolver};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct CountingObserver {
///     resolved: AtomicUsize,
/// }
///
/// impl DefinitionObserver for CountingObserver {
///     fn resolved(&self, _key: &Key, _duration: Duration) {
///         self.resolved.fetch_add(1, Ordering::SeqCst);
///     }
/// }
///
/// #[derive(Default)]
/// struct Config;
///
/// let observer = Arc::new(CountingObserver::default());
/// let registry = Registry::with_options(RegistryOptions::new().observer(observer.clone()));
/// registry.define(|b| b.class(Class::of::<Config>())).unwrap();
///
/// registry.get::<Config>(&Key::class::<Config>()).unwrap();
/// assert_eq!(observer.resolved.load(Ordering::SeqCst), 1);
/// ```
pub trait DefinitionObserver: Send + Sync {
    /// Called after a definition was inserted under all of its keys.
    fn registered(&self, _definition: &ObjectDefinition) {}

    /// Called when a registration replaced `previous` under `key`.
    fn shadowed(&self, _key: &Key, _previous: &ObjectDefinition) {}

    /// Called before a resolution looks at the scope cache.
    fn resolving(&self, _key: &Key) {}

    /// Called after a resolution returned an instance, cached or new.
    fn resolved(&self, _key: &Key, _duration: Duration) {}

    /// Called when a resolution failed.
    fn resolution_failed(&self, _key: &Key, _error: &DiError) {}
}

/// Registered observers, fanned out in registration order.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn DefinitionObserver>>,
}

impl Observers {
    pub(crate) fn add(&mut self, observer: Arc<dyn DefinitionObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn registered(&self, definition: &ObjectDefinition) {
        for observer in &self.observers {
            observer.registered(definition);
        }
    }

    pub(crate) fn shadowed(&self, key: &Key, previous: &ObjectDefinition) {
        for observer in &self.observers {
            observer.shadowed(key, previous);
        }
    }

    #[inline]
    pub(crate) fn resolving(&self, key: &Key) {
        for observer in &self.observers {
            observer.resolving(key);
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, key: &Key, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(key, duration);
        }
    }

    pub(crate) fn resolution_failed(&self, key: &Key, error: &DiError) {
        for observer in &self.observers {
            observer.resolution_failed(key, error);
        }
    }
}

/// Built-in observer that forwards events to `tracing`.
///
/// Registration and shadowing are logged at `debug`, resolutions at `trace`
/// and failures at `warn`, all under the `carbon_di` target.
///
/// # Examples
///
/// ```
/// use carbon_di::{LoggingObserver, Registry, RegistryOptions};
/// use std::sync::Arc;
///
/// let registry = Registry::with_options(
///     RegistryOptions::new().observer(Arc::new(LoggingObserver::with_prefix("app"))),
/// );
/// assert!(registry.is_empty());
/// ```
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    pub fn new() -> Self {
        Self::with_prefix("carbon-di")
    }

    /// Observer whose events carry `prefix` as their `registry` field.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl DefinitionObserver for LoggingObserver {
    fn registered(&self, definition: &ObjectDefinition) {
        tracing::debug!(
            target: "carbon_di",
            registry = %self.prefix,
            key = %definition.primary_key(),
            aliases = definition.alias_keys().len(),
            scope = %definition.scope(),
            "definition registered"
        );
    }

    fn shadowed(&self, key: &Key, previous: &ObjectDefinition) {
        tracing::debug!(
            target: "carbon_di",
            registry = %self.prefix,
            key = %key,
            previous = %previous.primary_key(),
            "definition replaced"
        );
    }

    fn resolved(&self, key: &Key, duration: Duration) {
        tracing::trace!(target: "carbon_di", registry = %self.prefix, key = %key, ?duration, "resolved");
    }

    fn resolution_failed(&self, key: &Key, error: &DiError) {
        tracing::warn!(target: "carbon_di", registry = %self.prefix, key = %key, error = %error, "resolution failed");
    }
}
