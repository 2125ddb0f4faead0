//! Resolver traits for instance resolution.

use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::Key;
use crate::provider::Shared;
use crate::scope::Instance;

/// Core resolver trait for object-safe resolution.
///
/// Implemented by [`Registry`](crate::Registry) and
/// [`ObjectContext`](crate::ObjectContext). Most callers use the typed
/// methods of [`Resolver`], which every `ResolverCore` gets for free.
pub trait ResolverCore: Send + Sync {
    /// Resolves `key` into a type-erased instance.
    ///
    /// # Returns
    ///
    /// * `Ok(Instance)` - cached or freshly constructed, depending on scope
    /// * `Err(DiError)` - not found, construction failure, cycle or depth error
    fn resolve_any(&self, key: &Key) -> DiResult<Instance>;
}

/// Typed resolution on top of [`ResolverCore`].
///
/// # Examples
///
/// ```
/// use carbon_di::{Key, Registry, Resolver};
/// use std::sync::Arc;
///
/// trait Logger: Send + Sync {
///     fn log(&self, msg: &str) -> String;
/// }
///
/// struct ConsoleLogger;
/// impl Logger for ConsoleLogger {
///     fn log(&self, msg: &str) -> String {
///         format!("[LOG] {}", msg)
///     }
/// }
///
/// let registry = Registry::new();
/// registry.define_named("port", |b| b.factory(|_| 8080u16)).unwrap();
/// registry
///     .define(|b| {
///         b.protocol(Key::protocol::<dyn Logger>())
///             .factory(|_| Arc::new(ConsoleLogger) as Arc<dyn Logger>)
///             .singleton()
///     })
///     .unwrap();
///
/// // Concrete values
/// assert_eq!(*registry.get::<u16>(&Key::named("port")).unwrap(), 8080);
///
/// // Protocol objects
/// let logger = registry.get_protocol::<dyn Logger>(&Key::protocol::<dyn Logger>()).unwrap();
/// assert_eq!(logger.log("ready"), "[LOG] ready");
///
/// // Optional dependencies
/// assert!(registry.try_get::<u16>(&Key::named("missing")).unwrap().is_none());
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves an instance of the concrete type `T`.
    ///
    /// The returned `Arc` shares the instance's allocation, so it keeps a
    /// weak-singleton instance alive like any other holder.
    fn get<T: Send + Sync + 'static>(&self, key: &Key) -> DiResult<Arc<T>> {
        self.resolve_any(key)?
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves a protocol object produced as an `Arc<P>`.
    ///
    /// Factories registering protocol objects return `Arc<dyn Protocol>`;
    /// this recovers that view.
    fn get_protocol<P: ?Sized + Send + Sync + 'static>(&self, key: &Key) -> DiResult<Shared<P>> {
        let instance = self.resolve_any(key)?;
        let view = instance
            .downcast_ref::<Arc<P>>()
            .cloned()
            .ok_or(DiError::TypeMismatch(std::any::type_name::<P>()))?;
        Ok(Shared::new(view, instance))
    }

    /// Like [`get`](Self::get), but an unregistered `key` yields `Ok(None)`.
    ///
    /// Only a missing definition for `key` itself is treated as absence; a
    /// missing dependency of that definition is still an error.
    fn try_get<T: Send + Sync + 'static>(&self, key: &Key) -> DiResult<Option<Arc<T>>> {
        match self.get::<T>(key) {
            Ok(value) => Ok(Some(value)),
            Err(DiError::NotFound(missing)) if &missing == key => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Resolves `T`, panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics with the resolution error if `key` cannot be resolved as `T`.
    fn get_required<T: Send + Sync + 'static>(&self, key: &Key) -> Arc<T> {
        match self.get::<T>(key) {
            Ok(value) => value,
            Err(e) => panic!("failed to resolve {}: {}", key, e),
        }
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}
