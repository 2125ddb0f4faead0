//! Resolution of definitions into instances.
//!
//! Resolution looks the key up, guards against re-entrant cycles, then lets
//! the definition's scope slot decide whether to construct. Construction runs
//! the class constructor and its property injection (or the factory), then the
//! completion hook, before the instance is cached or handed out.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Instant;

use crate::definition::{Construction, ObjectDefinition};
use crate::error::DiResult;
use crate::internal::with_cycle_guard;
use crate::key::Key;
use crate::registry::Registry;
use crate::scope::Instance;

pub mod context;
pub use context::ObjectContext;

/// Resolves `key` in `registry`, reporting to the registry's observers.
pub(crate) fn resolve_key(registry: &Registry, key: &Key) -> DiResult<Instance> {
    let observers = registry.observers();
    if !observers.has_observers() {
        return resolve_uninstrumented(registry, key);
    }

    let start = Instant::now();
    observers.resolving(key);
    let result = resolve_uninstrumented(registry, key);
    match &result {
        Ok(_) => observers.resolved(key, start.elapsed()),
        Err(error) => observers.resolution_failed(key, error),
    }
    result
}

fn resolve_uninstrumented(registry: &Registry, key: &Key) -> DiResult<Instance> {
    let definition = registry.lookup(key)?;
    tracing::trace!(target: "carbon_di", key = %key, definition = definition.id(), "resolving");
    with_cycle_guard(definition.id(), key.display_name(), registry.max_depth(), || {
        definition.scope_slot().resolve(|| construct(registry, key, &definition))
    })
}

/// Builds one instance of `definition`, running autowiring and the completion hook.
fn construct(registry: &Registry, key: &Key, definition: &ObjectDefinition) -> DiResult<Instance> {
    let ctx = ObjectContext::new(registry);
    let instance = match definition.construction() {
        Construction::ByClass(class) => class.instantiate(key, definition.autowired_properties(), &ctx)?,
        Construction::ByFactory(factory) => factory(&ctx, key)?,
    };
    if let Some(hook) = &definition.on_completed {
        hook(&ctx, &instance);
    }
    tracing::debug!(target: "carbon_di", key = %key, scope = %definition.scope(), "constructed instance");
    Ok(instance)
}

/// Protocol view of a resolved instance.
///
/// Dereferences to the protocol object and keeps the underlying instance
/// alive, so holding a `Shared` counts as holding the instance for
/// weak-singleton scopes.
pub struct Shared<P: ?Sized> {
    view: Arc<P>,
    owner: Instance,
}

impl<P: ?Sized> Shared<P> {
    pub(crate) fn new(view: Arc<P>, owner: Instance) -> Self {
        Self { view, owner }
    }

    /// The protocol object as a plain `Arc`.
    ///
    /// The returned `Arc` does not keep a weak-singleton instance cached;
    /// keep the `Shared` for that.
    pub fn as_arc(&self) -> &Arc<P> {
        &self.view
    }

    /// The type-erased instance this view was taken from.
    pub fn instance(&self) -> &Instance {
        &self.owner
    }

    /// Whether both views come from the same instance.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.owner, &b.owner)
    }
}

impl<P: ?Sized> Clone for Shared<P> {
    fn clone(&self) -> Self {
        Self {
            view: self.view.clone(),
            owner: self.owner.clone(),
        }
    }
}

impl<P: ?Sized> Deref for Shared<P> {
    type Target = P;

    fn deref(&self) -> &P {
        &self.view
    }
}

impl<P: ?Sized + fmt::Debug> fmt::Debug for Shared<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.view, f)
    }
}
