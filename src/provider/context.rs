//! Resolution context handed to factories, injectors and completion hooks.

use crate::error::DiResult;
use crate::key::Key;
use crate::registry::Registry;
use crate::scope::Instance;
use crate::traits::ResolverCore;

/// Context passed to factory functions, [`Autowire`](crate::Autowire)
/// injectors and completion hooks.
///
/// It resolves through the same registry that is constructing the current
/// object, so dependencies are looked up with their own scopes. Resolving
/// the object currently under construction is reported as a cycle.
///
/// # Examples
///
/// ```
/// use carbon_di::{Key, Registry, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let registry = Registry::new();
/// registry
///     .define_named("db", |b| b.factory(|_| Database { url: "postgres://localhost".into() }).singleton())
///     .unwrap();
/// registry
///     .define_named("users", |b| {
///         // `ctx` is an ObjectContext
///         b.try_factory(|ctx| Ok::<_, carbon_di::DiError>(UserService {
///             db: ctx.get::<Database>(&Key::named("db"))?,
///         }))
///     })
///     .unwrap();
///
/// let users = registry.get::<UserService>(&Key::named("users")).unwrap();
/// assert_eq!(users.db.url, "postgres://localhost");
/// ```
pub struct ObjectContext<'a> {
    registry: &'a Registry,
}

impl<'a> ObjectContext<'a> {
    pub(crate) fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// The registry this context resolves from.
    pub fn registry(&self) -> &'a Registry {
        self.registry
    }
}

impl<'a> ResolverCore for ObjectContext<'a> {
    fn resolve_any(&self, key: &Key) -> DiResult<Instance> {
        self.registry.resolve(key)
    }
}
