//! Class identities: how a concrete type is constructed and autowired.

use std::any::{Any, TypeId};
use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::Key;
use crate::provider::ObjectContext;
use crate::scope::Instance;

type BoxedObject = Box<dyn Any + Send + Sync>;
type Constructor = Arc<dyn Fn(&Key) -> DiResult<BoxedObject> + Send + Sync>;
type Injector = fn(&mut BoxedObject, &str, &ObjectContext<'_>) -> DiResult<()>;

/// Post-construction property injection.
///
/// A class registered through [`Class::autowired`] receives one call per
/// declared property name, in declaration order, after it was constructed and
/// before anyone else can observe it.
///
/// # Examples
///
/// ```rust
/// use carbon_di::{Autowire, Class, DiError, DiResult, Key, ObjectContext, Registry, Resolver};
/// use std::sync::Arc;
///
/// struct Clock;
///
/// #[derive(Default)]
/// struct Scheduler {
///     clock: Option<Arc<Clock>>,
/// }
///
/// impl Autowire for Scheduler {
///     fn autowire(&mut self, property: &str, ctx: &ObjectContext<'_>) -> DiResult<()> {
///         match property {
///             "clock" => {
///                 self.clock = Some(ctx.get::<Clock>(&Key::named("clock"))?);
///                 Ok(())
///             }
///             other => Err(DiError::InvalidDefinition(vec![format!("unknown property {other}")])),
///         }
///     }
/// }
///
/// let registry = Registry::new();
/// registry.define_named("clock", |b| b.factory(|_| Clock).singleton()).unwrap();
/// registry
///     .define(|b| b.class(Class::autowired::<Scheduler>()).property_name("clock"))
///     .unwrap();
///
/// let scheduler = registry.get::<Scheduler>(&Key::class::<Scheduler>()).unwrap();
/// assert!(scheduler.clock.is_some());
/// ```
pub trait Autowire: Send + Sync + 'static {
    /// Assigns the property `property`, resolving whatever it needs from `ctx`.
    fn autowire(&mut self, property: &str, ctx: &ObjectContext<'_>) -> DiResult<()>;
}

/// Identity of a concrete class together with the way to build it.
///
/// `Class` values are cheap to clone. The identity is the `TypeId` of the
/// class, so [`Class::key`] agrees with [`Key::class`].
#[derive(Clone)]
pub struct Class {
    id: TypeId,
    name: &'static str,
    constructor: Constructor,
    injector: Option<Injector>,
}

impl Class {
    /// Class built with `T::default()`.
    pub fn of<T>() -> Self
    where
        T: Default + Send + Sync + 'static,
    {
        Self::build::<T>(Arc::new(|_: &Key| Ok(Box::new(T::default()) as BoxedObject)), None)
    }

    /// Class built by a fallible constructor.
    ///
    /// A constructor error surfaces as
    /// [`DiError::ConstructionFailed`] carrying the error as its cause.
    /// The constructor may capture state, such as a connection string.
    pub fn with_constructor<T, E, F>(constructor: F) -> Self
    where
        T: Send + Sync + 'static,
        E: Error + Send + Sync + 'static,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        Self::build::<T>(Arc::new(move |key: &Key| {
            constructor()
                .map(|value| Box::new(value) as BoxedObject)
                .map_err(|e| DiError::construction(key, e))
        }), None)
    }

    /// Default-constructed class that accepts property autowiring.
    pub fn autowired<T>() -> Self
    where
        T: Default + Autowire,
    {
        let mut class = Self::of::<T>();
        class.injector = Some(inject::<T>);
        class
    }

    /// Class with a fallible constructor that accepts property autowiring.
    pub fn autowired_with_constructor<T, E, F>(constructor: F) -> Self
    where
        T: Autowire,
        E: Error + Send + Sync + 'static,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        let mut class = Self::with_constructor(constructor);
        class.injector = Some(inject::<T>);
        class
    }

    fn build<T: 'static>(constructor: Constructor, injector: Option<Injector>) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            constructor,
            injector,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The key class-only registrations of this class are stored under.
    pub fn key(&self) -> Key {
        Key::Class(self.id, self.name)
    }

    /// Whether [`Autowire`] property injection is available for this class.
    pub fn supports_autowiring(&self) -> bool {
        self.injector.is_some()
    }

    /// Constructs an instance and injects `properties` in order.
    ///
    /// `key` is the definition key reported in construction errors.
    pub(crate) fn instantiate(
        &self,
        key: &Key,
        properties: &[String],
        ctx: &ObjectContext<'_>,
    ) -> DiResult<Instance> {
        let mut object = (self.constructor)(key)?;
        if let Some(inject) = self.injector {
            for property in properties {
                inject(&mut object, property, ctx).map_err(|e| DiError::construction(key, e))?;
            }
        }
        Ok(Arc::from(object))
    }
}

fn inject<T: Autowire>(
    object: &mut BoxedObject,
    property: &str,
    ctx: &ObjectContext<'_>,
) -> DiResult<()> {
    match (**object).downcast_mut::<T>() {
        Some(target) => target.autowire(property, ctx),
        None => Err(DiError::TypeMismatch(std::any::type_name::<T>())),
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Class {}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("autowired", &self.injector.is_some())
            .finish()
    }
}
