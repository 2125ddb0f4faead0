//! Staged definition builder.
//!
//! A definition is declared as a chain of calls where every call hands back
//! the builder for the next stage, so only the operations valid at that
//! point are available:
//!
//! ```text
//! KeyBuilder ─protocol─▶ AliasBuilder ─alias_protocol/aliases─▶ AliasBuilder
//!     │                      │
//!     ├──────class───────────┴──class──▶ AutowireBuilder ─property_name(s)─▶ AutowireBuilder
//!     └──────factory─────────┴─factory─▶ AttributeBuilder
//!
//! AutowireBuilder / AttributeBuilder ─scope/singleton/..─▶ ActionBuilder ─on_completed─▶ ActionBuilder
//! ```
//!
//! Later stages keep the operations of the stages nested below them: an
//! `AliasBuilder` can go straight to `class`, and an `AutowireBuilder` can go
//! straight to `singleton` or `on_completed`. Argument problems are collected
//! while the chain runs and reported together when the chain is finalized.
//!
//! Builders are meant to be driven from one thread, start to finish.

use std::convert::Infallible;
use std::error::Error;
use std::sync::Arc;

use crate::class::Class;
use crate::definition::{AliasKeys, CompletionHook, Construction, FactoryFn, ObjectDefinition};
use crate::error::{DiError, DiResult};
use crate::key::Key;
use crate::provider::ObjectContext;
use crate::registry::Registry;
use crate::scope::{Instance, ScopeKind};

/// Configuration accumulated by a builder chain.
#[doc(hidden)]
pub struct Draft {
    name: Option<String>,
    protocol: Option<Key>,
    aliases: AliasKeys,
    construction: Option<Construction>,
    /// Class key of the factory's product type
    product: Option<Key>,
    properties: Vec<String>,
    scope: ScopeKind,
    on_completed: Option<CompletionHook>,
    issues: Vec<String>,
}

impl Draft {
    fn new(name: Option<String>) -> Self {
        Self {
            name,
            protocol: None,
            aliases: AliasKeys::new(),
            construction: None,
            product: None,
            properties: Vec::new(),
            scope: ScopeKind::default(),
            on_completed: None,
            issues: Vec::new(),
        }
    }

    fn add_alias(&mut self, key: Key) {
        if !self.aliases.contains(&key) {
            self.aliases.push(key);
        }
    }

    fn add_property(&mut self, name: String) {
        if name.is_empty() {
            self.issues.push("empty property name".to_string());
        } else if !self.properties.contains(&name) {
            self.properties.push(name);
        }
    }

    fn primary_key(&self) -> Option<Key> {
        if let Some(name) = &self.name {
            return Some(Key::named(name.as_str()));
        }
        if let Some(protocol) = &self.protocol {
            return Some(protocol.clone());
        }
        match &self.construction {
            Some(Construction::ByClass(class)) => Some(class.key()),
            Some(Construction::ByFactory(_)) => self.product.clone(),
            None => None,
        }
    }

    /// Validates the draft and freezes it into a definition.
    fn finalize(self) -> DiResult<ObjectDefinition> {
        let primary = self.primary_key();
        let Draft { name, protocol, mut aliases, construction, properties, scope, on_completed, mut issues, .. } = self;

        if matches!(&name, Some(n) if n.is_empty()) {
            issues.push("registration name is empty".to_string());
        }

        match &construction {
            None => issues.push("no construction strategy: call class(..) or factory(..)".to_string()),
            Some(Construction::ByClass(class)) if !properties.is_empty() && !class.supports_autowiring() => {
                issues.push(format!("class {} does not support property autowiring", class.name()));
            }
            _ => {}
        }

        let (Some(primary), Some(construction), true) = (primary, construction, issues.is_empty()) else {
            return Err(DiError::InvalidDefinition(issues));
        };

        // A named registration stays reachable through its protocol.
        if name.is_some() {
            if let Some(protocol) = protocol {
                if !aliases.contains(&protocol) {
                    aliases.insert(0, protocol);
                }
            }
        }
        aliases.retain(|alias| *alias != primary);

        Ok(ObjectDefinition::new(primary, aliases, construction, scope, properties, on_completed))
    }
}

fn factory_fn<T, E, F>(factory: F) -> FactoryFn
where
    T: Send + Sync + 'static,
    E: Error + Send + Sync + 'static,
    F: Fn(&ObjectContext<'_>) -> Result<T, E> + Send + Sync + 'static,
{
    Arc::new(move |ctx: &ObjectContext<'_>, key: &Key| {
        factory(ctx)
            .map(|value| Arc::new(value) as Instance)
            .map_err(|e| DiError::construction(key, e))
    })
}

mod sealed {
    pub trait Sealed {}
}

/// Any builder stage a definition chain may end on.
///
/// Ending before a construction strategy was chosen is allowed by the type
/// system and rejected at finalize with [`DiError::InvalidDefinition`].
pub trait DefinitionStage: sealed::Sealed {
    #[doc(hidden)]
    fn into_draft(self) -> Draft;
}

macro_rules! stage {
    ($($name:ident),*) => {
        $(
            impl sealed::Sealed for $name {}

            impl DefinitionStage for $name {
                fn into_draft(self) -> Draft {
                    self.draft
                }
            }
        )*
    };
}

stage!(KeyBuilder, AliasBuilder, AutowireBuilder, AttributeBuilder, ActionBuilder);

/// Entry stage: choose a protocol key, or go straight to class or factory.
pub struct KeyBuilder {
    draft: Draft,
}

impl KeyBuilder {
    /// Keys the definition by `protocol`.
    pub fn protocol(mut self, protocol: Key) -> AliasBuilder {
        self.draft.protocol = Some(protocol);
        AliasBuilder { draft: self.draft }
    }

    /// Class-based construction, keyed by the class unless a protocol or name is given.
    pub fn class(self, class: Class) -> AutowireBuilder {
        with_class(self.draft, class)
    }

    /// Factory-based construction.
    ///
    /// Without a protocol or name the definition is keyed by `Key::class::<T>()`.
    pub fn factory<T, F>(self, factory: F) -> AttributeBuilder
    where
        T: Send + Sync + 'static,
        F: Fn(&ObjectContext<'_>) -> T + Send + Sync + 'static,
    {
        with_factory(self.draft, move |ctx| Ok::<T, Infallible>(factory(ctx)))
    }

    /// Factory-based construction with a fallible factory.
    pub fn try_factory<T, E, F>(self, factory: F) -> AttributeBuilder
    where
        T: Send + Sync + 'static,
        E: Error + Send + Sync + 'static,
        F: Fn(&ObjectContext<'_>) -> Result<T, E> + Send + Sync + 'static,
    {
        with_factory(self.draft, factory)
    }
}

/// Alias stage: additional protocols the definition answers to.
pub struct AliasBuilder {
    draft: Draft,
}

impl AliasBuilder {
    /// Appends one alias; aliases already present are ignored.
    pub fn alias_protocol(mut self, alias: Key) -> AliasBuilder {
        self.draft.add_alias(alias);
        self
    }

    /// Replaces every alias declared so far with `aliases`.
    ///
    /// Aliases added with [`alias_protocol`](Self::alias_protocol) afterwards
    /// are appended to this list.
    pub fn aliases<I>(mut self, aliases: I) -> AliasBuilder
    where
        I: IntoIterator<Item = Key>,
    {
        self.draft.aliases.clear();
        for alias in aliases {
            self.draft.add_alias(alias);
        }
        self
    }

    pub fn class(self, class: Class) -> AutowireBuilder {
        with_class(self.draft, class)
    }

    pub fn factory<T, F>(self, factory: F) -> AttributeBuilder
    where
        T: Send + Sync + 'static,
        F: Fn(&ObjectContext<'_>) -> T + Send + Sync + 'static,
    {
        with_factory(self.draft, move |ctx| Ok::<T, Infallible>(factory(ctx)))
    }

    pub fn try_factory<T, E, F>(self, factory: F) -> AttributeBuilder
    where
        T: Send + Sync + 'static,
        E: Error + Send + Sync + 'static,
        F: Fn(&ObjectContext<'_>) -> Result<T, E> + Send + Sync + 'static,
    {
        with_factory(self.draft, factory)
    }
}

fn with_class(mut draft: Draft, class: Class) -> AutowireBuilder {
    draft.construction = Some(Construction::ByClass(class));
    AutowireBuilder { draft }
}

fn with_factory<T, E, F>(mut draft: Draft, factory: F) -> AttributeBuilder
where
    T: Send + Sync + 'static,
    E: Error + Send + Sync + 'static,
    F: Fn(&ObjectContext<'_>) -> Result<T, E> + Send + Sync + 'static,
{
    draft.construction = Some(Construction::ByFactory(factory_fn(factory)));
    draft.product = Some(Key::class::<T>());
    AttributeBuilder { draft }
}

/// Autowire stage: properties injected after class construction.
pub struct AutowireBuilder {
    draft: Draft,
}

impl AutowireBuilder {
    /// Appends one property name.
    pub fn property_name(mut self, name: impl Into<String>) -> AutowireBuilder {
        self.draft.add_property(name.into());
        self
    }

    /// Replaces every property name declared so far with `names`.
    pub fn properties_name<I, S>(mut self, names: I) -> AutowireBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.draft.properties.clear();
        for name in names {
            self.draft.add_property(name.into());
        }
        self
    }

    pub fn scope(self, scope: ScopeKind) -> ActionBuilder {
        with_scope(self.draft, scope)
    }

    pub fn prototype(self) -> ActionBuilder {
        self.scope(ScopeKind::Prototype)
    }

    pub fn singleton(self) -> ActionBuilder {
        self.scope(ScopeKind::Singleton)
    }

    pub fn singleton_weak(self) -> ActionBuilder {
        self.scope(ScopeKind::WeakSingleton)
    }

    pub fn on_completed<F>(self, hook: F) -> ActionBuilder
    where
        F: Fn(&ObjectContext<'_>, &Instance) + Send + Sync + 'static,
    {
        ActionBuilder { draft: self.draft }.on_completed(hook)
    }
}

/// Attribute stage: the scope of the definition.
pub struct AttributeBuilder {
    draft: Draft,
}

impl AttributeBuilder {
    pub fn scope(self, scope: ScopeKind) -> ActionBuilder {
        with_scope(self.draft, scope)
    }

    pub fn prototype(self) -> ActionBuilder {
        self.scope(ScopeKind::Prototype)
    }

    pub fn singleton(self) -> ActionBuilder {
        self.scope(ScopeKind::Singleton)
    }

    pub fn singleton_weak(self) -> ActionBuilder {
        self.scope(ScopeKind::WeakSingleton)
    }

    pub fn on_completed<F>(self, hook: F) -> ActionBuilder
    where
        F: Fn(&ObjectContext<'_>, &Instance) + Send + Sync + 'static,
    {
        ActionBuilder { draft: self.draft }.on_completed(hook)
    }
}

fn with_scope(mut draft: Draft, scope: ScopeKind) -> ActionBuilder {
    draft.scope = scope;
    ActionBuilder { draft }
}

/// Action stage: the completion hook.
pub struct ActionBuilder {
    draft: Draft,
}

impl ActionBuilder {
    /// Runs `hook` after every construction, once autowiring is done.
    ///
    /// Cache hits do not run it. Calling this again replaces the hook.
    pub fn on_completed<F>(mut self, hook: F) -> ActionBuilder
    where
        F: Fn(&ObjectContext<'_>, &Instance) + Send + Sync + 'static,
    {
        self.draft.on_completed = Some(Arc::new(hook));
        self
    }
}

enum BuilderState {
    Pending(Box<Draft>),
    Finalized,
}

/// Handle to a fully configured, not yet finalized definition.
///
/// Returned by [`define`] and [`define_named`]. The handle is single use:
/// after the first [`finalize`](Self::finalize) or
/// [`register`](Self::register), successful or not, every operation fails
/// with [`DiError::BuilderReused`].
///
/// # Examples
///
/// ```rust
/// use carbon_di::{define, Class, DiError, Registry};
///
/// #[derive(Default)]
/// struct Mailer;
///
/// let registry = Registry::new();
/// let mut builder = define(|b| b.class(Class::of::<Mailer>()).singleton());
/// builder.register(&registry).unwrap();
///
/// assert!(matches!(builder.register(&registry), Err(DiError::BuilderReused)));
/// ```
pub struct DefinitionBuilder {
    state: BuilderState,
}

impl DefinitionBuilder {
    fn pending(draft: Draft) -> Self {
        Self { state: BuilderState::Pending(Box::new(draft)) }
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self.state, BuilderState::Finalized)
    }

    /// The key the definition would be registered under, if one can be derived yet.
    pub fn primary_key(&self) -> DiResult<Option<Key>> {
        match &self.state {
            BuilderState::Pending(draft) => Ok(draft.primary_key()),
            BuilderState::Finalized => Err(DiError::BuilderReused),
        }
    }

    /// Validates the configuration and produces the immutable definition.
    pub fn finalize(&mut self) -> DiResult<ObjectDefinition> {
        match std::mem::replace(&mut self.state, BuilderState::Finalized) {
            BuilderState::Pending(draft) => draft.finalize(),
            BuilderState::Finalized => Err(DiError::BuilderReused),
        }
    }

    /// Finalizes and inserts the definition, returning its primary key.
    ///
    /// On error nothing is inserted.
    pub fn register(&mut self, registry: &Registry) -> DiResult<Key> {
        let definition = self.finalize()?;
        let key = definition.primary_key().clone();
        registry.register(definition);
        Ok(key)
    }
}

/// Starts a definition keyed by its protocol, or by its class when none is given.
pub fn define<F, S>(build: F) -> DefinitionBuilder
where
    F: FnOnce(KeyBuilder) -> S,
    S: DefinitionStage,
{
    DefinitionBuilder::pending(build(KeyBuilder { draft: Draft::new(None) }).into_draft())
}

/// Starts a definition keyed by `name`.
///
/// A protocol declared in the chain becomes the first alias, so the
/// definition stays reachable by protocol too.
pub fn define_named<F, S>(name: impl Into<String>, build: F) -> DefinitionBuilder
where
    F: FnOnce(KeyBuilder) -> S,
    S: DefinitionStage,
{
    DefinitionBuilder::pending(build(KeyBuilder { draft: Draft::new(Some(name.into())) }).into_draft())
}
