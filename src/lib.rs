//! # carbon-di
//!
//! Builder-driven object definitions with prototype, singleton and
//! weak-singleton scopes.
//!
//! ## Features
//!
//! - **Staged builder**: every call returns the builder for the next stage,
//!   so only valid operations are offered
//! - **Protocol keys and aliases**: one definition can answer to many protocols
//! - **Scopes**: prototype, singleton, and weak singletons that are rebuilt
//!   once their last holder lets go
//! - **Construct-once**: concurrent first resolutions of a shared scope
//!   construct exactly once, and a failure leaves nothing cached
//! - **Autowiring and completion hooks** run once per construction
//! - **Batched validation**: every configuration mistake of a definition is
//!   reported together
//!
//! ## Quick Start
//!
//! ```rust
//! use carbon_di::{Class, Key, Registry, Resolver};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! trait Storage: Send + Sync {}
//! trait Cache: Send + Sync {}
//!
//! #[derive(Default)]
//! struct MemoryStore;
//!
//! let completed = Arc::new(AtomicUsize::new(0));
//! let seen = completed.clone();
//!
//! let registry = Registry::new();
//! registry
//!     .define(|b| {
//!         b.protocol(Key::protocol::<dyn Storage>())
//!             .alias_protocol(Key::protocol::<dyn Cache>())
//!             .class(Class::of::<MemoryStore>())
//!             .singleton()
//!             .on_completed(move |_, _| {
//!                 seen.fetch_add(1, Ordering::SeqCst);
//!             })
//!     })
//!     .unwrap();
//!
//! let a = registry.get::<MemoryStore>(&Key::protocol::<dyn Storage>()).unwrap();
//! let b = registry.get::<MemoryStore>(&Key::protocol::<dyn Cache>()).unwrap();
//! assert!(Arc::ptr_eq(&a, &b));
//! assert_eq!(completed.load(Ordering::SeqCst), 1);
//! ```
//!
//! ## Scopes
//!
//! - **Prototype** (default): a new instance for every resolution
//! - **Singleton**: constructed on first resolution, then shared
//! - **WeakSingleton**: shared while held elsewhere, rebuilt afterwards
//!
//! ## Registries
//!
//! [`Registry::global`] is the process-wide registry. Tests and embedded
//! uses can create isolated registries with [`Registry::new`] and pass them
//! around explicitly.

pub mod class;
pub mod config;
pub mod definition;
pub mod descriptors;
pub mod error;
pub mod key;
pub mod observer;
pub mod provider;
pub mod registry;
pub mod scope;
pub mod traits;

// Internal modules
mod internal;

// Re-export core types
pub use class::{Autowire, Class};
pub use config::RegistryOptions;
pub use definition::builder::{
    define, define_named, ActionBuilder, AliasBuilder, AttributeBuilder, AutowireBuilder, DefinitionBuilder,
    DefinitionStage, KeyBuilder,
};
pub use definition::{CompletionHook, Construction, FactoryFn, ObjectDefinition};
pub use descriptors::DefinitionDescriptor;
pub use error::{DiError, DiResult};
pub use key::Key;
pub use observer::{DefinitionObserver, LoggingObserver};
pub use provider::{ObjectContext, Shared};
pub use registry::Registry;
pub use scope::{Instance, ScopeKind, ScopeSlot};
pub use traits::{Resolver, ResolverCore};
