//! Identity keys for definition storage and lookup.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Key identifying a capability a definition can be looked up by.
///
/// Keys are cheap to clone and compare. The type-backed variants compare by
/// `TypeId` only, so two unrelated protocols that happen to share a name
/// never collide, and asking for the same protocol twice always produces an
/// equal key.
///
/// # Key Types
///
/// - **Protocol**: a trait object type such as `dyn Logger`
/// - **Class**: a concrete type, used for class-only registrations
/// - **Named**: an explicit registration name
///
/// # Examples
///
/// ```rust
/// use carbon_di::Key;
///
/// trait Logger: Send + Sync {}
/// trait Sink: Send + Sync {}
///
/// assert_eq!(Key::protocol::<dyn Logger>(), Key::protocol::<dyn Logger>());
/// assert_ne!(Key::protocol::<dyn Logger>(), Key::protocol::<dyn Sink>());
/// assert_eq!(Key::named("db"), Key::named(String::from("db")));
/// assert!(Key::protocol::<dyn Logger>().is_protocol());
/// ```
#[derive(Debug, Clone)]
pub enum Key {
    /// Trait object type with its name for diagnostics
    Protocol(TypeId, &'static str),
    /// Concrete type with its name for diagnostics
    Class(TypeId, &'static str),
    /// Explicit registration name
    Named(Arc<str>),
}

impl Key {
    /// Key for a protocol, normally a `dyn Trait` type.
    #[inline]
    pub fn protocol<P: ?Sized + 'static>() -> Self {
        Key::Protocol(TypeId::of::<P>(), std::any::type_name::<P>())
    }

    /// Key for a concrete class.
    #[inline]
    pub fn class<T: 'static>() -> Self {
        Key::Class(TypeId::of::<T>(), std::any::type_name::<T>())
    }

    /// Key for an explicit registration name.
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Key::Named(name.into())
    }

    /// Human readable name: the type name or the registration name.
    ///
    /// ```rust
    /// use carbon_di::Key;
    ///
    /// assert_eq!(Key::class::<u32>().display_name(), "u32");
    /// assert_eq!(Key::named("cache").display_name(), "cache");
    /// ```
    pub fn display_name(&self) -> &str {
        match self {
            Key::Protocol(_, name) | Key::Class(_, name) => name,
            Key::Named(name) => name,
        }
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, Key::Protocol(..))
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Key::Named(_))
    }
}

impl PartialEq for Key {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Protocol(a, _), Key::Protocol(b, _)) => a == b,
            (Key::Class(a, _), Key::Class(b, _)) => a == b,
            (Key::Named(a), Key::Named(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Key::Protocol(id, _) => {
                0u8.hash(state);
                id.hash(state);
            }
            Key::Class(id, _) => {
                1u8.hash(state);
                id.hash(state);
            }
            Key::Named(name) => {
                2u8.hash(state);
                name.hash(state);
            }
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Protocol(_, name) => write!(f, "protocol {}", name),
            Key::Class(_, name) => write!(f, "class {}", name),
            Key::Named(name) => write!(f, "named \"{}\"", name),
        }
    }
}

impl From<&'static str> for Key {
    fn from(name: &'static str) -> Self {
        Key::named(name)
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::named(name)
    }
}
