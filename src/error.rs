//! Error types for object definitions and resolution.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::key::Key;

/// Shared, clonable cause attached to [`DiError::ConstructionFailed`].
pub type Cause = Arc<dyn Error + Send + Sync + 'static>;

/// Definition and resolution errors
///
/// Registration-time problems (`InvalidDefinition`, `BuilderReused`) are
/// reported to the registrant; resolution-time problems propagate to the
/// caller that asked for the object.
///
/// # Examples
///
/// ```rust
/// use carbon_di::{DiError, Key, Registry, Resolver};
///
/// let registry = Registry::new();
/// match registry.resolve(&Key::named("missing")) {
///     Err(DiError::NotFound(key)) => assert_eq!(key, Key::named("missing")),
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use carbon_di::DiError;
///
/// let invalid = DiError::InvalidDefinition(vec![
///     "no construction strategy".to_string(),
///     "empty property name".to_string(),
/// ]);
/// assert_eq!(
///     invalid.to_string(),
///     "Invalid definition: no construction strategy; empty property name"
/// );
/// ```
#[derive(Debug, Clone)]
pub enum DiError {
    /// No definition registered under the key
    NotFound(Key),
    /// Malformed builder input, every issue found at finalize time
    InvalidDefinition(Vec<String>),
    /// Builder handle used after it was finalized
    BuilderReused,
    /// Class constructor, factory or autowiring failed
    ConstructionFailed(Key, Cause),
    /// Resolved instance is not of the requested type
    TypeMismatch(&'static str),
    /// Re-entrant resolution of a definition already being constructed (includes path)
    Circular(Vec<String>),
    /// Maximum resolution depth exceeded
    DepthExceeded(usize),
}

impl DiError {
    /// Wraps a construction cause for `key`.
    pub(crate) fn construction<E>(key: &Key, cause: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        DiError::ConstructionFailed(key.clone(), Arc::new(cause))
    }

    /// Returns `true` if this error, or any construction cause below it, is a cycle.
    ///
    /// Cycles detected deep inside a factory surface wrapped in one
    /// `ConstructionFailed` per enclosing definition.
    pub fn is_circular(&self) -> bool {
        let mut current: Option<&(dyn Error + 'static)> = Some(self);
        while let Some(err) = current {
            if let Some(DiError::Circular(_)) = err.downcast_ref::<DiError>() {
                return true;
            }
            current = err.source();
        }
        false
    }

    /// The key a resolution error refers to, when it names one.
    pub fn key(&self) -> Option<&Key> {
        match self {
            DiError::NotFound(key) | DiError::ConstructionFailed(key, _) => Some(key),
            _ => None,
        }
    }
}

impl fmt::Display for DiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiError::NotFound(key) => write!(f, "Definition not found: {}", key),
            DiError::InvalidDefinition(issues) => {
                write!(f, "Invalid definition: {}", issues.join("; "))
            }
            DiError::BuilderReused => write!(f, "Definition builder used after finalize"),
            DiError::ConstructionFailed(key, cause) => {
                write!(f, "Construction failed for {}: {}", key, cause)
            }
            DiError::TypeMismatch(name) => write!(f, "Type mismatch for: {}", name),
            DiError::Circular(path) => {
                write!(f, "Circular dependency: {}", path.join(" -> "))
            }
            DiError::DepthExceeded(depth) => write!(f, "Max depth {} exceeded", depth),
        }
    }
}

impl Error for DiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DiError::ConstructionFailed(_, cause) => Some(cause.as_ref()),
            _ => None,
        }
    }
}

/// Result type for definition and resolution operations
///
/// # Examples
///
/// ```rust
/// use carbon_di::{DiResult, DiError};
///
/// fn reuse() -> DiResult<()> {
///     Err(DiError::BuilderReused)
/// }
///
/// assert!(reuse().is_err());
/// ```
pub type DiResult<T> = Result<T, DiError>;
