//! Registry configuration.

use std::fmt;
use std::sync::Arc;

use crate::internal::DEFAULT_MAX_DEPTH;
use crate::observer::{DefinitionObserver, Observers};

/// Options a [`Registry`](crate::Registry) is created with.
///
/// # Examples
///
/// ```
/// use carbon_di::{LoggingObserver, Registry, RegistryOptions};
/// use std::sync::Arc;
///
/// let options = RegistryOptions::new()
///     .max_depth(64)
///     .observer(Arc::new(LoggingObserver::new()));
/// assert_eq!(options.depth_limit(), 64);
///
/// let registry = Registry::with_options(options);
/// assert!(registry.is_empty());
/// ```
#[derive(Clone)]
pub struct RegistryOptions {
    pub(crate) max_depth: usize,
    pub(crate) observers: Observers,
}

impl RegistryOptions {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            observers: Observers::default(),
        }
    }

    /// Maximum number of nested resolutions on one thread before
    /// [`DiError::DepthExceeded`](crate::DiError::DepthExceeded) is returned.
    ///
    /// Values below 1 are raised to 1.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.max(1);
        self
    }

    /// Adds an observer; observers are notified in the order they were added.
    pub fn observer(mut self, observer: Arc<dyn DefinitionObserver>) -> Self {
        self.observers.add(observer);
        self
    }

    pub fn depth_limit(&self) -> usize {
        self.max_depth
    }
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RegistryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryOptions")
            .field("max_depth", &self.max_depth)
            .field("observers", &self.observers.len())
            .finish()
    }
}
