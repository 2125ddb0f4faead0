//! Core traits for resolution.

pub mod resolver;

pub use resolver::{Resolver, ResolverCore};
