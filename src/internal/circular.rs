//! Re-entrant resolution tracking.
//!
//! Factories, injectors and completion hooks may resolve other definitions
//! through their context. A definition that shows up twice on the current
//! thread's stack can only be a cycle; entering its construct-once barrier a
//! second time would deadlock, so the cycle is reported before any barrier is
//! taken.

use std::cell::RefCell;

use crate::error::{DiError, DiResult};

pub(crate) const DEFAULT_MAX_DEPTH: usize = 1024;

thread_local! {
    static RESOLUTION_STACK: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

struct Frame {
    definition: u64,
    label: String,
}

/// Pops its frame when the resolution it guards finishes, error or not.
pub(crate) struct StackGuard {
    definition: u64,
}

impl StackGuard {
    /// Pushes `definition` onto the current thread's stack.
    ///
    /// Fails with `Circular` if the definition is already being resolved on
    /// this thread and with `DepthExceeded` past `max_depth` frames.
    pub(crate) fn enter(definition: u64, label: &str, max_depth: usize) -> DiResult<Self> {
        RESOLUTION_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();

            if stack.iter().any(|frame| frame.definition == definition) {
                let mut path: Vec<String> = stack.iter().map(|frame| frame.label.clone()).collect();
                path.push(label.to_string());
                return Err(DiError::Circular(path));
            }

            if stack.len() >= max_depth {
                return Err(DiError::DepthExceeded(stack.len()));
            }

            stack.push(Frame { definition, label: label.to_string() });
            Ok(Self { definition })
        })
    }
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        RESOLUTION_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(last) = stack.pop() {
                debug_assert_eq!(last.definition, self.definition);
            }
        });
    }
}

/// Runs `f` with `definition` pushed on the resolution stack.
pub(crate) fn with_cycle_guard<T, F>(definition: u64, label: &str, max_depth: usize, f: F) -> DiResult<T>
where
    F: FnOnce() -> DiResult<T>,
{
    let _guard = StackGuard::enter(definition, label, max_depth)?;
    f()
}
