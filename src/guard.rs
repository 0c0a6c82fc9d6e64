//! Recursion guard for measured calls
//!
//! A [`CallDepth`] counts how many measured calls are active on the current
//! thread. Only the call that finds the counter at zero is the outermost one;
//! every re-entry while it runs is nested and must not be measured again.
//!
//! The counter is a `Cell`, so `CallDepth` is `!Sync`: each thread (or task
//! context) owns its own instance and nesting on one thread never affects
//! another.

use std::cell::Cell;

/// Per-thread depth of active measured calls
#[derive(Debug, Default)]
pub struct CallDepth {
    depth: Cell<usize>,
}

impl CallDepth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a measured call
    ///
    /// The returned guard restores the previous depth when dropped, including
    /// on early return through `?` and on unwinding.
    ///
    /// # Example
    /// ```
    /// use fibmark::guard::CallDepth;
    ///
    /// let depth = CallDepth::new();
    /// let outer = depth.enter();
    /// assert!(outer.is_outermost());
    /// {
    ///     let inner = depth.enter();
    ///     assert!(!inner.is_outermost());
    /// }
    /// drop(outer);
    /// assert_eq!(depth.current(), 0);
    /// ```
    pub fn enter(&self) -> DepthGuard<'_> {
        let previous = self.depth.get();
        self.depth.set(previous + 1);
        DepthGuard {
            depth: self,
            outermost: previous == 0,
        }
    }

    /// Number of measured calls currently active
    pub fn current(&self) -> usize {
        self.depth.get()
    }

    pub fn is_idle(&self) -> bool {
        self.depth.get() == 0
    }
}

/// Scope of one measured call; decrements the depth on drop
#[derive(Debug)]
pub struct DepthGuard<'a> {
    depth: &'a CallDepth,
    outermost: bool,
}

impl DepthGuard<'_> {
    pub fn is_outermost(&self) -> bool {
        self.outermost
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        let current = self.depth.depth.get();
        self.depth.depth.set(current.saturating_sub(1));
    }
}
