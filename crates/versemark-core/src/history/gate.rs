//! Recording gate: scoped guards that suppress history recording.

use std::cell::Cell;
use std::rc::Rc;

/// Shared depth counters for the two regions in which recording is dropped.
///
/// * restoring: an undo or redo is dispatching an operation.
/// * automatic: the engine or host acts on its own initiative (auto-created
///   tabs, passage reloads after a restore).
///
/// Regions nest; each guard decrements its counter on drop, so leaving an
/// inner region restores the outer state even when unwinding.
#[derive(Debug, Clone, Default)]
pub struct RecordingGate {
    restoring: Rc<Cell<usize>>,
    automatic: Rc<Cell<usize>>,
}

impl RecordingGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_restoring(&self) -> bool {
        self.restoring.get() > 0
    }

    pub fn is_automatic(&self) -> bool {
        self.automatic.get() > 0
    }

    /// Whether `record` would drop an operation right now.
    pub fn is_blocked(&self) -> bool {
        self.is_restoring() || self.is_automatic()
    }

    /// Enter a restoring region.
    pub fn restoring(&self) -> GateGuard {
        GateGuard::enter(&self.restoring)
    }

    /// Enter an automatic-operation region.
    pub fn automatic(&self) -> GateGuard {
        GateGuard::enter(&self.automatic)
    }

    /// Run `f` inside an automatic-operation region.
    pub fn run_automatic<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.automatic();
        f()
    }
}

/// Keeps a gate region open until dropped.
#[must_use = "the region closes as soon as the guard is dropped"]
#[derive(Debug)]
pub struct GateGuard {
    depth: Rc<Cell<usize>>,
}

impl GateGuard {
    fn enter(depth: &Rc<Cell<usize>>) -> Self {
        depth.set(depth.get() + 1);
        Self {
            depth: Rc::clone(depth),
        }
    }
}

impl Drop for GateGuard {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}
