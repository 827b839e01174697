//! Unified undo/redo history.
//!
//! One chronological log holds both committed strokes and discrete actions,
//! so undo always reverses the most recent operation whatever its kind.

mod action;
mod gate;

pub use action::{Action, ActionKind, ActionTarget, ClearedData, ReplayError};
pub use gate::{GateGuard, RecordingGate};

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::config::MAX_UNDO_HISTORY;
use crate::document::{ActiveDocument, DocumentKey, TabId};
use crate::stroke::Stroke;

/// Payload of a history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// A committed stroke; undo pops it from its document's stroke history.
    Stroke(Stroke),
    Action(Action),
}

/// An entry of the unified history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub kind: OperationKind,
    /// Tab the operation happened in.
    pub tab_id: Option<TabId>,
    /// Document the operation belongs to.
    pub document: Option<DocumentKey>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl Operation {
    pub fn new(kind: OperationKind, tab_id: Option<TabId>, document: Option<DocumentKey>) -> Self {
        Self {
            kind,
            tab_id,
            document,
            timestamp: crate::time::now_millis(),
        }
    }

    /// A stroke committed to `document`.
    pub fn stroke(stroke: Stroke, tab_id: Option<TabId>, document: DocumentKey) -> Self {
        Self::new(OperationKind::Stroke(stroke), tab_id, Some(document))
    }

    /// An action recorded in the given context.
    pub fn action(action: Action, context: &ActiveDocument) -> Self {
        Self::new(
            OperationKind::Action(action),
            Some(context.tab_id),
            Some(context.key.clone()),
        )
    }

    pub fn is_stroke(&self) -> bool {
        matches!(self.kind, OperationKind::Stroke(_))
    }

    /// Short label for logs.
    pub fn label(&self) -> String {
        match &self.kind {
            OperationKind::Stroke(_) => "stroke".to_string(),
            OperationKind::Action(action) => action.kind().to_string(),
        }
    }
}

/// Direction of a history replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Undo,
    Redo,
}

/// Bounded undo stack plus redo stack.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    undo: VecDeque<Operation>,
    redo: Vec<Operation>,
    capacity: usize,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new(MAX_UNDO_HISTORY)
    }
}

impl HistoryLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Append a new operation; forward history is discarded.
    pub fn push(&mut self, op: Operation) {
        self.redo.clear();
        self.push_undo(op);
    }

    /// Put an operation on the undo stack without touching redo.
    fn push_undo(&mut self, op: Operation) {
        self.undo.push_back(op);
        while self.undo.len() > self.capacity {
            if let Some(evicted) = self.undo.pop_front() {
                log::debug!("History full, evicted {}", evicted.label());
            }
        }
    }

    fn pop(&mut self, direction: Direction) -> Option<Operation> {
        match direction {
            Direction::Undo => self.undo.pop_back(),
            Direction::Redo => self.redo.pop(),
        }
    }

    /// Return an operation to the stack it was popped from.
    fn put_back(&mut self, op: Operation, direction: Direction) {
        match direction {
            Direction::Undo => self.push_undo(op),
            Direction::Redo => self.redo.push(op),
        }
    }

    /// Move a replayed operation to the opposite stack.
    fn complete(&mut self, op: Operation, direction: Direction) {
        match direction {
            Direction::Undo => self.redo.push(op),
            Direction::Redo => self.push_undo(op),
        }
    }

    pub fn len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty()
    }

    /// Operations on the undo stack, oldest first.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.undo.iter()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

/// An operation popped for replay.
///
/// Holds the restoring guard; pass it back to [`HistoryHandle::finish`].
#[derive(Debug)]
pub struct Replay {
    pub operation: Operation,
    pub direction: Direction,
    guard: GateGuard,
}

/// Shared handle to the unified history and its recording gate.
///
/// Cloned into hosts so they can record their own actions. The log is only
/// borrowed for the duration of each call, so host callbacks running inside
/// a replay can use the handle freely; the gate drops what they record.
#[derive(Debug, Clone)]
pub struct HistoryHandle {
    log: Rc<RefCell<HistoryLog>>,
    gate: RecordingGate,
}

impl Default for HistoryHandle {
    fn default() -> Self {
        Self::new(MAX_UNDO_HISTORY)
    }
}

impl HistoryHandle {
    pub fn new(capacity: usize) -> Self {
        Self {
            log: Rc::new(RefCell::new(HistoryLog::new(capacity))),
            gate: RecordingGate::new(),
        }
    }

    pub fn gate(&self) -> &RecordingGate {
        &self.gate
    }

    /// Record an operation unless a restoring or automatic region is open.
    pub fn record(&self, op: Operation) -> bool {
        if self.gate.is_restoring() {
            log::debug!("Dropped {} recorded during undo/redo", op.label());
            return false;
        }
        if self.gate.is_automatic() {
            log::debug!("Dropped {} recorded during automatic operation", op.label());
            return false;
        }
        log::debug!("Recorded {}", op.label());
        self.log.borrow_mut().push(op);
        true
    }

    /// Record an action in `context`. No context means nothing to record.
    pub fn record_action(&self, action: Action, context: Option<&ActiveDocument>) -> bool {
        let Some(context) = context else {
            log::debug!("No active document, {} not recorded", action.kind());
            return false;
        };
        self.record(Operation::action(action, context))
    }

    /// Pop the next operation to replay and open a restoring region.
    ///
    /// `None` when the stack is empty or a replay is already running.
    pub fn begin(&self, direction: Direction) -> Option<Replay> {
        if self.gate.is_restoring() {
            log::debug!("{:?} ignored, a replay is in progress", direction);
            return None;
        }
        let operation = self.log.borrow_mut().pop(direction)?;
        Some(Replay {
            operation,
            direction,
            guard: self.gate.restoring(),
        })
    }

    /// Close a replay: on success the operation moves to the opposite stack,
    /// on failure it goes back where it came from so it can be retried.
    pub fn finish(&self, replay: Replay, result: Result<(), ReplayError>) -> bool {
        let Replay {
            operation,
            direction,
            guard,
        } = replay;
        drop(guard);

        let mut stacks = self.log.borrow_mut();
        match result {
            Ok(()) => {
                log::debug!("{:?} of {} done", direction, operation.label());
                stacks.complete(operation, direction);
                true
            }
            Err(e) => {
                log::error!("{:?} of {} failed: {}", direction, operation.label(), e);
                stacks.put_back(operation, direction);
                false
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.log.borrow().is_empty()
    }

    pub fn can_redo(&self) -> bool {
        self.log.borrow().redo_len() > 0
    }

    pub fn len(&self) -> usize {
        self.log.borrow().len()
    }

    pub fn redo_len(&self) -> usize {
        self.log.borrow().redo_len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.borrow().is_empty()
    }

    /// Most recent operation, if any.
    pub fn last(&self) -> Option<Operation> {
        self.log.borrow().undo.back().cloned()
    }

    /// Labels of the undo stack, oldest first.
    pub fn labels(&self) -> Vec<String> {
        self.log.borrow().operations().map(Operation::label).collect()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }

    /// Run `f` inside an automatic-operation region.
    pub fn run_automatic<R>(&self, f: impl FnOnce() -> R) -> R {
        self.gate.run_automatic(f)
    }
}
