//! Events leaving the rendered tree, and control id bookkeeping.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde_json::Value;

use crate::collections::map::HashSet;
use crate::reducer::CoreAction;
use crate::state::CoreState;
use crate::NodeId;

/// A control produced a new core state from a user edit.
///
/// `core` is the edit reduced against the state the control last saw.
/// Owners of a newer state replay `path` and `value` against it instead.
#[derive(Debug, Clone, PartialEq)]
pub struct CoreChange {
    pub core: CoreState,
    pub path: String,
    pub value: Value,
    pub origin: NodeId,
}

impl CoreChange {
    pub fn action(&self) -> CoreAction {
        CoreAction::UpdateData {
            path: self.path.clone(),
            value: self.value.clone(),
        }
    }
}

/// FIFO of boundary events shared by every node of one tree.
///
/// Draining removes events; each one reaches exactly one consumer.
#[derive(Clone, Default)]
pub struct EventQueue {
    events: Rc<RefCell<VecDeque<CoreChange>>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, change: CoreChange) {
        self.events.borrow_mut().push_back(change);
    }

    pub fn drain(&self) -> Vec<CoreChange> {
        self.events.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue").field("len", &self.len()).finish()
    }
}

/// Unique element ids derived from control scopes.
///
/// The first control for a scope gets the scope itself; later ones get a
/// numeric suffix starting at 2.
#[derive(Clone, Default, Debug)]
pub struct ControlIds {
    used: Rc<RefCell<HashSet<String>>>,
}

impl ControlIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, scope: &str) -> String {
        let mut used = self.used.borrow_mut();
        let mut iteration = 1usize;
        loop {
            let candidate = if iteration <= 1 {
                scope.to_owned()
            } else {
                format!("{scope}{iteration}")
            };
            if !used.contains(&candidate) {
                used.insert(candidate.clone());
                return candidate;
            }
            iteration += 1;
        }
    }

    pub fn remove(&self, id: &str) -> bool {
        self.used.borrow_mut().remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.used.borrow().contains(id)
    }

    pub fn len(&self) -> usize {
        self.used.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.borrow().is_empty()
    }
}
