//! Trailing-edge debounce of refresh work, keyed by node.
//!
//! Every call to [`Coalescer::schedule`] replaces the pending task for the
//! key and restarts its quiet period, so a burst of writes collapses into one
//! execution that observes the inputs as they are at fire time. Tasks only run
//! from [`Coalescer::run_due`]; the host decides when to call it.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::collections::map::HashMap;
use crate::platform::Clock;
use crate::NodeId;

pub const DEFAULT_DELAY_MS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoalescerConfig {
    /// Quiet period measured from the last schedule call for a key.
    pub delay_ms: u64,
}

impl Default for CoalescerConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY_MS,
        }
    }
}

struct PendingTask {
    deadline: u64,
    sequence: u64,
    task: Box<dyn FnOnce() + 'static>,
}

/// Pending tasks by key, plus an index ordered by `(deadline, sequence)`.
#[derive(Default)]
struct PendingTasks {
    by_key: HashMap<NodeId, PendingTask>,
    order: BTreeMap<(u64, u64), NodeId>,
}

impl PendingTasks {
    fn insert(&mut self, key: NodeId, entry: PendingTask) -> Option<PendingTask> {
        self.order.insert((entry.deadline, entry.sequence), key);
        let superseded = self.by_key.insert(key, entry);
        if let Some(old) = &superseded {
            self.order.remove(&(old.deadline, old.sequence));
        }
        superseded
    }

    fn remove(&mut self, key: NodeId) -> Option<PendingTask> {
        let entry = self.by_key.remove(&key)?;
        self.order.remove(&(entry.deadline, entry.sequence));
        Some(entry)
    }

    /// Earliest task with `deadline <= now` scheduled before `sequence_limit`.
    ///
    /// Tasks scheduled later carry a deadline of at least `now` and a larger
    /// sequence, so they sort after every task that is still due.
    fn pop_due(&mut self, now: u64, sequence_limit: u64) -> Option<(NodeId, PendingTask)> {
        let (&(deadline, sequence), &key) = self.order.iter().next()?;
        if deadline > now || sequence >= sequence_limit {
            return None;
        }
        self.remove(key).map(|entry| (key, entry))
    }
}

struct CoalescerInner {
    clock: Rc<dyn Clock>,
    config: CoalescerConfig,
    pending: RefCell<PendingTasks>,
    next_sequence: Cell<u64>,
    executed: Cell<u64>,
}

impl CoalescerInner {
    fn take_next_due(&self, now: u64, sequence_limit: u64) -> Option<(NodeId, PendingTask)> {
        self.pending.borrow_mut().pop_due(now, sequence_limit)
    }
}

/// Single-threaded task queue with cancel-by-key semantics.
#[derive(Clone)]
pub struct Coalescer {
    inner: Rc<CoalescerInner>,
}

impl Coalescer {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self::with_config(clock, CoalescerConfig::default())
    }

    pub fn with_config(clock: Rc<dyn Clock>, config: CoalescerConfig) -> Self {
        Self {
            inner: Rc::new(CoalescerInner {
                clock,
                config,
                pending: RefCell::new(PendingTasks::default()),
                next_sequence: Cell::new(0),
                executed: Cell::new(0),
            }),
        }
    }

    pub fn config(&self) -> CoalescerConfig {
        self.inner.config
    }

    pub fn now(&self) -> u64 {
        self.inner.clock.now_millis()
    }

    /// Registers `task` to run once the quiet period for `key` elapses,
    /// superseding any task still pending for the same key.
    pub fn schedule(&self, key: NodeId, task: impl FnOnce() + 'static) {
        let sequence = self.inner.next_sequence.get();
        self.inner.next_sequence.set(sequence + 1);
        let entry = PendingTask {
            deadline: self.now().saturating_add(self.inner.config.delay_ms),
            sequence,
            task: Box::new(task),
        };
        // The superseded closure is dropped after the borrow ends; it may own
        // handles whose destructors call back into `cancel`.
        let superseded = self.inner.pending.borrow_mut().insert(key, entry);
        if superseded.is_some() {
            log::trace!("coalesced pending refresh for node {key}");
        }
        drop(superseded);
    }

    /// Voids the pending task for `key`. Returns whether one was pending.
    pub fn cancel(&self, key: NodeId) -> bool {
        let removed = self.inner.pending.borrow_mut().remove(key);
        removed.is_some()
    }

    pub fn is_scheduled(&self, key: NodeId) -> bool {
        self.inner.pending.borrow().by_key.contains_key(&key)
    }

    pub fn pending_count(&self) -> usize {
        self.inner.pending.borrow().by_key.len()
    }

    pub fn is_idle(&self) -> bool {
        self.inner.pending.borrow().by_key.is_empty()
    }

    /// Earliest deadline among pending tasks, in clock milliseconds.
    pub fn next_deadline(&self) -> Option<u64> {
        self.inner
            .pending
            .borrow()
            .order
            .keys()
            .next()
            .map(|&(deadline, _)| deadline)
    }

    /// Total number of tasks executed since creation.
    pub fn executed_count(&self) -> u64 {
        self.inner.executed.get()
    }

    /// Runs every task whose deadline has passed, earliest first.
    ///
    /// Tasks scheduled while this call is running are left for a later call,
    /// even with a zero delay, so a task that reschedules itself cannot spin.
    pub fn run_due(&self) -> usize {
        let now = self.now();
        let sequence_limit = self.inner.next_sequence.get();
        let mut ran = 0;
        while let Some((key, entry)) = self.inner.take_next_due(now, sequence_limit) {
            log::trace!("running coalesced task for node {key}");
            (entry.task)();
            ran += 1;
            self.inner.executed.set(self.inner.executed.get() + 1);
        }
        ran
    }
}

impl fmt::Debug for Coalescer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coalescer")
            .field("config", &self.inner.config)
            .field("pending", &self.pending_count())
            .field("executed", &self.executed_count())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/coalescer_tests.rs"]
mod tests;
