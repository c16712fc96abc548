use super::*;
use crate::platform::VirtualClock;
use std::cell::RefCell;

fn coalescer() -> (Rc<VirtualClock>, Coalescer) {
    let clock = Rc::new(VirtualClock::new());
    let coalescer = Coalescer::new(clock.clone());
    (clock, coalescer)
}

#[test]
fn burst_of_writes_runs_once_with_last_value() {
    let (clock, coalescer) = coalescer();
    let seen = Rc::new(RefCell::new(Vec::new()));
    for value in 1..=5 {
        let seen = seen.clone();
        coalescer.schedule(7, move || seen.borrow_mut().push(value));
        clock.advance(10);
    }
    assert_eq!(coalescer.run_due(), 0);
    clock.advance(60);
    assert_eq!(coalescer.run_due(), 0, "quiet period restarts on every write");
    clock.advance(40);
    assert_eq!(coalescer.run_due(), 1);
    assert_eq!(*seen.borrow(), vec![5]);
    assert!(coalescer.is_idle());
}

#[test]
fn distinct_keys_are_independent() {
    let (clock, coalescer) = coalescer();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let first = seen.clone();
    coalescer.schedule(1, move || first.borrow_mut().push("a"));
    clock.advance(50);
    let second = seen.clone();
    coalescer.schedule(2, move || second.borrow_mut().push("b"));
    clock.advance(50);
    assert_eq!(coalescer.run_due(), 1);
    assert_eq!(*seen.borrow(), vec!["a"]);
    assert!(coalescer.is_scheduled(2));
    clock.advance(50);
    coalescer.run_due();
    assert_eq!(*seen.borrow(), vec!["a", "b"]);
}

#[test]
fn cancelled_task_never_runs() {
    let (clock, coalescer) = coalescer();
    let ran = Rc::new(Cell::new(false));
    let flag = ran.clone();
    coalescer.schedule(3, move || flag.set(true));
    assert!(coalescer.cancel(3));
    assert!(!coalescer.cancel(3));
    clock.advance(1_000);
    assert_eq!(coalescer.run_due(), 0);
    assert!(!ran.get());
}

#[test]
fn next_deadline_tracks_earliest_task() {
    let (clock, coalescer) = coalescer();
    assert_eq!(coalescer.next_deadline(), None);
    coalescer.schedule(1, || {});
    clock.advance(30);
    coalescer.schedule(2, || {});
    assert_eq!(coalescer.next_deadline(), Some(100));
    assert_eq!(coalescer.pending_count(), 2);
}

#[test]
fn task_scheduled_during_run_waits_for_next_call() {
    let clock = Rc::new(VirtualClock::new());
    let coalescer = Coalescer::with_config(clock.clone(), CoalescerConfig { delay_ms: 0 });
    let runs = Rc::new(Cell::new(0));

    fn reschedule(coalescer: Coalescer, runs: Rc<Cell<u32>>) {
        let next = coalescer.clone();
        coalescer.schedule(9, move || {
            runs.set(runs.get() + 1);
            reschedule(next, runs);
        });
    }

    reschedule(coalescer.clone(), runs.clone());
    assert_eq!(coalescer.run_due(), 1);
    assert_eq!(runs.get(), 1);
    assert!(coalescer.is_scheduled(9));
    assert_eq!(coalescer.run_due(), 1);
    assert_eq!(runs.get(), 2);
    assert_eq!(coalescer.executed_count(), 2);
}

#[test]
fn due_tasks_run_in_deadline_order() {
    let (clock, coalescer) = coalescer();
    let order = Rc::new(RefCell::new(Vec::new()));
    for key in [5, 3, 8] {
        let order = order.clone();
        coalescer.schedule(key, move || order.borrow_mut().push(key));
        clock.advance(1);
    }
    clock.advance(200);
    assert_eq!(coalescer.run_due(), 3);
    assert_eq!(*order.borrow(), vec![5, 3, 8]);
}

#[test]
fn superseded_and_cancelled_tasks_leave_no_deadline_behind() {
    let (clock, coalescer) = coalescer();
    coalescer.schedule(1, || {});
    coalescer.schedule(2, || {});
    clock.advance(30);
    coalescer.schedule(1, || {});
    assert_eq!(coalescer.next_deadline(), Some(100));
    assert!(coalescer.cancel(2));
    assert_eq!(coalescer.next_deadline(), Some(130));
    assert_eq!(coalescer.pending_count(), 1);

    clock.advance(100);
    assert_eq!(coalescer.run_due(), 1);
    assert_eq!(coalescer.next_deadline(), None);
    assert!(coalescer.is_idle());
}

#[test]
fn many_keys_run_once_each_in_schedule_order() {
    let (clock, coalescer) = coalescer();
    let seen = Rc::new(RefCell::new(Vec::new()));
    for key in (0..64).rev() {
        let seen = seen.clone();
        coalescer.schedule(key, move || seen.borrow_mut().push(key));
    }
    clock.advance(100);
    assert_eq!(coalescer.run_due(), 64);
    let expected: Vec<NodeId> = (0..64).rev().collect();
    assert_eq!(*seen.borrow(), expected);
}
