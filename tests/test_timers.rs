use space_game::entities::EntityId;
use space_game::timers::{Scheduler, Task, Timers};

fn drain(s: &mut Scheduler, until: u64) -> Vec<(u64, Task)> {
    let mut fired = Vec::new();
    while let Some(task) = s.pop_due(until) {
        fired.push((s.now(), task));
    }
    s.settle(until);
    fired
}

#[test]
fn new_scheduler_is_empty() {
    let s = Scheduler::new();
    assert_eq!(s.now(), 0);
    assert_eq!(s.pending(), 0);
}

#[test]
fn once_fires_a_single_time() {
    let mut s = Scheduler::new();
    s.once(200, Task::Banner);
    assert!(drain(&mut s, 199).is_empty());
    assert_eq!(drain(&mut s, 1000), vec![(200, Task::Banner)]);
    assert_eq!(s.pending(), 0);
    assert_eq!(s.now(), 1000);
}

#[test]
fn every_rearms_at_its_period() {
    let mut s = Scheduler::new();
    let id = s.every(100, Task::Tick);
    let fired = drain(&mut s, 350);
    assert_eq!(
        fired,
        vec![(100, Task::Tick), (200, Task::Tick), (300, Task::Tick)]
    );
    assert!(s.is_scheduled(id));
}

#[test]
fn tasks_run_in_due_order_then_scheduling_order() {
    let mut s = Scheduler::new();
    s.once(300, Task::Expire(EntityId(1)));
    s.once(100, Task::Step(EntityId(2)));
    s.once(100, Task::Step(EntityId(3)));
    let order: Vec<Task> = drain(&mut s, 300).into_iter().map(|(_, t)| t).collect();
    assert_eq!(
        order,
        vec![
            Task::Step(EntityId(2)),
            Task::Step(EntityId(3)),
            Task::Expire(EntityId(1)),
        ]
    );
}

#[test]
fn cancelled_timer_never_fires() {
    let mut s = Scheduler::new();
    let id = s.every(100, Task::Tick);
    s.cancel(id);
    assert!(!s.is_scheduled(id));
    assert!(drain(&mut s, 1000).is_empty());
}

#[test]
fn cancel_unknown_timer_is_noop() {
    let mut s = Scheduler::new();
    let id = s.once(10, Task::Banner);
    drain(&mut s, 10);
    s.cancel(id);
    s.cancel(id);
    assert_eq!(s.pending(), 0);
}

#[test]
fn periodic_timer_can_be_cancelled_from_its_own_task() {
    let mut s = Scheduler::new();
    let id = s.every(100, Task::Cooldown(EntityId(7)));
    assert_eq!(s.pop_due(100), Some(Task::Cooldown(EntityId(7))));
    s.cancel(id);
    assert_eq!(s.pop_due(10_000), None);
}

#[test]
fn timers_armed_later_start_from_the_current_time() {
    let mut s = Scheduler::new();
    drain(&mut s, 1000);
    s.once(50, Task::Banner);
    assert!(drain(&mut s, 1049).is_empty());
    assert_eq!(drain(&mut s, 1050), vec![(1050, Task::Banner)]);
}

#[test]
fn zero_period_is_clamped() {
    let mut s = Scheduler::new();
    s.every(0, Task::Tick);
    assert_eq!(drain(&mut s, 3).len(), 3);
}
