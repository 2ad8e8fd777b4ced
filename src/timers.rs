/// Timer contract and a deterministic virtual-clock scheduler.
///
/// Timers never hold callbacks.  They carry a `Task` naming what to run and,
/// for per-entity work, the id of the entity it belongs to.  The session looks
/// the id up when the task fires, so a task whose entity is gone does nothing.

use crate::entities::EntityId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    /// One game-loop frame.
    Tick,
    /// Show the stage-clear / victory / defeat message.
    Banner,
    /// Autonomous behaviour of an entity (descent, travel, escort fire, boss pulse).
    Step(EntityId),
    /// Hero fire-cooldown decay.
    Cooldown(EntityId),
    /// End of a death grace delay.
    Expire(EntityId),
}

/// What the core needs from a clock.
pub trait Timers {
    /// Run `task` every `interval_ms`, first after one full interval.
    fn every(&mut self, interval_ms: u64, task: Task) -> TimerId;
    /// Run `task` once after `delay_ms`.
    fn once(&mut self, delay_ms: u64, task: Task) -> TimerId;
    /// Cancelling an unknown or finished timer is a no-op.
    fn cancel(&mut self, id: TimerId);
}

#[derive(Clone, Debug)]
struct Pending {
    id: TimerId,
    due: u64,
    period: Option<u64>,
    task: Task,
}

#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    now: u64,
    next_id: u64,
    pending: Vec<Pending>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Number of live timers.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.pending.iter().any(|p| p.id == id)
    }

    /// Pop the earliest task due at or before `until`, moving the clock to its
    /// due time.  Periodic timers are re-armed before the task is returned, so
    /// the task may cancel its own timer.  Equal due times run in scheduling
    /// order.
    pub fn pop_due(&mut self, until: u64) -> Option<Task> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= until)
            .min_by_key(|(_, p)| (p.due, p.id))
            .map(|(i, _)| i)?;

        let due = self.pending[idx].due;
        self.now = self.now.max(due);

        let task = self.pending[idx].task;
        match self.pending[idx].period {
            Some(period) => self.pending[idx].due = due + period,
            None => {
                self.pending.swap_remove(idx);
            }
        }
        Some(task)
    }

    /// Move the clock forward once every due task up to `until` has run.
    pub fn settle(&mut self, until: u64) {
        self.now = self.now.max(until);
    }

    fn arm(&mut self, delay_ms: u64, period: Option<u64>, task: Task) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            due: self.now + delay_ms,
            period,
            task,
        });
        id
    }
}

impl Timers for Scheduler {
    fn every(&mut self, interval_ms: u64, task: Task) -> TimerId {
        // A zero period would never let the clock move.
        let interval = interval_ms.max(1);
        self.arm(interval, Some(interval), task)
    }

    fn once(&mut self, delay_ms: u64, task: Task) -> TimerId {
        self.arm(delay_ms, None, task)
    }

    fn cancel(&mut self, id: TimerId) {
        self.pending.retain(|p| p.id != id);
    }
}
