//! Synchronous publish/subscribe bus
//!
//! Handlers run in subscription order, on the caller's stack.  A handler may
//! publish again; the nested dispatch finishes before the outer one resumes.
//! Handlers receive the bus itself and a mutable context, so they can both
//! change state and raise follow-up events.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::entities::EntityId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topic {
    KeyDown(Direction),
    KeyUp(Direction),
    Fire,
    Confirm,
    LaserHitEnemy,
    EnemyHitPlayer,
    StageCleared,
    GameLost,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::KeyDown(Direction::Up) => "KEYDOWN_EVENT_UP",
            Topic::KeyDown(Direction::Down) => "KEYDOWN_EVENT_DOWN",
            Topic::KeyDown(Direction::Left) => "KEYDOWN_EVENT_LEFT",
            Topic::KeyDown(Direction::Right) => "KEYDOWN_EVENT_RIGHT",
            Topic::KeyUp(Direction::Up) => "KEYUP_EVENT_UP",
            Topic::KeyUp(Direction::Down) => "KEYUP_EVENT_DOWN",
            Topic::KeyUp(Direction::Left) => "KEYUP_EVENT_LEFT",
            Topic::KeyUp(Direction::Right) => "KEYUP_EVENT_RIGHT",
            Topic::Fire => "KEY_EVENT_SPACE",
            Topic::Confirm => "KEY_EVENT_ENTER",
            Topic::LaserHitEnemy => "COLLISION_ENEMY_LASER",
            Topic::EnemyHitPlayer => "COLLISION_ENEMY_HERO",
            Topic::StageCleared => "GAME_STAGE_END",
            Topic::GameLost => "GAME_END_LOSS",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Payload {
    None,
    LaserHit { laser: EntityId, enemy: EntityId },
    PlayerHit { enemy: EntityId },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Event {
    pub topic: Topic,
    pub payload: Payload,
}

pub type Handler<C> = Rc<dyn Fn(&EventBus<C>, &mut C, &Event)>;

pub struct EventBus<C> {
    listeners: RefCell<HashMap<Topic, Vec<Handler<C>>>>,
}

impl<C> Default for EventBus<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> EventBus<C> {
    pub fn new() -> Self {
        EventBus {
            listeners: RefCell::new(HashMap::new()),
        }
    }

    /// Append a handler.  The same handler may be subscribed more than once.
    pub fn subscribe<F>(&self, topic: Topic, handler: F)
    where
        F: Fn(&EventBus<C>, &mut C, &Event) + 'static,
    {
        self.listeners
            .borrow_mut()
            .entry(topic)
            .or_default()
            .push(Rc::new(handler));
    }

    /// Run every handler registered for `topic` when the call starts.
    /// A topic nobody listens to is silently ignored.
    pub fn publish(&self, ctx: &mut C, topic: Topic, payload: Payload) {
        let handlers = match self.listeners.borrow().get(&topic) {
            Some(handlers) => handlers.clone(),
            None => return,
        };
        let event = Event { topic, payload };
        log::trace!("publish {} to {} handler(s)", topic, handlers.len());
        for handler in handlers {
            handler(self, ctx, &event);
        }
    }

    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }

    pub fn handler_count(&self, topic: Topic) -> usize {
        self.listeners
            .borrow()
            .get(&topic)
            .map(|handlers| handlers.len())
            .unwrap_or(0)
    }
}
