//! Session state, stage machine and the game-loop driver
//!
//! A `Session` is one attempt at one stage: the entity table, score, stage
//! index, phase and every timer the stage started.  `Game` owns the current
//! session together with the event bus, feeds it input, runs its timers and
//! replaces it on reset.

use std::collections::BTreeMap;
use std::rc::Rc;

use log::{debug, info, trace};

use crate::compute;
use crate::consts::{BOSS_WIDTH, HERO_WIDTH};
use crate::entities::{Axis, Entity, EntityId, EntityKind, Hero, Hit, Side, Step};
use crate::events::{Direction, EventBus, Payload, Topic};
use crate::render::{draw_banner, draw_hud, Canvas};
use crate::settings::Settings;
use crate::stages::place_enemies;
use crate::timers::{Scheduler, Task, TimerId, Timers};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Playing,
    /// Waiting for confirm before the next stage.
    StageClear,
    Victory,
    Defeat,
}

/// Keys the input collaborator forwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Fire,
    Confirm,
}

impl Key {
    pub fn press_topic(self) -> Topic {
        match self {
            Key::Up => Topic::KeyDown(Direction::Up),
            Key::Down => Topic::KeyDown(Direction::Down),
            Key::Left => Topic::KeyDown(Direction::Left),
            Key::Right => Topic::KeyDown(Direction::Right),
            Key::Fire => Topic::Fire,
            Key::Confirm => Topic::Confirm,
        }
    }

    /// Only the direction keys report a release.
    pub fn release_topic(self) -> Option<Topic> {
        match self {
            Key::Up => Some(Topic::KeyUp(Direction::Up)),
            Key::Down => Some(Topic::KeyUp(Direction::Down)),
            Key::Left => Some(Topic::KeyUp(Direction::Left)),
            Key::Right => Some(Topic::KeyUp(Direction::Right)),
            Key::Fire | Key::Confirm => None,
        }
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

pub struct Session {
    settings: Rc<Settings>,
    /// 0-based; equals the stage count once the game is won.
    pub stage: usize,
    pub score: u32,
    pub phase: Phase,
    pub timers: Scheduler,
    entities: BTreeMap<EntityId, Entity>,
    hero: EntityId,
    next_id: u32,
    loop_timer: Option<TimerId>,
    banner: Option<TimerId>,
    awaiting_confirm: bool,
    restart: Option<usize>,
}

impl Session {
    /// Build the stage's formation, the hero and its escorts, and start the loop timer.
    pub fn new(settings: Rc<Settings>, stage: usize, score: u32, timers: Scheduler) -> Self {
        let mut session = Session {
            settings,
            stage,
            score,
            phase: Phase::Playing,
            timers,
            entities: BTreeMap::new(),
            hero: EntityId(0),
            next_id: 1,
            loop_timer: None,
            banner: None,
            awaiting_confirm: false,
            restart: None,
        };
        session.populate();
        let tick_ms = session.settings.tick_ms;
        session.loop_timer = Some(session.timers.every(tick_ms, Task::Tick));
        session
    }

    fn populate(&mut self) {
        let settings = Rc::clone(&self.settings);
        let (w, h) = (settings.field_width, settings.field_height);

        match settings.stages.get(self.stage) {
            Some(def) => {
                let placed = self.spawn_formation(&def.grid);
                if def.boss {
                    let health = settings.boss_health;
                    self.spawn(|id| Entity::boss(id, (w - BOSS_WIDTH) / 2.0, 0.0, health));
                }
                info!(
                    "stage {}/{}: {} enemies{}",
                    self.stage + 1,
                    settings.stage_count(),
                    placed,
                    if def.boss { " and the boss" } else { "" }
                );
            }
            None => debug!("stage {} has no definition; starting empty", self.stage),
        }

        let (hero_x, hero_y) = ((w - HERO_WIDTH) / 2.0, h - h / 4.0);
        let health = settings.hero_health;
        self.hero = self.spawn(|id| Entity::hero(id, hero_x, hero_y, health));
        self.spawn(|id| Entity::escort(id, Side::Left, hero_x, hero_y));
        self.spawn(|id| Entity::escort(id, Side::Right, hero_x, hero_y));
    }

    fn alloc_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add an entity and arm its autonomous step timer.
    pub fn spawn(&mut self, build: impl FnOnce(EntityId) -> Entity) -> EntityId {
        let id = self.alloc_id();
        let mut entity = build(id);
        let period = match entity.kind() {
            EntityKind::Enemy => Some(self.settings.enemy_step_ms),
            EntityKind::Projectile => Some(self.settings.laser_step_ms),
            EntityKind::Escort => Some(self.settings.escort_fire_ms),
            EntityKind::Boss => Some(self.settings.boss_pulse_ms),
            EntityKind::Player => None,
        };
        if let Some(period) = period {
            entity.step = Some(self.timers.every(period, Task::Step(id)));
        }
        debug!(
            "spawn {:?} #{} at ({:.0}, {:.0})",
            entity.kind(),
            id.0,
            entity.x,
            entity.y
        );
        self.entities.insert(id, entity);
        id
    }

    /// Spawn one enemy per occupied cell.  Returns how many were placed.
    pub fn spawn_formation(&mut self, grid: &[Vec<u8>]) -> usize {
        let formation = place_enemies(grid, self.settings.field_width);
        let (cw, ch) = (formation.cell_width, formation.cell_height);
        for &(x, y) in &formation.slots {
            self.spawn(|id| Entity::enemy(id, x, y, cw, ch));
        }
        formation.slots.len()
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_live(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn loop_running(&self) -> bool {
        self.loop_timer.is_some()
    }

    pub fn awaiting_confirm(&self) -> bool {
        self.awaiting_confirm
    }

    /// Entities in id order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn hero_id(&self) -> EntityId {
        self.hero
    }

    pub fn hero_entity(&self) -> Option<&Entity> {
        self.entities.get(&self.hero)
    }

    pub fn hero(&self) -> Option<&Hero> {
        self.hero_entity().and_then(Entity::as_hero)
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.entities.values().filter(|e| e.kind() == kind).count()
    }

    /// Enemies and bosses not yet removed (dying ones included).
    pub fn hostiles_remaining(&self) -> usize {
        self.entities
            .values()
            .filter(|e| e.is_hostile() && e.is_alive())
            .count()
    }

    // ── Per-tick work ─────────────────────────────────────────────────────────

    /// Move the hero by its velocity and pull the escorts along.
    pub fn steer(&mut self) {
        let (w, h) = (self.settings.field_width, self.settings.field_height);
        let Some(hero) = self.entities.get_mut(&self.hero) else {
            return;
        };
        hero.steer(w, h);
        let (hx, hy) = (hero.x, hero.y);
        for entity in self.entities.values_mut() {
            entity.follow_hero(hx, hy);
        }
    }

    /// Drop every dead entity, cancelling the timers it still owns.
    pub fn prune(&mut self) -> usize {
        let dead: Vec<EntityId> = self
            .entities
            .values()
            .filter(|e| !e.is_alive())
            .map(|e| e.id)
            .collect();
        for id in &dead {
            if let Some(mut entity) = self.entities.remove(id) {
                entity.release_timers(&mut self.timers);
            }
        }
        dead.len()
    }

    // ── Hero actions ──────────────────────────────────────────────────────────

    pub fn set_hero_velocity(&mut self, axis: Axis, value: f32) {
        if let Some(hero) = self.entities.get_mut(&self.hero) {
            hero.set_velocity_axis(axis, value);
        }
    }

    /// Fire a laser if the cooldown has run out.  Returns the new laser.
    pub fn fire(&mut self) -> Option<EntityId> {
        let step_ms = self.settings.cooldown_step_ms;
        let cooldown_ms = self.settings.fire_cooldown_ms;
        let hero_id = self.hero;

        let entity = self.entities.get_mut(&hero_id)?;
        let (x, y) = entity.muzzle();
        let hero = entity.as_hero_mut()?;
        if !hero.can_fire() {
            return None;
        }
        hero.cooldown_ms = cooldown_ms;
        if hero.cooldown_timer.is_none() {
            hero.cooldown_timer = Some(self.timers.every(step_ms, Task::Cooldown(hero_id)));
        }
        Some(self.spawn(|id| Entity::laser(id, x, y)))
    }

    // ── Collision outcomes ────────────────────────────────────────────────────

    /// The laser is spent; the enemy takes a hit.  Points only for hits that land.
    /// A laser already spent this tick hits nothing.
    pub fn laser_hit(&mut self, laser: EntityId, enemy: EntityId) -> Hit {
        let spent = match self.entities.get_mut(&laser) {
            Some(laser) => laser.on_hit(&mut self.timers, &self.settings),
            None => Hit::Ignored,
        };
        if spent == Hit::Ignored {
            return Hit::Ignored;
        }
        let hit = match self.entities.get_mut(&enemy) {
            Some(enemy) => enemy.on_hit(&mut self.timers, &self.settings),
            None => Hit::Ignored,
        };
        if hit != Hit::Ignored {
            self.score += self.settings.points_per_hit;
        }
        hit
    }

    /// The enemy is destroyed on contact and the hero loses health.  An enemy
    /// already destroyed this tick does no damage.  Returns true when this hit
    /// ends the run.
    pub fn enemy_hit_player(&mut self, enemy: EntityId) -> bool {
        let contact = match self.entities.get_mut(&enemy) {
            Some(enemy) => enemy.on_hit(&mut self.timers, &self.settings),
            None => Hit::Ignored,
        };
        if contact == Hit::Ignored {
            return false;
        }
        let hit = match self.entities.get_mut(&self.hero) {
            Some(hero) => hero.on_hit(&mut self.timers, &self.settings),
            None => Hit::Ignored,
        };
        hit == Hit::Killed && self.is_live()
    }

    // ── Timer tasks ───────────────────────────────────────────────────────────

    /// Run a per-entity task.  A task for an entity that is gone does nothing.
    pub fn run(&mut self, task: Task) {
        let settings = Rc::clone(&self.settings);
        match task {
            Task::Step(id) => {
                // The world freezes once the loop stops.
                if !self.is_live() {
                    return;
                }
                let Some(entity) = self.entities.get_mut(&id) else {
                    debug!("step for removed entity #{}", id.0);
                    return;
                };
                match entity.advance(&settings) {
                    Step::Idle => {}
                    Step::Fire { x, y } => {
                        self.spawn(|id| Entity::laser(id, x, y));
                    }
                    Step::Reinforce => {
                        self.spawn_formation(&settings.boss_wave);
                    }
                }
            }
            Task::Cooldown(id) => {
                let Some(hero) = self.entities.get_mut(&id).and_then(Entity::as_hero_mut) else {
                    debug!("cooldown for removed entity #{}", id.0);
                    return;
                };
                hero.cooldown_ms = hero.cooldown_ms.saturating_sub(settings.cooldown_step_ms);
                if hero.cooldown_ms == 0 {
                    if let Some(timer) = hero.cooldown_timer.take() {
                        self.timers.cancel(timer);
                    }
                }
            }
            Task::Expire(id) => match self.entities.get_mut(&id) {
                Some(entity) => entity.expire(),
                None => debug!("expiry for removed entity #{}", id.0),
            },
            Task::Tick | Task::Banner => trace!("{:?} is driven by the game loop", task),
        }
    }

    // ── Stage machine ─────────────────────────────────────────────────────────

    pub fn stage_cleared(&mut self) {
        if !self.is_live() {
            return;
        }
        self.stop_loop();
        self.stage += 1;
        if self.stage >= self.settings.stage_count() {
            info!("victory with {} points", self.score);
            self.phase = Phase::Victory;
        } else {
            info!("stage {} cleared ({} points)", self.stage, self.score);
            self.phase = Phase::StageClear;
        }
        self.schedule_banner();
    }

    pub fn lose(&mut self) {
        if !self.is_live() {
            return;
        }
        self.stop_loop();
        info!("defeat on stage {} with {} points", self.stage + 1, self.score);
        self.phase = Phase::Defeat;
        self.schedule_banner();
    }

    fn stop_loop(&mut self) {
        if let Some(timer) = self.loop_timer.take() {
            self.timers.cancel(timer);
        }
    }

    fn schedule_banner(&mut self) {
        let delay = self.settings.banner_delay_ms;
        self.banner = Some(self.timers.once(delay, Task::Banner));
    }

    /// The banner is up; confirm is accepted from now on.
    pub fn show_banner(&mut self) -> bool {
        self.banner = None;
        if self.is_live() {
            return false;
        }
        self.awaiting_confirm = true;
        true
    }

    /// Ask for a restart: the next stage after a clear, stage 0 after the game ended.
    pub fn confirm(&mut self) {
        if !self.awaiting_confirm {
            return;
        }
        self.restart = Some(match self.phase {
            Phase::StageClear => self.stage,
            _ => 0,
        });
    }

    pub fn take_restart(&mut self) -> Option<usize> {
        self.restart.take()
    }

    /// Cancel every timer this session started.  Hands back the clock and the score.
    pub fn teardown(mut self) -> (Scheduler, u32) {
        self.stop_loop();
        if let Some(banner) = self.banner.take() {
            self.timers.cancel(banner);
        }
        for entity in self.entities.values_mut() {
            entity.release_timers(&mut self.timers);
        }
        (self.timers, self.score)
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// Wire input and game events to the session.
pub fn subscribe_handlers(bus: &EventBus<Session>) {
    let moves: [(Direction, Axis, f32); 4] = [
        (Direction::Up, Axis::Y, -1.0),
        (Direction::Down, Axis::Y, 1.0),
        (Direction::Left, Axis::X, -1.0),
        (Direction::Right, Axis::X, 1.0),
    ];
    for (direction, axis, sign) in moves {
        bus.subscribe(Topic::KeyDown(direction), move |_, session, _| {
            let speed = session.settings().hero_speed;
            session.set_hero_velocity(axis, sign * speed);
        });
        bus.subscribe(Topic::KeyUp(direction), move |_, session, _| {
            session.set_hero_velocity(axis, 0.0);
        });
    }

    bus.subscribe(Topic::Fire, |_, session, _| {
        if session.is_live() {
            session.fire();
        }
    });
    bus.subscribe(Topic::Confirm, |_, session, _| session.confirm());

    bus.subscribe(Topic::LaserHitEnemy, |_, session, event| {
        if let Payload::LaserHit { laser, enemy } = event.payload {
            session.laser_hit(laser, enemy);
        }
    });
    bus.subscribe(Topic::EnemyHitPlayer, |bus, session, event| {
        if let Payload::PlayerHit { enemy } = event.payload {
            if session.enemy_hit_player(enemy) {
                bus.publish(session, Topic::GameLost, Payload::None);
            }
        }
    });

    bus.subscribe(Topic::StageCleared, |_, session, _| session.stage_cleared());
    bus.subscribe(Topic::GameLost, |_, session, _| session.lose());
}

// ── Game ──────────────────────────────────────────────────────────────────────

/// Clear, draw every entity, run the update pass, then the HUD if still playing.
pub fn frame(bus: &EventBus<Session>, session: &mut Session, canvas: &mut dyn Canvas) {
    canvas.clear();
    for entity in session.entities() {
        canvas.draw_sprite(&entity.view());
    }
    compute::update(bus, session);
    if session.is_live() {
        draw_hud(canvas, session);
    }
}

pub struct Game {
    settings: Rc<Settings>,
    bus: EventBus<Session>,
    session: Option<Session>,
}

impl Game {
    pub fn new(settings: Settings) -> Self {
        Game {
            settings: Rc::new(settings),
            bus: EventBus::new(),
            session: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    pub fn bus(&self) -> &EventBus<Session> {
        &self.bus
    }

    /// Begin at stage 0.  Does nothing if a game is already running.
    pub fn start(&mut self) -> bool {
        if self.session.is_some() {
            return false;
        }
        self.open(0, 0, Scheduler::new());
        true
    }

    fn open(&mut self, stage: usize, score: u32, timers: Scheduler) {
        subscribe_handlers(&self.bus);
        self.session = Some(Session::new(Rc::clone(&self.settings), stage, score, timers));
    }

    /// Tear the current session down and start `stage` afresh.  Score carries
    /// over unless restarting from stage 0.  Without a running game this is a
    /// no-op and returns false.
    pub fn reset(&mut self, stage: usize) -> bool {
        let Some(old) = self.session.take() else {
            debug!("reset ignored: no game running");
            return false;
        };
        self.bus.clear();
        let (timers, score) = old.teardown();
        let score = if stage == 0 { 0 } else { score };
        info!("reset to stage {} (score {})", stage + 1, score);
        self.open(stage, score, timers);
        true
    }

    pub fn publish(&mut self, topic: Topic, payload: Payload) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        self.bus.publish(session, topic, payload);
        if let Some(stage) = session.take_restart() {
            self.reset(stage);
        }
    }

    pub fn press(&mut self, key: Key) {
        self.publish(key.press_topic(), Payload::None);
    }

    pub fn release(&mut self, key: Key) {
        if let Some(topic) = key.release_topic() {
            self.publish(topic, Payload::None);
        }
    }

    /// Let `elapsed_ms` of game time pass, running every timer that falls due.
    pub fn advance(&mut self, elapsed_ms: u64, canvas: &mut dyn Canvas) {
        let until = match &self.session {
            Some(session) => session.timers.now() + elapsed_ms,
            None => return,
        };
        loop {
            let Some(session) = self.session.as_mut() else {
                return;
            };
            let Some(task) = session.timers.pop_due(until) else {
                session.timers.settle(until);
                return;
            };
            trace!("{:?} at {}ms", task, session.timers.now());
            match task {
                Task::Tick => frame(&self.bus, session, canvas),
                Task::Banner => {
                    if session.show_banner() {
                        draw_banner(canvas, session);
                    }
                }
                other => session.run(other),
            }
        }
    }
}
