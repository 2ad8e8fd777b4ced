/// Game entities: one shared record plus a variant body.
///
/// Autonomous behaviour is driven from outside: the session owns the timers
/// and calls `advance` when an entity's step timer fires, then applies the
/// returned `Step`.

use crate::consts::*;
use crate::geometry::Rect;
use crate::render::SpriteView;
use crate::settings::Settings;
use crate::timers::{Task, TimerId, Timers};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// Collision-filtering tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Player,
    Escort,
    Enemy,
    Boss,
    Projectile,
}

/// Visual handle.  The core only swaps it; the renderer decides what it looks like.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sprite {
    Hero,
    HeroLeft,
    HeroRight,
    Escort,
    Enemy,
    Boss,
    Laser,
    Explosion,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Result of `Entity::on_hit`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
    /// Already dying, dead, or not damageable.
    Ignored,
    /// Lost health but still standing.
    Damaged,
    /// This hit finished it.
    Killed,
}

/// Work an autonomous step asks the session to do.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Step {
    Idle,
    /// Spawn a laser with its top-left corner here.
    Fire { x: f32, y: f32 },
    /// Spawn the boss reinforcement row.
    Reinforce,
}

// ── Variant payloads ──────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Hero {
    pub health: u32,
    /// Milliseconds until the next shot is allowed.
    pub cooldown_ms: u64,
    pub vx: f32,
    pub vy: f32,
    pub cooldown_timer: Option<TimerId>,
}

impl Hero {
    pub fn new(health: u32) -> Self {
        Hero {
            health,
            cooldown_ms: 0,
            vx: 0.0,
            vy: 0.0,
            cooldown_timer: None,
        }
    }

    pub fn can_fire(&self) -> bool {
        self.cooldown_ms == 0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Boss {
    pub health: u32,
    /// Regeneration never goes past this.
    pub max_health: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    Player(Hero),
    Escort(Side),
    Enemy,
    Boss(Boss),
    Laser,
}

// ── Entity ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Entity {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// False once the entity is due for removal at the end of the tick.
    pub alive: bool,
    /// Hit and playing its death frame; still alive until the grace delay ends.
    pub dying: bool,
    pub sprite: Sprite,
    pub body: Body,
    /// Periodic autonomous timer (descent, travel, escort fire, boss pulse).
    pub step: Option<TimerId>,
    /// Pending grace-delay removal.
    pub expire: Option<TimerId>,
}

impl Entity {
    fn with_body(
        id: EntityId,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        sprite: Sprite,
        body: Body,
    ) -> Self {
        Entity {
            id,
            x,
            y,
            width,
            height,
            alive: true,
            dying: false,
            sprite,
            body,
            step: None,
            expire: None,
        }
    }

    pub fn hero(id: EntityId, x: f32, y: f32, health: u32) -> Self {
        Self::with_body(
            id,
            x,
            y,
            HERO_WIDTH,
            HERO_HEIGHT,
            Sprite::Hero,
            Body::Player(Hero::new(health)),
        )
    }

    /// An escort starts on top of the hero; `follow_hero` places it.
    pub fn escort(id: EntityId, side: Side, hero_x: f32, hero_y: f32) -> Self {
        let mut escort = Self::with_body(
            id,
            hero_x,
            hero_y,
            ESCORT_WIDTH,
            ESCORT_HEIGHT,
            Sprite::Escort,
            Body::Escort(side),
        );
        escort.follow_hero(hero_x, hero_y);
        escort
    }

    pub fn enemy(id: EntityId, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::with_body(id, x, y, width, height, Sprite::Enemy, Body::Enemy)
    }

    pub fn boss(id: EntityId, x: f32, y: f32, health: u32) -> Self {
        Self::with_body(
            id,
            x,
            y,
            BOSS_WIDTH,
            BOSS_HEIGHT,
            Sprite::Boss,
            Body::Boss(Boss {
                health,
                max_health: health,
            }),
        )
    }

    pub fn laser(id: EntityId, x: f32, y: f32) -> Self {
        Self::with_body(id, x, y, LASER_WIDTH, LASER_HEIGHT, Sprite::Laser, Body::Laser)
    }

    pub fn kind(&self) -> EntityKind {
        match self.body {
            Body::Player(_) => EntityKind::Player,
            Body::Escort(_) => EntityKind::Escort,
            Body::Enemy => EntityKind::Enemy,
            Body::Boss(_) => EntityKind::Boss,
            Body::Laser => EntityKind::Projectile,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_dying(&self) -> bool {
        self.dying
    }

    pub fn is_hostile(&self) -> bool {
        matches!(self.kind(), EntityKind::Enemy | EntityKind::Boss)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn view(&self) -> SpriteView {
        SpriteView {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            sprite: self.sprite,
        }
    }

    pub fn as_hero(&self) -> Option<&Hero> {
        match &self.body {
            Body::Player(hero) => Some(hero),
            _ => None,
        }
    }

    pub fn as_hero_mut(&mut self) -> Option<&mut Hero> {
        match &mut self.body {
            Body::Player(hero) => Some(hero),
            _ => None,
        }
    }

    pub fn as_boss(&self) -> Option<&Boss> {
        match &self.body {
            Body::Boss(boss) => Some(boss),
            _ => None,
        }
    }

    /// Where a laser fired by this entity starts: centred on its nose.
    pub fn muzzle(&self) -> (f32, f32) {
        (
            self.x + (self.width - LASER_WIDTH) / 2.0,
            self.y - MUZZLE_GAP,
        )
    }

    // ── Autonomous behaviour ──────────────────────────────────────────────────

    /// One firing of the entity's step timer.
    pub fn advance(&mut self, settings: &Settings) -> Step {
        if !self.alive || self.dying {
            return Step::Idle;
        }
        let (muzzle_x, muzzle_y) = self.muzzle();
        match &mut self.body {
            Body::Enemy => {
                if self.y < settings.field_height - self.height {
                    self.y += settings.enemy_drop;
                } else {
                    // Slipped past the hero
                    self.alive = false;
                }
                Step::Idle
            }
            Body::Laser => {
                if self.y > 0.0 {
                    self.y -= settings.laser_speed;
                } else {
                    self.alive = false;
                }
                Step::Idle
            }
            Body::Boss(boss) => {
                if boss.health < boss.max_health {
                    boss.health = (boss.health + settings.boss_regen).min(boss.max_health);
                }
                Step::Reinforce
            }
            Body::Escort(_) => Step::Fire {
                x: muzzle_x,
                y: muzzle_y,
            },
            Body::Player(_) => Step::Idle,
        }
    }

    /// Per-tick movement of the hero from its velocity intent, kept on the field.
    pub fn steer(&mut self, field_width: f32, field_height: f32) {
        let (max_x, max_y) = (
            (field_width - self.width).max(0.0),
            (field_height - self.height).max(0.0),
        );
        if let Body::Player(hero) = &self.body {
            let (vx, vy) = (hero.vx, hero.vy);
            self.x = (self.x + vx).clamp(0.0, max_x);
            self.y = (self.y + vy).clamp(0.0, max_y);
            self.sprite = if vx < 0.0 {
                Sprite::HeroLeft
            } else if vx > 0.0 {
                Sprite::HeroRight
            } else {
                Sprite::Hero
            };
        }
    }

    pub fn set_velocity_axis(&mut self, axis: Axis, value: f32) {
        if let Some(hero) = self.as_hero_mut() {
            match axis {
                Axis::X => hero.vx = value,
                Axis::Y => hero.vy = value,
            }
        }
    }

    /// Escorts hold no position of their own between ticks.
    pub fn follow_hero(&mut self, hero_x: f32, hero_y: f32) {
        if let Body::Escort(side) = self.body {
            let offset = match side {
                Side::Left => -self.width,
                Side::Right => 2.0 * self.width,
            };
            self.x = hero_x + offset;
            self.y = hero_y + self.height * 0.5;
        }
    }

    // ── Damage ────────────────────────────────────────────────────────────────

    /// Apply one hit.  Calling it again on a dying or dead entity is a no-op.
    pub fn on_hit(&mut self, timers: &mut dyn Timers, settings: &Settings) -> Hit {
        if !self.alive || self.dying {
            return Hit::Ignored;
        }
        let (hit, grace) = match &mut self.body {
            Body::Laser => {
                self.alive = false;
                (Hit::Killed, None)
            }
            Body::Enemy => (Hit::Killed, Some(settings.enemy_grace_ms)),
            Body::Boss(boss) => {
                boss.health = boss.health.saturating_sub(1);
                if boss.health == 0 {
                    (Hit::Killed, Some(settings.boss_grace_ms))
                } else {
                    (Hit::Damaged, None)
                }
            }
            Body::Player(hero) => {
                if hero.health == 0 {
                    (Hit::Ignored, None)
                } else {
                    hero.health -= 1;
                    if hero.health == 0 {
                        (Hit::Killed, None)
                    } else {
                        (Hit::Damaged, None)
                    }
                }
            }
            Body::Escort(_) => (Hit::Ignored, None),
        };
        if let Some(grace_ms) = grace {
            self.start_dying(timers, grace_ms);
        }
        hit
    }

    /// Switch to the death frame, stop autonomous behaviour, and schedule removal.
    fn start_dying(&mut self, timers: &mut dyn Timers, grace_ms: u64) {
        self.dying = true;
        self.sprite = Sprite::Explosion;
        if let Some(step) = self.step.take() {
            timers.cancel(step);
        }
        self.expire = Some(timers.once(grace_ms, Task::Expire(self.id)));
    }

    /// Grace delay over.
    pub fn expire(&mut self) {
        self.expire = None;
        self.alive = false;
    }

    /// Cancel every timer this entity still owns.
    pub fn release_timers(&mut self, timers: &mut dyn Timers) {
        if let Some(step) = self.step.take() {
            timers.cancel(step);
        }
        if let Some(expire) = self.expire.take() {
            timers.cancel(expire);
        }
        if let Some(hero) = self.as_hero_mut() {
            if let Some(cooldown) = hero.cooldown_timer.take() {
                timers.cancel(cooldown);
            }
        }
    }
}
