/// Per-tick collision and update pass.
///
/// Detection only publishes events; the handlers subscribed on the bus decide
/// what a collision does.  Every pair is tested and every event handled
/// before anything is pruned, so one tick can register several kills.

use crate::entities::{EntityId, EntityKind};
use crate::events::{EventBus, Payload, Topic};
use crate::geometry::{intersects, Rect};
use crate::session::Session;

/// Targets that can still be hit: alive and not already dying.
#[derive(Clone, Debug, Default)]
pub struct Partition {
    /// Enemies and the boss.
    pub hostiles: Vec<(EntityId, Rect)>,
    pub lasers: Vec<(EntityId, Rect)>,
}

pub fn partition(session: &Session) -> Partition {
    let mut parts = Partition::default();
    for entity in session.entities() {
        if !entity.is_alive() || entity.is_dying() {
            continue;
        }
        if entity.is_hostile() {
            parts.hostiles.push((entity.id, entity.rect()));
        } else if entity.kind() == EntityKind::Projectile {
            parts.lasers.push((entity.id, entity.rect()));
        }
    }
    parts
}

/// Advance the simulation by one tick.
pub fn update(bus: &EventBus<Session>, session: &mut Session) {
    // ── 1. Hero movement; escorts follow ─────────────────────────────────────
    session.steer();

    let Partition { hostiles, lasers } = partition(session);

    // ── 2. Lasers ↔ hostiles ─────────────────────────────────────────────────
    for &(laser, laser_rect) in &lasers {
        for &(enemy, enemy_rect) in &hostiles {
            if intersects(&laser_rect, &enemy_rect) {
                bus.publish(session, Topic::LaserHitEnemy, Payload::LaserHit { laser, enemy });
            }
        }
    }

    // ── 3. Hostiles ↔ hero ───────────────────────────────────────────────────
    if let Some(hero_rect) = session.hero_entity().map(|hero| hero.rect()) {
        for &(enemy, enemy_rect) in &hostiles {
            if intersects(&hero_rect, &enemy_rect) {
                bus.publish(session, Topic::EnemyHitPlayer, Payload::PlayerHit { enemy });
            }
        }
    }

    // ── 4. Remove the dead ───────────────────────────────────────────────────
    session.prune();

    // ── 5. Stage clear ───────────────────────────────────────────────────────
    if session.is_live() && session.hostiles_remaining() == 0 {
        bus.publish(session, Topic::StageCleared, Payload::None);
    }
}
