use space_game::consts::*;
use space_game::entities::*;
use space_game::timers::{Scheduler, Task, Timers};
use space_game::Settings;

fn settings() -> Settings {
    Settings::default()
}

// ── Construction ──────────────────────────────────────────────────────────────

#[test]
fn constructors_set_kind_size_and_sprite() {
    let hero = Entity::hero(EntityId(1), 0.0, 0.0, 3);
    assert_eq!(hero.kind(), EntityKind::Player);
    assert_eq!((hero.width, hero.height), (HERO_WIDTH, HERO_HEIGHT));
    assert_eq!(hero.as_hero().map(|h| h.health), Some(3));

    let boss = Entity::boss(EntityId(2), 0.0, 0.0, 30);
    assert_eq!(boss.kind(), EntityKind::Boss);
    assert_eq!(boss.sprite, Sprite::Boss);
    assert!(boss.is_hostile());

    let laser = Entity::laser(EntityId(3), 5.0, 6.0);
    assert_eq!(laser.kind(), EntityKind::Projectile);
    assert_eq!(laser.rect().width(), LASER_WIDTH);
    assert!(!laser.is_hostile());

    let enemy = Entity::enemy(EntityId(4), 1.0, 2.0, 50.0, 25.0);
    assert!(enemy.is_alive());
    assert!(!enemy.is_dying());
    assert_eq!(enemy.view().width, 50.0);
}

#[test]
fn escorts_flank_the_hero() {
    let left = Entity::escort(EntityId(1), Side::Left, 100.0, 200.0);
    let right = Entity::escort(EntityId(2), Side::Right, 100.0, 200.0);
    assert_eq!(left.x, 100.0 - ESCORT_WIDTH);
    assert_eq!(right.x, 100.0 + 2.0 * ESCORT_WIDTH);
    assert_eq!(left.y, 200.0 + ESCORT_HEIGHT / 2.0);
    assert_eq!(right.y, left.y);
}

#[test]
fn escort_follows_a_moving_hero() {
    let mut escort = Entity::escort(EntityId(1), Side::Left, 100.0, 200.0);
    escort.follow_hero(300.0, 100.0);
    assert_eq!(escort.x, 300.0 - ESCORT_WIDTH);
    assert_eq!(escort.y, 100.0 + ESCORT_HEIGHT / 2.0);
}

#[test]
fn follow_hero_ignores_other_kinds() {
    let mut enemy = Entity::enemy(EntityId(1), 10.0, 10.0, 98.0, 50.0);
    enemy.follow_hero(500.0, 500.0);
    assert_eq!((enemy.x, enemy.y), (10.0, 10.0));
}

// ── Autonomous steps ──────────────────────────────────────────────────────────

#[test]
fn enemy_descends_then_leaves_at_the_bottom() {
    let s = settings();
    let mut enemy = Entity::enemy(EntityId(1), 0.0, 0.0, ENEMY_WIDTH, ENEMY_HEIGHT);
    assert_eq!(enemy.advance(&s), Step::Idle);
    assert_eq!(enemy.y, 5.0);

    enemy.y = s.field_height - ENEMY_HEIGHT;
    enemy.advance(&s);
    assert!(!enemy.is_alive());
}

#[test]
fn laser_climbs_then_leaves_at_the_top() {
    let s = settings();
    let mut laser = Entity::laser(EntityId(1), 0.0, 10.0);
    laser.advance(&s);
    assert_eq!(laser.y, -5.0);
    assert!(laser.is_alive());
    laser.advance(&s);
    assert!(!laser.is_alive());
}

#[test]
fn escort_step_fires_from_its_nose() {
    let s = settings();
    let mut escort = Entity::escort(EntityId(1), Side::Left, 100.0, 200.0);
    let expected = Step::Fire {
        x: escort.x + (ESCORT_WIDTH - LASER_WIDTH) / 2.0,
        y: escort.y - MUZZLE_GAP,
    };
    assert_eq!(escort.advance(&s), expected);
}

#[test]
fn boss_regenerates_up_to_its_cap_and_calls_reinforcements() {
    let s = settings();
    let mut boss = Entity::boss(EntityId(1), 0.0, 0.0, 30);
    if let Body::Boss(b) = &mut boss.body {
        b.health = 28;
    }
    assert_eq!(boss.advance(&s), Step::Reinforce);
    assert_eq!(boss.as_boss().map(|b| b.health), Some(30));

    if let Body::Boss(b) = &mut boss.body {
        b.health = 20;
    }
    boss.advance(&s);
    assert_eq!(boss.as_boss().map(|b| b.health), Some(25));
}

#[test]
fn dying_entities_do_not_step() {
    let s = settings();
    let mut enemy = Entity::enemy(EntityId(1), 0.0, 0.0, ENEMY_WIDTH, ENEMY_HEIGHT);
    enemy.dying = true;
    assert_eq!(enemy.advance(&s), Step::Idle);
    assert_eq!(enemy.y, 0.0);
}

// ── Hero movement ─────────────────────────────────────────────────────────────

#[test]
fn hero_moves_by_velocity_and_turns() {
    let mut hero = Entity::hero(EntityId(1), 100.0, 100.0, 3);
    hero.set_velocity_axis(Axis::X, -5.0);
    hero.steer(1024.0, 768.0);
    assert_eq!(hero.x, 95.0);
    assert_eq!(hero.sprite, Sprite::HeroLeft);

    hero.set_velocity_axis(Axis::X, 5.0);
    hero.set_velocity_axis(Axis::Y, 5.0);
    hero.steer(1024.0, 768.0);
    assert_eq!((hero.x, hero.y), (100.0, 105.0));
    assert_eq!(hero.sprite, Sprite::HeroRight);

    hero.set_velocity_axis(Axis::X, 0.0);
    hero.steer(1024.0, 768.0);
    assert_eq!(hero.sprite, Sprite::Hero);
}

#[test]
fn hero_stays_on_the_field() {
    let mut hero = Entity::hero(EntityId(1), 0.0, 768.0 - HERO_HEIGHT, 3);
    hero.set_velocity_axis(Axis::X, -5.0);
    hero.set_velocity_axis(Axis::Y, 5.0);
    hero.steer(1024.0, 768.0);
    assert_eq!((hero.x, hero.y), (0.0, 768.0 - HERO_HEIGHT));
}

// ── Damage ────────────────────────────────────────────────────────────────────

#[test]
fn boss_survives_a_hit_above_zero() {
    let s = settings();
    let mut timers = Scheduler::new();
    let mut boss = Entity::boss(EntityId(1), 0.0, 0.0, 5);
    boss.step = Some(timers.every(s.boss_pulse_ms, Task::Step(boss.id)));

    assert_eq!(boss.on_hit(&mut timers, &s), Hit::Damaged);
    assert_eq!(boss.as_boss().map(|b| b.health), Some(4));
    assert!(boss.is_alive());
    assert!(!boss.is_dying());
    assert!(boss.step.is_some());
}

#[test]
fn boss_at_zero_dies_after_its_grace_delay() {
    let s = settings();
    let mut timers = Scheduler::new();
    let mut boss = Entity::boss(EntityId(1), 0.0, 0.0, 1);
    let step = timers.every(s.boss_pulse_ms, Task::Step(boss.id));
    boss.step = Some(step);

    assert_eq!(boss.on_hit(&mut timers, &s), Hit::Killed);
    assert!(boss.is_dying());
    assert!(boss.is_alive());
    assert_eq!(boss.sprite, Sprite::Explosion);
    assert!(!timers.is_scheduled(step));
    assert!(boss.step.is_none());

    assert_eq!(timers.pop_due(s.boss_grace_ms - 1), None);
    assert_eq!(timers.pop_due(s.boss_grace_ms), Some(Task::Expire(boss.id)));
    boss.expire();
    assert!(!boss.is_alive());
}

#[test]
fn enemy_hit_is_idempotent() {
    let s = settings();
    let mut timers = Scheduler::new();
    let mut enemy = Entity::enemy(EntityId(1), 0.0, 0.0, ENEMY_WIDTH, ENEMY_HEIGHT);

    assert_eq!(enemy.on_hit(&mut timers, &s), Hit::Killed);
    assert_eq!(enemy.on_hit(&mut timers, &s), Hit::Ignored);
    assert_eq!(timers.pending(), 1);
    assert_eq!(timers.pop_due(s.enemy_grace_ms), Some(Task::Expire(EntityId(1))));
}

#[test]
fn laser_hit_removes_it_immediately() {
    let s = settings();
    let mut timers = Scheduler::new();
    let mut laser = Entity::laser(EntityId(1), 0.0, 0.0);
    assert_eq!(laser.on_hit(&mut timers, &s), Hit::Killed);
    assert!(!laser.is_alive());
    assert_eq!(laser.on_hit(&mut timers, &s), Hit::Ignored);
}

#[test]
fn hero_loses_health_and_stays_on_the_table() {
    let s = settings();
    let mut timers = Scheduler::new();
    let mut hero = Entity::hero(EntityId(1), 0.0, 0.0, 2);
    assert_eq!(hero.on_hit(&mut timers, &s), Hit::Damaged);
    assert_eq!(hero.on_hit(&mut timers, &s), Hit::Killed);
    assert_eq!(hero.on_hit(&mut timers, &s), Hit::Ignored);
    assert_eq!(hero.as_hero().map(|h| h.health), Some(0));
    assert!(hero.is_alive());
}

#[test]
fn escorts_are_not_damaged() {
    let s = settings();
    let mut timers = Scheduler::new();
    let mut escort = Entity::escort(EntityId(1), Side::Right, 0.0, 0.0);
    assert_eq!(escort.on_hit(&mut timers, &s), Hit::Ignored);
    assert!(escort.is_alive());
}

#[test]
fn release_timers_cancels_everything_owned() {
    let s = settings();
    let mut timers = Scheduler::new();
    let mut hero = Entity::hero(EntityId(1), 0.0, 0.0, 3);
    if let Some(h) = hero.as_hero_mut() {
        h.cooldown_timer = Some(timers.every(s.cooldown_step_ms, Task::Cooldown(EntityId(1))));
    }
    let mut enemy = Entity::enemy(EntityId(2), 0.0, 0.0, ENEMY_WIDTH, ENEMY_HEIGHT);
    enemy.step = Some(timers.every(s.enemy_step_ms, Task::Step(EntityId(2))));
    enemy.on_hit(&mut timers, &s);
    assert_eq!(timers.pending(), 2);

    hero.release_timers(&mut timers);
    enemy.release_timers(&mut timers);
    assert_eq!(timers.pending(), 0);
}
