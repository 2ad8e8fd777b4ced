//! Space Game - a small arcade shooter core
//!
//! Core modules:
//! - `geometry`: axis-aligned rectangles and the overlap test
//! - `entities`: hero, escorts, enemies, boss and lasers
//! - `events`: synchronous publish/subscribe bus
//! - `timers`: timer contract and the virtual-clock scheduler
//! - `compute`: per-tick collision and update pass
//! - `stages`: formation grids and enemy placement
//! - `session`: session state, stage machine and the game loop driver
//! - `render`: drawing contract and HUD
//! - `settings`: tuning loaded from JSON

pub mod compute;
pub mod entities;
pub mod events;
pub mod geometry;
pub mod render;
pub mod session;
pub mod settings;
pub mod stages;
pub mod timers;

pub use session::{Game, Key, Phase, Session};
pub use settings::Settings;

/// Fixed sizes, in playfield units
pub mod consts {
    pub const HERO_WIDTH: f32 = 99.0;
    pub const HERO_HEIGHT: f32 = 75.0;
    pub const ESCORT_WIDTH: f32 = HERO_WIDTH / 2.0;
    pub const ESCORT_HEIGHT: f32 = HERO_HEIGHT / 2.0;
    pub const ENEMY_WIDTH: f32 = 98.0;
    pub const ENEMY_HEIGHT: f32 = 50.0;
    pub const BOSS_WIDTH: f32 = 91.0;
    pub const BOSS_HEIGHT: f32 = 91.0;
    pub const LASER_WIDTH: f32 = 9.0;
    pub const LASER_HEIGHT: f32 = 33.0;
    /// Gap between a shooter's nose and the laser it spawns
    pub const MUZZLE_GAP: f32 = 10.0;
    /// Rows wider than this shrink to fit the playfield
    pub const FORMATION_COLUMNS: usize = 10;
}
