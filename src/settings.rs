//! Game tuning
//!
//! Every timing and balance constant of the game, loadable from a JSON file.
//! Missing fields fall back to the defaults below.

use serde::{Deserialize, Serialize};

use crate::stages::{default_stages, StageDef};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Game-loop period
    pub tick_ms: u64,
    /// Playfield size in units
    pub field_width: f32,
    pub field_height: f32,

    // === Hero ===
    pub hero_health: u32,
    /// Distance moved per tick while a direction key is held
    pub hero_speed: f32,
    pub fire_cooldown_ms: u64,
    /// Period of the cooldown decay; each step removes this much cooldown
    pub cooldown_step_ms: u64,
    pub escort_fire_ms: u64,

    // === Enemies ===
    pub enemy_step_ms: u64,
    pub enemy_drop: f32,
    pub enemy_grace_ms: u64,

    // === Lasers ===
    pub laser_step_ms: u64,
    pub laser_speed: f32,

    // === Boss ===
    pub boss_health: u32,
    pub boss_pulse_ms: u64,
    pub boss_regen: u32,
    pub boss_grace_ms: u64,
    /// Formation spawned on every boss pulse
    pub boss_wave: Vec<Vec<u8>>,

    // === Flow ===
    pub points_per_hit: u32,
    /// Delay before the stage-clear / end-of-game message appears
    pub banner_delay_ms: u64,
    pub stages: Vec<StageDef>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            field_width: 1024.0,
            field_height: 768.0,

            hero_health: 3,
            hero_speed: 5.0,
            fire_cooldown_ms: 500,
            cooldown_step_ms: 100,
            escort_fire_ms: 3000,

            enemy_step_ms: 300,
            enemy_drop: 5.0,
            enemy_grace_ms: 100,

            laser_step_ms: 100,
            laser_speed: 15.0,

            boss_health: 30,
            boss_pulse_ms: 5000,
            boss_regen: 5,
            boss_grace_ms: 300,
            boss_wave: vec![vec![1, 0, 1, 0, 1]],

            points_per_hit: 100,
            banner_delay_ms: 200,
            stages: default_stages(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON.  Unknown fields are ignored.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Number of stages; reaching this index is victory.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}
