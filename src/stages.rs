/// Stage definitions and formation placement.
///
/// A stage is an occupancy grid (1 = enemy, 0 = gap) whose rows may have
/// different lengths, plus an optional boss.

use serde::{Deserialize, Serialize};

use crate::consts::{ENEMY_HEIGHT, ENEMY_WIDTH, FORMATION_COLUMNS};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageDef {
    pub grid: Vec<Vec<u8>>,
    #[serde(default)]
    pub boss: bool,
}

impl StageDef {
    pub fn new(grid: Vec<Vec<u8>>) -> Self {
        StageDef { grid, boss: false }
    }

    pub fn with_boss(mut self) -> Self {
        self.boss = true;
        self
    }

    /// Enemies this stage spawns (the boss is not counted).
    pub fn enemy_count(&self) -> usize {
        self.grid.iter().flatten().filter(|&&c| c == 1).count()
    }
}

/// Where the enemies of one grid go.
#[derive(Clone, Debug, PartialEq)]
pub struct Formation {
    pub scale: f32,
    pub cell_width: f32,
    pub cell_height: f32,
    /// Top-left corner of every enemy, row by row.
    pub slots: Vec<(f32, f32)>,
}

/// Uniform shrink factor: `min(1, 10 / longest row)`.
pub fn formation_scale(grid: &[Vec<u8>]) -> f32 {
    let longest = grid.iter().map(|row| row.len()).max().unwrap_or(0);
    if longest > FORMATION_COLUMNS {
        FORMATION_COLUMNS as f32 / longest as f32
    } else {
        1.0
    }
}

/// Lay out a grid across a playfield `field_width` units wide, each row
/// centred on its own length.
pub fn place_enemies(grid: &[Vec<u8>], field_width: f32) -> Formation {
    let scale = formation_scale(grid);
    let cell_width = ENEMY_WIDTH * scale;
    let cell_height = ENEMY_HEIGHT * scale;

    let mut slots = Vec::new();
    for (row_idx, row) in grid.iter().enumerate() {
        let start_x = (field_width - cell_width * row.len() as f32) / 2.0;
        for (col_idx, &cell) in row.iter().enumerate() {
            if cell == 1 {
                slots.push((
                    start_x + col_idx as f32 * cell_width,
                    row_idx as f32 * cell_height,
                ));
            }
        }
    }

    Formation {
        scale,
        cell_width,
        cell_height,
        slots,
    }
}

/// The five stages of the game: a triangle, a scatter, a block, a wide
/// wedge and a fifteen-column fortress guarded by the boss.
pub fn default_stages() -> Vec<StageDef> {
    vec![
        StageDef::new(vec![
            vec![1, 1, 1, 1, 1],
            vec![1, 1, 1, 1],
            vec![1, 1, 1],
            vec![1, 1],
            vec![1],
        ]),
        StageDef::new(vec![
            vec![0, 0, 0, 0, 1, 1, 1, 0, 0, 0, 0],
            vec![0, 0, 0, 0, 1, 1, 0, 1, 1, 0],
            vec![0, 1, 1, 0, 0, 0, 0, 1, 0],
            vec![0, 0, 1, 0, 0, 1, 1, 0, 0, 0],
            vec![0, 0, 0, 0, 0, 1, 0, 0, 0],
        ]),
        StageDef::new(vec![vec![1, 1, 1, 1, 1]; 5]),
        StageDef::new(vec![
            vec![1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            vec![0, 1, 0, 1, 1, 1, 1, 0, 1, 0],
            vec![0, 0, 0, 0, 1, 1, 0, 0, 0, 0],
        ]),
        StageDef::new(vec![
            vec![0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0],
            vec![0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0],
            vec![0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0],
            vec![1, 1, 1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 1, 1, 1],
            vec![0, 1, 1, 1, 1, 1, 0, 0, 0, 1, 1, 1, 1, 1, 0],
            vec![0, 0, 1, 1, 1, 0, 0, 0, 0, 0, 1, 1, 1, 0, 0],
            vec![0, 0, 0, 1, 1, 0, 0, 0, 0, 0, 1, 1, 0, 0, 0],
        ])
        .with_boss(),
    ]
}
