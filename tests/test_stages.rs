use space_game::consts::{ENEMY_HEIGHT, ENEMY_WIDTH};
use space_game::stages::*;

const FIELD_WIDTH: f32 = 1024.0;

#[test]
fn single_cell_is_centred_at_full_size() {
    let f = place_enemies(&[vec![1]], FIELD_WIDTH);
    assert_eq!(f.scale, 1.0);
    assert_eq!(f.slots, vec![((FIELD_WIDTH - ENEMY_WIDTH) / 2.0, 0.0)]);
}

#[test]
fn wide_rows_shrink_the_whole_formation() {
    let grid = vec![vec![1; 15]];
    let f = place_enemies(&grid, FIELD_WIDTH);
    assert!((f.scale - 10.0 / 15.0).abs() < 1e-6);
    assert!((f.cell_width - ENEMY_WIDTH * 10.0 / 15.0).abs() < 1e-4);
    assert!((f.cell_height - ENEMY_HEIGHT * 10.0 / 15.0).abs() < 1e-4);
    assert_eq!(f.slots.len(), 15);
    // Fifteen shrunken cells span the width of ten full ones.
    let (first_x, _) = f.slots[0];
    assert!((first_x - (FIELD_WIDTH - 10.0 * ENEMY_WIDTH) / 2.0).abs() < 1e-3);
}

#[test]
fn ten_columns_keep_full_size() {
    assert_eq!(formation_scale(&[vec![1; 10]]), 1.0);
}

#[test]
fn empty_grid_places_nothing() {
    let f = place_enemies(&[], FIELD_WIDTH);
    assert_eq!(f.scale, 1.0);
    assert!(f.slots.is_empty());
}

#[test]
fn gaps_are_skipped_and_rows_stack() {
    let grid = vec![vec![1, 0, 1], vec![0, 1]];
    let f = place_enemies(&grid, FIELD_WIDTH);
    let row0 = (FIELD_WIDTH - 3.0 * ENEMY_WIDTH) / 2.0;
    let row1 = (FIELD_WIDTH - 2.0 * ENEMY_WIDTH) / 2.0;
    assert_eq!(
        f.slots,
        vec![
            (row0, 0.0),
            (row0 + 2.0 * ENEMY_WIDTH, 0.0),
            (row1 + ENEMY_WIDTH, ENEMY_HEIGHT),
        ]
    );
}

#[test]
fn default_stages_end_with_the_boss() {
    let stages = default_stages();
    assert_eq!(stages.len(), 5);
    assert!(stages[..4].iter().all(|s| !s.boss));
    assert!(stages[4].boss);
    assert_eq!(stages[0].enemy_count(), 15);
    assert_eq!(stages[2].enemy_count(), 25);
    assert_eq!(formation_scale(&stages[4].grid), 10.0 / 15.0);
}

#[test]
fn stage_def_builders() {
    let def = StageDef::new(vec![vec![1, 1, 0]]);
    assert!(!def.boss);
    assert_eq!(def.enemy_count(), 2);
    assert!(def.with_boss().boss);
}
