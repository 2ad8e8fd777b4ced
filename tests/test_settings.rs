use space_game::stages::StageDef;
use space_game::Settings;

#[test]
fn empty_object_gives_defaults() {
    let s = Settings::from_json("{}").unwrap();
    assert_eq!(s, Settings::default());
}

#[test]
fn defaults_match_the_arcade_tuning() {
    let s = Settings::default();
    assert_eq!(s.tick_ms, 100);
    assert_eq!((s.field_width, s.field_height), (1024.0, 768.0));
    assert_eq!(s.fire_cooldown_ms, 500);
    assert_eq!(s.enemy_step_ms, 300);
    assert_eq!(s.boss_health, 30);
    assert_eq!(s.points_per_hit, 100);
    assert_eq!(s.stage_count(), 5);
}

#[test]
fn partial_json_overrides_only_named_fields() {
    let s = Settings::from_json(r#"{ "hero_health": 1, "laser_speed": 30.0 }"#).unwrap();
    assert_eq!(s.hero_health, 1);
    assert_eq!(s.laser_speed, 30.0);
    assert_eq!(s.tick_ms, 100);
}

#[test]
fn stages_can_be_replaced() {
    let json = r#"{ "stages": [ { "grid": [[1, 1]] }, { "grid": [], "boss": true } ] }"#;
    let s = Settings::from_json(json).unwrap();
    assert_eq!(
        s.stages,
        vec![StageDef::new(vec![vec![1, 1]]), StageDef::new(vec![]).with_boss()]
    );
}

#[test]
fn written_settings_read_back() {
    let mut s = Settings::default();
    s.boss_regen = 2;
    let json = s.to_json().unwrap();
    assert_eq!(Settings::from_json(&json).unwrap(), s);
}

#[test]
fn malformed_json_is_an_error() {
    assert!(Settings::from_json("{ tick_ms: ").is_err());
    assert!(Settings::from_json(r#"{ "tick_ms": "fast" }"#).is_err());
}
