//! Drawing contract
//!
//! The core never touches a screen.  It hands sprite descriptors and text to a
//! `Canvas`, which the front-end implements.

use crate::entities::Sprite;
use crate::geometry::Rect;
use crate::session::{Phase, Session};

/// Everything a renderer needs to draw one entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteView {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub sprite: Sprite,
}

/// Colour role of a piece of text
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Hud,
    Alert,
    Success,
}

pub trait Canvas {
    /// Wipe the surface and redraw the background.
    fn clear(&mut self);
    fn draw_sprite(&mut self, view: &SpriteView);
    /// Draw `text` centred horizontally in `area` (playfield units).
    fn draw_text(&mut self, area: Rect, text: &str, tone: Tone);
}

/// Height of the HUD strip along the bottom edge
const HUD_HEIGHT: f32 = 30.0;

/// Score bottom-left, stage in the middle, remaining health bottom-right.
pub fn draw_hud(canvas: &mut dyn Canvas, session: &Session) {
    let settings = session.settings();
    let (w, h) = (settings.field_width, settings.field_height);
    let top = h - HUD_HEIGHT;
    let third = w / 3.0;

    canvas.draw_text(
        Rect::new(0.0, top, third, HUD_HEIGHT),
        &format!("Points: {}", session.score),
        Tone::Hud,
    );
    canvas.draw_text(
        Rect::new(third, top, third, HUD_HEIGHT),
        &format!("Stage {}/{}", session.stage + 1, settings.stage_count()),
        Tone::Hud,
    );
    let health = session.hero().map(|hero| hero.health).unwrap_or(0);
    canvas.draw_text(
        Rect::new(2.0 * third, top, third, HUD_HEIGHT),
        &"♥".repeat(health as usize),
        Tone::Alert,
    );
}

/// Full-screen message shown between stages and at the end of a run.
pub fn draw_banner(canvas: &mut dyn Canvas, session: &Session) {
    let (message, tone) = match session.phase {
        Phase::StageClear => ("Stage Clear! Press [Enter] to start next stage", Tone::Success),
        Phase::Victory => (
            "Victory!!! Pew Pew... - Press [Enter] to start a new game",
            Tone::Success,
        ),
        Phase::Defeat => ("You died !!! Press [Enter] to start a new game", Tone::Alert),
        Phase::Playing => return,
    };
    let settings = session.settings();
    canvas.clear();
    canvas.draw_text(
        Rect::new(0.0, settings.field_height / 2.0, settings.field_width, HUD_HEIGHT),
        message,
        tone,
    );
}
