/// Rendering layer: all terminal I/O lives here.
///
/// `TerminalCanvas` implements the core's `Canvas` by scaling playfield units
/// onto terminal cells in an off-screen buffer.  `flush` writes the buffer out
/// with crossterm.  No game logic is performed here.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    QueueableCommand,
};
use rand::Rng;
use space_game::entities::Sprite;
use space_game::geometry::Rect;
use space_game::render::{Canvas, SpriteView, Tone};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_STAR: Color = Color::DarkGrey;
const C_HERO: Color = Color::White;
const C_ESCORT: Color = Color::Grey;
const C_ENEMY: Color = Color::Green;
const C_BOSS: Color = Color::Magenta;
const C_LASER: Color = Color::Red;
const C_EXPLOSION: Color = Color::Yellow;
const C_HUD: Color = Color::Yellow;
const C_ALERT: Color = Color::Red;
const C_SUCCESS: Color = Color::Green;

/// One star per this many cells
const STAR_DENSITY: usize = 40;

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    ch: char,
    color: Color,
}

const BLANK: Cell = Cell {
    ch: ' ',
    color: Color::Reset,
};

pub struct TerminalCanvas {
    cols: u16,
    rows: u16,
    field_width: f32,
    field_height: f32,
    cells: Vec<Cell>,
    stars: Vec<(u16, u16)>,
    dirty: bool,
}

impl TerminalCanvas {
    pub fn new(
        cols: u16,
        rows: u16,
        field_width: f32,
        field_height: f32,
        rng: &mut impl Rng,
    ) -> Self {
        let mut canvas = TerminalCanvas {
            cols,
            rows,
            field_width,
            field_height,
            cells: Vec::new(),
            stars: Vec::new(),
            dirty: true,
        };
        canvas.resize(cols, rows, rng);
        canvas
    }

    /// Follow a terminal resize; the starfield is scattered again.
    pub fn resize(&mut self, cols: u16, rows: u16, rng: &mut impl Rng) {
        self.cols = cols.max(1);
        self.rows = rows.max(1);
        self.cells = vec![BLANK; self.cols as usize * self.rows as usize];

        let count = self.cells.len() / STAR_DENSITY;
        self.stars = (0..count)
            .map(|_| (rng.gen_range(0..self.cols), rng.gen_range(0..self.rows)))
            .collect();
        self.clear();
    }

    fn col(&self, x: f32) -> i32 {
        (x / self.field_width * self.cols as f32).floor() as i32
    }

    fn row(&self, y: f32) -> i32 {
        (y / self.field_height * self.rows as f32).floor() as i32
    }

    fn put(&mut self, col: i32, row: i32, ch: char, color: Color) {
        if col < 0 || row < 0 || col >= self.cols as i32 || row >= self.rows as i32 {
            return;
        }
        let idx = row as usize * self.cols as usize + col as usize;
        self.cells[idx] = Cell { ch, color };
    }

    fn put_str(&mut self, col: i32, row: i32, text: &str, color: Color) {
        for (i, ch) in text.chars().enumerate() {
            self.put(col + i as i32, row, ch, color);
        }
    }

    /// Write the buffer to the terminal if anything changed since the last flush.
    pub fn flush<W: Write>(&mut self, out: &mut W) -> std::io::Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let mut current = Color::Reset;
        out.queue(style::SetForegroundColor(current))?;
        for row in 0..self.rows {
            out.queue(cursor::MoveTo(0, row))?;
            let start = row as usize * self.cols as usize;
            for cell in &self.cells[start..start + self.cols as usize] {
                if cell.color != current {
                    current = cell.color;
                    out.queue(style::SetForegroundColor(current))?;
                }
                out.queue(Print(cell.ch))?;
            }
        }
        out.queue(style::ResetColor)?;
        out.flush()?;
        self.dirty = false;
        Ok(())
    }
}

/// Glyphs and colour per sprite.
fn glyph(sprite: Sprite) -> (&'static str, Color) {
    match sprite {
        Sprite::Hero => ("/▲\\", C_HERO),
        Sprite::HeroLeft => ("/▲", C_HERO),
        Sprite::HeroRight => ("▲\\", C_HERO),
        Sprite::Escort => ("^", C_ESCORT),
        Sprite::Enemy => ("«▼»", C_ENEMY),
        Sprite::Boss => ("(◎◎)", C_BOSS),
        Sprite::Laser => ("║", C_LASER),
        Sprite::Explosion => ("✶", C_EXPLOSION),
    }
}

fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Hud => C_HUD,
        Tone::Alert => C_ALERT,
        Tone::Success => C_SUCCESS,
    }
}

impl Canvas for TerminalCanvas {
    fn clear(&mut self) {
        self.cells.fill(BLANK);
        for i in 0..self.stars.len() {
            let (col, row) = self.stars[i];
            self.put(col as i32, row as i32, '·', C_STAR);
        }
        self.dirty = true;
    }

    fn draw_sprite(&mut self, view: &SpriteView) {
        // Centre the glyph on the sprite's middle cell
        let (text, color) = glyph(view.sprite);
        let mid_col = self.col(view.x + view.width / 2.0);
        let mid_row = self.row(view.y + view.height / 2.0);
        let len = text.chars().count() as i32;
        self.put_str(mid_col - len / 2, mid_row, text, color);
        self.dirty = true;
    }

    fn draw_text(&mut self, area: Rect, text: &str, tone: Tone) {
        let left = self.col(area.left);
        let width = self.col(area.right) - left;
        let len = text.chars().count() as i32;
        let row = self.row(area.top).min(self.rows as i32 - 1);
        self.put_str(left + (width - len).max(0) / 2, row, text, tone_color(tone));
        self.dirty = true;
    }
}
