mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal,
    ExecutableCommand, QueueableCommand,
};
use log::{info, warn};
use rand::thread_rng;

use display::TerminalCanvas;
use space_game::{Game, Key, Settings};

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

// ── Held-key tracking ─────────────────────────────────────────────────────────

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 4 frames (≈133 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 4;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<Key, u64>, key: &Key, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn key_for(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Key::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Key::Right),
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Key::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Key::Down),
        KeyCode::Char(' ') => Some(Key::Fire),
        KeyCode::Enter => Some(Key::Confirm),
        _ => None,
    }
}

// ── High-score persistence ────────────────────────────────────────────────────

fn high_score_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".space_game_score")
}

fn load_high_score() -> u32 {
    std::fs::read_to_string(high_score_path())
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

fn save_high_score(score: u32) {
    if let Err(err) = std::fs::write(high_score_path(), score.to_string()) {
        warn!("could not save high score: {}", err);
    }
}

// ── Settings and logging ──────────────────────────────────────────────────────

fn load_settings() -> Result<Settings> {
    let Some(path) = std::env::var_os("SPACE_GAME_CONFIG").map(PathBuf::from) else {
        return Ok(Settings::default());
    };
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("reading settings from {}", path.display()))?;
    let settings = Settings::from_json(&json)
        .with_context(|| format!("parsing settings in {}", path.display()))?;
    info!("settings loaded from {}", path.display());
    Ok(settings)
}

/// The terminal belongs to the game, so log records go to a file.
fn init_logging() -> Result<()> {
    let path = std::env::var_os("SPACE_GAME_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("space_game.log"));
    let file = File::create(&path)
        .with_context(|| format!("creating log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start,
    Quit,
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    high_score: u32,
) -> std::io::Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "★  SPACE  GAME  ★";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(5),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    if high_score > 0 {
        let hs_str = format!("Best Score: {}", high_score);
        out.queue(cursor::MoveTo(
            cx.saturating_sub(hs_str.chars().count() as u16 / 2),
            cy.saturating_sub(4),
        ))?;
        out.queue(style::SetForegroundColor(Color::Yellow))?;
        out.queue(Print(&hs_str))?;
    }

    let lines: &[(&str, Color)] = &[
        ("Five stages. The last one has a boss.", Color::White),
        ("Your escorts fire on their own.", Color::DarkGrey),
        ("", Color::DarkGrey),
        ("[Enter] Start   [Q] Quit", Color::Green),
        ("", Color::DarkGrey),
        ("Arrows / WASD : Move   SPACE : Shoot   ENTER : Continue", Color::DarkGrey),
    ];
    for (i, (text, color)) in lines.iter().enumerate() {
        let row = cy.saturating_sub(2) + i as u16;
        out.queue(cursor::MoveTo(
            cx.saturating_sub(text.chars().count() as u16 / 2),
            row,
        ))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*text))?;
    }

    out.queue(style::ResetColor)?;
    out.flush()?;

    // Block until the user makes a choice
    loop {
        match rx.recv() {
            Ok(Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            })) => match code {
                KeyCode::Enter => return Ok(MenuResult::Start),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(MenuResult::Quit);
                }
                _ => {}
            },
            Ok(_) => {}
            // Input thread gone
            Err(_) => return Ok(MenuResult::Quit),
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Returns `true` → quit program,  `false` → back to menu.
///
/// Direction keys are forwarded as press/release pairs.  Terminals with
/// keyboard enhancement send real `Release` events; on classic terminals a
/// key is released once no press/repeat has arrived for `HOLD_WINDOW` frames.
/// `best` is raised to the highest score seen during the run.
fn game_loop<W: Write>(
    out: &mut W,
    game: &mut Game,
    canvas: &mut TerminalCanvas,
    rx: &mpsc::Receiver<Event>,
    best: &mut u32,
) -> Result<bool> {
    let mut rng = thread_rng();

    // Maps each held key → the frame it was last seen (press or repeat).
    let mut key_frame: HashMap<Key, u64> = HashMap::new();
    let mut frame: u64 = 0;
    let mut last = Instant::now();

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let (code, kind, modifiers) = match ev {
                Event::Key(KeyEvent {
                    code,
                    kind,
                    modifiers,
                    ..
                }) => (code, kind, modifiers),
                Event::Resize(cols, rows) => {
                    canvas.resize(cols, rows, &mut rng);
                    continue;
                }
                _ => continue,
            };
            match kind {
                KeyEventKind::Press => {
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            return Ok(false);
                        }
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(true);
                        }
                        _ => {}
                    }
                    if let Some(key) = key_for(code) {
                        // OS key-repeat shows up as repeated presses; a held
                        // direction is only pressed once.
                        if key.release_topic().is_none() || !is_held(&key_frame, &key, frame) {
                            game.press(key);
                        }
                        key_frame.insert(key, frame);
                    }
                }
                KeyEventKind::Repeat => {
                    if let Some(key) = key_for(code) {
                        key_frame.insert(key, frame);
                        if key == Key::Fire {
                            game.press(key);
                        }
                    }
                }
                KeyEventKind::Release => {
                    if let Some(key) = key_for(code) {
                        if key_frame.remove(&key).is_some() {
                            game.release(key);
                        }
                    }
                }
            }
        }

        // ── Expire keys that stopped repeating ────────────────────────────────
        let stale: Vec<Key> = key_frame
            .keys()
            .filter(|key| !is_held(&key_frame, key, frame))
            .copied()
            .collect();
        for key in stale {
            key_frame.remove(&key);
            game.release(key);
        }

        let elapsed_ms = last.elapsed().as_millis() as u64;
        last = Instant::now();
        game.advance(elapsed_ms, canvas);
        canvas.flush(out).context("drawing frame")?;

        if let Some(session) = game.session() {
            *best = (*best).max(session.score);
        }

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_logging()?;
    let settings = load_settings()?;

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode().context("enabling raw mode")?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Ghostty / kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut out, &rx, settings);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    if let Err(err) = &result {
        log::error!("{:#}", err);
    }
    result
}

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>, settings: Settings) -> Result<()> {
    let mut high_score = load_high_score();
    let mut rng = thread_rng();

    loop {
        match show_menu(out, rx, high_score).context("drawing menu")? {
            MenuResult::Quit => break,
            MenuResult::Start => {
                let (cols, rows) = terminal::size()?;
                let mut canvas = TerminalCanvas::new(
                    cols,
                    rows,
                    settings.field_width,
                    settings.field_height,
                    &mut rng,
                );
                let mut game = Game::new(settings.clone());
                game.start();

                let mut best = 0;
                let quit = game_loop(out, &mut game, &mut canvas, rx, &mut best)?;

                // Persist new high score if beaten
                if best > high_score {
                    high_score = best;
                    save_high_score(high_score);
                    info!("new high score {}", high_score);
                }

                if quit {
                    break;
                }
            }
        }
    }
    Ok(())
}
