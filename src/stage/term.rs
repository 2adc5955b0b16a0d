//! Terminal kiosk surface, drawn with crossterm.
//!
//! One alternate-screen, raw-mode surface: the falling digits repaint in the
//! background, the active slot is drawn centered over them, opacity maps to
//! color intensity. Input is a spawned `EventStream` reader; Esc / Ctrl-C
//! fire the run's cancel handle so teardown goes through the same path as
//! any other cancellation (and the camera guard gets to run).

use crate::core::cancel::CancelHandle;
use crate::core::types::{CaptureResult, Language, OutcomeChoice, Verdict, VerdictTone};
use crate::fx::rain::RainGlyph;
use crate::stage::{Slot, Stage};
use async_trait::async_trait;
use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::{cursor, execute, queue, terminal};
use futures::StreamExt;
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::warn;

const RAIN_TICK: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Accent {
    Green,
    Red,
}

#[derive(Debug, Default, Clone)]
struct SlotState {
    text: String,
    opacity: f32,
    visible: bool,
    accent: Option<Accent>,
}

#[derive(Debug, Default)]
struct TermInner {
    slots: HashMap<Slot, SlotState>,
    caret: bool,
    card_front: String,
    card_back: String,
    rain: Vec<RainGlyph>,
    rain_started: Option<Instant>,
}

pub struct TerminalStage {
    inner: Arc<Mutex<TermInner>>,
    keys: tokio::sync::Mutex<mpsc::UnboundedReceiver<KeyCode>>,
    rain_task: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl TerminalStage {
    /// Take over the terminal. `abort` is fired on Esc / Ctrl-C; the caller
    /// keeps the matching token.
    pub fn new(abort: CancelHandle) -> anyhow::Result<Arc<Self>> {
        terminal::enable_raw_mode()?;
        execute!(
            std::io::stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All)
        )?;

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let mut events = EventStream::new();
            while let Some(event) = events.next().await {
                let Ok(Event::Key(key)) = event else { continue };
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Esc => abort.cancel(),
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        abort.cancel()
                    }
                    code => {
                        if tx.send(code).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        let stage = Arc::new(Self {
            inner: Arc::new(Mutex::new(TermInner::default())),
            keys: tokio::sync::Mutex::new(rx),
            rain_task: Mutex::new(None),
        });

        // The language gate is up from the first frame, like the original
        // picker buttons.
        {
            let mut inner = stage.inner.lock().unwrap();
            let picker = inner.slots.entry(Slot::LanguagePicker).or_default();
            picker.visible = true;
            picker.opacity = 1.0;
            picker.text = "M I R R O R   B O O T H\n\n[1] Français      [2] Nederlands".to_string();
        }
        stage.redraw();
        Ok(stage)
    }

    fn mutate(&self, f: impl FnOnce(&mut TermInner)) {
        {
            let mut inner = self.inner.lock().unwrap();
            f(&mut inner);
        }
        self.redraw();
    }

    fn redraw(&self) {
        let inner = self.inner.lock().unwrap();
        if let Err(e) = paint(&inner) {
            warn!("term: paint failed: {}", e);
        }
    }

    async fn next_key(&self) -> Option<KeyCode> {
        self.keys.lock().await.recv().await
    }
}

impl Drop for TerminalStage {
    fn drop(&mut self) {
        if let Some(task) = self.rain_task.lock().unwrap().take() {
            task.abort();
        }
        let _ = execute!(
            std::io::stdout(),
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

fn opacity_color(opacity: f32, accent: Option<Accent>) -> Color {
    let level = (30.0 + opacity.clamp(0.0, 1.0) * 210.0) as u8;
    match accent {
        Some(Accent::Red) => Color::Rgb { r: level, g: 0, b: 0 },
        Some(Accent::Green) | None => Color::Rgb { r: 0, g: level, b: 0 },
    }
}

fn paint(inner: &TermInner) -> std::io::Result<()> {
    let (cols, rows) = terminal::size().unwrap_or((80, 24));
    let mut out = std::io::stdout();
    queue!(out, terminal::Clear(terminal::ClearType::All))?;

    // Background rain, dimmest layer first.
    if let Some(started) = inner.rain_started {
        let elapsed = started.elapsed().as_millis() as u64;
        queue!(out, SetForegroundColor(Color::Rgb { r: 0, g: 80, b: 0 }))?;
        for glyph in &inner.rain {
            if elapsed < glyph.delay_ms {
                continue;
            }
            let progress =
                ((elapsed - glyph.delay_ms) % glyph.duration_ms) as f32 / glyph.duration_ms as f32;
            let col = (glyph.col_pct / 100.0 * cols.saturating_sub(1) as f32) as u16;
            let row_offset = glyph.row_pct / 100.0 + progress;
            let row = ((row_offset % 1.0) * rows.saturating_sub(1) as f32) as u16;
            queue!(out, cursor::MoveTo(col, row), Print(glyph.glyph))?;
        }
    }

    // Visible slots, centered block per slot.
    for (slot, state) in &inner.slots {
        if !state.visible {
            continue;
        }
        let mut text = state.text.clone();
        if *slot == Slot::Narrative && inner.caret {
            text.push('▌');
        }
        queue!(out, SetForegroundColor(opacity_color(state.opacity, state.accent)))?;
        let lines: Vec<&str> = text.lines().collect();
        let first_row = rows / 2 - (lines.len() as u16 / 2).min(rows / 2);
        for (i, line) in lines.iter().enumerate() {
            let width = line.chars().count() as u16;
            let col = cols.saturating_sub(width) / 2;
            queue!(
                out,
                cursor::MoveTo(col, first_row + i as u16),
                Print(line)
            )?;
        }
    }

    queue!(out, ResetColor)?;
    out.flush()
}

#[async_trait]
impl Stage for TerminalStage {
    async fn set_text(&self, slot: Slot, text: &str) {
        self.mutate(|inner| {
            let state = inner.slots.entry(slot).or_default();
            state.text = text.to_string();
        });
    }

    async fn text(&self, slot: Slot) -> String {
        self.inner
            .lock()
            .unwrap()
            .slots
            .get(&slot)
            .map(|s| s.text.clone())
            .unwrap_or_default()
    }

    async fn set_opacity(&self, slot: Slot, opacity: f32) {
        self.mutate(|inner| {
            inner.slots.entry(slot).or_default().opacity = opacity;
        });
    }

    async fn show(&self, slot: Slot) {
        self.mutate(|inner| {
            inner.slots.entry(slot).or_default().visible = true;
        });
    }

    async fn hide(&self, slot: Slot) {
        self.mutate(|inner| {
            inner.slots.entry(slot).or_default().visible = false;
        });
    }

    async fn is_visible(&self, slot: Slot) -> bool {
        self.inner
            .lock()
            .unwrap()
            .slots
            .get(&slot)
            .map(|s| s.visible)
            .unwrap_or(false)
    }

    async fn set_caret(&self, visible: bool) {
        self.mutate(|inner| inner.caret = visible);
    }

    async fn present_selfie(&self, frame: &CaptureResult, caption: &str, disclaimer: &str) {
        // No inline image on a terminal — a framed placeholder carries the
        // moment, the byte count proves the frame is real.
        let kb = frame.image_data.len() / 1024;
        let text = format!(
            "{caption}\n\n┌────────────────────┐\n│ ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓ │\n│ ▓▓▓▓ {kb:>4} KiB ▓▓▓▓ │\n│ ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓ │\n└────────────────────┘\n\n{disclaimer}"
        );
        self.mutate(|inner| {
            let state = inner.slots.entry(Slot::Selfie).or_default();
            state.text = text;
            state.visible = true;
        });
    }

    async fn present_choice(&self, prompt: &str, protect_label: &str, ignore_label: &str) {
        let text = format!("{prompt}\n\n[P] {protect_label}\n[I] {ignore_label}");
        self.mutate(|inner| {
            let state = inner.slots.entry(Slot::Choice).or_default();
            state.text = text;
            state.opacity = 1.0;
            state.visible = true;
        });
    }

    async fn present_verdict(&self, verdict: &Verdict) {
        let accent = match verdict.tone {
            VerdictTone::Reassuring => Accent::Green,
            VerdictTone::Grim => Accent::Red,
        };
        let text = format!("{}\n\n{}", verdict.icon, verdict.message);
        self.mutate(|inner| {
            let state = inner.slots.entry(Slot::Verdict).or_default();
            state.text = text;
            state.opacity = 1.0;
            state.accent = Some(accent);
            state.visible = true;
        });
    }

    async fn present_card(&self, front: &str, back: &str) {
        self.mutate(|inner| {
            inner.card_front = front.to_string();
            inner.card_back = back.to_string();
            let state = inner.slots.entry(Slot::Card).or_default();
            state.text = format!("★\n\n{front}\n\n— espace pour retourner —");
            state.opacity = 1.0;
            state.visible = true;
        });
    }

    async fn set_card_flipped(&self, flipped: bool) {
        self.mutate(|inner| {
            let face = if flipped {
                inner.card_back.clone()
            } else {
                inner.card_front.clone()
            };
            inner.slots.entry(Slot::Card).or_default().text =
                format!("★\n\n{face}\n\n— espace pour retourner —");
        });
    }

    async fn start_rain(&self, field: &[RainGlyph]) {
        self.mutate(|inner| {
            inner.rain = field.to_vec();
            inner.rain_started = Some(Instant::now());
        });

        let inner = self.inner.clone();
        let task = tokio::spawn(async move {
            loop {
                tokio::time::sleep(RAIN_TICK).await;
                let guard = inner.lock().unwrap();
                if let Err(e) = paint(&guard) {
                    warn!("term: rain repaint failed: {}", e);
                    break;
                }
            }
        });
        if let Some(previous) = self.rain_task.lock().unwrap().replace(task) {
            previous.abort();
        }
    }

    async fn await_language(&self) -> Option<Language> {
        loop {
            match self.next_key().await? {
                KeyCode::Char('1') | KeyCode::Char('f') | KeyCode::Char('F') => {
                    return Some(Language::Primary)
                }
                KeyCode::Char('2') | KeyCode::Char('n') | KeyCode::Char('N') => {
                    return Some(Language::Secondary)
                }
                _ => continue,
            }
        }
    }

    async fn await_choice(&self) -> Option<OutcomeChoice> {
        loop {
            match self.next_key().await? {
                KeyCode::Char('p') | KeyCode::Char('P') => return Some(OutcomeChoice::Protect),
                KeyCode::Char('i') | KeyCode::Char('I') => return Some(OutcomeChoice::Ignore),
                _ => continue,
            }
        }
    }

    async fn await_flip(&self) -> Option<()> {
        loop {
            match self.next_key().await? {
                KeyCode::Char(' ') | KeyCode::Enter => return Some(()),
                _ => continue,
            }
        }
    }
}
