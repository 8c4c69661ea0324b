//! Raw-mode terminal ownership and frame presentation.

use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use tracing::debug;

use crate::error::TerminalError;

use super::frame::{Cell, FrameBuffer, Tone};

/// Set while a guard holds raw mode and the alternate screen.
static HELD: AtomicBool = AtomicBool::new(false);

/// Holds the terminal in raw mode on the alternate screen until dropped.
#[derive(Debug)]
pub struct TerminalGuard {
    active: bool,
}

impl TerminalGuard {
    /// Enters raw mode, the alternate screen and mouse capture.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::NotATty`] when stdout is not a terminal and
    /// [`TerminalError::Setup`] if raw mode cannot be enabled.
    pub fn enter() -> Result<Self, TerminalError> {
        if !io::stdout().is_terminal() {
            return Err(TerminalError::NotATty);
        }
        terminal::enable_raw_mode().map_err(|e| TerminalError::Setup(e.to_string()))?;
        HELD.store(true, Ordering::SeqCst);
        let guard = Self { active: true };
        execute!(
            io::stdout(),
            EnterAlternateScreen,
            EnableMouseCapture,
            Hide,
            Clear(ClearType::All)
        )
        .map_err(|e| TerminalError::Setup(e.to_string()))?;
        debug!("terminal entered raw mode");
        Ok(guard)
    }

    /// Current terminal size as `(columns, rows)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be queried.
    pub fn size() -> Result<(u16, u16), TerminalError> {
        Ok(terminal::size()?)
    }

    /// Restores the terminal. Called by `Drop`; safe to call twice.
    pub fn restore(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        force_restore();
        debug!("terminal restored");
    }
}

/// Whether a [`TerminalGuard`] currently holds the terminal.
#[must_use]
pub fn is_held() -> bool {
    HELD.load(Ordering::SeqCst)
}

/// Leaves the alternate screen and raw mode if a guard holds them, without
/// waiting for the guard to drop. Exit paths that bypass destructors call
/// this first. Returns whether anything was restored.
pub fn force_restore() -> bool {
    if !HELD.swap(false, Ordering::SeqCst) {
        return false;
    }
    execute!(io::stdout(), Show, DisableMouseCapture, LeaveAlternateScreen).ok();
    terminal::disable_raw_mode().ok();
    true
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Maps a colour role to a terminal colour.
#[must_use]
pub const fn color_for(tone: Tone) -> Color {
    match tone {
        Tone::Plain | Tone::Strong => Color::Reset,
        Tone::Muted => Color::DarkGrey,
        Tone::Accent => Color::Rgb {
            r: 0xf7,
            g: 0xc5,
            b: 0x6b,
        },
        Tone::Alert => Color::Rgb {
            r: 0xff,
            g: 0x7a,
            b: 0x7a,
        },
        Tone::Success => Color::Rgb {
            r: 0x8c,
            g: 0xdc,
            b: 0x8c,
        },
        Tone::Rgb(r, g, b) => Color::Rgb { r, g, b },
    }
}

/// Writes the whole frame to `out`, changing colour only between runs of
/// differently toned cells.
///
/// # Errors
///
/// Returns an I/O error if writing fails.
pub fn present(frame: &FrameBuffer, out: &mut impl Write) -> io::Result<()> {
    for y in 0..frame.height() {
        queue!(out, MoveTo(0, y))?;
        let mut current: Option<Tone> = None;
        let mut run = String::new();
        for cell in frame.row(y) {
            if cell.ch == Cell::CONTINUATION {
                continue;
            }
            if current != Some(cell.tone) {
                flush_run(out, current, &mut run)?;
                current = Some(cell.tone);
            }
            run.push(cell.ch);
        }
        flush_run(out, current, &mut run)?;
    }
    queue!(out, ResetColor, SetAttribute(Attribute::Reset))?;
    out.flush()
}

fn flush_run(out: &mut impl Write, tone: Option<Tone>, run: &mut String) -> io::Result<()> {
    let Some(tone) = tone else {
        return Ok(());
    };
    if run.is_empty() {
        return Ok(());
    }
    let weight = if tone == Tone::Strong {
        Attribute::Bold
    } else {
        Attribute::NormalIntensity
    };
    queue!(
        out,
        SetForegroundColor(color_for(tone)),
        SetAttribute(weight),
        Print(std::mem::take(run))
    )
}
