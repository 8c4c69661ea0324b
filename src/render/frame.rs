//! Character-cell frame buffer and the view painter.
//!
//! Everything here is pure: [`paint`] turns an [`ExperienceView`] plus an
//! animation clock into cells, and tests read the cells back as text.
//! Only [`super::terminal`] touches the real terminal.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::layout::RainItem;
use crate::phase::{ExperienceView, PhaseView};

const SUBTITLE: &str = "ver 2.4 \u{b7} neural sync";
const CHIPS: [&str; 2] = ["signal 99%", "matrix link stable"];
const PANEL_MAX_WIDTH: usize = 64;
const SPRITE_HEIGHT: i32 = 3;

/// Colour role of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    /// Terminal default.
    #[default]
    Plain,
    /// De-emphasized text.
    Muted,
    /// Warm gold highlight.
    Accent,
    /// Bold text.
    Strong,
    /// Rejection message.
    Alert,
    /// Acceptance.
    Success,
    /// Explicit colour (confetti).
    Rgb(u8, u8, u8),
}

/// One terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Glyph. [`Cell::CONTINUATION`] marks the right half of a wide glyph.
    pub ch: char,
    /// Colour role.
    pub tone: Tone,
}

impl Cell {
    /// Placeholder occupying the second column of a double-width glyph.
    pub const CONTINUATION: char = '\0';

    const BLANK: Self = Self {
        ch: ' ',
        tone: Tone::Plain,
    };
}

/// Fixed-size grid of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    /// A blank buffer.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; usize::from(width) * usize::from(height)],
        }
    }

    /// Width in columns.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in rows.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Resets every cell to blank, resizing if needed.
    pub fn reset(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells
            .resize(usize::from(width) * usize::from(height), Cell::BLANK);
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        (x < usize::from(self.width) && y < usize::from(self.height))
            .then(|| y * usize::from(self.width) + x)
    }

    /// The cell at `(x, y)`, if inside the buffer.
    #[must_use]
    pub fn cell(&self, x: i32, y: i32) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Writes one glyph; off-buffer positions are clipped.
    pub fn put_char(&mut self, x: i32, y: i32, ch: char, tone: Tone) {
        let wide = ch.width().unwrap_or(0) > 1;
        if let Some(i) = self.index(x, y) {
            // A wide glyph cut by the right edge is dropped.
            if wide && self.index(x + 1, y).is_none() {
                return;
            }
            self.cells[i] = Cell { ch, tone };
            if wide && let Some(next) = self.index(x + 1, y) {
                self.cells[next] = Cell {
                    ch: Cell::CONTINUATION,
                    tone,
                };
            }
        }
    }

    /// Writes `text` starting at `(x, y)`. Returns the display width.
    pub fn put_str(&mut self, x: i32, y: i32, text: &str, tone: Tone) -> i32 {
        let mut col = x;
        for ch in text.chars() {
            let w = ch.width().unwrap_or(0);
            if w == 0 {
                continue;
            }
            self.put_char(col, y, ch, tone);
            col += to_i32(w);
        }
        col - x
    }

    /// Writes `text` centred horizontally on row `y`.
    pub fn put_centered(&mut self, y: i32, text: &str, tone: Tone) {
        let x = (i32::from(self.width) - to_i32(text.width())) / 2;
        self.put_str(x.max(0), y, text, tone);
    }

    /// Cells of row `y`.
    #[must_use]
    pub fn row(&self, y: u16) -> &[Cell] {
        let w = usize::from(self.width);
        let start = usize::from(y) * w;
        self.cells.get(start..start + w).unwrap_or(&[])
    }

    /// Row `y` as plain text, trailing blanks trimmed.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        let text: String = self
            .row(y)
            .iter()
            .filter(|c| c.ch != Cell::CONTINUATION)
            .map(|c| c.ch)
            .collect();
        text.trim_end().to_string()
    }

    /// Whole buffer as text, one line per row.
    #[must_use]
    pub fn to_text(&self) -> String {
        (0..self.height)
            .map(|y| self.row_text(y))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn to_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

// ============================================================================
// Painter
// ============================================================================

/// Paints `view` at animation time `elapsed` (seconds) into `frame`.
pub fn paint(view: &ExperienceView<'_>, elapsed: f64, frame: &mut FrameBuffer) {
    let (width, height) = (frame.width(), frame.height());
    frame.reset(width, height);
    paint_header(view, frame);

    match &view.body {
        PhaseView::Boot { typed, waiting } => {
            let mut lines: Vec<(String, Tone)> = typed
                .split('\n')
                .map(|line| (line.to_string(), Tone::Plain))
                .collect();
            if let Some((last, _)) = lines.last_mut() {
                last.push('\u{258c}');
            }
            if *waiting {
                lines.push((String::new(), Tone::Plain));
                lines.push((
                    "press any key to start typing with sound".to_string(),
                    Tone::Muted,
                ));
            }
            paint_panel(frame, "SYSTEM BOOT", Tone::Accent, &lines, &[]);
        }
        PhaseView::Prompt { lines } => {
            let lines: Vec<_> = lines.iter().map(|l| (l.clone(), Tone::Strong)).collect();
            paint_panel(frame, "SHARED HISTORY", Tone::Accent, &lines, &["[enter] View memories"]);
        }
        PhaseView::Memories { items, photo_dir } => {
            for item in *items {
                paint_sprite(frame, item, elapsed);
            }
            let cta_row = i32::from(height) / 2;
            if items.is_empty() {
                frame.put_centered(
                    cta_row - 1,
                    &format!("Drop photos into {photo_dir} to reveal them here."),
                    Tone::Muted,
                );
            }
            frame.put_centered(cta_row + 1, "[enter] Continue", Tone::Accent);
        }
        PhaseView::Ask { lines, rejection } => {
            let last = lines.len().saturating_sub(1);
            let mut body: Vec<_> = lines
                .iter()
                .enumerate()
                .map(|(i, l)| (l.clone(), if i == last { Tone::Accent } else { Tone::Strong }))
                .collect();
            if let Some(message) = rejection {
                body.push((String::new(), Tone::Plain));
                body.push(((*message).to_string(), Tone::Alert));
            }
            paint_panel(
                frame,
                "PRIMARY QUERY",
                Tone::Accent,
                &body,
                &["[y] YES \u{2764}", "[a] ABSOLUTELY YES \u{2764}", "[n] NO"],
            );
        }
        PhaseView::Accepted {
            recipient,
            tone_played,
            confetti_sent,
        } => {
            let mut notes = Vec::new();
            if *confetti_sent {
                notes.push("Confetti broadcast sent");
            }
            if *tone_played {
                notes.push("Success tone played");
            }
            let mut lines = vec![
                ("Owner      Duration".to_string(), Tone::Muted),
                (format!("{recipient}   Forever"), Tone::Strong),
            ];
            if !notes.is_empty() {
                lines.push((String::new(), Tone::Plain));
                lines.push((notes.join(" \u{b7} "), Tone::Muted));
            }
            paint_panel(frame, "VALENTINE ACCEPTED", Tone::Success, &lines, &[]);
        }
    }

    if height > 2 {
        frame.put_str(1, i32::from(height) - 1, "[q] quit", Tone::Muted);
    }
}

fn paint_header(view: &ExperienceView<'_>, frame: &mut FrameBuffer) {
    let led_tone = if view.audio_running {
        Tone::Success
    } else {
        Tone::Muted
    };
    frame.put_char(1, 0, '\u{25cf}', led_tone);
    let mut x = 3;
    x += frame.put_str(x, 0, view.title, Tone::Strong);
    frame.put_str(x + 2, 0, SUBTITLE, Tone::Muted);

    let chips: Vec<String> = CHIPS.iter().map(|c| format!("[{c}]")).collect();
    let chips = chips.join(" ");
    let right = i32::from(frame.width()) - to_i32(chips.width()) - 1;
    if right > x + to_i32(SUBTITLE.width()) + 4 {
        frame.put_str(right, 0, &chips, Tone::Muted);
    }
}

/// Boxed, centred panel with an eyebrow label, body lines and actions.
fn paint_panel(
    frame: &mut FrameBuffer,
    eyebrow: &str,
    eyebrow_tone: Tone,
    lines: &[(String, Tone)],
    actions: &[&str],
) {
    let width = usize::from(frame.width());
    let panel_width = width.saturating_sub(4).min(PANEL_MAX_WIDTH);
    if panel_width < 8 {
        for (row, (line, tone)) in lines.iter().enumerate() {
            frame.put_str(0, to_i32(row + 1), line, *tone);
        }
        return;
    }
    let inner = panel_width - 4;

    let mut body: Vec<(String, Tone)> = vec![(eyebrow.to_string(), eyebrow_tone), (String::new(), Tone::Plain)];
    for (line, tone) in lines {
        body.extend(wrap(line, inner).into_iter().map(|l| (l, *tone)));
    }
    if !actions.is_empty() {
        body.push((String::new(), Tone::Plain));
        body.push((actions.join("   "), Tone::Accent));
    }

    let panel_height = to_i32(body.len()) + 2;
    let left = to_i32((width - panel_width) / 2);
    let top = ((i32::from(frame.height()) - panel_height) / 2).max(2);
    let right = left + to_i32(panel_width) - 1;
    let bottom = top + panel_height - 1;

    let rule = "\u{2500}".repeat(panel_width - 2);
    frame.put_str(left, top, &format!("\u{256d}{rule}\u{256e}"), Tone::Muted);
    frame.put_str(left, bottom, &format!("\u{2570}{rule}\u{256f}"), Tone::Muted);
    for (offset, (line, tone)) in body.iter().enumerate() {
        let y = top + 1 + to_i32(offset);
        frame.put_char(left, y, '\u{2502}', Tone::Muted);
        frame.put_char(right, y, '\u{2502}', Tone::Muted);
        frame.put_str(left + 2, y, line, *tone);
    }
}

/// Greedy word wrap to `width` display columns. Words longer than the
/// width are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    if text.is_empty() || width == 0 {
        return vec![String::new()];
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split(' ') {
        let needed = if current.is_empty() {
            word.width()
        } else {
            current.width() + 1 + word.width()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        for ch in word.chars() {
            if current.width() + ch.width().unwrap_or(0) > width {
                lines.push(std::mem::take(&mut current));
            }
            current.push(ch);
        }
    }
    lines.push(current);
    lines
}

/// File stem of a photo reference (`/photos/beach.jpg` -> `beach`).
fn label_for(src: &str) -> &str {
    let name = src.rsplit('/').next().unwrap_or(src);
    name.rsplit_once('.').map_or(name, |(stem, _)| stem)
}

#[allow(clippy::cast_possible_truncation)]
fn paint_sprite(frame: &mut FrameBuffer, item: &RainItem, elapsed: f64) {
    let width = f64::from(frame.width());
    let height = f64::from(frame.height());

    // 180..380 px maps onto 10..18 columns.
    let box_width = 10 + ((item.size - 180.0) / 25.0).clamp(0.0, 8.0) as i32;
    let travel = height + f64::from(SPRITE_HEIGHT);
    let top = (item.progress(elapsed) * travel) as i32 - SPRITE_HEIGHT;
    let sway = (item.tilt_at(elapsed) / 4.0).round() as i32;
    let left = (item.x / 100.0 * (width - f64::from(box_width))) as i32 + sway;

    let tone = if item.blur > 0.0 || item.opacity < 0.9 {
        Tone::Muted
    } else {
        Tone::Plain
    };
    let inner = usize::try_from(box_width - 4).unwrap_or(0);
    let mut label: String = String::new();
    for ch in label_for(&item.src).chars() {
        if label.width() + ch.width().unwrap_or(0) > inner {
            break;
        }
        label.push(ch);
    }
    let pad = inner - label.width();
    let rule = "\u{2500}".repeat(inner + 2);

    frame.put_str(left, top, &format!("\u{250c}{rule}\u{2510}"), tone);
    frame.put_str(
        left,
        top + 1,
        &format!("\u{2502} {label}{} \u{2502}", " ".repeat(pad)),
        tone,
    );
    frame.put_str(left, top + 2, &format!("\u{2514}{rule}\u{2518}"), tone);
}
