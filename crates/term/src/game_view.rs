//! GameView: maps a playground [`GameSnapshot`] into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::{GameSnapshot, Phase};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::BrickColor;

const BOARD_BG: Rgb = Rgb::new(30, 30, 40);

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// A lightweight terminal renderer for the playground.
pub struct GameView {
    /// Grid cell width in terminal columns.
    cell_w: u16,
    /// Grid cell height in terminal rows.
    cell_h: u16,
    anchor_y: AnchorY,
    show_ghost: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self::new(2, 1)
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
            anchor_y: AnchorY::Center,
            show_ghost: true,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    pub fn with_ghost(mut self, show: bool) -> Self {
        self.show_ghost = show;
        self
    }

    /// Render into an existing framebuffer.
    ///
    /// This is the allocation-free hot path. Callers can reuse a framebuffer
    /// across frames and only resize when the terminal size changes.
    pub fn render_into(&self, snap: &GameSnapshot, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().into_cell(' '));

        let board_px_w = (snap.cols as u16) * self.cell_w;
        let board_px_h = (snap.rows as u16) * self.cell_h;
        let frame_w = board_px_w + 2;
        let frame_h = board_px_h + 2;

        let start_x = viewport.width.saturating_sub(frame_w) / 2;
        let start_y = match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(frame_h) / 2,
            AnchorY::Top => 0,
        };
        let origin = (start_x, start_y);

        let bg = CellStyle {
            fg: Rgb::new(80, 80, 90),
            bg: BOARD_BG,
            bold: false,
            dim: false,
        };
        fb.fill_rect(start_x + 1, start_y + 1, board_px_w, board_px_h, ' ', bg);
        self.draw_border(fb, start_x, start_y, frame_w, frame_h, CellStyle::fg(Rgb::new(200, 200, 200)));

        // Settled bricks; collapsing ones slide toward their targets.
        for y in 0..snap.rows {
            for x in 0..snap.cols {
                match snap.cell(x, y) {
                    Some(cell) if cell.active => {}
                    Some(cell) => {
                        let (dx, dy) = match cell.target {
                            Some((tx, ty)) => (
                                lerp(x, tx, snap.collapse_progress),
                                lerp(y, ty, snap.collapse_progress),
                            ),
                            None => (x, y),
                        };
                        self.draw_brick(fb, origin, dx, dy, cell.color, false);
                    }
                    None => self.draw_empty_cell(fb, origin, x, y),
                }
            }
        }

        if let Some(active) = &snap.active {
            let shift = active.finish_y - active.y;
            if self.show_ghost && shift > 0 && !active.falling {
                let ghost = CellStyle {
                    fg: Rgb::from(active.color).scaled(1, 2),
                    bg: BOARD_BG,
                    bold: false,
                    dim: true,
                };
                for &(x, y) in &active.cells {
                    let gy = y + shift;
                    if in_bounds(snap, x, gy) && snap.cell(x as usize, gy as usize).is_none() {
                        self.fill_cell_rect(fb, origin, x as usize, gy as usize, '░', ghost);
                    }
                }
            }

            let drop = if active.falling {
                (shift as f64 * active.fall_progress).round() as i32
            } else {
                0
            };
            for &(x, y) in &active.cells {
                let y = y + drop;
                if in_bounds(snap, x, y) {
                    self.draw_brick(fb, origin, x as usize, y as usize, active.color, true);
                }
            }
        }

        self.draw_side_panel(fb, snap, viewport, start_x, start_y, frame_w);

        if snap.game_over {
            self.draw_overlay_text(fb, start_x, start_y, frame_w, frame_h, "GAME OVER");
        } else if snap.paused {
            self.draw_overlay_text(fb, start_x, start_y, frame_w, frame_h, "PAUSED");
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, viewport, &mut fb);
        fb
    }

    fn draw_border(&self, fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: CellStyle) {
        if w < 2 || h < 2 {
            return;
        }

        fb.put_char(x, y, '┌', style);
        fb.put_char(x + w - 1, y, '┐', style);
        fb.put_char(x, y + h - 1, '└', style);
        fb.put_char(x + w - 1, y + h - 1, '┘', style);

        for dx in 1..w - 1 {
            fb.put_char(x + dx, y, '─', style);
            fb.put_char(x + dx, y + h - 1, '─', style);
        }
        for dy in 1..h - 1 {
            fb.put_char(x, y + dy, '│', style);
            fb.put_char(x + w - 1, y + dy, '│', style);
        }
    }

    fn draw_empty_cell(&self, fb: &mut FrameBuffer, origin: (u16, u16), x: usize, y: usize) {
        let style = CellStyle {
            fg: Rgb::new(90, 90, 100),
            bg: BOARD_BG,
            bold: false,
            dim: true,
        };
        self.fill_cell_rect(fb, origin, x, y, '·', style);
    }

    fn draw_brick(
        &self,
        fb: &mut FrameBuffer,
        origin: (u16, u16),
        x: usize,
        y: usize,
        color: BrickColor,
        bold: bool,
    ) {
        let style = CellStyle {
            fg: color.into(),
            bg: BOARD_BG,
            bold,
            dim: false,
        };
        self.fill_cell_rect(fb, origin, x, y, '█', style);
    }

    fn fill_cell_rect(
        &self,
        fb: &mut FrameBuffer,
        (start_x, start_y): (u16, u16),
        cell_x: usize,
        cell_y: usize,
        ch: char,
        style: CellStyle,
    ) {
        let px = start_x + 1 + cell_x as u16 * self.cell_w;
        let py = start_y + 1 + cell_y as u16 * self.cell_h;
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ch, style);
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        viewport: Viewport,
        start_x: u16,
        start_y: u16,
        frame_w: u16,
    ) {
        let panel_x = start_x.saturating_add(frame_w).saturating_add(2);
        if panel_x >= viewport.width {
            return;
        }
        let panel_w = viewport.width - panel_x;
        if panel_w < 12 {
            return;
        }

        let label = CellStyle {
            bold: true,
            ..CellStyle::default()
        };
        let value = CellStyle::fg(Rgb::new(200, 200, 200));

        let mut y = start_y;
        fb.put_str(panel_x, y, "SCORE", label);
        y = y.saturating_add(1);
        fb.put_u32(panel_x, y, snap.score, value);
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "LEVEL", label);
        y = y.saturating_add(1);
        fb.put_u32(panel_x, y, snap.level, value);
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "ROWS", label);
        y = y.saturating_add(1);
        fb.put_u32(panel_x, y, snap.destroyed_rows, value);
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "NEXT", label);
        y = y.saturating_add(1);
        for queued in &snap.queue {
            if y >= viewport.height {
                break;
            }
            fb.put_str(panel_x, y, "██", CellStyle::fg(queued.color.into()));
            fb.put_str(panel_x + 3, y, queued.kind.as_str(), value);
            y = y.saturating_add(1);
        }

        y = y.saturating_add(1);
        let dim = CellStyle { dim: true, ..value };
        fb.put_str(panel_x, y, phase_label(snap.phase), dim);
    }

    fn draw_overlay_text(
        &self,
        fb: &mut FrameBuffer,
        start_x: u16,
        start_y: u16,
        frame_w: u16,
        frame_h: u16,
        text: &str,
    ) {
        let mid_y = start_y.saturating_add(frame_h / 2);
        let text_w = text.chars().count() as u16;
        let x = start_x.saturating_add(frame_w.saturating_sub(text_w) / 2);
        let style = CellStyle {
            fg: Rgb::new(255, 255, 255),
            bg: Rgb::new(0, 0, 0),
            bold: true,
            dim: false,
        };
        fb.put_str(x, mid_y, text, style);
    }
}

fn in_bounds(snap: &GameSnapshot, x: i32, y: i32) -> bool {
    x >= 0 && y >= 0 && (x as usize) < snap.cols && (y as usize) < snap.rows
}

fn lerp(from: usize, to: usize, t: f64) -> usize {
    let v = from as f64 + (to as f64 - from as f64) * t.clamp(0.0, 1.0);
    v.round() as usize
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::WaitingStart => "ready",
        Phase::Spawning => "spawning",
        Phase::Controlling => "playing",
        Phase::Dropping => "dropping",
        Phase::Locking => "locking",
        Phase::ClearingRows => "clearing",
        Phase::Collapsing => "collapsing",
        Phase::GameOver => "game over",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Playground, PlaygroundConfig};
    use crate::types::NoInput;

    fn running_snapshot() -> GameSnapshot {
        let mut pg = Playground::new(PlaygroundConfig::default().with_seed(7)).unwrap();
        for _ in 0..20 {
            pg.frame(60.0, &NoInput);
        }
        pg.snapshot()
    }

    fn count_char(fb: &FrameBuffer, ch: char) -> usize {
        fb.cells().iter().filter(|c| c.ch == ch).count()
    }

    #[test]
    fn test_renders_border_and_active_figure() {
        let snap = running_snapshot();
        assert!(snap.active.is_some());
        let fb = GameView::default().render(&snap, Viewport::new(60, 24));

        assert_eq!(count_char(&fb, '┌'), 1);
        // Four bricks, two columns each.
        assert_eq!(count_char(&fb, '█') - 2 * snap.queue.len(), 8);
    }

    #[test]
    fn test_ghost_drawn_below_active_figure() {
        let snap = running_snapshot();
        let with = GameView::default().render(&snap, Viewport::new(60, 24));
        let without = GameView::default()
            .with_ghost(false)
            .render(&snap, Viewport::new(60, 24));

        assert_eq!(count_char(&with, '░'), 8);
        assert_eq!(count_char(&without, '░'), 0);
    }

    #[test]
    fn test_pause_overlay() {
        let mut snap = running_snapshot();
        snap.paused = true;
        let fb = GameView::default().render(&snap, Viewport::new(60, 24));
        let found = (0..fb.height()).any(|y| fb.row_text(y).contains("PAUSED"));
        assert!(found);
    }

    #[test]
    fn test_anchor_top_pins_board_to_first_row() {
        let snap = running_snapshot();
        // Frame is 22x22 (20 rows and 10 double-width columns, plus border).
        let vp = Viewport::new(22, 30);

        let centered = GameView::default().render(&snap, vp);
        assert_eq!(centered.get(0, 4).unwrap().ch, '┌');

        let top = GameView::default()
            .with_anchor_y(AnchorY::Top)
            .render(&snap, vp);
        assert_eq!(top.get(0, 0).unwrap().ch, '┌');
        assert_eq!(top.get(21, 21).unwrap().ch, '┘');
    }

    #[test]
    fn test_tiny_viewport_does_not_panic() {
        let snap = running_snapshot();
        let fb = GameView::default().render(&snap, Viewport::new(5, 3));
        assert_eq!(fb.width(), 5);
    }

    #[test]
    fn test_lerp_rounds_toward_target() {
        assert_eq!(lerp(3, 7, 0.0), 3);
        assert_eq!(lerp(3, 7, 0.5), 5);
        assert_eq!(lerp(3, 7, 2.0), 7);
    }
}
